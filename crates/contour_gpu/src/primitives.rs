//! GPU geometry for the silhouette pass
//!
//! Meshes are triangle lists in target pixel coordinates. Vertex data uses
//! `#[repr(C)]` and `bytemuck::Pod` for direct buffer uploads.

use contour_core::layer::render_queue;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuVertex {
    /// Position in pixels
    pub position: [f32; 2],
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn new(x: f32, y: f32) -> Self {
        Self { position: [x, y] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A filterable triangle mesh
#[derive(Clone, Debug, PartialEq)]
pub struct GpuMesh {
    pub layer: u8,
    pub render_queue: i32,
    pub vertices: Vec<GpuVertex>,
}

impl GpuMesh {
    /// Opaque mesh on layer 0
    pub fn new(vertices: Vec<GpuVertex>) -> Self {
        Self {
            layer: 0,
            render_queue: render_queue::GEOMETRY,
            vertices,
        }
    }

    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        let (x1, y1) = (x + width, y + height);
        Self::new(vec![
            GpuVertex::new(x, y),
            GpuVertex::new(x1, y),
            GpuVertex::new(x1, y1),
            GpuVertex::new(x, y),
            GpuVertex::new(x1, y1),
            GpuVertex::new(x, y1),
        ])
    }

    pub fn triangle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Self {
        Self::new(vec![
            GpuVertex::new(a.0, a.1),
            GpuVertex::new(b.0, b.1),
            GpuVertex::new(c.0, c.1),
        ])
    }

    /// Circle approximated by a fan of `segments` triangles
    pub fn circle(cx: f32, cy: f32, radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let point = |i: u32| {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            GpuVertex::new(cx + radius * angle.cos(), cy + radius * angle.sin())
        };
        let mut vertices = Vec::with_capacity(segments as usize * 3);
        for i in 0..segments {
            vertices.push(GpuVertex::new(cx, cy));
            vertices.push(point(i));
            vertices.push(point(i + 1));
        }
        Self::new(vertices)
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn in_queue(mut self, render_queue: i32) -> Self {
        self.render_queue = render_queue;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 8);
        assert_eq!(GpuVertex::layout().array_stride, 8);
    }

    #[test]
    fn test_mesh_builders() {
        assert_eq!(GpuMesh::rect(0.0, 0.0, 2.0, 2.0).vertices.len(), 6);
        assert_eq!(GpuMesh::circle(0.0, 0.0, 1.0, 16).vertices.len(), 48);
        assert_eq!(GpuMesh::circle(0.0, 0.0, 1.0, 1).vertices.len(), 9);
    }
}
