//! Scene geometry for the software backend
//!
//! Shapes are given in pixel coordinates with the origin at the top-left
//! corner of the target; pixel `(x, y)` covers `[x, x + 1) x [y, y + 1)`.

use contour_core::layer::{render_queue, GeometryFilter};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
    },
    Triangle {
        points: [(f32, f32); 3],
    },
}

impl Shape {
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Shape::Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn circle(cx: f32, cy: f32, radius: f32) -> Self {
        Shape::Circle { cx, cy, radius }
    }

    pub fn triangle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Self {
        Shape::Triangle { points: [a, b, c] }
    }

    /// Whether the point lies inside the shape (right and bottom edges excluded)
    pub fn contains(&self, px: f32, py: f32) -> bool {
        match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => px >= x && px < x + width && py >= y && py < y + height,
            Shape::Circle { cx, cy, radius } => {
                let dx = px - cx;
                let dy = py - cy;
                dx * dx + dy * dy <= radius * radius
            }
            Shape::Triangle { points: [a, b, c] } => {
                let e0 = edge(a, b, (px, py));
                let e1 = edge(b, c, (px, py));
                let e2 = edge(c, a, (px, py));
                // either winding
                (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0)
            }
        }
    }

    /// Bounding box as `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => (x, y, x + width, y + height),
            Shape::Circle { cx, cy, radius } => (cx - radius, cy - radius, cx + radius, cy + radius),
            Shape::Triangle { points } => {
                let xs = points.map(|p| p.0);
                let ys = points.map(|p| p.1);
                (
                    xs.iter().copied().fold(f32::INFINITY, f32::min),
                    ys.iter().copied().fold(f32::INFINITY, f32::min),
                    xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                    ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                )
            }
        }
    }
}

fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// A shape with the layer and render queue used for filtering
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable {
    pub layer: u8,
    pub render_queue: i32,
    pub shape: Shape,
}

impl Renderable {
    /// Opaque geometry on layer 0
    pub fn new(shape: Shape) -> Self {
        Self {
            layer: 0,
            render_queue: render_queue::GEOMETRY,
            shape,
        }
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

#[derive(Clone, Debug, Default)]
pub struct Scene {
    renderables: Vec<Renderable>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, renderable: Renderable) -> Self {
        self.add(renderable);
        self
    }

    pub fn add(&mut self, renderable: Renderable) {
        self.renderables.push(renderable);
    }

    pub fn clear(&mut self) {
        self.renderables.clear();
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Renderable> {
        self.renderables.iter()
    }

    /// Renderables passing `filter`, in insertion order
    pub fn filtered<'a>(
        &'a self,
        filter: &'a GeometryFilter,
    ) -> impl Iterator<Item = &'a Renderable> + 'a {
        self.renderables
            .iter()
            .filter(move |r| filter.matches(r.layer, r.render_queue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::{LayerMask, RenderQueueRange};

    #[test]
    fn test_rect_half_open() {
        let rect = Shape::rect(2.0, 2.0, 4.0, 4.0);
        assert!(rect.contains(2.0, 2.0));
        assert!(rect.contains(5.9, 5.9));
        assert!(!rect.contains(6.0, 3.0));
    }

    #[test]
    fn test_triangle_either_winding() {
        let cw = Shape::triangle((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        let ccw = Shape::triangle((0.0, 0.0), (0.0, 10.0), (10.0, 0.0));
        assert!(cw.contains(2.0, 2.0));
        assert!(ccw.contains(2.0, 2.0));
        assert!(!cw.contains(8.0, 8.0));
        assert_eq!(cw.bounds(), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_circle() {
        let circle = Shape::circle(5.0, 5.0, 2.0);
        assert!(circle.contains(6.0, 6.0));
        assert!(!circle.contains(7.5, 7.5));
    }

    #[test]
    fn test_filtered_by_layer_and_queue() {
        let scene = Scene::new()
            .with(Renderable::new(Shape::rect(0.0, 0.0, 1.0, 1.0)).on_layer(1))
            .with(Renderable::new(Shape::rect(0.0, 0.0, 1.0, 1.0)).on_layer(2))
            .with(
                Renderable::new(Shape::rect(0.0, 0.0, 1.0, 1.0))
                    .on_layer(1)
                    .in_queue(render_queue::TRANSPARENT),
            );
        let filter = GeometryFilter::new(LayerMask::layer(1), RenderQueueRange::OPAQUE_OR_EARLIER);
        assert_eq!(scene.filtered(&filter).count(), 1);
    }
}
