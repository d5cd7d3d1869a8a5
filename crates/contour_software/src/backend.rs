//! CPU execution of outline command streams

use contour_core::{
    BufferFormat, BufferId, CommandStream, MaterialHandle, OutlineBackend, OutlineCommand,
    ShaderPass,
};
use image::{Rgba, RgbaImage};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::buffer::{MaskBuffer, NearestBuffer, SoftwareBuffer};
use crate::error::{Result, SoftwareError};
use crate::kernels;
use crate::scene::Scene;

/// Handle of the built-in outline material
pub const OUTLINE_MATERIAL: MaterialHandle = MaterialHandle(0);

/// Reference backend executing every pass on the CPU
///
/// The color target is treated as linear RGBA8.
pub struct SoftwareBackend {
    scene: Scene,
    target: RgbaImage,
    buffers: FxHashMap<BufferId, SoftwareBuffer>,
    materials: FxHashSet<MaterialHandle>,
    executed: Vec<ShaderPass>,
}

impl SoftwareBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_target(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
    }

    pub fn with_target(target: RgbaImage) -> Self {
        let mut materials = FxHashSet::default();
        materials.insert(OUTLINE_MATERIAL);
        Self {
            scene: Scene::new(),
            target,
            buffers: FxHashMap::default(),
            materials,
            executed: Vec::new(),
        }
    }

    pub fn outline_material(&self) -> MaterialHandle {
        OUTLINE_MATERIAL
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub fn target(&self) -> &RgbaImage {
        &self.target
    }

    pub fn set_target(&mut self, target: RgbaImage) {
        self.target = target;
    }

    pub fn into_target(self) -> RgbaImage {
        self.target
    }

    /// Shader passes run by the last submission, in order
    pub fn executed_passes(&self) -> &[ShaderPass] {
        &self.executed
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn mask(&self, id: BufferId) -> Option<&MaskBuffer> {
        match self.buffers.get(&id) {
            Some(SoftwareBuffer::Mask(mask)) => Some(mask),
            _ => None,
        }
    }

    pub fn nearest_field(&self, id: BufferId) -> Option<&NearestBuffer> {
        match self.buffers.get(&id) {
            Some(SoftwareBuffer::Nearest(field)) => Some(field),
            _ => None,
        }
    }

    fn check_material(&self, material: MaterialHandle) -> Result<()> {
        if self.materials.contains(&material) {
            Ok(())
        } else {
            Err(SoftwareError::UnknownMaterial(material))
        }
    }

    /// Run `pass` writing into the nearest-point buffer `target`
    ///
    /// The target is taken out of the map for the duration of the pass so
    /// the other buffers stay readable.
    fn write_field<F>(&mut self, target: BufferId, pass: F) -> Result<()>
    where
        F: FnOnce(&FxHashMap<BufferId, SoftwareBuffer>, &mut NearestBuffer) -> Result<()>,
    {
        let mut field = match self.buffers.remove(&target) {
            Some(SoftwareBuffer::Nearest(field)) => field,
            Some(other) => {
                let actual = other.format();
                self.buffers.insert(target, other);
                return Err(SoftwareError::FormatMismatch {
                    id: target,
                    expected: BufferFormat::Rg16Snorm,
                    actual,
                });
            }
            None => return Err(SoftwareError::UnknownBuffer(target)),
        };
        let result = pass(&self.buffers, &mut field);
        self.buffers.insert(target, SoftwareBuffer::Nearest(field));
        result
    }

    fn check_size(id: BufferId, expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(SoftwareError::SizeMismatch {
                id,
                expected,
                actual,
            })
        }
    }

    fn execute(&mut self, command: &OutlineCommand) -> Result<()> {
        if let Some(pass) = command.shader_pass() {
            self.executed.push(pass);
        }

        match command {
            OutlineCommand::Allocate { id, descriptor } => {
                if self.buffers.contains_key(id) {
                    return Err(SoftwareError::AlreadyAllocated(*id));
                }
                let buffer = SoftwareBuffer::allocate(descriptor)
                    .ok_or(SoftwareError::UnsupportedFormat(descriptor.format))?;
                self.buffers.insert(*id, buffer);
            }
            OutlineCommand::Clear { id } => {
                self.buffers
                    .get_mut(id)
                    .ok_or(SoftwareError::UnknownBuffer(*id))?
                    .clear();
            }
            OutlineCommand::DrawSilhouette {
                target,
                filter,
                material,
            } => {
                self.check_material(*material)?;
                let mask = match self.buffers.get_mut(target) {
                    Some(SoftwareBuffer::Mask(mask)) => mask,
                    Some(other) => {
                        return Err(SoftwareError::FormatMismatch {
                            id: *target,
                            expected: BufferFormat::R8Unorm,
                            actual: other.format(),
                        })
                    }
                    None => return Err(SoftwareError::UnknownBuffer(*target)),
                };
                kernels::rasterize_silhouette(mask, &self.scene, filter);
            }
            OutlineCommand::JfaInit {
                source,
                target,
                material,
                ..
            } => {
                self.check_material(*material)?;
                self.write_field(*target, |buffers, field| {
                    let mask = mask_in(buffers, *source)?;
                    Self::check_size(*source, field.size(), mask.size())?;
                    kernels::seed(mask, field);
                    Ok(())
                })?;
            }
            OutlineCommand::Flood {
                source,
                target,
                material,
                uniforms,
            } => {
                self.check_material(*material)?;
                self.write_field(*target, |buffers, field| {
                    let src = field_in(buffers, *source)?;
                    Self::check_size(*source, field.size(), src.size())?;
                    kernels::flood(src, field, uniforms.jump());
                    Ok(())
                })?;
            }
            OutlineCommand::FloodAxis {
                source,
                target,
                material,
                uniforms,
            } => {
                self.check_material(*material)?;
                self.write_field(*target, |buffers, field| {
                    let src = field_in(buffers, *source)?;
                    Self::check_size(*source, field.size(), src.size())?;
                    kernels::flood_axis(src, field, uniforms.jump(), uniforms.axis());
                    Ok(())
                })?;
            }
            OutlineCommand::Composite {
                source,
                silhouette,
                material,
                uniforms,
            } => {
                self.check_material(*material)?;
                let field = field_in(&self.buffers, *source)?;
                let mask = mask_in(&self.buffers, *silhouette)?;
                let target_size = self.target.dimensions();
                Self::check_size(*source, target_size, field.size())?;
                Self::check_size(*silhouette, target_size, mask.size())?;
                kernels::composite(field, mask, &mut self.target, uniforms);
            }
            OutlineCommand::Release { id } => {
                if self.buffers.remove(id).is_none() {
                    return Err(SoftwareError::UnknownBuffer(*id));
                }
            }
        }
        Ok(())
    }
}

fn mask_in(buffers: &FxHashMap<BufferId, SoftwareBuffer>, id: BufferId) -> Result<&MaskBuffer> {
    match buffers.get(&id) {
        Some(SoftwareBuffer::Mask(mask)) => Ok(mask),
        Some(other) => Err(SoftwareError::FormatMismatch {
            id,
            expected: BufferFormat::R8Unorm,
            actual: other.format(),
        }),
        None => Err(SoftwareError::UnknownBuffer(id)),
    }
}

fn field_in(
    buffers: &FxHashMap<BufferId, SoftwareBuffer>,
    id: BufferId,
) -> Result<&NearestBuffer> {
    match buffers.get(&id) {
        Some(SoftwareBuffer::Nearest(field)) => Ok(field),
        Some(other) => Err(SoftwareError::FormatMismatch {
            id,
            expected: BufferFormat::Rg16Snorm,
            actual: other.format(),
        }),
        None => Err(SoftwareError::UnknownBuffer(id)),
    }
}

impl OutlineBackend for SoftwareBackend {
    type Error = SoftwareError;

    fn submit(&mut self, stream: &CommandStream) -> Result<()> {
        self.executed.clear();
        tracing::debug!(stream = stream.label(), commands = stream.len(), "software submit");
        for command in stream {
            tracing::trace!(command = command.label(), "execute");
            self.execute(command)?;
        }
        Ok(())
    }

    fn release(&mut self, id: BufferId) {
        if self.buffers.remove(&id).is_some() {
            tracing::debug!(buffer = %id, "released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_core::{BufferDescriptor, TargetDescriptor};

    fn nearest_descriptor() -> BufferDescriptor {
        BufferDescriptor::nearest_point(&BufferDescriptor::silhouette(
            &TargetDescriptor::new(8, 8),
            1,
        ))
    }

    #[test]
    fn test_double_allocate_fails() {
        let mut backend = SoftwareBackend::new(8, 8);
        let mut stream = CommandStream::new("test");
        for _ in 0..2 {
            stream.push(OutlineCommand::Allocate {
                id: BufferId::NEAREST_POINT,
                descriptor: nearest_descriptor(),
            });
        }
        assert_eq!(
            backend.submit(&stream),
            Err(SoftwareError::AlreadyAllocated(BufferId::NEAREST_POINT))
        );
        assert_eq!(backend.live_buffers(), 1);

        backend.release(BufferId::NEAREST_POINT);
        backend.release(BufferId::NEAREST_POINT);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_unknown_material() {
        let mut backend = SoftwareBackend::new(8, 8);
        let mut stream = CommandStream::new("test");
        stream.push(OutlineCommand::Allocate {
            id: BufferId::SILHOUETTE,
            descriptor: BufferDescriptor::silhouette(&TargetDescriptor::new(8, 8), 1),
        });
        stream.push(OutlineCommand::DrawSilhouette {
            target: BufferId::SILHOUETTE,
            filter: Default::default(),
            material: MaterialHandle(42),
        });
        assert_eq!(
            backend.submit(&stream),
            Err(SoftwareError::UnknownMaterial(MaterialHandle(42)))
        );
    }

    #[test]
    fn test_format_mismatch_keeps_buffer() {
        let mut backend = SoftwareBackend::new(8, 8);
        let mut stream = CommandStream::new("test");
        stream.push(OutlineCommand::Allocate {
            id: BufferId::SILHOUETTE,
            descriptor: BufferDescriptor::silhouette(&TargetDescriptor::new(8, 8), 1),
        });
        stream.push(OutlineCommand::JfaInit {
            source: BufferId::SILHOUETTE,
            target: BufferId::SILHOUETTE,
            material: OUTLINE_MATERIAL,
            uniforms: blank_uniforms(),
        });
        assert!(matches!(
            backend.submit(&stream),
            Err(SoftwareError::FormatMismatch { .. })
        ));
        assert!(backend.mask(BufferId::SILHOUETTE).is_some());
    }

    #[test]
    fn test_composite_size_mismatch() {
        let mut backend = SoftwareBackend::new(4, 4);
        let mut stream = CommandStream::new("test");
        stream.push(OutlineCommand::Allocate {
            id: BufferId::SILHOUETTE,
            descriptor: BufferDescriptor::silhouette(&TargetDescriptor::new(8, 8), 1),
        });
        stream.push(OutlineCommand::Allocate {
            id: BufferId::NEAREST_POINT,
            descriptor: nearest_descriptor(),
        });
        stream.push(OutlineCommand::Composite {
            source: BufferId::NEAREST_POINT,
            silhouette: BufferId::SILHOUETTE,
            material: OUTLINE_MATERIAL,
            uniforms: blank_uniforms(),
        });
        assert!(matches!(
            backend.submit(&stream),
            Err(SoftwareError::SizeMismatch { .. })
        ));
    }

    fn blank_uniforms() -> contour_core::OutlineUniforms {
        contour_core::OutlineUniforms {
            color: [0.0; 4],
            target_size: [8.0, 8.0],
            outline_width: 1.0,
            step_width: 0.0,
            axis_step: [0.0; 2],
            sample_count: 1,
            _padding: 0,
        }
    }
}
