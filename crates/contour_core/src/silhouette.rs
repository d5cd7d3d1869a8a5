//! Silhouette extraction
//!
//! Records the clear and draw of the single-channel mask that marks every
//! pixel covered by geometry matching the outline filter.

use crate::buffers::{BufferDescriptor, BufferId, TargetDescriptor};
use crate::command::{CommandStream, OutlineCommand};
use crate::layer::GeometryFilter;
use crate::settings::MaterialHandle;

#[derive(Clone, Copy, Debug)]
pub struct SilhouetteExtractor {
    filter: GeometryFilter,
    material: MaterialHandle,
}

impl SilhouetteExtractor {
    pub fn new(filter: GeometryFilter, material: MaterialHandle) -> Self {
        Self { filter, material }
    }

    pub fn filter(&self) -> &GeometryFilter {
        &self.filter
    }

    /// Mask sized to the camera target with the quality setting's sample count
    pub fn descriptor(target: &TargetDescriptor, antialiasing: u32) -> BufferDescriptor {
        BufferDescriptor::silhouette(target, antialiasing)
    }

    /// Record allocation, clear and draw of the mask into `stream`
    pub fn record(&self, stream: &mut CommandStream, descriptor: BufferDescriptor) -> BufferId {
        let id = BufferId::SILHOUETTE;
        stream.push(OutlineCommand::Allocate { id, descriptor });
        stream.push(OutlineCommand::Clear { id });
        stream.push(OutlineCommand::DrawSilhouette {
            target: id,
            filter: self.filter,
            material: self.material,
        });
        id
    }
}
