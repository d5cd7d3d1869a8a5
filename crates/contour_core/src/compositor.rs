//! Outline compositing

use crate::buffers::BufferId;
use crate::command::{CommandStream, OutlineCommand};
use crate::settings::MaterialHandle;
use crate::uniforms::OutlineUniforms;

/// Blends the converged field onto the camera color target
///
/// Pixels within `outline_width` of the nearest edge and outside the
/// silhouette receive the outline color; everything else is left untouched.
#[derive(Clone, Copy, Debug)]
pub struct OutlineCompositor {
    material: MaterialHandle,
}

impl OutlineCompositor {
    pub fn new(material: MaterialHandle) -> Self {
        Self { material }
    }

    pub fn record(
        &self,
        stream: &mut CommandStream,
        nearest_point: BufferId,
        silhouette: BufferId,
        uniforms: &OutlineUniforms,
    ) {
        stream.push(OutlineCommand::Composite {
            source: nearest_point,
            silhouette,
            material: self.material,
            uniforms: *uniforms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ShaderPass;

    #[test]
    fn test_records_outline_pass() {
        let mut stream = CommandStream::new("composite");
        OutlineCompositor::new(MaterialHandle(3)).record(
            &mut stream,
            BufferId::NEAREST_POINT,
            BufferId::SILHOUETTE,
            &bytemuck::Zeroable::zeroed(),
        );
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.commands()[0].shader_pass(), Some(ShaderPass::JfaOutline));
    }
}
