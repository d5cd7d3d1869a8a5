//! Recorded outline commands
//!
//! The pipeline never talks to a device directly. Each stage appends
//! [`OutlineCommand`]s to a [`CommandStream`] and the finished stream is
//! handed to an [`OutlineBackend`](crate::OutlineBackend) in one submission.

use crate::buffers::{BufferDescriptor, BufferId};
use crate::layer::GeometryFilter;
use crate::settings::MaterialHandle;
use crate::uniforms::OutlineUniforms;

/// Shader passes of the outline material (must match material pass order)
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderPass {
    InteriorStencil = 0,
    SilhouetteFill = 1,
    JfaInit = 2,
    JfaFlood = 3,
    JfaFloodSingleAxis = 4,
    JfaOutline = 5,
}

impl ShaderPass {
    pub fn index(&self) -> u32 {
        *self as u32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutlineCommand {
    /// Create a frame-scoped buffer
    Allocate {
        id: BufferId,
        descriptor: BufferDescriptor,
    },
    /// Fill a buffer with zero (masks) or the sentinel (nearest-point fields)
    Clear { id: BufferId },
    /// Draw filtered geometry into the silhouette mask
    DrawSilhouette {
        target: BufferId,
        filter: GeometryFilter,
        material: MaterialHandle,
    },
    /// Seed a nearest-point field from the silhouette boundary
    JfaInit {
        source: BufferId,
        target: BufferId,
        material: MaterialHandle,
        uniforms: OutlineUniforms,
    },
    /// Full-kernel flood pass
    Flood {
        source: BufferId,
        target: BufferId,
        material: MaterialHandle,
        uniforms: OutlineUniforms,
    },
    /// Single-axis flood pass
    FloodAxis {
        source: BufferId,
        target: BufferId,
        material: MaterialHandle,
        uniforms: OutlineUniforms,
    },
    /// Blend the outline onto the camera color target
    Composite {
        source: BufferId,
        silhouette: BufferId,
        material: MaterialHandle,
        uniforms: OutlineUniforms,
    },
    /// Free a frame-scoped buffer
    Release { id: BufferId },
}

impl OutlineCommand {
    /// Shader pass used by the command, if it draws
    pub fn shader_pass(&self) -> Option<ShaderPass> {
        match self {
            OutlineCommand::DrawSilhouette { .. } => Some(ShaderPass::SilhouetteFill),
            OutlineCommand::JfaInit { .. } => Some(ShaderPass::JfaInit),
            OutlineCommand::Flood { .. } => Some(ShaderPass::JfaFlood),
            OutlineCommand::FloodAxis { .. } => Some(ShaderPass::JfaFloodSingleAxis),
            OutlineCommand::Composite { .. } => Some(ShaderPass::JfaOutline),
            OutlineCommand::Allocate { .. }
            | OutlineCommand::Clear { .. }
            | OutlineCommand::Release { .. } => None,
        }
    }

    /// True for flood passes
    pub fn is_flood(&self) -> bool {
        matches!(
            self,
            OutlineCommand::Flood { .. } | OutlineCommand::FloodAxis { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutlineCommand::Allocate { .. } => "allocate",
            OutlineCommand::Clear { .. } => "clear",
            OutlineCommand::DrawSilhouette { .. } => "draw_silhouette",
            OutlineCommand::JfaInit { .. } => "jfa_init",
            OutlineCommand::Flood { .. } => "jfa_flood",
            OutlineCommand::FloodAxis { .. } => "jfa_flood_axis",
            OutlineCommand::Composite { .. } => "jfa_outline",
            OutlineCommand::Release { .. } => "release",
        }
    }
}

/// Ordered commands for one camera and one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandStream {
    label: String,
    commands: Vec<OutlineCommand>,
}

impl CommandStream {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn push(&mut self, command: OutlineCommand) {
        tracing::trace!(stream = %self.label, command = command.label(), "record");
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[OutlineCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OutlineCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of flood passes in the stream
    pub fn flood_pass_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_flood()).count()
    }
}

impl<'a> IntoIterator for &'a CommandStream {
    type Item = &'a OutlineCommand;
    type IntoIter = std::slice::Iter<'a, OutlineCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_pass_indices() {
        assert_eq!(ShaderPass::InteriorStencil.index(), 0);
        assert_eq!(ShaderPass::SilhouetteFill.index(), 1);
        assert_eq!(ShaderPass::JfaInit.index(), 2);
        assert_eq!(ShaderPass::JfaFlood.index(), 3);
        assert_eq!(ShaderPass::JfaFloodSingleAxis.index(), 4);
        assert_eq!(ShaderPass::JfaOutline.index(), 5);
    }

    #[test]
    fn test_bookkeeping_commands_have_no_pass() {
        let clear = OutlineCommand::Clear {
            id: BufferId::SILHOUETTE,
        };
        assert_eq!(clear.shader_pass(), None);
        assert!(!clear.is_flood());
    }

    #[test]
    fn test_stream_counts_floods() {
        let mut stream = CommandStream::new("test");
        let uniforms = bytemuck::Zeroable::zeroed();
        stream.push(OutlineCommand::Flood {
            source: BufferId::NEAREST_POINT,
            target: BufferId::NEAREST_POINT_PING_PONG,
            material: MaterialHandle(0),
            uniforms,
        });
        stream.push(OutlineCommand::Release {
            id: BufferId::NEAREST_POINT,
        });
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.flood_pass_count(), 1);
    }
}
