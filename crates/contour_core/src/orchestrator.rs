//! Per-frame outline pass
//!
//! [`OutlineRenderer`] is what a host drives once per camera per frame. It
//! records the whole pipeline into one [`CommandStream`], submits it to the
//! backend and keeps a ledger of the temporary buffers so they are released
//! exactly once whether the frame succeeds or not.

use crate::backend::OutlineBackend;
use crate::buffers::{BufferId, FrameResources, TargetDescriptor};
use crate::command::{CommandStream, OutlineCommand};
use crate::compositor::OutlineCompositor;
use crate::error::{OutlineError, Result};
use crate::jump_flood::JumpFlood;
use crate::plan::IterationPlan;
use crate::settings::{MaterialHandle, OutlineSettings};
use crate::silhouette::SilhouetteExtractor;
use crate::uniforms::OutlineUniforms;

/// Points in the host frame where a pass can be inserted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderPassEvent {
    BeforeRendering,
    AfterRenderingOpaques,
    AfterRenderingSkybox,
    AfterRenderingTransparents,
    AfterRendering,
}

/// What the host provides for one camera and one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameContext {
    pub target: TargetDescriptor,
    /// Antialiasing quality (MSAA sample count); sizes the silhouette only
    pub antialiasing: u32,
}

impl FrameContext {
    pub fn new(target: TargetDescriptor) -> Self {
        Self {
            antialiasing: target.sample_count.max(1),
            target,
        }
    }

    pub fn with_antialiasing(mut self, antialiasing: u32) -> Self {
        self.antialiasing = antialiasing;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No outline material configured
    MissingMaterial,
    /// Camera target has no pixels
    EmptyTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    Rendered {
        /// Flood passes recorded
        flood_passes: usize,
        /// Buffer that held the converged field
        final_buffer: BufferId,
    },
    Skipped(SkipReason),
}

/// A host-driven render pass
pub trait OutlinePass<B: OutlineBackend> {
    /// Apply settings for the coming frames
    fn configure(&mut self, settings: &OutlineSettings);

    /// Record and submit the pass for one frame
    fn execute(&mut self, frame: &FrameContext, backend: &mut B) -> Result<PassOutcome>;

    /// Release anything the frame still holds. No-op after a normal frame.
    fn frame_cleanup(&mut self, backend: &mut B);
}

/// Jump flood outline pass for one camera
#[derive(Debug, Default)]
pub struct OutlineRenderer {
    settings: OutlineSettings,
    resources: FrameResources,
    warned_missing_material: bool,
    /// Frames skipped without a warning since the last one
    suppressed_missing_material: u32,
}

impl OutlineRenderer {
    pub fn new(settings: OutlineSettings) -> Self {
        Self {
            settings,
            resources: FrameResources::new(),
            warned_missing_material: false,
            suppressed_missing_material: 0,
        }
    }

    pub fn settings(&self) -> &OutlineSettings {
        &self.settings
    }

    pub fn insertion_point() -> RenderPassEvent {
        RenderPassEvent::AfterRenderingTransparents
    }

    /// Buffers currently held by the frame
    pub fn live_buffers(&self) -> &[BufferId] {
        self.resources.live()
    }

    /// Record the full pipeline for one frame
    ///
    /// Returns the stream and the buffer holding the converged field. The
    /// stream ends with the release of every buffer it allocates.
    pub fn record(&self, material: MaterialHandle, frame: &FrameContext) -> (CommandStream, BufferId) {
        let settings = &self.settings;
        let plan = IterationPlan::new(settings.width());
        let mut stream = CommandStream::new("jump_flood_outline");

        let silhouette_descriptor =
            SilhouetteExtractor::descriptor(&frame.target, frame.antialiasing);
        let silhouette = SilhouetteExtractor::new(settings.geometry_filter(), material)
            .record(&mut stream, silhouette_descriptor);

        let uniforms = OutlineUniforms::new(
            settings,
            &plan,
            &frame.target,
            silhouette_descriptor.sample_count,
        );

        let mut flood = JumpFlood::new(settings.variant, plan, material);
        let nearest_point =
            flood.record(&mut stream, silhouette, &silhouette_descriptor, &uniforms);

        OutlineCompositor::new(material).record(&mut stream, nearest_point, silhouette, &uniforms);

        for id in [
            BufferId::SILHOUETTE,
            BufferId::NEAREST_POINT,
            BufferId::NEAREST_POINT_PING_PONG,
        ] {
            stream.push(OutlineCommand::Release { id });
        }

        (stream, nearest_point)
    }

    fn release_live<B: OutlineBackend>(&mut self, backend: &mut B) {
        for id in self.resources.drain() {
            tracing::debug!(buffer = %id, "releasing frame buffer");
            backend.release(id);
        }
    }
}

impl<B: OutlineBackend> OutlinePass<B> for OutlineRenderer {
    fn configure(&mut self, settings: &OutlineSettings) {
        self.settings = settings.clone();
        self.warned_missing_material = false;
        self.suppressed_missing_material = 0;
    }

    fn execute(&mut self, frame: &FrameContext, backend: &mut B) -> Result<PassOutcome> {
        // Buffers left behind by a frame that was never cleaned up
        self.release_live(backend);

        let Some(material) = self.settings.material else {
            if self.warned_missing_material {
                self.suppressed_missing_material += 1;
                tracing::debug!(
                    frames = self.suppressed_missing_material,
                    "outline material is still not set; skipping outline pass"
                );
            } else {
                tracing::warn!("outline material is not set; skipping outline pass");
                self.warned_missing_material = true;
            }
            return Ok(PassOutcome::Skipped(SkipReason::MissingMaterial));
        };

        if frame.target.is_empty() {
            tracing::debug!(
                width = frame.target.width,
                height = frame.target.height,
                "empty camera target; skipping outline pass"
            );
            return Ok(PassOutcome::Skipped(SkipReason::EmptyTarget));
        }

        let (stream, final_buffer) = self.record(material, frame);
        for command in stream.iter() {
            if let OutlineCommand::Allocate { id, .. } = command {
                self.resources.acquire(*id);
            }
        }

        tracing::debug!(
            commands = stream.len(),
            flood_passes = stream.flood_pass_count(),
            width = self.settings.width(),
            variant = ?self.settings.variant,
            "submitting outline pass"
        );

        if let Err(err) = backend.submit(&stream) {
            tracing::error!(stream = stream.label(), "outline pass failed: {}", err);
            return Err(OutlineError::Backend {
                stream: stream.label().to_string(),
                source: Box::new(err),
            });
        }

        for command in stream.iter() {
            if let OutlineCommand::Release { id } = command {
                self.resources.release(*id);
            }
        }

        Ok(PassOutcome::Rendered {
            flood_passes: stream.flood_pass_count(),
            final_buffer,
        })
    }

    fn frame_cleanup(&mut self, backend: &mut B) {
        self.release_live(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::JfaVariant;

    #[derive(Debug, thiserror::Error)]
    #[error("device lost")]
    struct DeviceLost;

    #[derive(Default)]
    struct RecordingBackend {
        submitted: Vec<CommandStream>,
        released: Vec<BufferId>,
        fail: bool,
    }

    impl OutlineBackend for RecordingBackend {
        type Error = DeviceLost;

        fn submit(&mut self, stream: &CommandStream) -> std::result::Result<(), DeviceLost> {
            if self.fail {
                return Err(DeviceLost);
            }
            for command in stream.iter() {
                if let OutlineCommand::Release { id } = command {
                    self.released.push(*id);
                }
            }
            self.submitted.push(stream.clone());
            Ok(())
        }

        fn release(&mut self, id: BufferId) {
            self.released.push(id);
        }
    }

    fn frame() -> FrameContext {
        FrameContext::new(TargetDescriptor::new(64, 48))
    }

    fn released_counts(backend: &RecordingBackend) -> [usize; 3] {
        let count = |id| backend.released.iter().filter(|r| **r == id).count();
        [
            count(BufferId::SILHOUETTE),
            count(BufferId::NEAREST_POINT),
            count(BufferId::NEAREST_POINT_PING_PONG),
        ]
    }

    #[test]
    fn test_missing_material_is_noop() {
        let mut renderer = OutlineRenderer::new(OutlineSettings::new());
        let mut backend = RecordingBackend::default();

        for _ in 0..2 {
            let outcome = renderer.execute(&frame(), &mut backend).unwrap();
            assert_eq!(outcome, PassOutcome::Skipped(SkipReason::MissingMaterial));
        }
        assert!(backend.submitted.is_empty());
        assert!(backend.released.is_empty());
        assert!(renderer.live_buffers().is_empty());
    }

    #[test]
    fn test_empty_target_skipped() {
        let settings = OutlineSettings::new().with_material(MaterialHandle(0));
        let mut renderer = OutlineRenderer::new(settings);
        let mut backend = RecordingBackend::default();

        let empty = FrameContext::new(TargetDescriptor::new(0, 10));
        let outcome = renderer.execute(&empty, &mut backend).unwrap();
        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::EmptyTarget));
        assert!(backend.submitted.is_empty());
    }

    #[test]
    fn test_single_submission_with_releases() {
        let settings = OutlineSettings::new()
            .with_material(MaterialHandle(0))
            .with_width(4.0);
        let mut renderer = OutlineRenderer::new(settings);
        let mut backend = RecordingBackend::default();

        let outcome = renderer.execute(&frame(), &mut backend).unwrap();
        assert_eq!(
            outcome,
            PassOutcome::Rendered {
                flood_passes: 2,
                final_buffer: BufferId::NEAREST_POINT,
            }
        );
        assert_eq!(backend.submitted.len(), 1);
        assert_eq!(released_counts(&backend), [1, 1, 1]);
        assert!(renderer.live_buffers().is_empty());

        // cleanup after a normal frame releases nothing more
        renderer.frame_cleanup(&mut backend);
        assert_eq!(released_counts(&backend), [1, 1, 1]);
    }

    #[test]
    fn test_failed_submit_released_by_cleanup() {
        let settings = OutlineSettings::new().with_material(MaterialHandle(0));
        let mut renderer = OutlineRenderer::new(settings);
        let mut backend = RecordingBackend {
            fail: true,
            ..Default::default()
        };

        let err = renderer.execute(&frame(), &mut backend).unwrap_err();
        assert!(matches!(err, OutlineError::Backend { .. }));
        assert_eq!(renderer.live_buffers().len(), 3);

        renderer.frame_cleanup(&mut backend);
        renderer.frame_cleanup(&mut backend);
        assert_eq!(released_counts(&backend), [1, 1, 1]);
        assert!(renderer.live_buffers().is_empty());
    }

    #[test]
    fn test_stream_order() {
        let settings = OutlineSettings::new()
            .with_material(MaterialHandle(0))
            .with_width(2.0)
            .with_variant(JfaVariant::SeparableAxis);
        let renderer = OutlineRenderer::new(settings);
        let (stream, _) = renderer.record(MaterialHandle(0), &frame());

        let labels: Vec<_> = stream.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            [
                "allocate",
                "clear",
                "draw_silhouette",
                "allocate",
                "allocate",
                "jfa_init",
                "jfa_flood_axis",
                "jfa_flood_axis",
                "jfa_outline",
                "release",
                "release",
                "release",
            ]
        );
    }

    #[test]
    fn test_distance_buffers_single_sample_with_msaa() {
        let settings = OutlineSettings::new().with_material(MaterialHandle(0));
        let renderer = OutlineRenderer::new(settings);
        let msaa = FrameContext::new(TargetDescriptor::new(32, 32).with_sample_count(8));
        let (stream, _) = renderer.record(MaterialHandle(0), &msaa);

        for command in stream.iter() {
            if let OutlineCommand::Allocate { id, descriptor } = command {
                let expected = if *id == BufferId::SILHOUETTE { 8 } else { 1 };
                assert_eq!(descriptor.sample_count, expected, "{id}");
            }
        }
    }

    #[test]
    fn test_configure_rearms_warning() {
        let mut renderer = OutlineRenderer::default();
        let mut backend = RecordingBackend::default();
        renderer.execute(&frame(), &mut backend).unwrap();
        assert!(renderer.warned_missing_material);

        OutlinePass::<RecordingBackend>::configure(&mut renderer, &OutlineSettings::new());
        assert!(!renderer.warned_missing_material);
    }

    #[test]
    fn test_repeated_missing_material_frames_logged() {
        let mut renderer = OutlineRenderer::default();
        let mut backend = RecordingBackend::default();

        for _ in 0..3 {
            let outcome = renderer.execute(&frame(), &mut backend).unwrap();
            assert_eq!(outcome, PassOutcome::Skipped(SkipReason::MissingMaterial));
        }
        // first frame warns, the other two go to debug
        assert!(renderer.warned_missing_material);
        assert_eq!(renderer.suppressed_missing_material, 2);

        OutlinePass::<RecordingBackend>::configure(&mut renderer, &OutlineSettings::new());
        assert_eq!(renderer.suppressed_missing_material, 0);
    }

    #[test]
    fn test_insertion_point() {
        assert_eq!(
            OutlineRenderer::insertion_point(),
            RenderPassEvent::AfterRenderingTransparents
        );
    }
}
