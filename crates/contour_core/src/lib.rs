//! Contour Core
//!
//! Backend-independent core of the Contour outline renderer.
//!
//! An outline is produced in four stages, recorded into a single
//! [`CommandStream`] per camera per frame:
//!
//! - **Silhouette**: filtered geometry is drawn into a cleared single-channel mask
//! - **Jump flood init**: boundary pixels of the mask seed a nearest-edge field
//! - **Jump flood**: the field is propagated across two ping-pong buffers, either
//!   with a full 8-neighbour kernel or with separable horizontal/vertical passes
//! - **Compositing**: the converged field is turned into a width-faded colored
//!   outline blended onto the camera color target
//!
//! The recorded stream is executed by an [`OutlineBackend`]; the CPU reference
//! backend lives in `contour_software` and the wgpu backend in `contour_gpu`.

pub mod backend;
pub mod buffers;
pub mod color;
pub mod command;
pub mod compositor;
pub mod encoding;
pub mod error;
pub mod jump_flood;
pub mod layer;
pub mod orchestrator;
pub mod ping_pong;
pub mod plan;
pub mod settings;
pub mod silhouette;
pub mod uniforms;

pub use backend::OutlineBackend;
pub use buffers::{
    BufferDescriptor, BufferFormat, BufferId, FrameResources, TargetDescriptor,
    supported_sample_count,
};
pub use color::Color;
pub use command::{CommandStream, OutlineCommand, ShaderPass};
pub use compositor::OutlineCompositor;
pub use encoding::NearestPoint;
pub use error::{OutlineError, Result};
pub use jump_flood::{JfaState, JumpFlood};
pub use layer::{GeometryFilter, LayerMask, RenderQueueRange};
pub use orchestrator::{
    FrameContext, OutlinePass, OutlineRenderer, PassOutcome, RenderPassEvent, SkipReason,
};
pub use ping_pong::{PingPong, Slot};
pub use plan::{FloodStep, IterationPlan};
pub use settings::{JfaVariant, MaterialHandle, OutlineSettings, MAX_OUTLINE_WIDTH};
pub use silhouette::SilhouetteExtractor;
pub use uniforms::OutlineUniforms;
