//! Outline pass parameters
//!
//! Every draw and propagation command carries its own copy of
//! [`OutlineUniforms`]; nothing is stored in global shader state. The layout
//! is `#[repr(C)]` and matches the `Uniforms` struct of the WGSL shaders.

use crate::buffers::TargetDescriptor;
use crate::plan::{FloodStep, IterationPlan};
use crate::settings::OutlineSettings;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OutlineUniforms {
    /// Linear outline color, alpha multiplied by the width fade
    pub color: [f32; 4],
    /// Target size in pixels (width, height)
    pub target_size: [f32; 2],
    /// Distance threshold in pixels (`effective_step_base`)
    pub outline_width: f32,
    /// Flood step width in pixels; zero outside flood passes
    pub step_width: f32,
    /// Flood direction for single-axis passes, `(1, 0)` or `(0, 1)`
    pub axis_step: [f32; 2],
    /// Silhouette sample count
    pub sample_count: u32,
    pub _padding: u32,
}

impl OutlineUniforms {
    pub fn new(
        settings: &OutlineSettings,
        plan: &IterationPlan,
        target: &TargetDescriptor,
        silhouette_samples: u32,
    ) -> Self {
        let color = settings.color.to_linear();
        Self {
            color: [color.r, color.g, color.b, color.a * plan.alpha_fade()],
            target_size: [target.width as f32, target.height as f32],
            outline_width: plan.effective_step_base(),
            step_width: 0.0,
            axis_step: [0.0, 0.0],
            sample_count: silhouette_samples.max(1),
            _padding: 0,
        }
    }

    /// Parameters for a full-kernel flood pass
    pub fn with_step(mut self, step: &FloodStep) -> Self {
        self.step_width = step.step_width;
        self.axis_step = [0.0, 0.0];
        self
    }

    /// Parameters for a single-axis flood pass
    pub fn with_axis_step(mut self, step: &FloodStep, horizontal: bool) -> Self {
        self.step_width = step.step_width;
        self.axis_step = if horizontal { [1.0, 0.0] } else { [0.0, 1.0] };
        self
    }

    /// Integer pixel jump for flood passes
    pub fn jump(&self) -> i32 {
        self.step_width.floor() as i32
    }

    /// Integer axis direction for single-axis passes
    pub fn axis(&self) -> (i32, i32) {
        (self.axis_step[0] as i32, self.axis_step[1] as i32)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.target_size[0] as u32, self.target_size[1] as u32)
    }
}
