//! Jump flood iteration planning
//!
//! Turns an outline width into the number of flood iterations and the step
//! width used by each of them. Each iteration halves the jump distance, so a
//! field covering `w` pixels needs `ceil(log2(w + 1))` levels.

use crate::settings::{clamp_width, JfaVariant};

/// One flood iteration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloodStep {
    /// Iteration index, counting down to zero
    pub index: u32,
    /// Sample offset in pixels, `2^index + 0.5`
    pub step_width: f32,
}

impl FloodStep {
    /// Integer pixel offset sampled by this step
    ///
    /// The half pixel in `step_width` only guards the float-to-texel rounding.
    pub fn jump(&self) -> i32 {
        self.step_width.floor() as i32
    }
}

/// Iteration plan derived from the outline width for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationPlan {
    width: f32,
    iteration_count: u32,
}

impl IterationPlan {
    pub fn new(width: f32) -> Self {
        let width = clamp_width(width);
        let iteration_count = (width + 1.0).log2().ceil().max(0.0) as u32;
        Self {
            width,
            iteration_count,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// `ceil(log2(width + 1))`
    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// Number of flood iterations; zero when `iteration_count < 2`
    pub fn flood_iterations(&self) -> u32 {
        self.iteration_count.saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.flood_iterations() == 0
    }

    /// Flood steps from `iteration_count - 2` down to `0`
    pub fn steps(&self) -> impl Iterator<Item = FloodStep> {
        (0..self.flood_iterations()).rev().map(|index| FloodStep {
            index,
            step_width: 2f32.powi(index as i32) + 0.5,
        })
    }

    /// Sampling passes recorded for this plan under the given variant
    pub fn flood_pass_count(&self, variant: JfaVariant) -> usize {
        self.flood_iterations() as usize * variant.passes_per_iteration()
    }

    /// Width used for step sizes and the final distance threshold
    pub fn effective_step_base(&self) -> f32 {
        self.width.max(1.0)
    }

    /// Opacity multiplier fading sub-pixel outlines out
    pub fn alpha_fade(&self) -> f32 {
        self.width.clamp(0.0, 1.0)
    }
}
