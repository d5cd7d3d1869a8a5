//! Jump flood recording
//!
//! Seeds a nearest-point field from the silhouette boundary and floods it
//! across two ping-pong buffers. The seed goes into whichever slot makes the
//! final pass write slot A, so the converged field is always found in
//! [`BufferId::NEAREST_POINT`] regardless of how many passes ran.
//!
//! ```text
//! Traditional, 2 iterations:   INIT->A  A->B (i=1)  B->A (i=0)
//! SeparableAxis, 1 iteration:  INIT->A  A->B (x)    B->A (y)
//! ```

use crate::buffers::{BufferDescriptor, BufferId};
use crate::command::{CommandStream, OutlineCommand};
use crate::ping_pong::{PingPong, Slot};
use crate::plan::IterationPlan;
use crate::settings::{JfaVariant, MaterialHandle};
use crate::uniforms::OutlineUniforms;

/// Progress of the flood for one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JfaState {
    Uninitialized,
    Seeded,
    /// Iteration `i` has been recorded
    Flooding(u32),
    Converged,
}

impl JfaState {
    /// Whether moving to `next` keeps the iteration index strictly decreasing
    pub fn can_advance_to(&self, next: JfaState) -> bool {
        match (*self, next) {
            (JfaState::Uninitialized, JfaState::Seeded) => true,
            (JfaState::Seeded, JfaState::Flooding(_)) => true,
            (JfaState::Seeded, JfaState::Converged) => true,
            (JfaState::Flooding(current), JfaState::Flooding(next)) => next < current,
            (JfaState::Flooding(0), JfaState::Converged) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct JumpFlood {
    variant: JfaVariant,
    plan: IterationPlan,
    material: MaterialHandle,
    state: JfaState,
}

impl JumpFlood {
    pub fn new(variant: JfaVariant, plan: IterationPlan, material: MaterialHandle) -> Self {
        Self {
            variant,
            plan,
            material,
            state: JfaState::Uninitialized,
        }
    }

    pub fn state(&self) -> JfaState {
        self.state
    }

    pub fn plan(&self) -> &IterationPlan {
        &self.plan
    }

    /// Total flood passes this pipeline records
    pub fn pass_count(&self) -> usize {
        self.plan.flood_pass_count(self.variant)
    }

    /// Slot receiving the seed
    pub fn init_slot(&self) -> Slot {
        PingPong::seed_slot(self.pass_count())
    }

    fn advance(&mut self, next: JfaState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid jump flood transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Record allocation of both ping-pong buffers, the seed and every flood
    /// pass. Returns the buffer holding the converged field.
    pub fn record(
        &mut self,
        stream: &mut CommandStream,
        silhouette: BufferId,
        silhouette_descriptor: &BufferDescriptor,
        uniforms: &OutlineUniforms,
    ) -> BufferId {
        let descriptor = BufferDescriptor::nearest_point(silhouette_descriptor);
        let mut roles = PingPong::starting_at(
            BufferId::NEAREST_POINT,
            BufferId::NEAREST_POINT_PING_PONG,
            self.pass_count(),
        );
        for id in [BufferId::NEAREST_POINT, BufferId::NEAREST_POINT_PING_PONG] {
            stream.push(OutlineCommand::Allocate { id, descriptor });
        }

        stream.push(OutlineCommand::JfaInit {
            source: silhouette,
            target: roles.read(),
            material: self.material,
            uniforms: *uniforms,
        });
        self.advance(JfaState::Seeded);

        tracing::debug!(
            variant = ?self.variant,
            iterations = self.plan.flood_iterations(),
            passes = self.pass_count(),
            seed = %roles.read(),
            "recording jump flood"
        );

        for step in self.plan.steps() {
            match self.variant {
                JfaVariant::Traditional => {
                    stream.push(OutlineCommand::Flood {
                        source: roles.read(),
                        target: roles.write(),
                        material: self.material,
                        uniforms: uniforms.with_step(&step),
                    });
                    roles.swap();
                }
                JfaVariant::SeparableAxis => {
                    for horizontal in [true, false] {
                        stream.push(OutlineCommand::FloodAxis {
                            source: roles.read(),
                            target: roles.write(),
                            material: self.material,
                            uniforms: uniforms.with_axis_step(&step, horizontal),
                        });
                        roles.swap();
                    }
                }
            }
            self.advance(JfaState::Flooding(step.index));
        }

        self.advance(JfaState::Converged);
        debug_assert_eq!(roles.read(), roles.final_buffer());
        roles.final_buffer()
    }
}
