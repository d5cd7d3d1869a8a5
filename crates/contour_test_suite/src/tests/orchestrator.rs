//! Pass orchestration tests
//!
//! Frames where the outline pass is skipped or produces nothing

use crate::runner::TestSuite;
use contour_core::Color;
use contour_software::Shape;

/// Create the orchestrator test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("orchestrator");

    suite.add("missing_material", |ctx| {
        ctx.add(Shape::rect(50.0, 40.0, 60.0, 40.0), Color::BLUE);
        ctx.settings().material = None;
    });

    suite.add("zero_width", |ctx| {
        ctx.add(Shape::rect(50.0, 40.0, 60.0, 40.0), Color::BLUE);
        ctx.settings().set_width(0.0);
    });

    suite.add("small_target", |ctx| {
        ctx.width = 16;
        ctx.height = 16;
        ctx.add(Shape::rect(6.0, 6.0, 4.0, 4.0), Color::BLUE);
        ctx.settings().set_width(3.0);
    });

    // Reported as skipped; the pass itself skips empty targets
    suite.add("empty_target", |ctx| {
        ctx.width = 0;
        ctx.add(Shape::rect(0.0, 0.0, 4.0, 4.0), Color::BLUE);
    });

    suite
}
