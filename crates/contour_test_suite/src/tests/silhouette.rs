//! Silhouette extraction tests
//!
//! Geometry selection by layer mask and render queue, and multisampled masks

use crate::runner::TestSuite;
use contour_core::layer::render_queue;
use contour_core::{Color, LayerMask};
use contour_software::{Renderable, Shape};

/// Create the silhouette test suite
pub fn suite() -> TestSuite {
    let mut suite = TestSuite::new("silhouette");

    suite.add("single_rect", |ctx| {
        ctx.add(Shape::rect(50.0, 40.0, 60.0, 40.0), Color::BLUE);
    });

    suite.add("mixed_shapes", |ctx| {
        ctx.add(Shape::rect(20.0, 20.0, 40.0, 30.0), Color::BLUE)
            .add(Shape::circle(100.0, 60.0, 25.0), Color::GREEN)
            .add(
                Shape::triangle((30.0, 100.0), (70.0, 100.0), (50.0, 65.0)),
                Color::RED,
            );
    });

    // Only layer 2 is outlined; the green circle stays bare
    suite.add("layer_mask", |ctx| {
        ctx.add_renderable(
            Renderable::new(Shape::rect(20.0, 30.0, 50.0, 50.0)).on_layer(2),
            Color::BLUE,
        )
        .add_renderable(
            Renderable::new(Shape::circle(115.0, 55.0, 25.0)).on_layer(3),
            Color::GREEN,
        );
        ctx.settings().layer_mask = LayerMask::layer(2);
    });

    // Transparent geometry is outside the opaque queue range
    suite.add("render_queue_range", |ctx| {
        ctx.add(Shape::rect(20.0, 30.0, 50.0, 50.0), Color::BLUE)
            .add_renderable(
                Renderable::new(Shape::rect(90.0, 30.0, 50.0, 50.0))
                    .in_queue(render_queue::TRANSPARENT),
                Color::GREEN.with_alpha(0.5),
            );
    });

    suite.add("msaa_circle", |ctx| {
        ctx.add(Shape::circle(80.0, 60.0, 30.0), Color::BLUE);
        ctx.antialiasing = 4;
    });

    suite.add("empty_scene", |_ctx| {});

    suite
}
