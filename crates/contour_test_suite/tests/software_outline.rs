//! End-to-end outline rendering on the software backend

use contour_core::{
    BufferId, Color, FrameContext, JfaVariant, LayerMask, OutlinePass, OutlineRenderer,
    OutlineSettings, PassOutcome, SkipReason, TargetDescriptor,
};
use contour_software::{Renderable, Scene, Shape, SoftwareBackend, OUTLINE_MATERIAL};
use image::{Rgba, RgbaImage};

const SIZE: u32 = 64;
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn settings(width: f32) -> OutlineSettings {
    OutlineSettings::new()
        .with_color(Color::RED)
        .with_width(width)
        .with_material(OUTLINE_MATERIAL)
}

fn square_scene() -> Scene {
    Scene::new().with(Renderable::new(Shape::rect(20.0, 20.0, 20.0, 20.0)))
}

fn render(settings: OutlineSettings, scene: Scene) -> (RgbaImage, PassOutcome, SoftwareBackend) {
    let mut backend = SoftwareBackend::new(SIZE, SIZE);
    backend.set_scene(scene);
    let mut renderer = OutlineRenderer::new(settings);
    let frame = FrameContext::new(TargetDescriptor::new(SIZE, SIZE));

    let outcome = renderer.execute(&frame, &mut backend).unwrap();
    assert!(renderer.live_buffers().is_empty());
    (backend.target().clone(), outcome, backend)
}

fn assert_close(actual: &Rgba<u8>, expected: [u8; 4]) {
    for (a, e) in actual.0.iter().zip(expected) {
        assert!(
            (*a as i32 - e as i32).abs() <= 1,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }
}

#[test]
fn outline_surrounds_square() {
    let (image, outcome, backend) = render(settings(4.0), square_scene());

    assert_eq!(
        outcome,
        PassOutcome::Rendered {
            flood_passes: 2,
            final_buffer: BufferId::NEAREST_POINT,
        }
    );
    assert_eq!(backend.live_buffers(), 0);

    // one and a half pixels outside each edge
    for (x, y) in [(18, 30), (41, 30), (30, 18), (30, 41)] {
        assert_eq!(image.get_pixel(x, y), &RED, "pixel ({x}, {y})");
    }
    // interior and far background untouched
    assert_eq!(image.get_pixel(30, 30), &BLACK);
    assert_eq!(image.get_pixel(21, 30), &BLACK);
    assert_eq!(image.get_pixel(5, 5), &BLACK);
    assert_eq!(image.get_pixel(10, 30), &BLACK);
}

#[test]
fn width_two_reaches_one_pixel() {
    let (image, outcome, _) = render(settings(2.0), square_scene());

    assert!(matches!(
        outcome,
        PassOutcome::Rendered {
            flood_passes: 1,
            ..
        }
    ));
    assert_eq!(image.get_pixel(19, 30), &RED);
    assert_eq!(image.get_pixel(40, 30), &RED);
    assert_eq!(image.get_pixel(18, 30), &BLACK);
}

#[test]
fn separable_matches_traditional_along_edges() {
    let (traditional, outcome, _) = render(settings(6.0), square_scene());
    let (separable, separable_outcome, _) = render(
        settings(6.0).with_variant(JfaVariant::SeparableAxis),
        square_scene(),
    );

    let passes = |outcome: PassOutcome| match outcome {
        PassOutcome::Rendered { flood_passes, .. } => flood_passes,
        PassOutcome::Skipped(reason) => panic!("skipped: {reason:?}"),
    };
    assert_eq!(passes(separable_outcome), 2 * passes(outcome));

    for i in 0..SIZE {
        assert_eq!(traditional.get_pixel(i, 30), separable.get_pixel(i, 30));
        assert_eq!(traditional.get_pixel(30, i), separable.get_pixel(30, i));
    }
}

#[test]
fn translucent_color_blends_over_target() {
    let (image, _, _) = render(
        settings(2.0).with_color(Color::RED.with_alpha(0.5)),
        square_scene(),
    );
    assert_close(image.get_pixel(19, 30), [128, 0, 0, 255]);
}

#[test]
fn missing_material_skips_pass() {
    let mut settings = settings(4.0);
    settings.material = None;
    let (image, outcome, backend) = render(settings, square_scene());

    assert_eq!(outcome, PassOutcome::Skipped(SkipReason::MissingMaterial));
    assert!(backend.executed_passes().is_empty());
    assert!(image.pixels().all(|p| *p == BLACK));
}

#[test]
fn layer_mask_excludes_geometry() {
    let scene = Scene::new().with(Renderable::new(Shape::rect(20.0, 20.0, 20.0, 20.0)).on_layer(5));
    let (image, outcome, _) = render(
        settings(4.0).with_layer_mask(LayerMask::layer(0)),
        scene,
    );

    assert!(matches!(outcome, PassOutcome::Rendered { .. }));
    assert!(image.pixels().all(|p| *p == BLACK));
}

#[test]
fn zero_width_draws_nothing() {
    let (image, outcome, _) = render(settings(0.0), square_scene());

    assert!(matches!(
        outcome,
        PassOutcome::Rendered {
            flood_passes: 0,
            ..
        }
    ));
    assert!(image.pixels().all(|p| *p == BLACK));
}

#[test]
fn empty_target_is_skipped() {
    let mut backend = SoftwareBackend::new(0, 0);
    let mut renderer = OutlineRenderer::new(settings(4.0));
    let frame = FrameContext::new(TargetDescriptor::new(0, 0));

    let outcome = renderer.execute(&frame, &mut backend).unwrap();
    assert_eq!(outcome, PassOutcome::Skipped(SkipReason::EmptyTarget));
    assert_eq!(backend.live_buffers(), 0);
}

#[test]
fn multisampled_silhouette_keeps_outline() {
    let mut backend = SoftwareBackend::new(SIZE, SIZE);
    backend.set_scene(square_scene());
    let mut renderer = OutlineRenderer::new(settings(4.0));
    let frame = FrameContext::new(TargetDescriptor::new(SIZE, SIZE)).with_antialiasing(4);

    renderer.execute(&frame, &mut backend).unwrap();
    renderer.frame_cleanup(&mut backend);

    let image = backend.target();
    assert_eq!(image.get_pixel(18, 30), &RED);
    assert_eq!(image.get_pixel(30, 30), &BLACK);
    assert_eq!(backend.live_buffers(), 0);
}

#[test]
fn repeated_frames_release_buffers() {
    let mut backend = SoftwareBackend::new(SIZE, SIZE);
    backend.set_scene(square_scene());
    let mut renderer = OutlineRenderer::new(settings(4.0));
    let frame = FrameContext::new(TargetDescriptor::new(SIZE, SIZE));

    for _ in 0..3 {
        renderer.execute(&frame, &mut backend).unwrap();
        assert_eq!(backend.live_buffers(), 0);
        assert!(renderer.live_buffers().is_empty());
    }
    assert_eq!(backend.target().get_pixel(18, 30), &RED);
    assert_eq!(backend.target().get_pixel(30, 30), &BLACK);
}
