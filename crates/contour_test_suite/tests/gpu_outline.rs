//! Outline rendering on the wgpu backend

#![cfg(feature = "gpu")]

use contour_core::{
    Color, FrameContext, JfaVariant, OutlinePass, OutlineRenderer, OutlineSettings, PassOutcome,
    TargetDescriptor,
};
use contour_gpu::{GpuBackend, GpuConfig, GpuMesh, OUTLINE_MATERIAL};
use image::{Rgba, RgbaImage};

const SIZE: u32 = 64;

fn backend() -> GpuBackend {
    let mut backend = pollster::block_on(GpuBackend::new(GpuConfig::default())).unwrap();
    backend.set_color_target(&RgbaImage::from_pixel(SIZE, SIZE, Rgba([0, 0, 0, 255])));
    backend.set_meshes(vec![GpuMesh::rect(20.0, 20.0, 20.0, 20.0)]);
    backend
}

fn settings(variant: JfaVariant) -> OutlineSettings {
    OutlineSettings::new()
        .with_color(Color::RED)
        .with_width(4.0)
        .with_variant(variant)
        .with_material(OUTLINE_MATERIAL)
}

#[test]
#[ignore] // Requires GPU
fn test_gpu_outline_surrounds_square() {
    for variant in [JfaVariant::Traditional, JfaVariant::SeparableAxis] {
        let mut backend = backend();
        let mut renderer = OutlineRenderer::new(settings(variant));
        let frame = FrameContext::new(TargetDescriptor::new(SIZE, SIZE));

        let outcome = renderer.execute(&frame, &mut backend).unwrap();
        assert!(matches!(outcome, PassOutcome::Rendered { .. }));
        assert_eq!(backend.live_buffers(), 0);

        let image = backend.read_color_target().unwrap();
        assert!(image.get_pixel(18, 30)[0] > 250, "{variant:?}");
        assert_eq!(image.get_pixel(30, 30), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(5, 5), &Rgba([0, 0, 0, 255]));
    }
}

#[test]
#[ignore] // Requires GPU
fn test_gpu_multisampled_silhouette() {
    let mut backend = backend();
    let mut renderer = OutlineRenderer::new(settings(JfaVariant::Traditional));
    let frame = FrameContext::new(TargetDescriptor::new(SIZE, SIZE)).with_antialiasing(4);

    renderer.execute(&frame, &mut backend).unwrap();
    renderer.frame_cleanup(&mut backend);

    let image = backend.read_color_target().unwrap();
    assert!(image.get_pixel(18, 30)[0] > 250);
    assert_eq!(backend.live_buffers(), 0);
}
