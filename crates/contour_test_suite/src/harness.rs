//! Test harness for visual tests
//!
//! Provides infrastructure for running visual tests, including:
//! - Scene setup and outline rendering on the software or wgpu backend
//! - Output to PNG files
//! - Reference image comparison

use anyhow::{Context, Result};
use contour_core::{
    Color, FrameContext, OutlinePass, OutlineRenderer, OutlineSettings, PassOutcome,
    TargetDescriptor,
};
use contour_software::{Renderable, Scene, Shape, SoftwareBackend, OUTLINE_MATERIAL};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

#[cfg(feature = "gpu")]
use std::cell::RefCell;

/// Result of a visual test
#[derive(Debug)]
pub enum TestResult {
    /// Test passed
    Passed,
    /// Test passed but reference image was created/updated
    PassedWithNewReference,
    /// Test failed with difference percentage
    Failed { difference: f32, diff_path: PathBuf },
    /// Test skipped (e.g., no GPU available)
    Skipped { reason: String },
}

impl TestResult {
    pub fn is_passed(&self) -> bool {
        matches!(
            self,
            TestResult::Passed | TestResult::PassedWithNewReference
        )
    }
}

/// Backend used to execute the outline pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU reference backend
    #[default]
    Software,
    /// wgpu backend
    Gpu,
}

/// Context for a single test
pub struct TestContext {
    /// Test name
    pub name: String,
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Outline settings for the frame
    pub settings: OutlineSettings,
    /// Antialiasing level of the camera target
    pub antialiasing: u32,
    /// Clear color of the camera target
    pub background: Color,
    objects: Vec<(Renderable, Color)>,
}

impl TestContext {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            settings: OutlineSettings::new()
                .with_color(Color::ORANGE)
                .with_width(4.0)
                .with_material(OUTLINE_MATERIAL),
            antialiasing: 1,
            background: Color::rgb(0.1, 0.1, 0.12),
            objects: Vec::new(),
        }
    }

    /// Add opaque geometry on layer 0, painted with `color`
    pub fn add(&mut self, shape: Shape, color: Color) -> &mut Self {
        self.add_renderable(Renderable::new(shape), color)
    }

    pub fn add_renderable(&mut self, renderable: Renderable, color: Color) -> &mut Self {
        self.objects.push((renderable, color));
        self
    }

    pub fn settings(&mut self) -> &mut OutlineSettings {
        &mut self.settings
    }

    /// Geometry seen by the outline pass
    pub fn scene(&self) -> Scene {
        let mut scene = Scene::new();
        for (renderable, _) in &self.objects {
            scene.add(*renderable);
        }
        scene
    }

    /// Camera color before the outline pass: background plus flat-filled geometry
    pub fn paint(&self) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(self.width, self.height, to_pixel(self.background));
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            // later objects paint over earlier ones
            if let Some((_, color)) = self
                .objects
                .iter()
                .rev()
                .find(|(renderable, _)| renderable.shape.contains(px, py))
            {
                *pixel = to_pixel(*color);
            }
        }
        image
    }

    fn frame(&self) -> FrameContext {
        FrameContext::new(TargetDescriptor::new(self.width, self.height))
            .with_antialiasing(self.antialiasing)
    }
}

fn to_pixel(color: Color) -> Rgba<u8> {
    Rgba(color.to_linear().to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}

/// Configuration for the test harness
pub struct TestHarnessConfig {
    /// Output directory for test results
    pub output_dir: PathBuf,
    /// Reference image directory
    pub reference_dir: PathBuf,
    /// Default viewport size
    pub default_size: (u32, u32),
    /// Difference threshold for visual comparison (0.0-1.0)
    pub threshold: f32,
    /// Backend executing the outline pass
    pub backend: BackendKind,
}

impl Default for TestHarnessConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test_output"),
            reference_dir: PathBuf::from("test_output/references"),
            default_size: (160, 120),
            threshold: 0.001,
            backend: BackendKind::Software,
        }
    }
}

/// Test harness for running visual tests
pub struct TestHarness {
    #[cfg(feature = "gpu")]
    gpu: Option<RefCell<contour_gpu::GpuBackend>>,
    /// Output directory for test results
    output_dir: PathBuf,
    /// Reference image directory
    reference_dir: PathBuf,
    /// Default viewport size
    default_size: (u32, u32),
    /// Difference threshold for visual comparison (0.0-1.0)
    threshold: f32,
    backend: BackendKind,
}

impl TestHarness {
    /// Create a new test harness with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TestHarnessConfig::default())
    }

    /// Create a new test harness with custom configuration
    pub fn with_config(config: TestHarnessConfig) -> Result<Self> {
        #[cfg(feature = "gpu")]
        let gpu = match config.backend {
            BackendKind::Gpu => Some(RefCell::new(
                pollster::block_on(contour_gpu::GpuBackend::new(
                    contour_gpu::GpuConfig::default(),
                ))
                .context("Failed to create GPU backend")?,
            )),
            BackendKind::Software => None,
        };
        if cfg!(not(feature = "gpu")) && config.backend == BackendKind::Gpu {
            anyhow::bail!("GPU backend requested but the `gpu` feature is disabled");
        }

        // Create output directories
        std::fs::create_dir_all(&config.output_dir).context("Failed to create output directory")?;
        std::fs::create_dir_all(&config.reference_dir)
            .context("Failed to create reference directory")?;

        Ok(Self {
            #[cfg(feature = "gpu")]
            gpu,
            output_dir: config.output_dir,
            reference_dir: config.reference_dir,
            default_size: config.default_size,
            threshold: config.threshold,
            backend: config.backend,
        })
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Create a test context with default size
    pub fn create_context(&self, name: &str) -> TestContext {
        TestContext::new(name, self.default_size.0, self.default_size.1)
    }

    /// Run the outline pass over the context's scene
    pub fn render(&self, ctx: &TestContext) -> Result<(RgbaImage, PassOutcome)> {
        let mut renderer = OutlineRenderer::new(ctx.settings.clone());
        let frame = ctx.frame();

        match self.backend {
            BackendKind::Software => {
                let mut backend = SoftwareBackend::with_target(ctx.paint());
                backend.set_scene(ctx.scene());
                let outcome = renderer.execute(&frame, &mut backend);
                renderer.frame_cleanup(&mut backend);
                Ok((backend.into_target(), outcome?))
            }
            #[cfg(feature = "gpu")]
            BackendKind::Gpu => {
                let gpu = self.gpu.as_ref().context("GPU backend not initialized")?;
                let mut backend = gpu.borrow_mut();
                backend.set_color_target(&ctx.paint());
                backend.set_meshes(ctx.scene().iter().map(gpu_mesh).collect());
                let outcome = renderer.execute(&frame, &mut *backend);
                renderer.frame_cleanup(&mut *backend);
                let outcome = outcome?;
                Ok((backend.read_color_target()?, outcome))
            }
            #[cfg(not(feature = "gpu"))]
            BackendKind::Gpu => anyhow::bail!("GPU backend requested but the `gpu` feature is disabled"),
        }
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", sanitize(name)))
    }

    pub fn reference_path(&self, name: &str) -> PathBuf {
        self.reference_dir.join(format!("{}.png", sanitize(name)))
    }

    pub fn diff_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}_diff.png", sanitize(name)))
    }

    /// Compare two images and return the difference ratio (0.0 = identical, 1.0 = completely different)
    pub fn compare_images(img1: &RgbaImage, img2: &RgbaImage) -> f32 {
        if img1.dimensions() != img2.dimensions() {
            return 1.0;
        }

        let (width, height) = img1.dimensions();
        let total_pixels = (width * height).max(1) as f64;
        let mut diff_sum = 0.0;

        for (p1, p2) in img1.pixels().zip(img2.pixels()) {
            let channels: f64 = (0..4)
                .map(|i| (p1[i] as f64 - p2[i] as f64).abs() / 255.0)
                .sum();
            diff_sum += channels / 4.0;
        }

        (diff_sum / total_pixels) as f32
    }

    /// Generate a diff image highlighting differences between two images
    pub fn generate_diff_image(img1: &RgbaImage, img2: &RgbaImage) -> Option<RgbaImage> {
        if img1.dimensions() != img2.dimensions() {
            return None;
        }

        let (width, height) = img1.dimensions();
        let mut diff = ImageBuffer::new(width, height);

        for (x, y, p1) in img1.enumerate_pixels() {
            let p2 = img2.get_pixel(x, y);
            let max_diff = (0..3)
                .map(|i| (p1[i] as i32 - p2[i] as i32).abs())
                .max()
                .unwrap_or(0);

            if max_diff > 2 {
                diff.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            } else {
                diff.put_pixel(x, y, Rgba([p1[0] / 3, p1[1] / 3, p1[2] / 3, 128]));
            }
        }

        Some(diff)
    }

    /// Run a test and save output as PNG
    pub fn run_test<F>(&self, name: &str, test_fn: F) -> Result<TestResult>
    where
        F: FnOnce(&mut TestContext),
    {
        let mut ctx = self.create_context(name);
        test_fn(&mut ctx);
        if ctx.width == 0 || ctx.height == 0 {
            return Ok(TestResult::Skipped {
                reason: format!("empty {}x{} target", ctx.width, ctx.height),
            });
        }

        let (output_img, outcome) = self.render(&ctx)?;
        tracing::info!(
            "Test '{}': {} objects, width {}, {:?}",
            name,
            ctx.objects.len(),
            ctx.settings.width(),
            outcome
        );

        let output_path = self.output_path(name);
        save_png(&output_img, &output_path)?;
        let reference_path = self.reference_path(name);

        // Compare with reference if it exists
        if reference_path.exists() {
            let reference_img = image::open(&reference_path)
                .context("Failed to open reference image")?
                .to_rgba8();

            let difference = Self::compare_images(&output_img, &reference_img);

            if difference <= self.threshold {
                tracing::info!("Test '{}' PASSED (diff: {:.4}%)", name, difference * 100.0);
                Ok(TestResult::Passed)
            } else {
                let diff_path = self.diff_path(name);
                if let Some(diff_img) = Self::generate_diff_image(&output_img, &reference_img) {
                    diff_img.save(&diff_path).ok();
                }
                tracing::warn!(
                    "Test '{}' FAILED (diff: {:.4}%, threshold: {:.4}%)",
                    name,
                    difference * 100.0,
                    self.threshold * 100.0
                );
                Ok(TestResult::Failed {
                    difference,
                    diff_path,
                })
            }
        } else {
            // No reference exists - copy output as new reference
            std::fs::copy(&output_path, &reference_path)
                .context("Failed to create reference image")?;
            tracing::info!(
                "Test '{}' created new reference at {:?}",
                name,
                reference_path
            );
            Ok(TestResult::PassedWithNewReference)
        }
    }
}

fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("Failed to save PNG to {:?}", path))
}

fn sanitize(name: &str) -> String {
    name.replace("::", "_")
}

#[cfg(feature = "gpu")]
fn gpu_mesh(renderable: &Renderable) -> contour_gpu::GpuMesh {
    use contour_gpu::GpuMesh;

    let mesh = match renderable.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => GpuMesh::rect(x, y, width, height),
        Shape::Circle { cx, cy, radius } => GpuMesh::circle(cx, cy, radius, 64),
        Shape::Triangle { points: [a, b, c] } => GpuMesh::triangle(a, b, c),
    };
    mesh.on_layer(renderable.layer)
        .in_queue(renderable.render_queue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_orders_objects() {
        let mut ctx = TestContext::new("paint", 8, 8);
        ctx.add(Shape::rect(0.0, 0.0, 4.0, 4.0), Color::RED)
            .add(Shape::rect(2.0, 2.0, 4.0, 4.0), Color::BLUE);
        let image = ctx.paint();
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(image.get_pixel(3, 3), &Rgba([0, 0, 255, 255]));
        assert_eq!(ctx.scene().len(), 2);
    }

    #[test]
    fn test_compare_images() {
        let a = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let mut b = a.clone();
        assert_eq!(TestHarness::compare_images(&a, &b), 0.0);
        b.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        let diff = TestHarness::compare_images(&a, &b);
        assert!(diff > 0.0 && diff < 0.1);
        assert_eq!(
            TestHarness::compare_images(&a, &RgbaImage::new(2, 2)),
            1.0
        );
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("outline::rect"), "outline_rect");
    }
}
