//! CPU versions of the outline shader passes
//!
//! Each function mirrors one fragment shader: it reads whole input buffers
//! and writes every texel of its output exactly once.

use contour_core::{GeometryFilter, NearestPoint, OutlineUniforms};
use image::RgbaImage;
use smallvec::SmallVec;

use crate::buffer::{MaskBuffer, NearestBuffer};
use crate::sample_pattern::sample_offsets;
use crate::scene::Scene;

/// Mark every sample covered by filtered geometry
pub fn rasterize_silhouette(mask: &mut MaskBuffer, scene: &Scene, filter: &GeometryFilter) {
    let (width, height) = mask.size();
    let offsets = sample_offsets(mask.sample_count());

    for renderable in scene.filtered(filter) {
        let (min_x, min_y, max_x, max_y) = renderable.shape.bounds();
        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().max(0.0) as u32).min(width);
        let y1 = (max_y.ceil().max(0.0) as u32).min(height);

        for y in y0..y1 {
            for x in x0..x1 {
                for (sample, (ox, oy)) in offsets.iter().enumerate() {
                    let px = x as f32 + 0.5 + ox;
                    let py = y as f32 + 0.5 + oy;
                    if renderable.shape.contains(px, py) {
                        mask.set_sample(x, y, sample as u32, 255);
                    }
                }
            }
        }
    }
}

/// Seed the field from the silhouette boundary
///
/// A pixel is a boundary pixel when it is partially covered, or fully
/// covered with an empty 4-neighbour. Neighbours outside the mask read as
/// the pixel's own coverage. The seed sits at the pixel centre moved
/// `coverage - 0.5` pixels along the outward coverage gradient.
pub fn seed(mask: &MaskBuffer, field: &mut NearestBuffer) {
    let size = field.size();
    for y in 0..field.height() {
        for x in 0..field.width() {
            let value = seed_texel(mask, x, y, size);
            field.set(x, y, value);
        }
    }
}

fn seed_texel(mask: &MaskBuffer, x: u32, y: u32, size: (u32, u32)) -> NearestPoint {
    let c = mask.coverage(x, y);
    if c <= 0.0 {
        return NearestPoint::NONE;
    }

    let (xi, yi) = (x as i32, y as i32);
    let left = mask.coverage_or(xi - 1, yi, c);
    let right = mask.coverage_or(xi + 1, yi, c);
    let up = mask.coverage_or(xi, yi - 1, c);
    let down = mask.coverage_or(xi, yi + 1, c);

    let boundary = c < 1.0 || [left, right, up, down].iter().any(|n| *n <= 0.0);
    if !boundary {
        return NearestPoint::NONE;
    }

    // coverage grows inward; the edge lies against the gradient
    let gx = right - left;
    let gy = down - up;
    let length = (gx * gx + gy * gy).sqrt();
    let (mut px, mut py) = (x as f32 + 0.5, y as f32 + 0.5);
    if length > 0.0 {
        let nudge = c - 0.5;
        px -= gx / length * nudge;
        py -= gy / length * nudge;
    }
    NearestPoint::from_pixel(px, py, size)
}

fn closest<I>(candidates: I, src: &NearestBuffer, x: u32, y: u32) -> NearestPoint
where
    I: IntoIterator<Item = (i32, i32)>,
{
    let size = src.size();
    let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
    let mut best = NearestPoint::NONE;
    let mut best_distance = f32::INFINITY;

    for (sx, sy) in candidates {
        if sx < 0 || sy < 0 || sx >= size.0 as i32 || sy >= size.1 as i32 {
            continue;
        }
        let candidate = src.get(sx as u32, sy as u32);
        if let Some(distance) = candidate.distance_squared(cx, cy, size) {
            if distance < best_distance {
                best_distance = distance;
                best = candidate;
            }
        }
    }
    best
}

/// Full-kernel flood: centre plus the 8 neighbours `jump` pixels away
pub fn flood(src: &NearestBuffer, dst: &mut NearestBuffer, jump: i32) {
    for y in 0..dst.height() {
        for x in 0..dst.width() {
            let mut candidates: SmallVec<[(i32, i32); 9]> = SmallVec::new();
            for dy in -1..=1 {
                for dx in -1..=1 {
                    candidates.push((x as i32 + dx * jump, y as i32 + dy * jump));
                }
            }
            dst.set(x, y, closest(candidates, src, x, y));
        }
    }
}

/// Single-axis flood: centre plus the two neighbours `jump` pixels along `axis`
pub fn flood_axis(src: &NearestBuffer, dst: &mut NearestBuffer, jump: i32, axis: (i32, i32)) {
    let (ax, ay) = axis;
    for y in 0..dst.height() {
        for x in 0..dst.width() {
            let (xi, yi) = (x as i32, y as i32);
            let candidates: SmallVec<[(i32, i32); 3]> = smallvec::smallvec![
                (xi - ax * jump, yi - ay * jump),
                (xi, yi),
                (xi + ax * jump, yi + ay * jump),
            ];
            dst.set(x, y, closest(candidates, src, x, y));
        }
    }
}

/// Blend the outline onto `target` (linear RGBA8, source-over)
///
/// Pixels without edge information or with zero outline alpha are not
/// written.
pub fn composite(
    field: &NearestBuffer,
    silhouette: &MaskBuffer,
    target: &mut RgbaImage,
    uniforms: &OutlineUniforms,
) {
    let [r, g, b, a] = uniforms.color;
    let width = uniforms.outline_width;

    for y in 0..field.height() {
        for x in 0..field.width() {
            let Some(distance) = field.distance(x, y) else {
                continue;
            };
            let interior = silhouette.coverage(x, y);
            let coverage = (width - distance + 0.5).clamp(0.0, 1.0) * (1.0 - interior);
            let alpha = a * coverage;
            if alpha <= 0.0 {
                continue;
            }

            let pixel = target.get_pixel_mut(x, y);
            let dst = pixel.0.map(|c| c as f32 / 255.0);
            let out = [
                r * alpha + dst[0] * (1.0 - alpha),
                g * alpha + dst[1] * (1.0 - alpha),
                b * alpha + dst[2] * (1.0 - alpha),
                alpha + dst[3] * (1.0 - alpha),
            ];
            pixel.0 = out.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Renderable, Shape};
    use contour_core::{LayerMask, RenderQueueRange};

    fn rect_mask(size: u32, rect: Shape) -> MaskBuffer {
        let mut mask = MaskBuffer::new(size, size, 1);
        let scene = Scene::new().with(Renderable::new(rect));
        let filter = GeometryFilter::new(LayerMask::ALL, RenderQueueRange::ALL);
        rasterize_silhouette(&mut mask, &scene, &filter);
        mask
    }

    #[test]
    fn test_rasterize_rect() {
        let mask = rect_mask(8, Shape::rect(2.0, 2.0, 3.0, 3.0));
        assert_eq!(mask.coverage(2, 2), 1.0);
        assert_eq!(mask.coverage(4, 4), 1.0);
        assert_eq!(mask.coverage(5, 4), 0.0);
        assert_eq!(mask.coverage(1, 2), 0.0);
    }

    #[test]
    fn test_partial_coverage_with_msaa() {
        let mut mask = MaskBuffer::new(4, 4, 4);
        let scene = Scene::new().with(Renderable::new(Shape::rect(0.0, 0.0, 1.5, 4.0)));
        let filter = GeometryFilter::new(LayerMask::ALL, RenderQueueRange::ALL);
        rasterize_silhouette(&mut mask, &scene, &filter);
        assert_eq!(mask.coverage(0, 1), 1.0);
        assert_eq!(mask.coverage(1, 1), 0.5);
        assert_eq!(mask.coverage(2, 1), 0.0);
    }

    #[test]
    fn test_seed_marks_only_boundary() {
        let mask = rect_mask(9, Shape::rect(2.0, 2.0, 5.0, 5.0));
        let mut field = NearestBuffer::new(9, 9);
        seed(&mask, &mut field);

        // interior and exterior are empty
        assert!(field.get(4, 4).is_none());
        assert!(field.get(0, 0).is_none());
        assert!(field.get(1, 4).is_none());

        // left edge pixel seeds at its outer side
        let (x, y) = field.get(2, 4).to_pixel((9, 9)).unwrap();
        assert!((x - 2.0).abs() < 0.01);
        assert!((y - 4.5).abs() < 0.01);
    }

    #[test]
    fn test_target_border_is_not_an_edge() {
        let mask = rect_mask(6, Shape::rect(0.0, 0.0, 6.0, 6.0));
        let mut field = NearestBuffer::new(6, 6);
        seed(&mask, &mut field);
        assert!(field.texels().iter().all(NearestPoint::is_none));
    }

    #[test]
    fn test_flood_propagates_within_reach() {
        let mask = rect_mask(16, Shape::rect(4.0, 4.0, 8.0, 8.0));
        let mut a = NearestBuffer::new(16, 16);
        let mut b = NearestBuffer::new(16, 16);
        seed(&mask, &mut a);
        flood(&a, &mut b, 2);
        flood(&b, &mut a, 1);

        // three pixels left of the edge at x = 4
        for x in 1..4 {
            let d = a.distance(x, 8).unwrap();
            assert!((d - (4.0 - (x as f32 + 0.5))).abs() < 0.01, "x = {x}, d = {d}");
        }
        assert!(a.distance(0, 8).is_none());
    }

    #[test]
    fn test_flood_axis_matches_full_kernel_on_rect() {
        let mask = rect_mask(20, Shape::rect(6.0, 6.0, 8.0, 8.0));
        let mut seeded = NearestBuffer::new(20, 20);
        seed(&mask, &mut seeded);

        let mut full_a = seeded.clone();
        let mut full_b = NearestBuffer::new(20, 20);
        flood(&full_a, &mut full_b, 2);
        flood(&full_b, &mut full_a, 1);

        let mut axis_a = seeded;
        let mut axis_b = NearestBuffer::new(20, 20);
        for jump in [2, 1] {
            flood_axis(&axis_a, &mut axis_b, jump, (1, 0));
            flood_axis(&axis_b, &mut axis_a, jump, (0, 1));
        }

        // exterior pixels facing an edge, away from the corners
        let inside = |v: u32| (6..14).contains(&v);
        let band = |v: u32| (8..12).contains(&v);
        for y in 0..20 {
            for x in 0..20 {
                let facing_edge = (band(y) && !inside(x)) || (band(x) && !inside(y));
                if !facing_edge {
                    continue;
                }
                match (full_a.distance(x, y), axis_a.distance(x, y)) {
                    (Some(full), Some(axis)) => {
                        assert!((full - axis).abs() < 0.01, "({x}, {y})")
                    }
                    (None, None) => {}
                    other => panic!("({x}, {y}) reached by one kernel only: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_composite_skips_untouched_pixels() {
        let field = NearestBuffer::new(4, 4);
        let mask = MaskBuffer::new(4, 4, 1);
        let mut target = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]));
        let before = target.clone();
        let mut uniforms: OutlineUniforms = blank_uniforms();
        uniforms.color = [1.0, 0.0, 0.0, 1.0];
        uniforms.outline_width = 2.0;
        composite(&field, &mask, &mut target, &uniforms);
        assert_eq!(target, before);
    }

    #[test]
    fn test_composite_blends_outside_only() {
        let mask = rect_mask(8, Shape::rect(4.0, 0.0, 4.0, 8.0));
        let mut field = NearestBuffer::new(8, 8);
        seed(&mask, &mut field);
        let mut spread = NearestBuffer::new(8, 8);
        flood(&field, &mut spread, 1);

        let mut target = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]));
        let mut uniforms: OutlineUniforms = blank_uniforms();
        uniforms.color = [1.0, 1.0, 1.0, 1.0];
        uniforms.outline_width = 2.0;
        composite(&spread, &mask, &mut target, &uniforms);

        assert_eq!(target.get_pixel(3, 3).0, [255, 255, 255, 255]);
        assert_eq!(target.get_pixel(4, 3).0, [0, 0, 0, 255]);
        assert_eq!(target.get_pixel(1, 3).0, [0, 0, 0, 255]);
    }

    fn blank_uniforms() -> OutlineUniforms {
        OutlineUniforms {
            color: [0.0; 4],
            target_size: [0.0; 2],
            outline_width: 0.0,
            step_width: 0.0,
            axis_step: [0.0; 2],
            sample_count: 1,
            _padding: 0,
        }
    }
}
