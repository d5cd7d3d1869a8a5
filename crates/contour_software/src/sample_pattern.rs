//! Standard multisample positions
//!
//! Offsets from the pixel centre in pixels. They are the usual 1/2/4/8
//! sample patterns, authored in 1/16 pixel units.

const SAMPLES_1: [(f32, f32); 1] = [(0.0, 0.0)];

// (4, 4) (-4, -4)
const SAMPLES_2: [(f32, f32); 2] = [(0.25, 0.25), (-0.25, -0.25)];

// (-2, -6) (6, -2) (-6, 2) (2, 6)
const SAMPLES_4: [(f32, f32); 4] = [
    (-0.125, -0.375),
    (0.375, -0.125),
    (-0.375, 0.125),
    (0.125, 0.375),
];

// (1, -3) (-1, 3) (5, 1) (-3, -5) (-5, 5) (-7, -1) (3, 7) (7, -7)
const SAMPLES_8: [(f32, f32); 8] = [
    (0.0625, -0.1875),
    (-0.0625, 0.1875),
    (0.3125, 0.0625),
    (-0.1875, -0.3125),
    (-0.3125, 0.3125),
    (-0.4375, -0.0625),
    (0.1875, 0.4375),
    (0.4375, -0.4375),
];

/// Sample offsets for `sample_count`, rounded down to a standard count
pub fn sample_offsets(sample_count: u32) -> &'static [(f32, f32)] {
    match contour_core::supported_sample_count(sample_count) {
        1 => &SAMPLES_1,
        2 => &SAMPLES_2,
        4 => &SAMPLES_4,
        _ => &SAMPLES_8,
    }
}
