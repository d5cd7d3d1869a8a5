//! Nearest-point texel encoding
//!
//! A nearest-point texel stores the position of the closest seeded edge in
//! normalized target coordinates, quantized to two snorm16 channels. Valid
//! positions live in `[0, 1]`; `(-1, -1)` marks a texel that has not seen
//! any edge yet.

const SNORM16_MAX: f32 = 32767.0;

/// An encoded nearest-point texel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NearestPoint(pub [i16; 2]);

impl NearestPoint {
    /// No edge information
    pub const NONE: NearestPoint = NearestPoint([-32767, -32767]);

    pub fn from_uv(u: f32, v: f32) -> Self {
        Self([encode_snorm16(u), encode_snorm16(v)])
    }

    /// Position in pixels for a target of `size`
    pub fn from_pixel(x: f32, y: f32, size: (u32, u32)) -> Self {
        Self::from_uv(x / size.0.max(1) as f32, y / size.1.max(1) as f32)
    }

    pub fn is_none(&self) -> bool {
        self.0[0] < 0 || self.0[1] < 0
    }

    pub fn to_uv(&self) -> Option<(f32, f32)> {
        if self.is_none() {
            return None;
        }
        Some((decode_snorm16(self.0[0]), decode_snorm16(self.0[1])))
    }

    pub fn to_pixel(&self, size: (u32, u32)) -> Option<(f32, f32)> {
        self.to_uv()
            .map(|(u, v)| (u * size.0 as f32, v * size.1 as f32))
    }

    /// Squared distance in pixels from `(x, y)`, `None` for the sentinel
    pub fn distance_squared(&self, x: f32, y: f32, size: (u32, u32)) -> Option<f32> {
        self.to_pixel(size).map(|(px, py)| {
            let dx = px - x;
            let dy = py - y;
            dx * dx + dy * dy
        })
    }
}

impl Default for NearestPoint {
    fn default() -> Self {
        Self::NONE
    }
}

pub fn encode_snorm16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * SNORM16_MAX).round() as i16
}

pub fn decode_snorm16(value: i16) -> f32 {
    (value as f32 / SNORM16_MAX).max(-1.0)
}
