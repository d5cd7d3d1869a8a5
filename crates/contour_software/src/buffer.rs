//! In-memory frame buffers

use contour_core::{BufferDescriptor, BufferFormat, NearestPoint};

/// Multisampled coverage mask
#[derive(Clone, Debug)]
pub struct MaskBuffer {
    width: u32,
    height: u32,
    sample_count: u32,
    samples: Vec<u8>,
}

impl MaskBuffer {
    pub fn new(width: u32, height: u32, sample_count: u32) -> Self {
        let sample_count = sample_count.max(1);
        Self {
            width,
            height,
            sample_count,
            samples: vec![0; width as usize * height as usize * sample_count as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn clear(&mut self) {
        self.samples.fill(0);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.sample_count as usize
    }

    pub fn set_sample(&mut self, x: u32, y: u32, sample: u32, value: u8) {
        let index = self.offset(x, y) + sample as usize;
        self.samples[index] = value;
    }

    /// Number of covered samples at `(x, y)`
    pub fn covered_samples(&self, x: u32, y: u32) -> u32 {
        let start = self.offset(x, y);
        self.samples[start..start + self.sample_count as usize]
            .iter()
            .filter(|s| **s != 0)
            .count() as u32
    }

    /// Mean coverage over the samples of `(x, y)` in `[0, 1]`
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        self.covered_samples(x, y) as f32 / self.sample_count as f32
    }

    /// Coverage at a signed position; positions outside read as `fallback`
    pub fn coverage_or(&self, x: i32, y: i32, fallback: f32) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            fallback
        } else {
            self.coverage(x as u32, y as u32)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.iter().all(|s| *s == 0)
    }
}

/// Single-sample nearest-point field
#[derive(Clone, Debug, PartialEq)]
pub struct NearestBuffer {
    width: u32,
    height: u32,
    texels: Vec<NearestPoint>,
}

impl NearestBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texels: vec![NearestPoint::NONE; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.texels.fill(NearestPoint::NONE);
    }

    pub fn get(&self, x: u32, y: u32) -> NearestPoint {
        self.texels[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: NearestPoint) {
        let index = y as usize * self.width as usize + x as usize;
        self.texels[index] = value;
    }

    /// Distance in pixels from the centre of `(x, y)` to its nearest edge
    pub fn distance(&self, x: u32, y: u32) -> Option<f32> {
        self.get(x, y)
            .distance_squared(x as f32 + 0.5, y as f32 + 0.5, self.size())
            .map(f32::sqrt)
    }

    pub fn texels(&self) -> &[NearestPoint] {
        &self.texels
    }
}

/// A live frame buffer
#[derive(Clone, Debug)]
pub enum SoftwareBuffer {
    Mask(MaskBuffer),
    Nearest(NearestBuffer),
}

impl SoftwareBuffer {
    /// Allocate storage for `descriptor`; color buffers are not frame buffers here
    pub fn allocate(descriptor: &BufferDescriptor) -> Option<Self> {
        match descriptor.format {
            BufferFormat::R8Unorm => Some(SoftwareBuffer::Mask(MaskBuffer::new(
                descriptor.width,
                descriptor.height,
                descriptor.sample_count,
            ))),
            BufferFormat::Rg16Snorm => Some(SoftwareBuffer::Nearest(NearestBuffer::new(
                descriptor.width,
                descriptor.height,
            ))),
            BufferFormat::Rgba8Unorm => None,
        }
    }

    pub fn format(&self) -> BufferFormat {
        match self {
            SoftwareBuffer::Mask(_) => BufferFormat::R8Unorm,
            SoftwareBuffer::Nearest(_) => BufferFormat::Rg16Snorm,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            SoftwareBuffer::Mask(mask) => mask.size(),
            SoftwareBuffer::Nearest(field) => field.size(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            SoftwareBuffer::Mask(mask) => mask.clear(),
            SoftwareBuffer::Nearest(field) => field.clear(),
        }
    }
}
