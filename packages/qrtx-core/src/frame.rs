//! 1-bit frame buffer for the e-paper panel.

/// Monochrome image; `true` is a white pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Frame {
    /// All-white frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![true; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Pixel colour; out-of-bounds reads are white.
    pub fn is_white(&self, x: u32, y: u32) -> bool {
        self.index(x, y).map_or(true, |i| self.pixels[i])
    }

    /// Sets a pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, white: bool) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = white;
        }
    }

    /// Number of black pixels.
    pub fn black_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&white| !white).count()
    }

    /// Thresholds an RGB888 buffer (`width * height * 3` bytes).
    ///
    /// Pixels with luma of at least 128 become white. Returns `None` on a
    /// size mismatch.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != width as usize * height as usize * 3 {
            return None;
        }

        let pixels = rgb
            .chunks_exact(3)
            .map(|px| {
                let luma = (299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32) / 1000;
                luma >= 128
            })
            .collect();

        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Copies `src` with its top-left corner at `(x, y)`, clipping at the edges.
    pub fn paste(&mut self, src: &Frame, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y as i64 + sy as i64;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..src.width {
                let dx = x as i64 + sx as i64;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                self.set(dx as u32, dy as u32, src.is_white(sx, sy));
            }
        }
    }

    /// Nearest-neighbour resize, sampling source pixel centres.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Frame {
        let mut out = Frame::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }

        for dy in 0..height {
            let sy = ((2 * dy as u64 + 1) * self.height as u64 / (2 * height as u64)) as u32;
            for dx in 0..width {
                let sx = ((2 * dx as u64 + 1) * self.width as u64 / (2 * width as u64)) as u32;
                out.set(dx, dy, self.is_white(sx, sy));
            }
        }
        out
    }

    fn pack(&self, bit_for: impl Fn(bool) -> bool) -> Vec<u8> {
        let stride = (self.width as usize + 7) / 8;
        let mut buf = vec![0u8; stride * self.height as usize];
        for y in 0..self.height {
            for x in 0..self.width {
                if bit_for(self.is_white(x, y)) {
                    buf[y as usize * stride + x as usize / 8] |= 0x80 >> (x % 8);
                }
            }
        }
        buf
    }

    /// Panel buffer: rows padded to whole bytes, MSB first, bit set = white.
    pub fn to_packed(&self) -> Vec<u8> {
        self.pack(|white| white)
    }

    /// Binary PBM (`P4`) image; PBM bits are set for black.
    pub fn to_pbm(&self) -> Vec<u8> {
        let mut out = format!("P4\n{} {}\n", self.width, self.height).into_bytes();
        out.extend(self.pack(|white| !white));
        out
    }
}
