//! Progressive accumulation buffer.
//!
//! Each pixel holds four channels: accumulated red, green and blue plus the
//! number of samples folded in so far. Rows are stored behind their own lock
//! so scanline jobs can write disjoint rows from different threads; within a
//! pass every row has exactly one writer, so the locks are never contended.

use glint_math::Colour;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Accumulated channels of one pixel: `[r, g, b, samples]`.
pub type Texel = [f64; 4];

/// Row-major, top-down accumulation buffer.
#[derive(Debug)]
pub struct Film {
    width: u32,
    height: u32,
    rows: Vec<Mutex<Box<[Texel]>>>,
}

impl Film {
    /// Create a film with every channel at zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "film must not be empty");

        let rows = (0..height)
            .map(|_| Mutex::new(vec![[0.0; 4]; width as usize].into_boxed_slice()))
            .collect();
        Self {
            width,
            height,
            rows,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Lock one row for writing.
    pub fn row(&self, row: u32) -> FilmRow<'_> {
        FilmRow {
            texels: lock(&self.rows[row as usize]),
        }
    }

    /// Zero every channel of every pixel.
    pub fn clear(&self) {
        for row in &self.rows {
            lock(row).fill([0.0; 4]);
        }
    }

    /// Raw channels of one pixel.
    pub fn texel(&self, row: u32, column: u32) -> Texel {
        lock(&self.rows[row as usize])[column as usize]
    }

    /// Current estimate for one pixel: accumulated colour over sample count.
    ///
    /// Black for a pixel with no samples yet.
    pub fn pixel(&self, row: u32, column: u32) -> Colour {
        resolve(self.texel(row, column))
    }

    /// All pixel estimates, row-major from the top row.
    pub fn to_colours(&self) -> Vec<Colour> {
        let mut colours = Vec::with_capacity(self.width as usize * self.height as usize);
        for row in &self.rows {
            colours.extend(lock(row).iter().map(|&texel| resolve(texel)));
        }
        colours
    }

    /// 8-bit RGBA with a square-root tone curve, clamped, alpha 255.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 * self.width as usize * self.height as usize);
        for colour in self.to_colours() {
            let [r, g, b] = colour.to_rgb8();
            bytes.extend_from_slice(&[r, g, b, 255]);
        }
        bytes
    }
}

/// Exclusive access to one row of a [`Film`].
pub struct FilmRow<'a> {
    texels: MutexGuard<'a, Box<[Texel]>>,
}

impl FilmRow<'_> {
    /// Fold one sample into a pixel.
    #[inline]
    pub fn accumulate(&mut self, column: u32, colour: Colour) {
        let texel = &mut self.texels[column as usize];
        texel[0] += colour.r;
        texel[1] += colour.g;
        texel[2] += colour.b;
        texel[3] += 1.0;
    }
}

fn resolve(texel: Texel) -> Colour {
    let [r, g, b, samples] = texel;
    if samples > 0.0 {
        Colour::new(r, g, b) / samples
    } else {
        Colour::BLACK
    }
}

// A panicking worker leaves its row half written; the data is still plain
// numbers, so later passes keep using it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
