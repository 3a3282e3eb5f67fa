//! The monochrome screen of the chip.
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::definitions::display::{self, sprite};

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. Every pixel is either on or off, drawing toggles them.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [[bool; display::WIDTH]; display::HEIGHT],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: [[false; display::WIDTH]; display::HEIGHT],
        }
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|p| if *p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            for pixel in row.iter_mut() {
                *pixel = false;
            }
        }
    }

    /// Coordinates wrap around the screen.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y % display::HEIGHT][x % display::WIDTH]
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.pixels[y % display::HEIGHT][x % display::WIDTH] = on;
    }

    /// Draws the sprite `rows` with its top left corner at `(x, y)`. Every set bit of a row
    /// toggles the pixel underneath, both axis wrap around the screen edges.
    ///
    /// Returns `true` if any pixel was switched from on to off.
    ///
    /// # Example
    /// ```rust
    /// # use chip::display::Framebuffer;
    /// let mut fb = Framebuffer::new();
    /// assert!(!fb.draw_sprite(62, 0, &[0b1100_0000]));
    /// assert!(fb.get(63, 0));
    /// assert!(fb.draw_sprite(63, 0, &[0b1000_0000]));
    /// assert!(!fb.get(63, 0));
    /// ```
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        debug_assert!(rows.len() <= sprite::MAX_HEIGHT);

        let x = x % display::WIDTH;
        let y = y % display::HEIGHT;
        let mut collision = false;

        for (i, row) in rows.iter().enumerate() {
            let py = (y + i) % display::HEIGHT;
            // the most significant bit is the left most pixel
            for j in 0..sprite::WIDTH {
                let mask = 0x80u8 >> j;
                if row & mask == 0 {
                    continue;
                }
                let px = (x + j) % display::WIDTH;
                let pixel = &mut self.pixels[py][px];
                if *pixel {
                    collision = true;
                }
                *pixel = !*pixel;
            }
        }
        collision
    }

    /// Iterates the screen from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool; display::WIDTH]> {
        self.pixels.iter()
    }

    /// An owned copy of the current screen.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Counts the pixels that are currently on.
    pub fn lit(&self) -> usize {
        self.pixels
            .iter()
            .map(|row| row.iter().filter(|p| **p).count())
            .sum()
    }
}

/// A handle to a [`Framebuffer`] that can be shared with a renderer running on an other
/// thread. Drawing holds the write lock for the complete sprite, so a reader sees either the
/// screen before or after a draw, never a part of it.
#[derive(Clone, Default, Debug)]
pub struct SharedDisplay {
    inner: Arc<RwLock<Framebuffer>>,
}

impl SharedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Framebuffer> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Framebuffer> {
        self.inner.write()
    }

    /// Copies the screen while holding the read lock.
    pub fn snapshot(&self) -> Framebuffer {
        self.inner.read().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.set(3, 4, true);
        fb.set(63, 31, true);
        assert_eq!(fb.lit(), 2);
        fb.clear();
        assert_eq!(fb.lit(), 0);
    }

    #[test]
    fn test_draw_wraps_horizontally() {
        let mut fb = Framebuffer::new();

        assert!(!fb.draw_sprite(60, 0, &[0xFF]));

        for x in 60..64 {
            assert!(fb.get(x, 0), "pixel {} should be on", x);
        }
        for x in 0..4 {
            assert!(fb.get(x, 0), "pixel {} should be on", x);
        }
        assert_eq!(fb.lit(), 8);

        // drawing the same sprite again removes all of it
        assert!(fb.draw_sprite(60, 0, &[0xFF]));
        assert_eq!(fb.lit(), 0);
    }

    #[test]
    fn test_draw_wraps_vertically() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(0, 30, &[0x80, 0x80, 0x80, 0x80]));
        assert!(fb.get(0, 30));
        assert!(fb.get(0, 31));
        assert!(fb.get(0, 0));
        assert!(fb.get(0, 1));
        assert_eq!(fb.lit(), 4);
    }

    #[test]
    fn test_start_coordinates_are_reduced() {
        let mut fb = Framebuffer::new();
        assert!(!fb.draw_sprite(64 + 5, 32 + 2, &[0x80]));
        assert!(fb.get(5, 2));
        assert_eq!(fb.lit(), 1);
    }

    #[test]
    fn test_partial_collision() {
        let mut fb = Framebuffer::new();
        fb.set(1, 0, true);
        // only the first pixel is new, the second is toggled off
        assert!(fb.draw_sprite(0, 0, &[0b1100_0000]));
        assert!(fb.get(0, 0));
        assert!(!fb.get(1, 0));
    }

    #[test]
    fn test_shared_snapshot() {
        let shared = SharedDisplay::new();
        let reader = shared.clone();
        shared.write().draw_sprite(0, 0, &[0xF0]);
        let snapshot = reader.snapshot();
        assert_eq!(snapshot.lit(), 4);
        assert_eq!(*reader.read(), snapshot);
    }
}
