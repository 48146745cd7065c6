//! A wrapper around the 64x32 monochrome pixel buffer the interpreter draws into and the host
//! reads out of
use std::fmt;
use std::ops::Index;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Color of a lit pixel in `Graphics::to_rgb` when the host doesn't pick its own
pub const DEFAULT_FG: u32 = 0xFFFFFF;
pub const DEFAULT_BG: u32 = 0x000000;

#[derive(Clone, PartialEq)]
pub struct Graphics {
    buffer: [bool; WIDTH * HEIGHT],
}

impl Graphics {
    pub fn new() -> Self {
        Graphics {
            buffer: [false; WIDTH * HEIGHT],
        }
    }

    pub fn len(&self) -> usize {
        WIDTH * HEIGHT
    }

    /// Given x and y coordinate for a pixel in the buffer, return the corresponding
    /// index of that pixel in the buffer
    pub fn get_graphics_idx(x: usize, y: usize) -> usize {
        y * WIDTH + x
    }

    /// Whether the pixel at (x, y) is on. Coordinates off the screen read as off
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.buffer[Self::get_graphics_idx(x, y)]
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buffer = [false; WIDTH * HEIGHT];
    }

    pub fn is_clear(&self) -> bool {
        self.buffer.iter().all(|p| !p)
    }

    /// XOR a single pixel, returning true if it was on and is now off
    pub fn xor_set(&mut self, x: usize, y: usize, on: bool) -> bool {
        let idx = Self::get_graphics_idx(x, y);
        let was_on = self.buffer[idx];
        self.buffer[idx] = was_on ^ on;
        was_on && on
    }

    /// Draw `sprite` with its top left corner at (x, y). Each byte is one row of 8 pixels, most
    /// significant bit leftmost. The starting coordinates wrap around the screen, but anything
    /// running past the right or bottom edge is clipped.
    ///
    /// Returns true if any pixel went from on to off
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x0 = x as usize % WIDTH;
        let y0 = y as usize % HEIGHT;
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            let y = y0 + row;
            if y >= HEIGHT {
                break;
            }
            for col in 0..8 {
                let x = x0 + col;
                if x >= WIDTH {
                    break;
                }
                let on = (byte >> (7 - col)) & 1 == 1;
                if on {
                    collision |= self.xor_set(x, y, true);
                }
            }
        }

        collision
    }

    pub fn pixels(&self) -> &[bool] {
        &self.buffer
    }

    /// Convert the buffer to one 0RGB `u32` per pixel, row by row, the layout framebuffer
    /// windowing libraries expect
    pub fn to_rgb(&self, fg: u32, bg: u32) -> Vec<u32> {
        self.buffer
            .iter()
            .map(|&on| if on { fg } else { bg })
            .collect()
    }
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Graphics {
    type Output = bool;

    #[inline]
    fn index(&self, idx: usize) -> &Self::Output {
        &self.buffer[idx]
    }
}

impl fmt::Debug for Graphics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.buffer.chunks(WIDTH) {
            let line: String = row.iter().map(|&on| if on { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
