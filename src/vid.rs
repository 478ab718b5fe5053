#[cfg(test)]
#[path = "./vid_test.rs"]
mod vid_test;

use std::cell::Cell;

use crate::assets::Graphic;

pub const MAX_SCAN_LINES: usize = 200;
pub const SCREENBWIDE: usize = 80;
const PAGE_LINES: usize = 208;
pub const PAGE_SIZE: usize = SCREENBWIDE * PAGE_LINES;

pub const PAGE_1_START: usize = 0;
pub const PAGE_2_START: usize = PAGE_SIZE;
pub const PAGE_3_START: usize = PAGE_SIZE * 2;
const PLANE_SIZE: usize = PAGE_SIZE * 3;

static PIXMASKS: [u8; 4] = [1, 2, 4, 8];
static LEFTMASKS: [u8; 4] = [15, 14, 12, 8];
static RIGHTMASKS: [u8; 4] = [1, 3, 7, 15];

/// The 16 EGA colors as 6-bit-per-channel RGB.
pub static GAME_PALETTE: [[u8; 3]; 16] = [
    [0, 0, 0],
    [0, 0, 42],
    [0, 42, 0],
    [0, 42, 42],
    [42, 0, 0],
    [42, 0, 42],
    [42, 21, 0],
    [42, 42, 42],
    [21, 21, 21],
    [21, 21, 63],
    [21, 63, 21],
    [21, 63, 63],
    [63, 21, 21],
    [63, 21, 63],
    [63, 63, 21],
    [63, 63, 63],
];

/// Four-plane byte surface addressed the way the adapter addresses it:
/// one byte holds one pixel, pixel x goes to plane x&3 at byte x/4 of
/// its scanline. Three pages live back to back in each plane so the
/// play loop can draw into one page while another is displayed.
pub struct PlanarScreen {
    planes: [Vec<u8>; 4],
    linewidth: usize,
    bufferofs: Cell<usize>,
    displayofs: Cell<usize>,
    map_mask: Cell<u8>,
}

pub fn new_screen() -> PlanarScreen {
    PlanarScreen {
        planes: [
            vec![0; PLANE_SIZE],
            vec![0; PLANE_SIZE],
            vec![0; PLANE_SIZE],
            vec![0; PLANE_SIZE],
        ],
        linewidth: SCREENBWIDE,
        bufferofs: Cell::new(PAGE_1_START),
        displayofs: Cell::new(PAGE_1_START),
        map_mask: Cell::new(0xF),
    }
}

impl PlanarScreen {
    pub fn set_buffer_offset(&self, offset: usize) {
        self.bufferofs.set(offset);
    }

    pub fn buffer_offset(&self) -> usize {
        self.bufferofs.get()
    }

    /// Page flip: what was drawn becomes visible on the next retrace.
    pub fn set_display_offset(&self, offset: usize) {
        self.displayofs.set(offset);
    }

    pub fn display_offset(&self) -> usize {
        self.displayofs.get()
    }

    fn set_mask(&self, mask: u8) {
        self.map_mask.set(mask);
    }

    fn write_mem(&mut self, dest: usize, color: u8) {
        let mask = self.map_mask.get();
        for plane in 0..4 {
            if mask & (1 << plane) != 0 {
                self.planes[plane][dest] = color;
            }
        }
    }

    fn y_offset(&self, y: usize) -> usize {
        self.bufferofs.get() + y * self.linewidth
    }

    /// Color of a pixel in the draw page, assembled back from the
    /// plane layout. Test and presentation read path.
    pub fn pixel_at(&self, x: usize, y: usize) -> u8 {
        self.planes[x & 3][self.y_offset(y) + (x >> 2)]
    }

    /// Whole draw page as a linear width*height byte image.
    pub fn linear_page(&self, width: usize, height: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                out.push(self.pixel_at(x, y));
            }
        }
        out
    }

    pub fn bar(&mut self, x: usize, y: usize, width: usize, height: usize, color: u8) {
        let leftmask = LEFTMASKS[x & 3];
        let rightmask = RIGHTMASKS[(x + width - 1) & 3];
        let midbytes = ((x as i32 + (width as i32) + 3) >> 2) - (x as i32 >> 2) - 2;

        let mut dest = self.y_offset(y) + (x >> 2);

        if midbytes < 0 {
            self.set_mask(leftmask & rightmask);
            for _ in 0..height {
                self.write_mem(dest, color);
                dest += self.linewidth;
            }
        } else {
            for _ in 0..height {
                let linedelta = self.linewidth - (midbytes as usize + 1);
                self.set_mask(leftmask);
                self.write_mem(dest, color);
                dest += 1;

                self.set_mask(0xFF);
                for _ in 0..midbytes {
                    self.write_mem(dest, color);
                    dest += 1;
                }
                self.set_mask(rightmask);
                self.write_mem(dest, color);

                dest += linedelta;
            }
        }

        self.set_mask(0xFF);
    }

    pub fn hlin(&mut self, x: usize, y: usize, width: usize, color: u8) {
        let xbyte = x >> 2;
        let leftmask = LEFTMASKS[x & 3];
        let rightmask = RIGHTMASKS[(x + width - 1) & 3];
        let midbytes: i32 = ((x + width + 3) >> 2) as i32 - xbyte as i32 - 2;

        let mut dest = self.y_offset(y) + xbyte;
        if midbytes < 0 {
            self.set_mask(leftmask & rightmask);
            self.write_mem(dest, color);
        } else {
            self.set_mask(leftmask);
            self.write_mem(dest, color);
            dest += 1;

            self.set_mask(0xFF);
            for _ in 0..midbytes {
                self.write_mem(dest, color);
                dest += 1;
            }

            self.set_mask(rightmask);
            self.write_mem(dest, color);
        }

        self.set_mask(0xFF);
    }

    pub fn vlin(&mut self, x: usize, y: usize, height: usize, color: u8) {
        self.set_mask(PIXMASKS[x & 3]);

        let mut dest = self.y_offset(y) + (x >> 2);
        let mut h = height;
        while h > 0 {
            self.write_mem(dest, color);
            dest += self.linewidth;
            h -= 1;
        }

        self.set_mask(0xFF);
    }

    pub fn plot(&mut self, x: usize, y: usize, color: u8) {
        self.set_mask(PIXMASKS[x & 3]);
        let dest = self.y_offset(y) + (x >> 2);
        self.write_mem(dest, color);
    }

    /// Blit a decoded picture with its top left at (x, y).
    /// Transparent index 0 is drawn, pictures are rectangular here.
    pub fn pic(&mut self, x: usize, y: usize, graphic: &Graphic) {
        let linear = crate::assets::linearize(graphic);
        for row in 0..graphic.height {
            for col in 0..graphic.width {
                self.plot(x + col, y + row, linear[row * graphic.width + col]);
            }
        }
    }
}
