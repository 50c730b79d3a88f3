//! Hardware cursor register bank and scanline compositor.
//!
//! The cursor is a 32-line two-plane (AND/XOR) bitmap in VRAM. The scanout
//! collaborator polls [`crate::At3d::cursor_state`] after register writes and
//! calls [`crate::At3d::hwcursor_draw`] once per scanline while compositing.

use crate::device::At3d;
use crate::regs::register_bank;

register_bank! {
    pub(crate) struct CursorRegs {
        0x140 => control: u8,
        0x142 => x: u16,
        0x144 => y: u16,
        0x148 => addr: u32,
        0x14C => hotspot_x: u8,
        0x14D => hotspot_y: u8,
        0x150 => fg_color: u32,
        0x154 => bg_color: u32,
    }
}

/// Snapshot of the cursor configuration for the scanout collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CursorState {
    pub enabled: bool,
    pub x: u16,
    pub y: u16,
    pub addr: u32,
    pub hotspot_x: u8,
    pub hotspot_y: u8,
    pub fg_color: u32,
    pub bg_color: u32,
}

impl At3d {
    /// Current cursor configuration, with the bitmap address already masked
    /// to VRAM.
    pub fn cursor_state(&self) -> CursorState {
        let regs = self.cursor_regs();
        CursorState {
            enabled: regs.control & 0x01 != 0,
            x: regs.x,
            y: regs.y,
            addr: regs.addr & self.vram_mask(),
            hotspot_x: regs.hotspot_x,
            hotspot_y: regs.hotspot_y,
            fg_color: regs.fg_color,
            bg_color: regs.bg_color,
        }
    }

    /// Composite the cursor into one scanline of the target buffer.
    ///
    /// `line` is the full-width pixel row for `displine`; pixels outside the
    /// buffer are clipped. AND-plane rows sit at the cursor address, XOR-plane
    /// rows 128 bytes further: a clear AND bit paints the background color, a
    /// set XOR bit inverts the pixel.
    pub fn hwcursor_draw(&self, displine: u32, line: &mut [u32]) {
        let cursor = self.cursor_state();
        if !cursor.enabled {
            return;
        }

        let y = u32::from(cursor.y);
        if displine < y || displine >= y + 32 {
            return;
        }

        let x = i64::from(cursor.x);
        let xoff = i64::from(cursor.hotspot_x);
        let line_offset = (displine - y) * 16;
        let base = cursor.addr as usize + line_offset as usize;
        let vram = self.vram();
        if base + 128 + 16 > vram.len() {
            return;
        }

        for chunk in 0..4usize {
            let mut and_bits = u32::from_be_bytes(
                vram[base + chunk * 4..base + chunk * 4 + 4].try_into().unwrap(),
            );
            let mut xor_bits = u32::from_be_bytes(
                vram[base + 128 + chunk * 4..base + 128 + chunk * 4 + 4]
                    .try_into()
                    .unwrap(),
            );

            for bit in 0..32i64 {
                let px = x - xoff + chunk as i64 * 32 + bit;
                if px >= 0 && (px as usize) < line.len() {
                    let p = &mut line[px as usize];
                    if and_bits & 0x8000_0000 == 0 {
                        *p = cursor.bg_color;
                    }
                    if xor_bits & 0x8000_0000 != 0 {
                        *p ^= 0x00FF_FFFF;
                    }
                }
                and_bits <<= 1;
                xor_bits <<= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{At3d, At3dConfig};

    fn device() -> At3d {
        At3d::new(At3dConfig::default())
    }

    fn write_cursor_reg(dev: &mut At3d, offset: u32, val: u8) {
        dev.mmio_write8(offset, val);
    }

    #[test]
    fn disabled_cursor_leaves_line_untouched() {
        let dev = device();
        let mut line = vec![0x1111_1111u32; 64];
        dev.hwcursor_draw(0, &mut line);
        assert!(line.iter().all(|&p| p == 0x1111_1111));
    }

    #[test]
    fn cursor_paints_background_where_and_plane_is_clear() {
        let mut dev = device();

        // Cursor bitmap at VRAM offset 0x1000: AND plane all clear for the
        // first row, XOR plane all clear.
        for i in 0..16 {
            dev.linear_write8(0x1000 + i, 0x00);
            dev.linear_write8(0x1000 + 128 + i, 0x00);
        }

        write_cursor_reg(&mut dev, 0x148, 0x00);
        write_cursor_reg(&mut dev, 0x149, 0x10); // addr = 0x1000
        // bg color
        write_cursor_reg(&mut dev, 0x154, 0x44);
        write_cursor_reg(&mut dev, 0x155, 0x33);
        write_cursor_reg(&mut dev, 0x156, 0x22);
        write_cursor_reg(&mut dev, 0x157, 0x00);
        // enable
        write_cursor_reg(&mut dev, 0x140, 0x01);

        let mut line = vec![0u32; 200];
        dev.hwcursor_draw(0, &mut line);
        assert_eq!(line[0], 0x0022_3344);
        assert_eq!(line[127], 0x0022_3344);
        assert_eq!(line[128], 0, "cursor span ends after 128 pixels");
    }

    #[test]
    fn xor_plane_inverts_pixels() {
        let mut dev = device();

        // AND plane all set (leave underlying pixel), XOR plane all set for
        // the first chunk.
        for i in 0..16 {
            dev.linear_write8(0x2000 + i, 0xFF);
            dev.linear_write8(0x2000 + 128 + i, if i < 4 { 0xFF } else { 0x00 });
        }

        write_cursor_reg(&mut dev, 0x148, 0x00);
        write_cursor_reg(&mut dev, 0x149, 0x20); // addr = 0x2000
        write_cursor_reg(&mut dev, 0x140, 0x01);

        let mut line = vec![0x00AB_CDEFu32; 200];
        dev.hwcursor_draw(0, &mut line);
        assert_eq!(line[0], 0x00AB_CDEF ^ 0x00FF_FFFF);
        assert_eq!(line[32], 0x00AB_CDEF, "second chunk has no XOR bits");
    }

    #[test]
    fn scanlines_outside_cursor_window_are_ignored() {
        let mut dev = device();
        write_cursor_reg(&mut dev, 0x144, 10); // y = 10
        write_cursor_reg(&mut dev, 0x140, 0x01);

        let mut line = vec![0x5555_5555u32; 64];
        dev.hwcursor_draw(9, &mut line);
        dev.hwcursor_draw(42, &mut line);
        assert!(line.iter().all(|&p| p == 0x5555_5555));
    }
}
