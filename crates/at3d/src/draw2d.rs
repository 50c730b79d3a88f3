//! 2D draw engine.
//!
//! The engine is a two-state machine (idle/busy). Writing the last byte of
//! the draw-control field with the start bit making a 0→1 transition kicks a
//! job; completion clears both the internal busy state and the start bit, as
//! the only completion signal guest software gets. Execution is synchronous
//! here, but nothing outside this module may observe an intermediate state:
//! the busy window brackets all pixel side effects.

use crate::regs::register_bank;

pub(crate) const DRAW_START_BIT: u32 = 1 << 31;

/// Engine execution state, visible to embedders for scheduling decisions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    Busy,
}

register_bank! {
    pub(crate) struct Draw2dRegs {
        0x030 => clip_control: u8,
        0x038 => clip_left: u16,
        0x03A => clip_top: u16,
        0x03C => clip_right: u16,
        0x03E => clip_bottom: u16,
        0x040 => draw_control: u32,
        0x046 => raster_op: u8,
        0x047 => byte_mask: u8,
        0x048 => pattern: u64,
        0x050 => src_x: u16,
        0x052 => src_y: u16,
        0x054 => dst_x: u16,
        0x056 => dst_y: u16,
        0x058 => size_x: u16,
        0x05A => size_y: u16,
        0x05C => dst_pitch: u16,
        0x05E => src_pitch: u16,
        0x060 => fg_color: u32,
        0x064 => bg_color: u32,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BankWrite {
    Unclaimed,
    Stored,
    Kick,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Draw2d {
    pub regs: Draw2dRegs,
    pub state: EngineState,
}

impl Draw2d {
    pub fn read_byte(&self, offset: u32) -> Option<u8> {
        self.regs.read_byte(offset)
    }

    pub fn write_byte(&mut self, offset: u32, val: u8) -> BankWrite {
        let start_was_set = self.regs.draw_control & DRAW_START_BIT != 0;
        if !self.regs.write_byte(offset, val) {
            return BankWrite::Unclaimed;
        }
        if offset == 0x043 {
            let start_set = self.regs.draw_control & DRAW_START_BIT != 0;
            if start_set && !start_was_set {
                self.state = EngineState::Busy;
                return BankWrite::Kick;
            }
        }
        BankWrite::Stored
    }

    /// Run the triggered job to completion against video memory.
    ///
    /// Only the rectangle-fill raster operation writes pixels at this level;
    /// the remaining opcodes belong to the external pixel pipeline and must
    /// leave memory untouched while still completing the busy/start protocol.
    pub fn execute(&mut self, vram: &mut [u8], vram_mask: u32) {
        let cmd = self.regs.draw_control & 0x0F;
        let clip_enable = self.regs.clip_control & 0x01 != 0;

        tracing::debug!(target: "at3d::draw2d", cmd, "2D engine kick");

        if cmd == 0x01 {
            let fill = (self.regs.fg_color & 0xFF) as u8;
            for y in 0..u32::from(self.regs.size_y) {
                for x in 0..u32::from(self.regs.size_x) {
                    let px = u32::from(self.regs.dst_x) + x;
                    let py = u32::from(self.regs.dst_y) + y;
                    if clip_enable
                        && !(px >= u32::from(self.regs.clip_left)
                            && px < u32::from(self.regs.clip_right)
                            && py >= u32::from(self.regs.clip_top)
                            && py < u32::from(self.regs.clip_bottom))
                    {
                        continue;
                    }
                    let offset = py
                        .wrapping_mul(u32::from(self.regs.dst_pitch))
                        .wrapping_add(px);
                    vram[(offset & vram_mask) as usize] = fill;
                }
            }
        }

        self.state = EngineState::Idle;
        self.regs.draw_control &= !DRAW_START_BIT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_bit_edge_detection() {
        let mut engine = Draw2d::default();

        // Writing the trigger byte without the start bit does nothing.
        assert_eq!(engine.write_byte(0x043, 0x00), BankWrite::Stored);

        // 0 -> 1 transition kicks.
        assert_eq!(engine.write_byte(0x043, 0x80), BankWrite::Kick);
        assert_eq!(engine.state, EngineState::Busy);

        // Re-writing an already-set start bit does not re-trigger.
        assert_eq!(engine.write_byte(0x043, 0x80), BankWrite::Stored);
    }

    #[test]
    fn lower_control_bytes_never_trigger() {
        let mut engine = Draw2d::default();
        assert_eq!(engine.write_byte(0x040, 0xFF), BankWrite::Stored);
        assert_eq!(engine.write_byte(0x041, 0xFF), BankWrite::Stored);
        assert_eq!(engine.write_byte(0x042, 0xFF), BankWrite::Stored);
        assert_eq!(engine.state, EngineState::Idle);
    }

    #[test]
    fn non_fill_opcode_leaves_memory_untouched_but_completes() {
        let mut engine = Draw2d::default();
        engine.regs.size_x = 4;
        engine.regs.size_y = 4;
        engine.regs.fg_color = 0xAA;
        engine.write_byte(0x043, 0x80);
        // Opcode 0 is reserved for the external pixel pipeline.
        let mut vram = vec![0u8; 0x1000];
        engine.execute(&mut vram, 0xFFF);
        assert!(vram.iter().all(|&b| b == 0));
        assert_eq!(engine.state, EngineState::Idle);
        assert_eq!(engine.regs.draw_control & DRAW_START_BIT, 0);
    }

    #[test]
    fn fill_wraps_offsets_modulo_memory_size() {
        let mut engine = Draw2d::default();
        engine.regs.draw_control = 0x01;
        engine.regs.dst_x = 0;
        engine.regs.dst_y = 0x4000; // way past the end of a 4 KiB buffer
        engine.regs.dst_pitch = 1;
        engine.regs.size_x = 1;
        engine.regs.size_y = 1;
        engine.regs.fg_color = 0x5A;
        let mut vram = vec![0u8; 0x1000];
        engine.execute(&mut vram, 0xFFF);
        assert_eq!(vram[0x4000 & 0xFFF], 0x5A);
    }
}
