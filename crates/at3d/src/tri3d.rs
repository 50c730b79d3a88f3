//! 3D triangle-setup engine.
//!
//! The register file holds per-triangle start values and per-axis gradients
//! in the chip's fixed-point encodings; this model treats the raw bit
//! patterns as the contract and applies no scaling. On a start-bit edge the
//! whole file is copied into a [`TriangleSetupJob`] so in-flight work is
//! unaffected by register writes that follow the trigger. Rasterization
//! itself belongs to an external pixel pipeline consuming the job.

use crate::draw2d::{BankWrite, EngineState};
use crate::regs::register_bank;

pub(crate) const CMD_START_BIT: u32 = 1 << 31;

register_bank! {
    /// Triangle-setup register file. 32-bit gradients are signed; the
    /// per-channel color gradients are signed 16-bit; start values are
    /// 16-bit unsigned fractions.
    pub struct TriangleSetupJob {
        0x300 => cmd_set: u32,
        0x304 => dest_base: u32,
        0x308 => dest_stride: u16,
        0x30C => z_base: u32,
        0x310 => z_stride: u16,
        0x314 => tex_base: u32,
        0x318 => tex_border_color: u32,
        0x31C => tb_v: u16,
        0x31E => tb_u: u16,
        0x320 => d_v_dx: i32,
        0x324 => d_u_dx: i32,
        0x328 => d_v_dy: i32,
        0x32C => d_u_dy: i32,
        0x330 => u_start: u16,
        0x332 => v_start: u16,
        0x334 => d_z_dx: i32,
        0x338 => d_z_dy: i32,
        0x33C => z_start: u16,
        0x33E => d_w_dx: i32,
        0x342 => d_w_dy: i32,
        0x346 => w_start: u16,
        0x348 => d_d_dx: i32,
        0x34C => d_d_dy: i32,
        0x350 => d_start: u16,
        0x352 => d_g_dx: i16,
        0x354 => d_b_dx: i16,
        0x356 => d_r_dx: i16,
        0x358 => d_a_dx: i16,
        0x35A => d_g_dy: i16,
        0x35C => d_b_dy: i16,
        0x35E => d_r_dy: i16,
        0x360 => d_a_dy: i16,
        0x362 => g_start: u16,
        0x364 => b_start: u16,
        0x366 => r_start: u16,
        0x368 => a_start: u16,
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TriangleSetup {
    pub regs: TriangleSetupJob,
    pub state: EngineState,
}

impl TriangleSetup {
    pub fn read_byte(&self, offset: u32) -> Option<u8> {
        self.regs.read_byte(offset)
    }

    pub fn write_byte(&mut self, offset: u32, val: u8) -> BankWrite {
        let start_was_set = self.regs.cmd_set & CMD_START_BIT != 0;
        if !self.regs.write_byte(offset, val) {
            return BankWrite::Unclaimed;
        }
        if offset == 0x303 {
            let start_set = self.regs.cmd_set & CMD_START_BIT != 0;
            if start_set && !start_was_set {
                self.state = EngineState::Busy;
                return BankWrite::Kick;
            }
        }
        BankWrite::Stored
    }

    /// Capture the parameter block and complete. The returned job is the
    /// hand-off to the rasterizer collaborator.
    pub fn execute(&mut self) -> TriangleSetupJob {
        let job = self.regs.clone();
        tracing::debug!(
            target: "at3d::tri3d",
            cmd = format_args!("{:08x}", job.cmd_set),
            dest_base = format_args!("{:08x}", job.dest_base),
            "triangle setup captured"
        );
        self.state = EngineState::Idle;
        self.regs.cmd_set &= !CMD_START_BIT;
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_copies_the_parameter_block() {
        let mut engine = TriangleSetup::default();
        engine.regs.d_v_dx = -0x1234;
        engine.regs.g_start = 0xBEEF;
        assert_eq!(engine.write_byte(0x303, 0x80), BankWrite::Kick);

        let job = engine.execute();
        assert_eq!(job.d_v_dx, -0x1234);
        assert_eq!(job.g_start, 0xBEEF);
        // The captured block keeps the start bit as triggered; the live
        // register file has it cleared.
        assert_eq!(job.cmd_set & CMD_START_BIT, CMD_START_BIT);
        assert_eq!(engine.regs.cmd_set & CMD_START_BIT, 0);
        assert_eq!(engine.state, EngineState::Idle);
    }

    #[test]
    fn writes_after_capture_do_not_alter_the_job() {
        let mut engine = TriangleSetup::default();
        engine.regs.z_start = 0x1111;
        engine.write_byte(0x303, 0x80);
        let job = engine.execute();

        engine.regs.z_start = 0x2222;
        assert_eq!(job.z_start, 0x1111);
    }

    #[test]
    fn signed_gradient_bytes_assemble_little_endian() {
        let mut engine = TriangleSetup::default();
        // d_g_dx is a signed 16-bit field at 0x352.
        assert_eq!(engine.write_byte(0x352, 0xFE), BankWrite::Stored);
        assert_eq!(engine.write_byte(0x353, 0xFF), BankWrite::Stored);
        assert_eq!(engine.regs.d_g_dx, -2);
    }
}
