//! THP bridge registers: the primary chip's indirect path into the
//! companion chip's PUMA address space.
//!
//! Software writes the address register, then the data register; committing
//! the data register's last byte performs the PUMA write. Reads of any data
//! register byte perform the PUMA read at the current address, stage the
//! result behind the data register, and return the selected byte. The
//! control register's trigger byte carries the bridge enable bit.

use crate::regs::register_bank;

register_bank! {
    pub(crate) struct ThpRegs {
        0x400 => control: u32,
        0x404 => status: u32,
        0x408 => address: u32,
        0x40C => data: u32,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ThpWrite {
    Unclaimed,
    Stored,
    /// Trigger byte of the control register was written; payload is the new
    /// enable-bit state.
    EnableUpdate(bool),
    /// Last byte of the data register was written; the staged address/data
    /// pair commits to PUMA space.
    CommitData,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Thp {
    pub regs: ThpRegs,
}

impl Thp {
    pub fn read_byte(&self, offset: u32) -> Option<u8> {
        self.regs.read_byte(offset)
    }

    pub fn write_byte(&mut self, offset: u32, val: u8) -> ThpWrite {
        if !self.regs.write_byte(offset, val) {
            return ThpWrite::Unclaimed;
        }
        match offset {
            0x403 => ThpWrite::EnableUpdate(self.regs.control & 0x01 != 0),
            0x40F => ThpWrite::CommitData,
            _ => ThpWrite::Stored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_update_reports_bit_state_on_trigger_byte_only() {
        let mut thp = Thp::default();
        assert_eq!(thp.write_byte(0x400, 0x01), ThpWrite::Stored);
        assert_eq!(thp.write_byte(0x403, 0x00), ThpWrite::EnableUpdate(true));

        thp.write_byte(0x400, 0x00);
        assert_eq!(thp.write_byte(0x403, 0x00), ThpWrite::EnableUpdate(false));
    }

    #[test]
    fn data_commit_fires_on_last_byte() {
        let mut thp = Thp::default();
        assert_eq!(thp.write_byte(0x40C, 0xAA), ThpWrite::Stored);
        assert_eq!(thp.write_byte(0x40D, 0xBB), ThpWrite::Stored);
        assert_eq!(thp.write_byte(0x40E, 0xCC), ThpWrite::Stored);
        assert_eq!(thp.write_byte(0x40F, 0xDD), ThpWrite::CommitData);
        assert_eq!(thp.regs.data, 0xDDCC_BBAA);
    }
}
