//! PCI configuration space and aperture control.
//!
//! The chip decodes config-space accesses bytewise. Each BAR group is
//! committed to the platform address space only when its high-order byte is
//! written with the governing command bit set; clearing the command bits or
//! zeroing a base unmaps the window immediately. The device never owns the
//! platform address space: mapping requests go through the [`MemoryMapper`]
//! collaborator.

use bitflags::bitflags;

pub const PCI_VENDOR_ID: u16 = 0x1142;
pub const PCI_DEVICE_ID: u16 = 0x643D;

const MMIO_APERTURE_SIZE: u32 = 0x1_0000;
const ROM_APERTURE_SIZE: u32 = 0x1_0000;

bitflags! {
    /// PCI command register bits the device decodes.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct PciCommand: u8 {
        const IO = 0x01;
        const MEMORY = 0x02;
        const BUS_MASTER = 0x04;
    }
}

/// Address window controlled by a BAR group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Aperture {
    /// Linear framebuffer (BAR0), 1 MiB aligned, sized to VRAM.
    Linear,
    /// Register window (BAR1), 64 KiB.
    Mmio,
    /// Companion-chip PUMA window (BAR2), 4 KiB aligned.
    Companion,
    /// Expansion ROM window, 64 KiB.
    ExpansionRom,
}

/// Platform memory-mapping collaborator. Implementations route the given
/// window to the device's bus handlers; `unmap` removes it.
pub trait MemoryMapper {
    fn map(&mut self, aperture: Aperture, base: u32, size: u32);
    fn unmap(&mut self, aperture: Aperture);
}

pub(crate) struct PciConfig {
    regs: [u8; 256],
    interrupt_line: u8,
    linear_size: u32,
    /// PUMA aperture span; `None` when no companion chip is configured.
    companion_size: Option<u32>,
}

impl PciConfig {
    pub fn new(linear_size: u32, companion_size: Option<u32>) -> Self {
        let mut cfg = Self {
            regs: [0; 256],
            interrupt_line: 0,
            linear_size,
            companion_size,
        };
        cfg.load_power_on_defaults();
        cfg
    }

    fn load_power_on_defaults(&mut self) {
        self.regs[0x04] = 0x07; // IO + MEM + bus master
        self.regs[0x06] = 0x40; // status
        self.regs[0x3D] = 0x01; // INTA#
    }

    pub fn command(&self) -> PciCommand {
        PciCommand::from_bits_truncate(self.regs[0x04])
    }

    pub fn reset(&mut self, mapper: &mut dyn MemoryMapper) {
        self.regs = [0; 256];
        self.load_power_on_defaults();
        for aperture in [
            Aperture::Linear,
            Aperture::Mmio,
            Aperture::Companion,
            Aperture::ExpansionRom,
        ] {
            mapper.unmap(aperture);
        }
    }

    pub fn read(&self, addr: u8) -> u8 {
        let ret = match addr {
            0x00 => PCI_VENDOR_ID as u8,
            0x01 => (PCI_VENDOR_ID >> 8) as u8,
            0x02 => PCI_DEVICE_ID as u8,
            0x03 => (PCI_DEVICE_ID >> 8) as u8,
            0x06 => 0x40, // status: medium DEVSEL timing
            0x07 => 0x00,
            0x08 => 0x00, // revision
            0x09 => 0x00,
            0x0A => 0x03, // display class
            0x0B => 0x00,
            0x0C..=0x0F => 0x00,
            0x10..=0x13 => self.bar_read(0x10, self.linear_size, addr),
            0x14..=0x17 => self.bar_read(0x14, MMIO_APERTURE_SIZE, addr),
            0x18..=0x1B => match self.companion_size {
                Some(size) => self.bar_read(0x18, size, addr),
                None => 0x00,
            },
            0x30..=0x33 => self.bar_read(0x30, ROM_APERTURE_SIZE, addr),
            0x3C => self.interrupt_line,
            0x3D => 0x01, // INTA#
            _ => self.regs[addr as usize],
        };
        tracing::trace!(target: "at3d::pci", addr = format_args!("{addr:02x}"), ret = format_args!("{ret:02x}"), "config read");
        ret
    }

    /// While every byte of a BAR group is zero, reads return the aperture's
    /// size mask (`(size - 1) >> 8`, little-endian) so probing software can
    /// discover the window size. Any non-zero byte switches the group to
    /// verbatim storage.
    fn bar_read(&self, group: u8, size: u32, addr: u8) -> u8 {
        let group = group as usize;
        if self.regs[group..group + 4].iter().all(|&b| b == 0) {
            let mask = size.saturating_sub(1) >> 8;
            mask.to_le_bytes()[(addr as usize) - group]
        } else {
            self.regs[addr as usize]
        }
    }

    pub fn write(&mut self, addr: u8, val: u8, mapper: &mut dyn MemoryMapper) {
        tracing::trace!(target: "at3d::pci", addr = format_args!("{addr:02x}"), val = format_args!("{val:02x}"), "config write");
        match addr {
            0x04 => {
                self.regs[0x04] = val & 0x07;
                // Command-bit changes take effect on every aperture at once.
                self.commit_all(mapper);
            }
            0x10..=0x13 => {
                self.regs[addr as usize] = val;
                if addr == 0x13 {
                    self.commit_linear(mapper);
                }
            }
            0x14..=0x17 => {
                self.regs[addr as usize] = val;
                if addr == 0x17 {
                    self.commit_mmio(mapper);
                }
            }
            0x18..=0x1B => {
                self.regs[addr as usize] = val;
                if addr == 0x1B {
                    self.commit_companion(mapper);
                }
            }
            0x30..=0x33 => {
                self.regs[addr as usize] = val;
                if addr == 0x30 || addr == 0x33 {
                    self.commit_rom(mapper);
                }
            }
            0x3C => self.interrupt_line = val,
            _ => self.regs[addr as usize] = val,
        }
    }

    fn bar_base(&self, group: u8) -> u32 {
        let group = group as usize;
        u32::from_le_bytes(self.regs[group..group + 4].try_into().unwrap())
    }

    fn commit_all(&mut self, mapper: &mut dyn MemoryMapper) {
        self.commit_linear(mapper);
        self.commit_mmio(mapper);
        self.commit_companion(mapper);
        self.commit_rom(mapper);
    }

    fn commit_linear(&mut self, mapper: &mut dyn MemoryMapper) {
        let base = self.bar_base(0x10) & 0xFFF0_0000;
        if base != 0 && self.command().contains(PciCommand::MEMORY) {
            mapper.map(Aperture::Linear, base, self.linear_size);
            tracing::debug!(target: "at3d::pci", base = format_args!("{base:08x}"), "linear aperture mapped");
        } else {
            mapper.unmap(Aperture::Linear);
        }
    }

    fn commit_mmio(&mut self, mapper: &mut dyn MemoryMapper) {
        let base = self.bar_base(0x14) & 0xFFFF_0000;
        if base != 0 && self.command().contains(PciCommand::IO) {
            mapper.map(Aperture::Mmio, base, MMIO_APERTURE_SIZE);
            tracing::debug!(target: "at3d::pci", base = format_args!("{base:08x}"), "MMIO aperture mapped");
        } else {
            mapper.unmap(Aperture::Mmio);
        }
    }

    fn commit_companion(&mut self, mapper: &mut dyn MemoryMapper) {
        let Some(size) = self.companion_size else {
            return;
        };
        let base = self.bar_base(0x18) & 0xFFFF_F000;
        if base != 0 && self.command().contains(PciCommand::MEMORY) {
            mapper.map(Aperture::Companion, base, size);
            tracing::debug!(target: "at3d::pci", base = format_args!("{base:08x}"), "companion aperture mapped");
        } else {
            mapper.unmap(Aperture::Companion);
        }
    }

    fn commit_rom(&mut self, mapper: &mut dyn MemoryMapper) {
        let enabled = self.regs[0x30] & 0x01 != 0;
        let base = (u32::from(self.regs[0x32]) << 16) | (u32::from(self.regs[0x33]) << 24);
        if enabled && base != 0 && self.command().contains(PciCommand::MEMORY) {
            mapper.map(Aperture::ExpansionRom, base, ROM_APERTURE_SIZE);
            tracing::debug!(target: "at3d::pci", base = format_args!("{base:08x}"), "expansion ROM mapped");
        } else {
            mapper.unmap(Aperture::ExpansionRom);
        }
    }
}
