//! PCI configuration space: BAR probing, aperture commit rules, command
//! gating and reset behavior.

use at3d::{Aperture, At3d, At3dConfig, MemoryMapper};
use pretty_assertions::assert_eq;
use sst96::PumaMode;

#[derive(Default)]
struct RecordingMapper {
    mapped: Vec<(Aperture, u32, u32)>,
    unmapped: Vec<Aperture>,
}

impl MemoryMapper for RecordingMapper {
    fn map(&mut self, aperture: Aperture, base: u32, size: u32) {
        self.mapped.push((aperture, base, size));
    }

    fn unmap(&mut self, aperture: Aperture) {
        self.unmapped.push(aperture);
    }
}

fn device_with_companion() -> At3d {
    At3d::new(At3dConfig {
        vram_size_mb: 2,
        companion: Some(PumaMode::EightMb),
    })
}

fn write_bar(dev: &mut At3d, group: u8, base: u32, mapper: &mut RecordingMapper) {
    for (i, b) in base.to_le_bytes().iter().enumerate() {
        dev.pci_write(group + i as u8, *b, mapper);
    }
}

#[test]
fn probing_returns_size_mask_until_a_base_is_written() {
    let mut dev = device_with_companion();
    let mut mapper = RecordingMapper::default();

    // Companion BAR: 8 MiB aperture.
    assert_eq!(dev.pci_read(0x18), 0xFF);
    assert_eq!(dev.pci_read(0x19), 0x7F);

    // Linear BAR: 2 MiB aperture.
    assert_eq!(dev.pci_read(0x10), 0xFF);
    assert_eq!(dev.pci_read(0x11), 0x1F);

    write_bar(&mut dev, 0x18, 0xE000_0000, &mut mapper);
    assert_eq!(dev.pci_read(0x18), 0x00, "stored bytes after programming");
    assert_eq!(dev.pci_read(0x1B), 0xE0);
}

#[test]
fn linear_aperture_maps_on_high_byte_with_memory_enable() {
    let mut dev = At3d::new(At3dConfig::default());
    let mut mapper = RecordingMapper::default();

    // Low bytes alone never commit.
    dev.pci_write(0x10, 0x00, &mut mapper);
    dev.pci_write(0x11, 0x00, &mut mapper);
    dev.pci_write(0x12, 0x00, &mut mapper);
    assert!(mapper.mapped.is_empty());

    dev.pci_write(0x13, 0xD0, &mut mapper);
    assert_eq!(mapper.mapped, vec![(Aperture::Linear, 0xD000_0000, 0x20_0000)]);
}

#[test]
fn mmio_aperture_is_64k_aligned() {
    let mut dev = At3d::new(At3dConfig::default());
    let mut mapper = RecordingMapper::default();
    write_bar(&mut dev, 0x14, 0xD123_4567, &mut mapper);
    assert_eq!(mapper.mapped, vec![(Aperture::Mmio, 0xD123_0000, 0x1_0000)]);
}

#[test]
fn companion_aperture_is_4k_aligned_and_8mib() {
    let mut dev = device_with_companion();
    let mut mapper = RecordingMapper::default();
    write_bar(&mut dev, 0x18, 0xE000_1FFF, &mut mapper);
    assert_eq!(
        mapper.mapped,
        vec![(Aperture::Companion, 0xE000_1000, 0x80_0000)]
    );
}

#[test]
fn companion_bar_is_inert_without_a_companion_chip() {
    let mut dev = At3d::new(At3dConfig::default());
    let mut mapper = RecordingMapper::default();
    write_bar(&mut dev, 0x18, 0xE000_0000, &mut mapper);
    assert!(mapper.mapped.is_empty());
    assert_eq!(dev.pci_read(0x18), 0x00);
}

#[test]
fn clearing_command_bits_unmaps_everything_enabled() {
    let mut dev = device_with_companion();
    let mut mapper = RecordingMapper::default();

    write_bar(&mut dev, 0x10, 0xD000_0000, &mut mapper);
    write_bar(&mut dev, 0x14, 0xD100_0000, &mut mapper);
    write_bar(&mut dev, 0x18, 0xE000_0000, &mut mapper);
    assert_eq!(mapper.mapped.len(), 3);

    mapper.unmapped.clear();
    dev.pci_write(0x04, 0x00, &mut mapper);
    assert!(mapper.unmapped.contains(&Aperture::Linear));
    assert!(mapper.unmapped.contains(&Aperture::Mmio));
    assert!(mapper.unmapped.contains(&Aperture::Companion));

    // Re-enabling recommits the programmed windows.
    mapper.mapped.clear();
    dev.pci_write(0x04, 0x07, &mut mapper);
    assert_eq!(mapper.mapped.len(), 3);
}

#[test]
fn zero_base_never_maps() {
    let mut dev = At3d::new(At3dConfig::default());
    let mut mapper = RecordingMapper::default();
    write_bar(&mut dev, 0x10, 0x0000_0000, &mut mapper);
    assert!(mapper.mapped.is_empty());
}

#[test]
fn expansion_rom_needs_enable_bit_base_and_memory_decode() {
    let mut dev = At3d::new(At3dConfig::default());
    let mut mapper = RecordingMapper::default();

    dev.pci_write(0x32, 0x0C, &mut mapper); // base bits 16-23
    dev.pci_write(0x33, 0x00, &mut mapper);
    assert!(mapper.mapped.is_empty(), "no commit before the enable bit");

    dev.pci_write(0x30, 0x01, &mut mapper);
    assert_eq!(
        mapper.mapped,
        vec![(Aperture::ExpansionRom, 0x000C_0000, 0x1_0000)]
    );

    mapper.unmapped.clear();
    dev.pci_write(0x30, 0x00, &mut mapper);
    assert!(mapper.unmapped.contains(&Aperture::ExpansionRom));
}

#[test]
fn reset_restores_power_on_values_and_unmaps() {
    let mut dev = device_with_companion();
    let mut mapper = RecordingMapper::default();

    write_bar(&mut dev, 0x10, 0xD000_0000, &mut mapper);
    dev.mmio_write8(0x060, 0x12);
    dev.reset(&mut mapper);

    assert_eq!(dev.pci_read(0x04), 0x07);
    assert_eq!(dev.pci_read(0x06), 0x40);
    assert_eq!(dev.pci_read(0x3D), 0x01);
    assert_eq!(dev.mmio_read8(0x060), 0x00, "banks are zeroed");
    assert!(mapper.unmapped.contains(&Aperture::Linear));

    // Companion power-on init registers are restored.
    let companion = dev.companion().unwrap();
    assert_eq!(companion.reg_read(sst96::reg::FBIJR_INIT0), 0x0000_F201);
}

#[test]
fn interrupt_line_is_writable_pin_is_fixed() {
    let mut dev = At3d::new(At3dConfig::default());
    let mut mapper = RecordingMapper::default();
    dev.pci_write(0x3C, 0x0B, &mut mapper);
    assert_eq!(dev.pci_read(0x3C), 0x0B);
    dev.pci_write(0x3D, 0x07, &mut mapper);
    assert_eq!(dev.pci_read(0x3D), 0x01);
}
