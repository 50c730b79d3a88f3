//! Register-window decode behavior: byte-partial field access, trigger
//! semantics of wide writes, and the flat fallback space.

use at3d::{At3d, At3dConfig, EngineState};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn device() -> At3d {
    At3d::new(At3dConfig::default())
}

#[test]
fn byte_writes_do_not_disturb_field_siblings() {
    let mut dev = device();

    // fg_color is a 4-byte field at 0x060.
    dev.mmio_write8(0x060, 0x11);
    dev.mmio_write8(0x061, 0x22);
    dev.mmio_write8(0x062, 0x33);
    dev.mmio_write8(0x063, 0x44);

    dev.mmio_write8(0x062, 0xAB);

    assert_eq!(dev.mmio_read8(0x060), 0x11);
    assert_eq!(dev.mmio_read8(0x061), 0x22);
    assert_eq!(dev.mmio_read8(0x062), 0xAB);
    assert_eq!(dev.mmio_read8(0x063), 0x44);
}

proptest! {
    #[test]
    fn byte_write_isolation_holds_across_the_pattern_field(
        initial in any::<u64>(),
        index in 0u32..8,
        val in any::<u8>(),
    ) {
        let mut dev = device();
        // pattern is the 8-byte field at 0x048.
        for (i, b) in initial.to_le_bytes().iter().enumerate() {
            dev.mmio_write8(0x048 + i as u32, *b);
        }

        dev.mmio_write8(0x048 + index, val);

        for (i, b) in initial.to_le_bytes().iter().enumerate() {
            let expected = if i as u32 == index { val } else { *b };
            prop_assert_eq!(dev.mmio_read8(0x048 + i as u32), expected);
        }
    }
}

#[test]
fn wide_accesses_decompose_in_increasing_address_order() {
    let mut dev = device();
    dev.mmio_write32(0x060, 0xDDCC_BBAA);
    assert_eq!(dev.mmio_read8(0x060), 0xAA);
    assert_eq!(dev.mmio_read8(0x063), 0xDD);
    assert_eq!(dev.mmio_read16(0x062), 0xDDCC);
    assert_eq!(dev.mmio_read32(0x060), 0xDDCC_BBAA);
}

#[test]
fn dword_trigger_write_fires_exactly_once() {
    let mut dev = device();

    // Rectangle fill, 1x1 at (0,0), pitch 1.
    dev.mmio_write16(0x054, 0);
    dev.mmio_write16(0x056, 0);
    dev.mmio_write16(0x058, 1);
    dev.mmio_write16(0x05A, 1);
    dev.mmio_write16(0x05C, 1);
    dev.mmio_write32(0x060, 0x77);

    // Writing the three low control bytes must not start anything.
    dev.mmio_write8(0x040, 0x01);
    dev.mmio_write8(0x041, 0x00);
    dev.mmio_write8(0x042, 0x00);
    assert_eq!(dev.vram()[0], 0x00, "no trigger before the last byte");

    // The high byte carries the start bit: one fill, then completion clears
    // busy and the start bit together.
    dev.mmio_write8(0x043, 0x80);
    assert_eq!(dev.vram()[0], 0x77);
    assert_eq!(dev.draw2d_state(), EngineState::Idle);
    assert_eq!(dev.mmio_read8(0x043) & 0x80, 0, "start bit self-clears");

    // The same trigger as one atomic dword write also fires exactly once.
    dev.vram_mut()[0] = 0;
    dev.mmio_write32(0x060, 0x99);
    dev.mmio_write32(0x040, 0x8000_0001);
    assert_eq!(dev.vram()[0], 0x99);
    assert_eq!(dev.mmio_read32(0x040) & 0x8000_0000, 0);
}

#[test]
fn unclaimed_offsets_fall_back_to_flat_bytes_without_side_effects() {
    let mut dev = device();

    // 0x044/0x045 sit inside the 2D bank's range but belong to no field.
    dev.mmio_write8(0x044, 0xA1);
    assert_eq!(dev.mmio_read8(0x044), 0xA1);

    // Far outside any bank.
    dev.mmio_write8(0x7123, 0x5C);
    assert_eq!(dev.mmio_read8(0x7123), 0x5C);
    assert!(!dev.take_recalc_timings());
}

#[test]
fn setup_writes_request_timing_recalc() {
    let mut dev = device();
    assert!(!dev.take_recalc_timings());
    dev.mmio_write8(0x005, 0x42);
    assert!(dev.take_recalc_timings());
    assert!(!dev.take_recalc_timings(), "request is consumed");
    assert_eq!(dev.mmio_read8(0x005), 0x42);
}

#[test]
fn overlay_control_writes_request_timing_recalc() {
    let mut dev = device();
    dev.mmio_write8(0x080, 0x01);
    assert!(dev.take_recalc_timings());
    dev.mmio_write8(0x084, 0x10);
    assert!(!dev.take_recalc_timings(), "scale registers do not");
}

#[test]
fn tile_bank_stores_raw_bytes() {
    let mut dev = device();
    dev.mmio_write8(0x234, 0x9D);
    assert_eq!(dev.mmio_read8(0x234), 0x9D);
}

#[test]
fn mmio_window_wraps_at_64k() {
    let mut dev = device();
    dev.mmio_write8(0x1_0044, 0x3E);
    assert_eq!(dev.mmio_read8(0x0044), 0x3E);
}
