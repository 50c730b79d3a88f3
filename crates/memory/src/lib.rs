//! Guest physical memory access for the AT3D device model.
//!
//! Legacy PCI graphics hardware decodes a 32-bit physical address space, so
//! unlike a full-system memory bus this crate works in `u32` addresses
//! throughout. Devices decompose wide bus cycles into byte accesses in
//! increasing address order; the helpers here mirror that little-endian
//! contract.

mod bus;
mod ram;

pub use bus::MemoryBus;
pub use ram::Bus;
