//! AT3D-class PCI 2D/3D graphics accelerator device model.
//!
//! This crate models the register/command state machine of the primary chip:
//! - the PCI configuration space with byte-granular BAR programming and the
//!   aperture (linear framebuffer / MMIO / companion / expansion ROM) enable
//!   rules,
//! - the 64 KiB MMIO window decoded into register banks with byte-partial
//!   field access and trigger-on-last-byte command semantics,
//! - the 2D draw engine and 3D triangle-setup engine state machines, and
//! - the THP bridge through which the optional companion 3D chip (the
//!   [`sst96`] crate) is reached.
//!
//! The CRTC/scanout timing engine, I2C/DDC plumbing and the host display path
//! are external collaborators: this crate latches a timing-recalculation
//! request for them, exposes cursor state and a per-scanline cursor
//! compositor, and forwards the vsync tick.
#![forbid(unsafe_code)]

mod cursor;
mod device;
mod draw2d;
mod overlay;
mod pci;
mod regs;
mod thp;
mod tri3d;
mod vmi;

pub use cursor::CursorState;
pub use device::{At3d, At3dConfig};
pub use draw2d::EngineState;
pub use pci::{Aperture, MemoryMapper, PciCommand};
pub use tri3d::TriangleSetupJob;
