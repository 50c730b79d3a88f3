//! SST-96 companion 3D chip device model.
//!
//! The SST-96 has no PCI presence of its own: it sits behind the primary 2D
//! chip and is reached exclusively through the shared PUMA address space,
//! either via a memory aperture owned by the primary chip or via the THP
//! indirect address/data register pair. This crate models that register-level
//! view:
//! - the PUMA address-space router (framebuffer / register / texture regions),
//! - the 256-entry register file with its write side effects,
//! - the CmdFifo ring living inside the shared framebuffer, which replays
//!   deferred register writes,
//! - the vsync-paced buffer-swap scheduler, and
//! - the fastfill / chroma-key / stipple primitives the pixel pipeline builds
//!   on.
//!
//! The actual triangle rasterizer is an external collaborator: the model
//! captures a complete parameter block per triangle command and hands it off,
//! it never walks spans itself.
#![forbid(unsafe_code)]

mod cmdfifo;
mod device;
mod fill;
mod puma;

pub mod reg;

pub use cmdfifo::CmdFifoError;
pub use device::{NullPresentSink, PresentSink, PumaMode, RenderState, Sst96, TriangleParams};
