//! VMI+ port register banks.
//!
//! The host-port and video-port banks are identical four-register latches
//! with no side effects; external video plumbing is out of scope, so the
//! model stores and returns bytes verbatim. Offsets here are relative to the
//! bank base (0x500 for the host port, 0x600 for the video port).

use crate::regs::register_bank;

register_bank! {
    pub(crate) struct VmiPort {
        0x0 => control: u32,
        0x4 => status: u32,
        0x8 => address: u32,
        0xC => data: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latches_bytes_verbatim() {
        let mut port = VmiPort::default();
        assert!(port.write_byte(0x0, 0x12));
        assert!(port.write_byte(0x9, 0x34));
        assert_eq!(port.control, 0x12);
        assert_eq!(port.address, 0x3400);
        assert_eq!(port.read_byte(0x9), Some(0x34));
        assert_eq!(port.read_byte(0x10), None);
    }
}
