/// Abstraction for 32-bit guest physical memory access.
///
/// Reads are defined as `&mut self`: a "memory" access may be backed by MMIO
/// with read side effects (the AT3D THP data register is one such case).
pub trait MemoryBus {
    fn read_physical(&mut self, paddr: u32, buf: &mut [u8]);
    fn write_physical(&mut self, paddr: u32, buf: &[u8]);

    fn read_u8(&mut self, paddr: u32) -> u8 {
        let mut buf = [0u8; 1];
        self.read_physical(paddr, &mut buf);
        buf[0]
    }

    fn read_u16(&mut self, paddr: u32) -> u16 {
        let mut buf = [0u8; 2];
        self.read_physical(paddr, &mut buf);
        u16::from_le_bytes(buf)
    }

    fn read_u32(&mut self, paddr: u32) -> u32 {
        let mut buf = [0u8; 4];
        self.read_physical(paddr, &mut buf);
        u32::from_le_bytes(buf)
    }

    fn write_u8(&mut self, paddr: u32, val: u8) {
        self.write_physical(paddr, &[val]);
    }

    fn write_u16(&mut self, paddr: u32, val: u16) {
        self.write_physical(paddr, &val.to_le_bytes());
    }

    fn write_u32(&mut self, paddr: u32, val: u32) {
        self.write_physical(paddr, &val.to_le_bytes());
    }
}
