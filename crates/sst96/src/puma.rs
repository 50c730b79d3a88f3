//! PUMA address-space routing.
//!
//! Every access from the primary chip (direct aperture or THP-indirect)
//! lands here and is classified into one of three regions: the shared
//! framebuffer (which may contain the CmdFifo ring), the register window
//! (one register per 4 KiB page), or texture memory. Anything else is an
//! invalid address: reads return 0, writes are dropped, both with a
//! diagnostic.

use crate::device::{sign_extend_24, Sst96};
use crate::reg;

impl Sst96 {
    /// Direct PUMA read at a 32-bit address.
    pub fn puma_read(&self, addr: u32) -> u32 {
        if !self.enabled {
            tracing::debug!(target: "sst96::puma", addr, "read while chip disabled");
            return 0;
        }

        let mode = self.mode;
        if addr < mode.fb_size() {
            return self.fb_load_u32(addr);
        }

        let reg_start = mode.reg_start();
        if addr >= reg_start && addr < reg_start + mode.reg_size() {
            let reg = ((addr - reg_start) >> 12) & 0xFF;
            let val = self.reg_read(reg);
            if (reg::SIGN_EXTEND_FIRST..=reg::SIGN_EXTEND_LAST).contains(&reg) {
                return sign_extend_24(val) as u32;
            }
            return val;
        }

        let tex_start = mode.tex_start();
        if addr >= tex_start && addr < tex_start + mode.tex_size() {
            return self.tex_load_u32(addr - tex_start);
        }

        tracing::warn!(target: "sst96::puma", addr = format_args!("{addr:08x}"), "read from invalid address");
        0
    }

    /// Direct PUMA write at a 32-bit address.
    pub fn puma_write(&mut self, addr: u32, val: u32) {
        if !self.enabled {
            tracing::debug!(target: "sst96::puma", addr, "write while chip disabled");
            return;
        }

        let mode = self.mode;
        if addr < mode.fb_size() {
            // Writes into the configured CmdFifo window feed the packet
            // processor instead of plain memory.
            if self.cmdfifo.enabled
                && addr >= self.cmdfifo.bottom()
                && addr < self.cmdfifo.top()
            {
                self.cmdfifo_write(addr, val);
                return;
            }
            self.fb_store_u32(addr, val);
            return;
        }

        let reg_start = mode.reg_start();
        if addr >= reg_start && addr < reg_start + mode.reg_size() {
            let reg = ((addr - reg_start) >> 12) & 0xFF;
            self.reg_write(reg, val);
            return;
        }

        let tex_start = mode.tex_start();
        if addr >= tex_start && addr < tex_start + mode.tex_size() {
            self.tex_store_u32(addr - tex_start, val);
            return;
        }

        tracing::warn!(
            target: "sst96::puma",
            addr = format_args!("{addr:08x}"),
            val = format_args!("{val:08x}"),
            "write to invalid address dropped"
        );
    }

    /// THP-indirect write from the primary chip. Framebuffer traffic latches
    /// the request side of the bridge handshake.
    pub fn thp_write(&mut self, addr: u32, val: u32) {
        if !self.enabled {
            tracing::debug!(target: "sst96::puma", addr, "THP write while chip disabled");
            return;
        }
        self.puma_write(addr, val);
        if addr < self.mode.fb_size() {
            self.latch_puma_req();
        }
    }

    /// THP-indirect read from the primary chip. Framebuffer traffic latches
    /// the grant side of the bridge handshake.
    pub fn thp_read(&mut self, addr: u32) -> u32 {
        if !self.enabled {
            tracing::debug!(target: "sst96::puma", addr, "THP read while chip disabled");
            return 0;
        }
        let ret = self.puma_read(addr);
        if addr < self.mode.fb_size() {
            self.latch_puma_gnt();
        }
        ret
    }

    pub(crate) fn fb_load_u32(&self, addr: u32) -> u32 {
        let i = (addr & self.fb_mask & !3) as usize;
        u32::from_le_bytes(self.fb[i..i + 4].try_into().unwrap())
    }

    pub(crate) fn fb_store_u32(&mut self, addr: u32, val: u32) {
        let i = (addr & self.fb_mask & !3) as usize;
        self.fb[i..i + 4].copy_from_slice(&val.to_le_bytes());
    }

    pub(crate) fn fb_load_u16(&self, addr: u32) -> u16 {
        let i = (addr & self.fb_mask & !1) as usize;
        u16::from_le_bytes(self.fb[i..i + 2].try_into().unwrap())
    }

    pub(crate) fn fb_store_u16(&mut self, addr: u32, val: u16) {
        let i = (addr & self.fb_mask & !1) as usize;
        self.fb[i..i + 2].copy_from_slice(&val.to_le_bytes());
    }

    fn tex_load_u32(&self, offset: u32) -> u32 {
        let i = (offset & !3) as usize;
        match self.tex.get(i..i + 4) {
            Some(bytes) => u32::from_le_bytes(bytes.try_into().unwrap()),
            None => 0,
        }
    }

    fn tex_store_u32(&mut self, offset: u32, val: u32) {
        let i = (offset & !3) as usize;
        if let Some(bytes) = self.tex.get_mut(i..i + 4) {
            bytes.copy_from_slice(&val.to_le_bytes());
        }
    }
}
