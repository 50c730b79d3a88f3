//! CmdFifo: a ring of deferred register-write packets inside the shared
//! framebuffer.
//!
//! The ring spans `[bottom_page << 12, top_page << 12)` and is consumed in
//! 8-byte slots. Two packet kinds exist:
//! - non-grouped: one address word (register index in bits [22:2]) plus one
//!   data word;
//! - grouped (address word bit 31 set): the address word carries a base
//!   register index, the second word is a 32-bit mask, and one data word
//!   follows per set mask bit (ascending), targeting `base + bit`.
//!
//! A fully-zero slot pair is a no-op. Malformed packets are dropped with a
//! diagnostic; a computed address outside the ring aborts the current drain
//! call. The ring never stalls guest-visibly: the next trigger retries.

use thiserror::Error;

use crate::device::Sst96;
use crate::reg;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CmdFifoError {
    #[error("write outside ring bounds: addr={addr:#010x} ring=[{bottom:#010x},{top:#010x})")]
    WriteOutOfBounds { addr: u32, bottom: u32, top: u32 },
    #[error("read pointer outside ring bounds: addr={addr:#010x}")]
    ReadPtrOutOfBounds { addr: u32 },
    #[error("grouped packet with empty mask")]
    EmptyGroupMask,
    #[error("register index {reg} out of range")]
    RegisterOutOfRange { reg: u32 },
    #[error("misaligned ring write at offset {offset:#x}")]
    MisalignedWrite { offset: u32 },
}

impl Sst96 {
    /// Store one word into the ring. The second word of each 8-byte-aligned
    /// pair raises the fill level and triggers a drain.
    pub(crate) fn cmdfifo_write(&mut self, addr: u32, val: u32) {
        if !self.cmdfifo.enabled {
            return;
        }

        let bottom = self.cmdfifo.bottom();
        let top = self.cmdfifo.top();
        if addr < bottom || addr >= top {
            log_dropped(CmdFifoError::WriteOutOfBounds { addr, bottom, top });
            return;
        }

        let offset = addr - bottom;
        match offset & 7 {
            0 => self.fb_store_u32(addr, val),
            4 => {
                self.fb_store_u32(addr, val);
                self.cmdfifo.entry_count += 1;
                self.process_cmdfifo();
            }
            _ => log_dropped(CmdFifoError::MisalignedWrite { offset }),
        }
    }

    /// Drain pending ring slots: up to `threshold` packets per call, or
    /// everything pending when the threshold is zero.
    pub fn process_cmdfifo(&mut self) {
        if !self.cmdfifo.enabled || self.cmdfifo.entry_count == 0 {
            return;
        }

        let bottom = self.cmdfifo.bottom();
        let top = self.cmdfifo.top();
        if top <= bottom {
            tracing::warn!(
                target: "sst96::cmdfifo",
                bottom = format_args!("{bottom:#x}"),
                top = format_args!("{top:#x}"),
                "degenerate ring geometry; drain skipped"
            );
            return;
        }
        let ring_bytes = top - bottom;
        let slots = ring_bytes / 8;

        let max_process = if self.cmdfifo.threshold != 0 {
            self.cmdfifo.threshold
        } else {
            self.cmdfifo.entry_count
        };

        let mut processed = 0;
        'drain: while self.cmdfifo.entry_count > 0 && processed < max_process {
            let read_addr = bottom + (self.cmdfifo.read_ptr.wrapping_mul(8)) % ring_bytes;
            if read_addr + 8 > top {
                log_dropped(CmdFifoError::ReadPtrOutOfBounds { addr: read_addr });
                break;
            }

            let addr_word = self.fb_load_u32(read_addr);
            let data_word = self.fb_load_u32(read_addr + 4);

            if addr_word == 0 && data_word == 0 {
                // No-op slot pair.
                self.cmdfifo.read_ptr = (self.cmdfifo.read_ptr + 2) % slots;
                self.cmdfifo.entry_count -= 1;
                processed += 1;
                continue;
            }

            if addr_word & 0x8000_0000 != 0 {
                // Grouped packet: base register index + mask, then one data
                // word per set bit.
                let base = (addr_word >> 2) & 0x1F_FFFF;
                let mask = data_word;
                let num_writes = mask.count_ones();
                if num_writes == 0 {
                    log_dropped(CmdFifoError::EmptyGroupMask);
                    self.cmdfifo.read_ptr = (self.cmdfifo.read_ptr + 2) % slots;
                    self.cmdfifo.entry_count -= 1;
                    processed += 1;
                    continue;
                }

                let mut word_addr = read_addr + 8;
                for bit in 0..32 {
                    if mask & (1 << bit) == 0 {
                        continue;
                    }
                    if word_addr < bottom || word_addr + 4 > top {
                        log_dropped(CmdFifoError::ReadPtrOutOfBounds { addr: word_addr });
                        break 'drain;
                    }
                    let value = self.fb_load_u32(word_addr);
                    word_addr += 4;
                    self.cmdfifo_reg_write(base + bit, value);
                }

                self.cmdfifo.read_ptr = (self.cmdfifo.read_ptr + 1 + num_writes) % slots;
            } else {
                let reg = (addr_word >> 2) & 0x1F_FFFF;
                self.cmdfifo_reg_write(reg, data_word);
                self.cmdfifo.read_ptr = (self.cmdfifo.read_ptr + 2) % slots;
            }

            self.cmdfifo.entry_count -= 1;
            processed += 1;
        }

        if self.cmdfifo.entry_count < self.cmdfifo.threshold {
            self.status &= !reg::STATUS_CMDFIFO_THRESHOLD;
        }
    }

    fn cmdfifo_reg_write(&mut self, reg: u32, val: u32) {
        if reg >= 256 {
            log_dropped(CmdFifoError::RegisterOutOfRange { reg });
            return;
        }
        self.reg_write(reg, val);
    }
}

fn log_dropped(err: CmdFifoError) {
    tracing::warn!(target: "sst96::cmdfifo", %err, "packet dropped");
}
