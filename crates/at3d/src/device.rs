use memory::MemoryBus;
use sst96::{PumaMode, Sst96};

use crate::cursor::CursorRegs;
use crate::draw2d::{BankWrite, Draw2d, EngineState};
use crate::overlay::{Overlay, OverlayWrite};
use crate::pci::{MemoryMapper, PciConfig};
use crate::regs::FieldBytes;
use crate::thp::{Thp, ThpWrite};
use crate::tri3d::{TriangleSetup, TriangleSetupJob};
use crate::vmi::VmiPort;

const MMIO_WINDOW_SIZE: usize = 0x1_0000;

/// Construction-time configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct At3dConfig {
    /// VRAM size in MiB; must be 1, 2 or 4.
    pub vram_size_mb: u32,
    /// Companion 3D chip, when the board carries one.
    pub companion: Option<PumaMode>,
}

impl Default for At3dConfig {
    fn default() -> Self {
        Self {
            vram_size_mb: 2,
            companion: None,
        }
    }
}

/// AT3D device model. See the crate docs for the component map.
pub struct At3d {
    pci: PciConfig,

    vram: Vec<u8>,
    vram_mask: u32,

    /// Extended setup registers; any write requests a timing recalc.
    setup: [u8; 0x20],
    /// Video tile buffer bytes.
    tile: [u8; 0x100],
    /// Fallback storage for MMIO offsets no bank claims.
    fallback: Vec<u8>,

    draw2d: Draw2d,
    tri3d: TriangleSetup,
    overlay: Overlay,
    cursor: CursorRegs,
    thp: Thp,
    vmi_host: VmiPort,
    vmi_video: VmiPort,

    companion: Option<Sst96>,
    /// Bridge enable latched from the THP control trigger byte; starts up
    /// enabled whenever a companion chip is configured.
    bridge_enabled: bool,

    recalc_timings: bool,
    last_triangle_job: Option<TriangleSetupJob>,
}

impl At3d {
    pub fn new(config: At3dConfig) -> Self {
        assert!(
            matches!(config.vram_size_mb, 1 | 2 | 4),
            "unsupported VRAM size {} MiB",
            config.vram_size_mb
        );
        let vram_size = config.vram_size_mb << 20;
        let companion = config.companion.map(Sst96::new);

        Self {
            pci: PciConfig::new(
                vram_size,
                config.companion.map(PumaMode::aperture_size),
            ),
            vram: vec![0; vram_size as usize],
            vram_mask: vram_size - 1,
            setup: [0; 0x20],
            tile: [0; 0x100],
            fallback: vec![0; MMIO_WINDOW_SIZE],
            draw2d: Draw2d::default(),
            tri3d: TriangleSetup::default(),
            overlay: Overlay::default(),
            cursor: CursorRegs::default(),
            thp: Thp::default(),
            vmi_host: VmiPort::default(),
            vmi_video: VmiPort::default(),
            bridge_enabled: companion.is_some(),
            companion,
            recalc_timings: false,
            last_triangle_job: None,
        }
    }

    /// Device reset: zero every register bank and restore PCI and companion
    /// power-on defaults. VRAM contents survive, as on real hardware.
    pub fn reset(&mut self, mapper: &mut dyn MemoryMapper) {
        self.pci.reset(mapper);
        self.setup = [0; 0x20];
        self.tile = [0; 0x100];
        self.fallback.fill(0);
        self.draw2d = Draw2d::default();
        self.tri3d = TriangleSetup::default();
        self.overlay = Overlay::default();
        self.cursor = CursorRegs::default();
        self.thp = Thp::default();
        self.vmi_host = VmiPort::default();
        self.vmi_video = VmiPort::default();
        self.last_triangle_job = None;
        if let Some(companion) = self.companion.as_mut() {
            companion.reset();
        }
        self.recalc_timings = true;
        tracing::debug!(target: "at3d", "device reset");
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut [u8] {
        &mut self.vram
    }

    pub fn vram_mask(&self) -> u32 {
        self.vram_mask
    }

    pub fn companion(&self) -> Option<&Sst96> {
        self.companion.as_ref()
    }

    pub fn companion_mut(&mut self) -> Option<&mut Sst96> {
        self.companion.as_mut()
    }

    pub fn bridge_enabled(&self) -> bool {
        self.bridge_enabled
    }

    pub fn draw2d_state(&self) -> EngineState {
        self.draw2d.state
    }

    pub fn tri3d_state(&self) -> EngineState {
        self.tri3d.state
    }

    pub(crate) fn cursor_regs(&self) -> &CursorRegs {
        &self.cursor
    }

    /// Returns and clears the pending timing-recalculation request. The CRTC
    /// collaborator polls this after register traffic.
    pub fn take_recalc_timings(&mut self) -> bool {
        core::mem::take(&mut self.recalc_timings)
    }

    /// Returns the most recent triangle-setup parameter block, handing it to
    /// the rasterizer collaborator.
    pub fn take_triangle_job(&mut self) -> Option<TriangleSetupJob> {
        self.last_triangle_job.take()
    }

    /// Frame tick from the scanout collaborator: drives the companion chip's
    /// swap scheduler.
    pub fn vsync(&mut self) {
        if self.bridge_enabled {
            if let Some(companion) = self.companion.as_mut() {
                companion.vsync();
            }
        }
    }

    // --- PCI configuration space -----------------------------------------

    pub fn pci_read(&self, addr: u8) -> u8 {
        self.pci.read(addr)
    }

    pub fn pci_write(&mut self, addr: u8, val: u8, mapper: &mut dyn MemoryMapper) {
        self.pci.write(addr, val, mapper);
    }

    // --- Linear (framebuffer) aperture -----------------------------------

    pub fn linear_read8(&self, addr: u32) -> u8 {
        self.vram[(addr & self.vram_mask) as usize]
    }

    pub fn linear_write8(&mut self, addr: u32, val: u8) {
        self.vram[(addr & self.vram_mask) as usize] = val;
    }

    pub fn linear_read16(&self, addr: u32) -> u16 {
        u16::from_le_bytes([self.linear_read8(addr), self.linear_read8(addr.wrapping_add(1))])
    }

    pub fn linear_write16(&mut self, addr: u32, val: u16) {
        let bytes = val.to_le_bytes();
        self.linear_write8(addr, bytes[0]);
        self.linear_write8(addr.wrapping_add(1), bytes[1]);
    }

    pub fn linear_read32(&self, addr: u32) -> u32 {
        let mut bytes = [0u8; 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.linear_read8(addr.wrapping_add(i as u32));
        }
        u32::from_le_bytes(bytes)
    }

    pub fn linear_write32(&mut self, addr: u32, val: u32) {
        for (i, b) in val.to_le_bytes().iter().enumerate() {
            self.linear_write8(addr.wrapping_add(i as u32), *b);
        }
    }

    // --- Companion (PUMA) aperture ---------------------------------------

    pub fn puma_read32(&mut self, addr: u32) -> u32 {
        match self.companion.as_ref() {
            Some(companion) if self.bridge_enabled => companion.puma_read(addr),
            Some(_) => {
                tracing::debug!(target: "at3d::thp", addr, "PUMA read while bridge disabled");
                0
            }
            None => {
                tracing::debug!(target: "at3d::thp", addr, "PUMA read without companion chip");
                0
            }
        }
    }

    pub fn puma_write32(&mut self, addr: u32, val: u32) {
        match self.companion.as_mut() {
            Some(companion) if self.bridge_enabled => companion.puma_write(addr, val),
            Some(_) => {
                tracing::debug!(target: "at3d::thp", addr, "PUMA write while bridge disabled");
            }
            None => {
                tracing::debug!(target: "at3d::thp", addr, "PUMA write without companion chip");
            }
        }
    }

    // --- MMIO window ------------------------------------------------------

    pub fn mmio_read8(&mut self, addr: u32) -> u8 {
        let offset = addr & 0xFFFF;
        let ret = match offset {
            0x000..=0x01F => self.setup[offset as usize],
            0x030..=0x06F => self
                .draw2d
                .read_byte(offset)
                .unwrap_or(self.fallback[offset as usize]),
            0x080..=0x09F => self
                .overlay
                .read_byte(offset)
                .unwrap_or(self.fallback[offset as usize]),
            0x140..=0x15F => self
                .cursor
                .read_byte(offset)
                .unwrap_or(self.fallback[offset as usize]),
            0x200..=0x2FF => self.tile[(offset - 0x200) as usize],
            0x300..=0x3FF => self
                .tri3d
                .read_byte(offset)
                .unwrap_or(self.fallback[offset as usize]),
            0x400..=0x4FF => self.thp_read_byte(offset),
            0x500..=0x5FF => self
                .vmi_host
                .read_byte(offset - 0x500)
                .unwrap_or(self.fallback[offset as usize]),
            0x600..=0x6FF => self
                .vmi_video
                .read_byte(offset - 0x600)
                .unwrap_or(self.fallback[offset as usize]),
            _ => self.fallback[offset as usize],
        };
        tracing::trace!(target: "at3d::mmio", offset = format_args!("{offset:04x}"), ret = format_args!("{ret:02x}"), "read");
        ret
    }

    pub fn mmio_write8(&mut self, addr: u32, val: u8) {
        let offset = addr & 0xFFFF;
        tracing::trace!(target: "at3d::mmio", offset = format_args!("{offset:04x}"), val = format_args!("{val:02x}"), "write");
        match offset {
            0x000..=0x01F => {
                self.setup[offset as usize] = val;
                self.recalc_timings = true;
            }
            0x030..=0x06F => match self.draw2d.write_byte(offset, val) {
                BankWrite::Kick => self.draw2d.execute(&mut self.vram, self.vram_mask),
                BankWrite::Stored => {}
                BankWrite::Unclaimed => self.fallback[offset as usize] = val,
            },
            0x080..=0x09F => match self.overlay.write_byte(offset, val) {
                OverlayWrite::StoredRecalc => self.recalc_timings = true,
                OverlayWrite::Stored => {}
                OverlayWrite::Unclaimed => self.fallback[offset as usize] = val,
            },
            0x140..=0x15F => {
                if !self.cursor.write_byte(offset, val) {
                    self.fallback[offset as usize] = val;
                }
            }
            0x200..=0x2FF => self.tile[(offset - 0x200) as usize] = val,
            0x300..=0x3FF => match self.tri3d.write_byte(offset, val) {
                BankWrite::Kick => {
                    self.last_triangle_job = Some(self.tri3d.execute());
                }
                BankWrite::Stored => {}
                BankWrite::Unclaimed => self.fallback[offset as usize] = val,
            },
            0x400..=0x4FF => match self.thp.write_byte(offset, val) {
                ThpWrite::EnableUpdate(enable) => self.update_bridge_enable(enable),
                ThpWrite::CommitData => self.commit_thp_data(),
                ThpWrite::Stored => {}
                ThpWrite::Unclaimed => self.fallback[offset as usize] = val,
            },
            0x500..=0x5FF => {
                if !self.vmi_host.write_byte(offset - 0x500, val) {
                    self.fallback[offset as usize] = val;
                }
            }
            0x600..=0x6FF => {
                if !self.vmi_video.write_byte(offset - 0x600, val) {
                    self.fallback[offset as usize] = val;
                }
            }
            _ => self.fallback[offset as usize] = val,
        }
    }

    /// Wide bus cycles decompose into byte accesses in increasing address
    /// order, so trigger fields fire exactly once, on the last byte.
    pub fn mmio_read16(&mut self, addr: u32) -> u16 {
        u16::from(self.mmio_read8(addr))
            | (u16::from(self.mmio_read8(addr.wrapping_add(1))) << 8)
    }

    pub fn mmio_read32(&mut self, addr: u32) -> u32 {
        u32::from(self.mmio_read8(addr))
            | (u32::from(self.mmio_read8(addr.wrapping_add(1))) << 8)
            | (u32::from(self.mmio_read8(addr.wrapping_add(2))) << 16)
            | (u32::from(self.mmio_read8(addr.wrapping_add(3))) << 24)
    }

    pub fn mmio_write16(&mut self, addr: u32, val: u16) {
        self.mmio_write8(addr, val as u8);
        self.mmio_write8(addr.wrapping_add(1), (val >> 8) as u8);
    }

    pub fn mmio_write32(&mut self, addr: u32, val: u32) {
        self.mmio_write8(addr, val as u8);
        self.mmio_write8(addr.wrapping_add(1), (val >> 8) as u8);
        self.mmio_write8(addr.wrapping_add(2), (val >> 16) as u8);
        self.mmio_write8(addr.wrapping_add(3), (val >> 24) as u8);
    }

    // --- THP bridge -------------------------------------------------------

    fn thp_read_byte(&mut self, offset: u32) -> u8 {
        // Data register reads perform the indirect PUMA access and stage the
        // result; everything else returns stored bytes.
        if (0x40C..=0x40F).contains(&offset) {
            if self.bridge_enabled {
                if let Some(companion) = self.companion.as_mut() {
                    let address = self.thp.regs.address;
                    self.thp.regs.data = companion.thp_read(address);
                }
            }
            return self.thp.regs.data.get_byte(offset - 0x40C);
        }
        self.thp
            .read_byte(offset)
            .unwrap_or(self.fallback[offset as usize])
    }

    fn update_bridge_enable(&mut self, enable: bool) {
        match self.companion.as_mut() {
            Some(companion) => {
                self.bridge_enabled = enable;
                companion.set_enabled(enable);
                tracing::debug!(target: "at3d::thp", enable, "companion bridge toggled");
            }
            None if enable => {
                tracing::debug!(
                    target: "at3d::thp",
                    "bridge enable requested but no companion chip is configured"
                );
            }
            None => {}
        }
    }

    fn commit_thp_data(&mut self) {
        let address = self.thp.regs.address;
        let data = self.thp.regs.data;
        match self.companion.as_mut() {
            Some(companion) if self.bridge_enabled => companion.thp_write(address, data),
            Some(_) => {
                tracing::debug!(target: "at3d::thp", address, "THP write while bridge disabled");
            }
            None => {
                tracing::debug!(target: "at3d::thp", address, "THP write without companion chip");
            }
        }
    }
}

/// Bus-facing view of the linear aperture: raw video memory, address-masked.
impl MemoryBus for At3d {
    fn read_physical(&mut self, paddr: u32, buf: &mut [u8]) {
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.linear_read8(paddr.wrapping_add(i as u32));
        }
    }

    fn write_physical(&mut self, paddr: u32, buf: &[u8]) {
        for (i, b) in buf.iter().enumerate() {
            self.linear_write8(paddr.wrapping_add(i as u32), *b);
        }
    }
}
