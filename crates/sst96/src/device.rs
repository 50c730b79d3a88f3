use crate::reg;

/// PUMA address-space geometry. The board straps the chip for either a 4 MiB
/// or an 8 MiB window; the region split scales with it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PumaMode {
    FourMb,
    EightMb,
}

impl PumaMode {
    pub fn fb_size(self) -> u32 {
        match self {
            Self::FourMb => 0x20_0000,
            Self::EightMb => 0x40_0000,
        }
    }

    pub fn reg_start(self) -> u32 {
        self.fb_size()
    }

    pub fn reg_size(self) -> u32 {
        match self {
            Self::FourMb => 0x10_0000,
            Self::EightMb => 0x20_0000,
        }
    }

    pub fn tex_start(self) -> u32 {
        self.reg_start() + self.reg_size()
    }

    pub fn tex_size(self) -> u32 {
        match self {
            Self::FourMb => 0x10_0000,
            Self::EightMb => 0x20_0000,
        }
    }

    /// Total PUMA span (framebuffer + registers + texture).
    pub fn aperture_size(self) -> u32 {
        self.tex_start() + self.tex_size()
    }
}

/// Triangle setup parameters, captured incrementally from register writes and
/// handed off as a block when a triangle command lands.
///
/// Values are stored post-conversion (vertices sign-extended from 16 bits,
/// color terms from 24 bits) so the rasterizer collaborator sees the same
/// numeric domain the register file defines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriangleParams {
    pub vertex_ax: i32,
    pub vertex_ay: i32,
    pub vertex_bx: i32,
    pub vertex_by: i32,
    pub vertex_cx: i32,
    pub vertex_cy: i32,
    pub start_r: u32,
    pub start_g: u32,
    pub start_b: u32,
    pub start_a: u32,
    pub start_z: u32,
    pub d_r_dx: i32,
    pub d_g_dx: i32,
    pub d_b_dx: i32,
    pub d_a_dx: i32,
    pub d_z_dx: i32,
    pub d_r_dy: i32,
    pub d_g_dy: i32,
    pub d_b_dy: i32,
    pub d_a_dy: i32,
    pub d_z_dy: i32,
    pub start_s: u32,
    pub start_t: u32,
    pub start_w: u32,
    pub d_s_dx: i32,
    pub d_t_dx: i32,
    pub d_w_dx: i32,
    pub d_s_dy: i32,
    pub d_t_dy: i32,
    pub d_w_dy: i32,
}

/// Raster-state snapshot consumed by the pixel-pipeline collaborator along
/// with a [`TriangleParams`] block. Mirrors the register file's masked views.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderState {
    pub fbz_color_path: u32,
    pub fog_mode: u32,
    pub alpha_mode: u32,
    pub fbz_mode: u32,
    pub stipple: u32,
    pub color0: u32,
    pub color1: u32,
    pub fog_color: u32,
    pub za_color: u32,
    pub chroma_key: u32,
    pub chroma_range: u32,
    pub col_buffer_setup: u32,
    pub aux_buffer_setup: u32,
    pub clip_left_right: [u32; 2],
    pub clip_top_bottom: [u32; 2],
    pub texture_mode: u32,
    pub tlod: u32,
    pub tdetail: u32,
    pub tex_base_addr: [u32; 4],
}

/// Presentation collaborator notified when a deferred buffer swap finally
/// executes on a vsync tick.
pub trait PresentSink {
    fn swap_buffers(&mut self);
}

/// Sink that drops swap notifications (headless operation).
#[derive(Debug, Default)]
pub struct NullPresentSink;

impl PresentSink for NullPresentSink {
    fn swap_buffers(&mut self) {}
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CmdFifoState {
    pub enabled: bool,
    pub bottom_page: u32,
    pub top_page: u32,
    pub read_ptr: u32,
    pub entry_count: u32,
    pub threshold: u32,
}

impl CmdFifoState {
    pub fn bottom(&self) -> u32 {
        self.bottom_page << 12
    }

    pub fn top(&self) -> u32 {
        self.top_page << 12
    }
}

/// SST-96 companion chip state.
pub struct Sst96 {
    pub(crate) mode: PumaMode,
    pub(crate) enabled: bool,

    /// Shared PUMA framebuffer (also backs the CmdFifo ring).
    pub(crate) fb: Vec<u8>,
    pub(crate) fb_mask: u32,
    /// PUMA texture memory.
    pub(crate) tex: Vec<u8>,

    /// Raw backing store for all 256 registers; named fields below shadow the
    /// registers that carry masks or side effects.
    pub(crate) regs: [u32; 256],
    pub(crate) status: u32,
    fbijr_version: u32,
    fbijr_init: [u32; 6],

    pub(crate) cmdfifo: CmdFifoState,

    pub(crate) triangle: TriangleParams,

    // Rendering state consumed by the fastfill primitive and the (external)
    // pixel pipeline.
    pub(crate) fbz_color_path: u32,
    pub(crate) fog_mode: u32,
    pub(crate) alpha_mode: u32,
    pub(crate) fbz_mode: u32,
    pub(crate) stipple: u32,
    pub(crate) color0: u32,
    pub(crate) color1: u32,
    pub(crate) fog_color: u32,
    pub(crate) za_color: u32,
    pub(crate) chroma_key: u32,
    pub(crate) chroma_range: u32,
    pub(crate) col_buffer_setup: u32,
    pub(crate) aux_buffer_setup: u32,
    pub(crate) clip_left_right: [u32; 2],
    pub(crate) clip_top_bottom: [u32; 2],

    texture_mode: u32,
    tlod: u32,
    tdetail: u32,
    tex_base_addr: [u32; 4],

    pixels_in: u32,
    chroma_fail: u32,
    zfunc_fail: u32,
    afunc_fail: u32,
    pixels_out: u32,

    // Bridge handshake latches (request/grant), driven by THP traffic.
    puma_req: bool,
    puma_gnt: bool,

    // Swap scheduler.
    swap_req: bool,
    swap_pending: u32,
    present: Box<dyn PresentSink>,
}

impl Sst96 {
    const FBIJR_INIT_DEFAULTS: [u32; 4] = [0x0000_F201, 0x0180_0000, 0x0007_0D2D, 0x0018_0600];

    pub fn new(mode: PumaMode) -> Self {
        let fb_size = mode.fb_size();
        let tex_size = mode.tex_size();
        assert!(fb_size.is_power_of_two());

        let mut dev = Self {
            mode,
            enabled: true,
            fb: vec![0; fb_size as usize],
            fb_mask: fb_size - 1,
            tex: vec![0; tex_size as usize],
            regs: [0; 256],
            status: 0,
            fbijr_version: 0x0001_0201,
            fbijr_init: [0; 6],
            cmdfifo: CmdFifoState::default(),
            triangle: TriangleParams::default(),
            fbz_color_path: 0,
            fog_mode: 0,
            alpha_mode: 0,
            fbz_mode: 0,
            stipple: 0,
            color0: 0,
            color1: 0,
            fog_color: 0,
            za_color: 0,
            chroma_key: 0,
            chroma_range: 0,
            col_buffer_setup: 0,
            aux_buffer_setup: 0,
            clip_left_right: [0; 2],
            clip_top_bottom: [0; 2],
            texture_mode: 0,
            tlod: 0,
            tdetail: 0,
            tex_base_addr: [0; 4],
            pixels_in: 0,
            chroma_fail: 0,
            zfunc_fail: 0,
            afunc_fail: 0,
            pixels_out: 0,
            puma_req: false,
            puma_gnt: false,
            swap_req: false,
            swap_pending: 0,
            present: Box::new(NullPresentSink),
        };
        dev.load_init_defaults();
        dev
    }

    fn load_init_defaults(&mut self) {
        self.fbijr_init[..4].copy_from_slice(&Self::FBIJR_INIT_DEFAULTS);
        self.fbijr_init[4] = 0;
        self.fbijr_init[5] = 0;
    }

    pub fn reset(&mut self) {
        self.regs = [0; 256];
        self.triangle = TriangleParams::default();
        self.status = 0;
        self.cmdfifo = CmdFifoState::default();
        self.swap_pending = 0;
        self.swap_req = false;
        self.puma_req = false;
        self.puma_gnt = false;
        self.load_init_defaults();
        tracing::debug!(target: "sst96", "companion chip reset");
    }

    pub fn mode(&self) -> PumaMode {
        self.mode
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_present_sink(&mut self, sink: Box<dyn PresentSink>) {
        self.present = sink;
    }

    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn swap_req(&self) -> bool {
        self.swap_req
    }

    pub fn swap_pending(&self) -> u32 {
        self.swap_pending
    }

    pub fn puma_req(&self) -> bool {
        self.puma_req
    }

    pub fn puma_gnt(&self) -> bool {
        self.puma_gnt
    }

    pub(crate) fn latch_puma_req(&mut self) {
        self.puma_req = true;
    }

    pub(crate) fn latch_puma_gnt(&mut self) {
        self.puma_gnt = true;
    }

    pub fn cmdfifo_entry_count(&self) -> u32 {
        self.cmdfifo.entry_count
    }

    pub fn cmdfifo_read_ptr(&self) -> u32 {
        self.cmdfifo.read_ptr
    }

    /// Last-captured triangle parameter block (the hand-off point for the
    /// rasterizer collaborator).
    pub fn triangle_params(&self) -> &TriangleParams {
        &self.triangle
    }

    /// Current raster state for the pixel-pipeline collaborator.
    pub fn render_state(&self) -> RenderState {
        RenderState {
            fbz_color_path: self.fbz_color_path,
            fog_mode: self.fog_mode,
            alpha_mode: self.alpha_mode,
            fbz_mode: self.fbz_mode,
            stipple: self.stipple,
            color0: self.color0,
            color1: self.color1,
            fog_color: self.fog_color,
            za_color: self.za_color,
            chroma_key: self.chroma_key,
            chroma_range: self.chroma_range,
            col_buffer_setup: self.col_buffer_setup,
            aux_buffer_setup: self.aux_buffer_setup,
            clip_left_right: self.clip_left_right,
            clip_top_bottom: self.clip_top_bottom,
            texture_mode: self.texture_mode,
            tlod: self.tlod,
            tdetail: self.tdetail,
            tex_base_addr: self.tex_base_addr,
        }
    }

    pub fn framebuffer(&self) -> &[u8] {
        &self.fb
    }

    /// Vsync tick: pace down the pending-swap counter and execute the swap
    /// when it reaches zero with a request outstanding.
    pub fn vsync(&mut self) {
        if self.swap_pending > 0 && self.swap_req {
            self.swap_pending -= 1;
            if self.swap_pending == 0 {
                self.swap_req = false;
                self.present.swap_buffers();
                tracing::debug!(target: "sst96::swap", "buffer swap completed");
            }
        }
    }

    pub fn reg_read(&self, reg: u32) -> u32 {
        if reg >= 256 {
            return 0;
        }

        match reg {
            reg::STATUS => self.status,
            reg::FBIJR_VERSION => self.fbijr_version,
            reg::FBI_PIXELS_IN => self.pixels_in & 0xFF_FFFF,
            reg::FBI_CHROMA_FAIL => self.chroma_fail & 0xFF_FFFF,
            reg::FBI_ZFUNC_FAIL => self.zfunc_fail & 0xFF_FFFF,
            reg::FBI_AFUNC_FAIL => self.afunc_fail & 0xFF_FFFF,
            reg::FBI_PIXELS_OUT => self.pixels_out & 0xFF_FFFF,
            reg::FBIJR_INIT0..=reg::FBIJR_INIT5 => {
                self.fbijr_init[(reg - reg::FBIJR_INIT0) as usize]
            }
            reg::COL_BUFFER_SETUP => self.col_buffer_setup,
            reg::AUX_BUFFER_SETUP => self.aux_buffer_setup,
            reg::CLIP_LEFT_RIGHT0 => self.clip_left_right[0],
            reg::CLIP_TOP_BOTTOM0 => self.clip_top_bottom[0],
            reg::CLIP_LEFT_RIGHT1 => self.clip_left_right[1],
            reg::CLIP_TOP_BOTTOM1 => self.clip_top_bottom[1],
            _ => self.regs[reg as usize],
        }
    }

    pub fn reg_write(&mut self, reg: u32, val: u32) {
        if reg >= 256 {
            return;
        }
        self.regs[reg as usize] = val;

        match reg {
            reg::VERTEX_AX => self.triangle.vertex_ax = sign_extend_16(val),
            reg::VERTEX_AY => self.triangle.vertex_ay = sign_extend_16(val),
            reg::VERTEX_BX => self.triangle.vertex_bx = sign_extend_16(val),
            reg::VERTEX_BY => self.triangle.vertex_by = sign_extend_16(val),
            reg::VERTEX_CX => self.triangle.vertex_cx = sign_extend_16(val),
            reg::VERTEX_CY => self.triangle.vertex_cy = sign_extend_16(val),
            reg::START_R => self.triangle.start_r = val & 0xFF_FFFF,
            reg::START_G => self.triangle.start_g = val & 0xFF_FFFF,
            reg::START_B => self.triangle.start_b = val & 0xFF_FFFF,
            reg::START_A => self.triangle.start_a = val & 0xFF_FFFF,
            reg::START_Z => self.triangle.start_z = val,
            reg::START_S => self.triangle.start_s = val,
            reg::START_T => self.triangle.start_t = val,
            reg::START_W => self.triangle.start_w = val,
            reg::DRDX => self.triangle.d_r_dx = sign_extend_24(val),
            reg::DGDX => self.triangle.d_g_dx = sign_extend_24(val),
            reg::DBDX => self.triangle.d_b_dx = sign_extend_24(val),
            reg::DADX => self.triangle.d_a_dx = sign_extend_24(val),
            reg::DZDX => self.triangle.d_z_dx = val as i32,
            reg::DSDX => self.triangle.d_s_dx = val as i32,
            reg::DTDX => self.triangle.d_t_dx = val as i32,
            reg::DWDX => self.triangle.d_w_dx = val as i32,
            reg::DRDY => self.triangle.d_r_dy = sign_extend_24(val),
            reg::DGDY => self.triangle.d_g_dy = sign_extend_24(val),
            reg::DBDY => self.triangle.d_b_dy = sign_extend_24(val),
            reg::DADY => self.triangle.d_a_dy = sign_extend_24(val),
            reg::DZDY => self.triangle.d_z_dy = val as i32,
            reg::DSDY => self.triangle.d_s_dy = val as i32,
            reg::DTDY => self.triangle.d_t_dy = val as i32,
            reg::DWDY => self.triangle.d_w_dy = val as i32,
            reg::TRIANGLE_CMD => self.triangle_cmd(),
            reg::NOP_CMD => {
                tracing::trace!(target: "sst96", "nop command");
            }
            reg::FASTFILL_CMD => self.fastfill(),
            reg::SWAPBUFFER_CMD => {
                self.swap_req = true;
                if self.swap_pending > 0 {
                    self.swap_pending -= 1;
                }
                tracing::trace!(target: "sst96::swap", "swap buffer command");
            }
            reg::SWAPPEND_CMD => {
                self.swap_pending = (self.swap_pending + 1).min(7);
                tracing::trace!(
                    target: "sst96::swap",
                    pending = self.swap_pending,
                    "swap pending increment"
                );
            }
            reg::FBZ_COLOR_PATH => self.fbz_color_path = val & 0x0FFF_FFFF,
            reg::FOG_MODE => self.fog_mode = val & 0x3F,
            reg::ALPHA_MODE => self.alpha_mode = val,
            reg::FBZ_MODE => self.fbz_mode = val & 0xF_FFFF,
            reg::STIPPLE => self.stipple = val,
            reg::COLOR0 => self.color0 = val,
            reg::COLOR1 => self.color1 = val,
            reg::FOG_COLOR => self.fog_color = val & 0xFF_FFFF,
            reg::ZA_COLOR => self.za_color = val,
            reg::CHROMA_KEY => self.chroma_key = val & 0xFF_FFFF,
            reg::CHROMA_RANGE => self.chroma_range = val & 0x1FFF_FFFF,
            reg::COL_BUFFER_SETUP => self.col_buffer_setup = val,
            reg::AUX_BUFFER_SETUP => self.aux_buffer_setup = val & 0x7FFF_FFFF,
            reg::CLIP_LEFT_RIGHT0 => self.clip_left_right[0] = val,
            reg::CLIP_TOP_BOTTOM0 => self.clip_top_bottom[0] = val,
            reg::CLIP_LEFT_RIGHT1 => self.clip_left_right[1] = val,
            reg::CLIP_TOP_BOTTOM1 => self.clip_top_bottom[1] = val,
            reg::FBIJR_INIT0..=reg::FBIJR_INIT5 => {
                self.fbijr_init[(reg - reg::FBIJR_INIT0) as usize] = val;
                if reg == reg::FBIJR_INIT3 {
                    // Packed CmdFifo configuration.
                    self.cmdfifo.enabled = val & 0x01 != 0;
                    self.cmdfifo.bottom_page = (val >> 1) & 0x3FF;
                    self.cmdfifo.top_page = (val >> 11) & 0x3FF;
                    self.cmdfifo.threshold = (val >> 21) & 0x3FF;
                    tracing::debug!(
                        target: "sst96::cmdfifo",
                        enabled = self.cmdfifo.enabled,
                        bottom = self.cmdfifo.bottom_page,
                        top = self.cmdfifo.top_page,
                        threshold = self.cmdfifo.threshold,
                        "packed CmdFifo configuration"
                    );
                }
            }
            reg::TEXTURE_MODE => self.texture_mode = val & 0x7FFF_FFFF,
            reg::TLOD => self.tlod = val & 0x7FFF_FFFF,
            reg::TDETAIL => self.tdetail = val & 0xFFFF,
            reg::TEX_BASE_ADDR0 => self.tex_base_addr[0] = val & 0x7_FFFF,
            reg::TEX_BASE_ADDR1 => self.tex_base_addr[1] = val & 0x7_FFFF,
            reg::TEX_BASE_ADDR2 => self.tex_base_addr[2] = val & 0x7_FFFF,
            reg::TEX_BASE_ADDR3 => self.tex_base_addr[3] = val & 0x7_FFFF,
            reg::CMDFIFO_BASE | reg::CMDFIFO_BOTTOM => {
                self.cmdfifo.bottom_page = val & 0xFFFF;
                tracing::debug!(
                    target: "sst96::cmdfifo",
                    page = self.cmdfifo.bottom_page,
                    "CmdFifo bottom page"
                );
            }
            reg::CMDFIFO_TOP => {
                self.cmdfifo.top_page = val & 0xFFFF;
                tracing::debug!(
                    target: "sst96::cmdfifo",
                    page = self.cmdfifo.top_page,
                    "CmdFifo top page"
                );
            }
            reg::CMDFIFO_RDPTR => self.cmdfifo.read_ptr = val & 0xFFFF,
            reg::CMDFIFO_THRESHOLD => self.cmdfifo.threshold = val & 0xFFFF,
            reg::CMDFIFO_ENABLE => {
                self.cmdfifo.enabled = val & 0x01 != 0;
                tracing::debug!(
                    target: "sst96::cmdfifo",
                    enabled = self.cmdfifo.enabled,
                    bottom = self.cmdfifo.bottom_page,
                    top = self.cmdfifo.top_page,
                    "CmdFifo enable"
                );
            }
            _ => {
                tracing::trace!(target: "sst96", reg, val, "register write (no side effect)");
            }
        }
    }

    /// Triangle command: the parameter block is complete; hand it to the
    /// rasterizer collaborator. Without one attached the block stays
    /// available via [`Sst96::triangle_params`].
    fn triangle_cmd(&mut self) {
        if !self.enabled {
            tracing::debug!(target: "sst96::triangle", "triangle command while disabled");
            return;
        }
        tracing::debug!(
            target: "sst96::triangle",
            ax = self.triangle.vertex_ax,
            ay = self.triangle.vertex_ay,
            bx = self.triangle.vertex_bx,
            by = self.triangle.vertex_by,
            cx = self.triangle.vertex_cx,
            cy = self.triangle.vertex_cy,
            "triangle parameter block captured; no rasterizer attached"
        );
        self.pixels_in = self.pixels_in.wrapping_add(1);
    }
}

fn sign_extend_16(val: u32) -> i32 {
    (val & 0xFFFF) as u16 as i16 as i32
}

pub(crate) fn sign_extend_24(val: u32) -> i32 {
    ((val << 8) as i32) >> 8
}
