//! SST-96 register indices.
//!
//! These are 8-bit register numbers, not byte offsets: a register occupies a
//! 4 KiB page of the PUMA register region, so `reg = (offset >> 12) & 0xFF`.

pub const STATUS: u32 = 0x000;
pub const VERTEX_AX: u32 = 0x002;
pub const VERTEX_AY: u32 = 0x003;
pub const VERTEX_BX: u32 = 0x004;
pub const VERTEX_BY: u32 = 0x005;
pub const VERTEX_CX: u32 = 0x006;
pub const VERTEX_CY: u32 = 0x007;
pub const START_R: u32 = 0x008;
pub const DRDX: u32 = 0x009;
pub const DRDY: u32 = 0x00A;
pub const START_G: u32 = 0x00B;
pub const DGDX: u32 = 0x00C;
pub const DGDY: u32 = 0x00D;
pub const START_B: u32 = 0x00E;
pub const DBDX: u32 = 0x00F;
pub const DBDY: u32 = 0x010;
pub const START_Z: u32 = 0x011;
pub const DZDX: u32 = 0x012;
pub const DZDY: u32 = 0x013;
pub const START_A: u32 = 0x014;
pub const DADX: u32 = 0x015;
pub const DADY: u32 = 0x016;
pub const START_S: u32 = 0x017;
pub const DSDX: u32 = 0x018;
pub const DSDY: u32 = 0x019;
pub const START_T: u32 = 0x01A;
pub const DTDX: u32 = 0x01B;
pub const DTDY: u32 = 0x01C;
pub const START_W: u32 = 0x01D;
pub const DWDX: u32 = 0x01E;
pub const DWDY: u32 = 0x01F;
pub const TRIANGLE_CMD: u32 = 0x020;
pub const NOP_CMD: u32 = 0x042;
pub const FASTFILL_CMD: u32 = 0x044;
pub const SWAPBUFFER_CMD: u32 = 0x046;
pub const SWAPPEND_CMD: u32 = 0x048;
pub const FBZ_COLOR_PATH: u32 = 0x050;
pub const FOG_MODE: u32 = 0x051;
pub const ALPHA_MODE: u32 = 0x052;
pub const FBZ_MODE: u32 = 0x054;
pub const STIPPLE: u32 = 0x055;
pub const COLOR0: u32 = 0x056;
pub const COLOR1: u32 = 0x057;
pub const FOG_COLOR: u32 = 0x058;
pub const ZA_COLOR: u32 = 0x059;
pub const CHROMA_KEY: u32 = 0x05A;
pub const CHROMA_RANGE: u32 = 0x05B;
pub const COL_BUFFER_SETUP: u32 = 0x060;
pub const AUX_BUFFER_SETUP: u32 = 0x061;
pub const CLIP_LEFT_RIGHT0: u32 = 0x062;
pub const CLIP_TOP_BOTTOM0: u32 = 0x063;
pub const CLIP_LEFT_RIGHT1: u32 = 0x064;
pub const CLIP_TOP_BOTTOM1: u32 = 0x065;
pub const FBIJR_INIT0: u32 = 0x090;
pub const FBIJR_INIT1: u32 = 0x091;
pub const FBIJR_INIT2: u32 = 0x092;
pub const FBIJR_INIT3: u32 = 0x093;
pub const FBIJR_INIT4: u32 = 0x094;
pub const FBIJR_INIT5: u32 = 0x095;
pub const FBIJR_VERSION: u32 = 0x0A0;
pub const FBI_PIXELS_IN: u32 = 0x0A1;
pub const FBI_CHROMA_FAIL: u32 = 0x0A2;
pub const FBI_ZFUNC_FAIL: u32 = 0x0A3;
pub const FBI_AFUNC_FAIL: u32 = 0x0A4;
pub const FBI_PIXELS_OUT: u32 = 0x0A5;
pub const TEXTURE_MODE: u32 = 0x0C1;
pub const TLOD: u32 = 0x0C2;
pub const TDETAIL: u32 = 0x0C3;
pub const TEX_BASE_ADDR0: u32 = 0x0C4;
pub const TEX_BASE_ADDR1: u32 = 0x0C5;
pub const TEX_BASE_ADDR2: u32 = 0x0C6;
pub const TEX_BASE_ADDR3: u32 = 0x0C7;
pub const CMDFIFO_BASE: u32 = 0x0E8;
pub const CMDFIFO_TOP: u32 = 0x0E9;
pub const CMDFIFO_BOTTOM: u32 = 0x0EA;
pub const CMDFIFO_RDPTR: u32 = 0x0EB;
pub const CMDFIFO_THRESHOLD: u32 = 0x0EC;
pub const CMDFIFO_ENABLE: u32 = 0x0ED;

/// Registers in `SIGN_EXTEND_FIRST..=SIGN_EXTEND_LAST` hold 24-bit
/// fixed-point values; PUMA-space reads sign-extend them to 32 bits.
pub const SIGN_EXTEND_FIRST: u32 = DRDX;
pub const SIGN_EXTEND_LAST: u32 = DADY;

/// Status register bit latched when the CmdFifo fill level crosses the
/// configured threshold.
pub const STATUS_CMDFIFO_THRESHOLD: u32 = 1 << 16;
