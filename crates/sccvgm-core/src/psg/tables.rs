//! Register write masks and DAC volume tables.

/// Per-register write masks; unused bits are forced to zero on write.
pub const REG_MASK: [u8; 16] = [
    0xFF, 0x0F, 0xFF, 0x0F, 0xFF, 0x0F, 0x1F, 0x3F,
    0x1F, 0x1F, 0x1F, 0xFF, 0xFF, 0x0F, 0xFF, 0xFF,
];

/// YM2149 DAC curve: 32 distinct steps (5-bit envelope resolution).
pub const VOLTBL_YM2149: [u32; 32] = [
    0x00, 0x01, 0x01, 0x02, 0x02, 0x03, 0x03, 0x04,
    0x05, 0x06, 0x07, 0x09, 0x0B, 0x0D, 0x0F, 0x12,
    0x16, 0x1A, 0x1F, 0x25, 0x2D, 0x35, 0x3F, 0x4C,
    0x5A, 0x6A, 0x7F, 0x97, 0xB4, 0xD6, 0xFF, 0xFF,
];

/// AY-3-8910 DAC curve: 16 steps duplicated pairwise so it shares the
/// 32-entry indexing used by the envelope pointer.
pub const VOLTBL_AY8910: [u32; 32] = [
    0x00, 0x00, 0x03, 0x03, 0x04, 0x04, 0x06, 0x06,
    0x09, 0x09, 0x0D, 0x0D, 0x12, 0x12, 0x1D, 0x1D,
    0x22, 0x22, 0x37, 0x37, 0x4D, 0x4D, 0x62, 0x62,
    0x82, 0x82, 0xA6, 0xA6, 0xD0, 0xD0, 0xFF, 0xFF,
];
