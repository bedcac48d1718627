pub(crate) mod decode;
pub(crate) mod mix;
pub(crate) mod mixdown;
pub(crate) mod probe;
pub(crate) mod wav;

/// Mixdown output rate.
pub const MIX_SAMPLE_RATE: u32 = 44_100;
/// Mixdown output channel count.
pub const MIX_CHANNELS: u16 = 2;
