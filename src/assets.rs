pub(crate) mod decode;
pub(crate) mod fetch;
pub(crate) mod image_cache;
pub(crate) mod media;

use std::sync::Arc;

/// Decoded raster ready for compositing.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}
