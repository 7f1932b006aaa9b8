use std::io::Read;

use anyhow::Context as _;

use crate::foundation::error::{FigError, FigResult};

/// Frame magic of the zstd format, little-endian `0xFD2FB528`.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Inflate a raw (headerless) deflate stream.
pub(crate) fn inflate_raw(data: &[u8]) -> FigResult<Vec<u8>> {
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| FigError::corrupt(0, format!("deflate stream: {e}")))?;
    Ok(out)
}

/// Decompress a chunk whose scheme is discriminated by its leading bytes:
/// the zstd frame magic selects zstd, anything else is attempted as raw
/// deflate.
pub(crate) fn decompress_auto(data: &[u8]) -> FigResult<Vec<u8>> {
    if data.len() >= 4 && data[..4] == ZSTD_MAGIC {
        let out = zstd::stream::decode_all(data).context("zstd chunk")?;
        return Ok(out);
    }
    inflate_raw(data)
}

/// Decompress an archive entry by its directory method code.
///
/// Method 0 is stored, method 8 is deflate; everything else is rejected.
pub(crate) fn decompress_entry(method: u16, data: &[u8]) -> FigResult<Vec<u8>> {
    match method {
        0 => Ok(data.to_vec()),
        8 => inflate_raw(data),
        other => Err(FigError::UnsupportedCompression(other)),
    }
}
