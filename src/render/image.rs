use base64::Engine as _;

use crate::scene::ImageScaleMode;

/// Media type sniffed from leading magic bytes. PNG is the neutral fallback
/// so unknown payloads still yield a deterministic, viewer-tolerant URI.
pub(crate) fn sniff_media_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if bytes.starts_with(b"GIF") {
        "image/gif"
    } else if bytes.starts_with(b"RIFF") {
        "image/webp"
    } else {
        "image/png"
    }
}

pub(crate) fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        sniff_media_type(bytes),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// `preserveAspectRatio` value for an image paint's scale mode.
pub(crate) fn preserve_aspect_ratio(mode: ImageScaleMode) -> &'static str {
    match mode {
        ImageScaleMode::Fit => "xMidYMid meet",
        ImageScaleMode::Stretch => "none",
        ImageScaleMode::Fill | ImageScaleMode::Tile => "xMidYMid slice",
    }
}
