//! Upload acceptance rules (size, extension, MIME type, content sniffing).

use crate::error::CoreError;

/// Default maximum accepted upload size (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Message returned for anything that is not a supported image.
pub const UNSUPPORTED_IMAGE_MESSAGE: &str = "Only image files (JPEG, PNG, WebP) are allowed!";

/// Image formats accepted for enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    /// Extension used when storing a file of this kind.
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
        }
    }

    /// Map a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    /// Map a declared MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    /// Detect the format from the leading bytes of the file.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            image::ImageFormat::Png => Some(ImageKind::Png),
            image::ImageFormat::WebP => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// Validate an uploaded file and return the format it will be stored as.
///
/// Checks, in order: non-empty, size limit, file extension, declared MIME
/// type, then the actual content. The stored kind is the sniffed one.
pub fn validate_image_upload(
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
    max_bytes: usize,
) -> Result<ImageKind, CoreError> {
    if data.is_empty() {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if data.len() > max_bytes {
        return Err(CoreError::Validation(format!(
            "File too large: {} bytes exceeds the {max_bytes} byte limit",
            data.len()
        )));
    }

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("");
    let by_ext = ImageKind::from_extension(ext);
    let by_mime = content_type.and_then(ImageKind::from_mime);
    if by_ext.is_none() || by_mime.is_none() {
        return Err(CoreError::Validation(UNSUPPORTED_IMAGE_MESSAGE.into()));
    }

    ImageKind::sniff(data).ok_or_else(|| CoreError::Validation(UNSUPPORTED_IMAGE_MESSAGE.into()))
}
