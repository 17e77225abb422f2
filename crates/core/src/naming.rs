//! File naming for stored uploads and their enhanced outputs.

use std::path::{Path, PathBuf};

/// Prefix prepended to a stored file name to derive its enhanced output.
pub const ENHANCED_PREFIX: &str = "enhanced_";

/// Name under which an upload is stored: `<stem>.<extension>`.
pub fn stored_file_name(stem: &str, extension: &str) -> String {
    format!("{stem}.{extension}")
}

/// Derive the enhanced output path for a stored upload.
///
/// The output lives next to the original with [`ENHANCED_PREFIX`] in front
/// of the file name. Returns `None` when `original` has no file name.
pub fn enhanced_file_path(original: &Path) -> Option<PathBuf> {
    let name = original.file_name()?.to_str()?;
    Some(original.with_file_name(format!("{ENHANCED_PREFIX}{name}")))
}
