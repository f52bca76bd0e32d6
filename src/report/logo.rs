use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Image types accepted for the company logo.
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Read a logo file and base64-encode it for embedding in the report.
pub fn encode_logo(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !LOGO_EXTENSIONS.contains(&extension.as_str()) {
        bail!("Logo must be a png, jpg or jpeg file.");
    }

    let bytes =
        fs::read(path).with_context(|| format!("failed to read logo {}", path.display()))?;
    Ok(STANDARD.encode(bytes))
}
