//! Download URL rendering.

use anyhow::{Context, Result};

/// Placeholder replaced with the release version.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Substitute the version into `template` and check the result is a usable URL.
pub fn render_download_url(template: &str, version: &str) -> Result<String> {
    if !template.contains(VERSION_PLACEHOLDER) {
        anyhow::bail!("download URL template {:?} has no {} placeholder", template, VERSION_PLACEHOLDER);
    }
    let rendered = template.replace(VERSION_PLACEHOLDER, version);
    let parsed = url::Url::parse(&rendered)
        .with_context(|| format!("invalid download URL {:?}", rendered))?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed.to_string()),
        other => anyhow::bail!("unsupported URL scheme {:?} in {}", other, rendered),
    }
}

/// True for `file://` URLs, which have no HTTP status to check.
pub(crate) fn is_file_url(u: &str) -> bool {
    u.get(..7).is_some_and(|s| s.eq_ignore_ascii_case("file://"))
}
