use std::path::Path;

use anyhow::{bail, Context};
use shared::domain::Frame;
use url::Url;

/// Reads a JSON array of `{name, imageUrl}` frames.
pub fn load_manifest(path: &Path) -> anyhow::Result<Vec<Frame>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read frames manifest '{}'", path.display()))?;
    let frames: Vec<Frame> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid frames manifest '{}'", path.display()))?;
    validate_frames(&frames)?;
    Ok(frames)
}

pub fn validate_frames(frames: &[Frame]) -> anyhow::Result<()> {
    if frames.is_empty() {
        bail!("frames manifest contains no frames");
    }
    for (index, frame) in frames.iter().enumerate() {
        if frame.name.trim().is_empty() {
            bail!("frame #{index} has an empty name");
        }
        let url = Url::parse(&frame.image_url).with_context(|| {
            format!("frame '{}' has an invalid imageUrl '{}'", frame.name, frame.image_url)
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "frame '{}' imageUrl must be http or https, got '{}'",
                frame.name,
                url.scheme()
            );
        }
    }
    Ok(())
}
