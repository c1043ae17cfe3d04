//! Subcommand implementations.

pub mod predict;
pub mod render;
pub mod stages;

use std::path::Path;

use anyhow::{Context, Result};
use glint_core::Look;

/// Read a look file through the payload normalizer.
pub fn load_look(path: &Path) -> Result<Look> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read look file {}", path.display()))?;
    glint_payload::normalize_str(&text)
        .with_context(|| format!("invalid look file {}", path.display()))
}
