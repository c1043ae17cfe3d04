use std::path::Path;

use anyhow::{Context, Result};
use glint_core::scopes::histogram::compute;
use glint_core::{Histogram, Look, SourceImage, predict};

use crate::PredictArgs;

pub fn run(args: PredictArgs) -> Result<()> {
    let base = match (&args.histogram, &args.image) {
        (Some(path), _) => load_histogram(path)?,
        (None, Some(path)) => {
            let image = SourceImage::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            compute(&image)
        }
        (None, None) => anyhow::bail!("either --histogram or --image is required"),
    };
    let look = super::load_look(&args.look)?;
    let json = predict_json(&base, &look)?;

    match &args.out {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn load_histogram(path: &Path) -> Result<Histogram> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read histogram {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid histogram {}", path.display()))
}

fn predict_json(base: &Histogram, look: &Look) -> Result<String> {
    let predicted = predict(base, look);
    Ok(serde_json::to_string(&predicted)?)
}
