use std::path::Path;

use anyhow::{Context, Result};
use glint_core::pipeline::evaluate_image;
use glint_core::solo::parse_layers;
use glint_core::{BalancePolicy, Look, SoloOptions, SourceImage, TiledCubeLut, solo_with};
use glint_gpu::{EngineConfig, PreviewEngine};

use crate::RenderArgs;

pub async fn run(args: RenderArgs) -> Result<()> {
    let source = SourceImage::open(&args.image)
        .with_context(|| format!("failed to open {}", args.image.display()))?;
    let look = prepare_look(
        super::load_look(&args.look)?,
        args.solo.as_deref(),
        args.follow_balance,
    )?;

    let lut = match &args.lut {
        Some(url) => Some(
            glint_gpu::fetch_lut(url)
                .await
                .with_context(|| format!("failed to load LUT {url}"))?,
        ),
        None => None,
    };

    let output = if args.cpu {
        tracing::info!(width = source.width, height = source.height, "rendering on CPU");
        evaluate_image(&source, &look, lut.as_ref())
    } else {
        let mut config = EngineConfig::default();
        if let Some(power) = args.power {
            config.power_preference = power;
        }
        render_gpu(config, &source, &look, lut.as_ref())?
    };

    save(&output, &args.out)?;
    tracing::info!(out = %args.out.display(), "wrote preview");
    Ok(())
}

/// Apply `--solo` to a loaded look.
fn prepare_look(look: Look, solo: Option<&str>, follow_balance: bool) -> Result<Look> {
    let Some(list) = solo else {
        return Ok(look);
    };
    let layers = parse_layers(list)?;
    let options = SoloOptions {
        balance: if follow_balance {
            BalancePolicy::FollowZones
        } else {
            BalancePolicy::Explicit
        },
    };
    tracing::debug!(layers = ?layers, "soloing layers");
    Ok(solo_with(&look, &layers, options))
}

fn render_gpu(
    config: EngineConfig,
    source: &SourceImage,
    look: &Look,
    lut: Option<&TiledCubeLut>,
) -> Result<SourceImage> {
    let mut engine = PreviewEngine::new(config).context("failed to start GPU engine")?;
    if let Some(lut) = lut {
        engine.set_lut(lut);
    }
    engine.load_image(source)?;
    engine.render(look);
    Ok(engine.read_output()?)
}

fn save(image: &SourceImage, path: &Path) -> Result<()> {
    let rgba = image
        .to_rgba_image()
        .context("rendered buffer does not match its dimensions")?;
    rgba.save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::look::HueBand;

    fn graded_look() -> Look {
        let mut look = Look::neutral();
        look.tone.exposure = 1.0;
        look.tone.contrast = 30.0;
        look.hsl.get_mut(HueBand::Red).saturation = -50.0;
        look
    }

    #[test]
    fn test_prepare_look_without_solo_is_unchanged() {
        let look = graded_look();
        assert_eq!(prepare_look(look.clone(), None, false).expect("look"), look);
    }

    #[test]
    fn test_prepare_look_isolates_named_layers() {
        let soloed = prepare_look(graded_look(), Some("exposure, hsl_red"), false).expect("look");
        assert_eq!(soloed.tone.exposure, 1.0);
        assert_eq!(soloed.tone.contrast, 0.0);
        assert_eq!(soloed.hsl.get(HueBand::Red).saturation, -50.0);
    }

    #[test]
    fn test_prepare_look_rejects_unknown_layer() {
        assert!(prepare_look(graded_look(), Some("exposure,sparkle"), false).is_err());
    }

    #[test]
    fn test_prepare_look_empty_solo_is_neutral() {
        for list in ["", " , "] {
            let look = prepare_look(graded_look(), Some(list), false).expect("empty solo set");
            assert_eq!(look, Look::neutral());
        }
    }

    #[tokio::test]
    async fn test_cpu_render_writes_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image_path = dir.path().join("in.png");
        let look_path = dir.path().join("look.json");
        let out_path = dir.path().join("out.png");

        let mut src = image::RgbaImage::new(4, 2);
        for (i, px) in src.pixels_mut().enumerate() {
            *px = image::Rgba([(i * 30) as u8, 100, 200, 255]);
        }
        src.save(&image_path).expect("write source");
        std::fs::write(&look_path, r#"{ "exposure": 1.0 }"#).expect("write look");

        run(RenderArgs {
            image: image_path,
            look: look_path,
            solo: None,
            follow_balance: false,
            lut: None,
            out: out_path.clone(),
            cpu: true,
            power: None,
        })
        .await
        .expect("render should succeed");

        let out = image::open(&out_path).expect("read output").to_rgba8();
        assert_eq!(out.dimensions(), (4, 2));
        assert!(out.get_pixel(1, 0)[1] > 100, "exposure brightens");
        assert_eq!(out.get_pixel(3, 1)[3], 255);
    }

    #[tokio::test]
    async fn test_missing_lut_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image_path = dir.path().join("in.png");
        let look_path = dir.path().join("look.json");
        image::RgbaImage::new(2, 2).save(&image_path).expect("write source");
        std::fs::write(&look_path, "{}").expect("write look");

        let result = run(RenderArgs {
            image: image_path,
            look: look_path,
            solo: None,
            follow_balance: false,
            lut: Some(dir.path().join("nope.png").display().to_string()),
            out: dir.path().join("out.png"),
            cpu: true,
            power: None,
        })
        .await;
        assert!(result.is_err());
    }
}
