//! Engine configuration.

pub use wgpu::PowerPreference;

/// Label prefix for every wgpu object the engine creates.
const DEFAULT_LABEL: &str = "glint_preview";

/// Runtime configuration for [`PreviewEngine`](crate::PreviewEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Adapter preference. Overridden by `GLINT_POWER_PREFERENCE=low|high`.
    pub power_preference: PowerPreference,
    /// Backends to try. Overridden by `WGPU_BACKEND` (e.g. `vulkan,metal`).
    pub backends: wgpu::Backends,
    /// Device label.
    pub label: String,
    /// Output surface format. `Rgba8Unorm` or `Bgra8Unorm`.
    pub output_format: wgpu::TextureFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            power_preference: std::env::var("GLINT_POWER_PREFERENCE")
                .ok()
                .and_then(|s| parse_power_preference(&s))
                .unwrap_or(wgpu::PowerPreference::HighPerformance),
            backends: wgpu::Backends::from_env().unwrap_or(wgpu::Backends::all()),
            label: DEFAULT_LABEL.to_string(),
            output_format: wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Parse `low`/`high` (and a few aliases) into a power preference.
pub fn parse_power_preference(s: &str) -> Option<wgpu::PowerPreference> {
    match s.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "lowpower" | "integrated" => Some(wgpu::PowerPreference::LowPower),
        "high" | "high-performance" | "highperformance" | "discrete" => {
            Some(wgpu::PowerPreference::HighPerformance)
        }
        "none" => Some(wgpu::PowerPreference::None),
        _ => None,
    }
}

/// Output formats the readback path understands.
pub(crate) fn is_supported_output(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Bgra8Unorm
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_power_preference() {
        assert_eq!(
            parse_power_preference("LOW"),
            Some(wgpu::PowerPreference::LowPower)
        );
        assert_eq!(
            parse_power_preference(" high "),
            Some(wgpu::PowerPreference::HighPerformance)
        );
        assert_eq!(parse_power_preference("fast"), None);
    }

    #[test]
    fn test_srgb_output_is_rejected() {
        assert!(is_supported_output(wgpu::TextureFormat::Rgba8Unorm));
        assert!(!is_supported_output(wgpu::TextureFormat::Rgba8UnormSrgb));
    }
}
