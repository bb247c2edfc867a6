use crate::emitter::NumberFormat;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: i32,
    pub height: i32,
    pub number_format: NumberFormat,
    /// Fill for a full-canvas rectangle drawn before any shape.
    pub background: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            number_format: NumberFormat::Shortest,
            background: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    fill: Option<String>,
    stroke: Option<String>,
    stroke_width: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    width: Option<i32>,
    height: Option<i32>,
    /// Decimal places; omitted means shortest round-trip text.
    precision: Option<u8>,
    background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document, accepting JSON5 where strict JSON fails.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    let mut config = Config::default();
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown theme: {theme_name}"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.fill {
            config.theme.fill = Some(v);
        }
        if let Some(v) = vars.stroke {
            config.theme.stroke = Some(v);
        }
        if let Some(v) = vars.stroke_width {
            config.theme.stroke_width = Some(v);
        }
    }

    if let Some(width) = parsed.width {
        config.render.width = width;
    }
    if let Some(height) = parsed.height {
        config.render.height = height;
    }
    if let Some(precision) = parsed.precision {
        config.render.number_format = NumberFormat::Fixed(precision);
    }
    if parsed.background.is_some() {
        config.render.background = parsed.background;
    }

    Ok(config)
}
