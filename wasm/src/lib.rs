use serde::Deserialize;
use svg_stream_writer::{Config, NumberFormat, Theme, render_scene};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneRenderOptions {
    theme: Option<String>,
    precision: Option<u8>,
    background: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
}

fn build_config(options: SceneRenderOptions) -> Result<Config, String> {
    let mut config = Config::default();
    if let Some(name) = options.theme.as_deref() {
        config.theme = Theme::from_name(name).ok_or_else(|| format!("Unknown theme: {name}"))?;
    }
    if let Some(precision) = options.precision {
        config.render.number_format = NumberFormat::Fixed(precision);
    }
    if let Some(width) = options.width {
        config.render.width = width;
    }
    if let Some(height) = options.height {
        config.render.height = height;
    }
    config.render.background = options.background;
    Ok(config)
}

#[wasm_bindgen]
pub fn render_scene_svg(scene: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<SceneRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        SceneRenderOptions::default()
    };

    let config = build_config(options).map_err(|error| JsValue::from_str(&error))?;
    render_scene(scene, &config).map_err(|error| JsValue::from_str(&error.to_string()))
}
