use crate::config::{Config, RenderConfig};
use crate::scene::{Scene, draw_scene};
use crate::sink::{DataSink, IoDataSink, StringDataSink};
use crate::types::{Attributes, Point, Size};
use crate::writer::SvgWriter;
use anyhow::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Canvas size: the scene's own dimensions win over the configured ones.
pub fn canvas_size(scene: &Scene, render: &RenderConfig) -> (i32, i32) {
    (
        scene.width.unwrap_or(render.width),
        scene.height.unwrap_or(render.height),
    )
}

/// Streams `scene` into `sink`. The document is closed even when drawing fails.
pub fn render_into<S: DataSink>(scene: &Scene, config: &Config, sink: S) -> Result<()> {
    let (width, height) = canvas_size(scene, &config.render);
    let mut writer =
        SvgWriter::with_number_format(sink, width, height, config.render.number_format)?;

    let mut drawn = Ok(());
    if let Some(background) = &config.render.background {
        drawn = writer.rectangle(
            Point::new(0.0, 0.0),
            Size::new(f64::from(width), f64::from(height)),
            &Attributes::new().with("fill", background.clone()),
        );
    }
    if drawn.is_ok() {
        drawn = draw_scene(scene, &config.theme, &mut writer);
    }
    let finished = writer.finish();
    drawn?;
    finished?;
    Ok(())
}

pub fn render_svg(scene: &Scene, config: &Config) -> Result<String> {
    let mut sink = StringDataSink::new();
    render_into(scene, config, &mut sink)?;
    Ok(sink.into_string())
}

/// Streams the document to `output`, or stdout when no path is given.
pub fn write_output_svg(scene: &Scene, config: &Config, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            render_to_writer(scene, config, file)
        }
        None => render_to_writer(scene, config, io::stdout().lock()),
    }
}

/// Streams the document into any writer; I/O errors surface with their original cause.
pub fn render_to_writer<W: Write>(scene: &Scene, config: &Config, out: W) -> Result<()> {
    let mut sink = IoDataSink::new(out);
    let rendered = render_into(scene, config, &mut sink);
    if let Some(err) = sink.take_error() {
        return Err(err.into());
    }
    rendered
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32)
        .ok_or_else(|| anyhow::anyhow!("Invalid default size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}
