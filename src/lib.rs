#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod render;
pub mod scene;
pub mod sink;
pub mod source;
pub mod theme;
pub mod types;
pub mod writer;
pub mod xml;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RenderConfig, load_config, parse_config};
pub use emitter::{CallbackOutput, FORMAT_BUFFER_SIZE, NumberFormat, SvgContext, SvgOutput};
pub use error::{SvgError, SvgResult, XmlError};
pub use render::{render_into, render_svg, render_to_writer};
pub use scene::{Scene, Shape, draw_scene, parse_scene};
pub use sink::{DataSink, IoDataSink, StringDataSink};
pub use source::{DataSource, IoDataSource, StringDataSource};
pub use theme::Theme;
pub use types::{Attributes, Point, Size};
pub use writer::SvgWriter;
pub use xml::{XmlEntity, XmlEntityKind, XmlReader};

/// Parses a scene document and renders it to an SVG string.
pub fn render_scene(input: &str, config: &Config) -> anyhow::Result<String> {
    let scene = parse_scene(input)?;
    render_svg(&scene, config)
}
