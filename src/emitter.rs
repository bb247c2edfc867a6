//! Raw SVG text emission.
//!
//! [`SvgContext`] turns primitive shapes into markup chunks and hands each chunk to an
//! [`SvgOutput`] in a single `write_text` call. Nothing is buffered between calls, so the
//! output sees the document grow element by element.

use crate::error::{SvgError, SvgResult};
use crate::types::{Point, Size};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Size of the per-element formatting buffer. Chunks must be strictly shorter.
pub const FORMAT_BUFFER_SIZE: usize = 256;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const CLOSING_TAG: &str = "</svg>\n";

/// Write and cleanup capabilities used by a [`SvgContext`].
pub trait SvgOutput {
    /// Accepts one complete chunk of markup.
    fn write_text(&mut self, text: &str) -> SvgResult<()>;

    /// Called exactly once, when the context is destroyed.
    fn cleanup(&mut self) -> SvgResult<()>;
}

pub type WriteFn = Box<dyn FnMut(&str) -> SvgResult<()>>;
pub type CleanupFn = Box<dyn FnMut() -> SvgResult<()>>;

/// An [`SvgOutput`] assembled from a pair of closures.
pub struct CallbackOutput {
    write: WriteFn,
    cleanup: CleanupFn,
}

impl CallbackOutput {
    pub fn new(write: Option<WriteFn>, cleanup: Option<CleanupFn>) -> SvgResult<Self> {
        let write = write.ok_or(SvgError::NullArgument("write callback"))?;
        let cleanup = cleanup.ok_or(SvgError::NullArgument("cleanup callback"))?;
        Ok(Self { write, cleanup })
    }
}

impl SvgOutput for CallbackOutput {
    fn write_text(&mut self, text: &str) -> SvgResult<()> {
        (self.write)(text)
    }

    fn cleanup(&mut self) -> SvgResult<()> {
        (self.cleanup)()
    }
}

/// How real-valued attributes are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberFormat {
    /// Shortest text that round-trips, with ECMAScript number-to-string rules.
    #[default]
    Shortest,
    /// Fixed decimals with trailing zeros removed.
    Fixed(u8),
}

impl NumberFormat {
    pub fn format(&self, value: f64) -> String {
        match *self {
            NumberFormat::Shortest => {
                if value == 0.0 {
                    return "0".to_string();
                }
                ryu_js::Buffer::new().format(value).to_string()
            }
            NumberFormat::Fixed(decimals) => {
                if !value.is_finite() {
                    return ryu_js::Buffer::new().format(value).to_string();
                }
                let mut text = format!("{:.*}", decimals as usize, value);
                if text.contains('.') {
                    let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
                    text.truncate(trimmed);
                }
                if text == "-0" {
                    text = "0".to_string();
                }
                text
            }
        }
    }
}

/// One in-progress SVG document bound to a canvas size and an output.
///
/// The prologue is written by [`SvgContext::create`]; [`SvgContext::destroy`] writes the
/// closing tag and runs cleanup. After destruction every call fails with
/// [`SvgError::State`].
pub struct SvgContext<O: SvgOutput> {
    output: O,
    alive: bool,
    number_format: NumberFormat,
}

impl<O: SvgOutput> SvgContext<O> {
    pub fn create(output: O, width: i32, height: i32) -> SvgResult<Self> {
        Self::create_with_format(output, width, height, NumberFormat::default())
    }

    pub fn create_with_format(
        mut output: O,
        width: i32,
        height: i32,
        number_format: NumberFormat,
    ) -> SvgResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(SvgError::InvalidArgument(format!(
                "canvas must be positive, got {width}x{height}"
            )));
        }
        let prologue = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg width=\"{width}\" height=\"{height}\" xmlns=\"{SVG_NAMESPACE}\">\n"
        );
        check_chunk_len("svg", &prologue)?;
        output.write_text(&prologue).inspect_err(|err| {
            warn!(%err, "prologue rejected; no context created");
        })?;
        debug!(width, height, ?number_format, "svg context created");
        Ok(Self {
            output,
            alive: true,
            number_format,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn number_format(&self) -> NumberFormat {
        self.number_format
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Writes `</svg>` and runs cleanup. Both steps are attempted; the first failure wins.
    pub fn destroy(&mut self) -> SvgResult<()> {
        self.ensure_alive()?;
        self.alive = false;
        let closed = self.output.write_text(CLOSING_TAG);
        if let Err(err) = &closed {
            warn!(%err, "closing tag rejected");
        }
        let cleaned = self.output.cleanup();
        if let Err(err) = &cleaned {
            warn!(%err, "output cleanup failed");
        }
        debug!("svg context destroyed");
        closed.and(cleaned)
    }

    pub fn circle(&mut self, center: Point, radius: f64, style: Option<&str>) -> SvgResult<()> {
        self.ensure_alive()?;
        let text = format!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" style=\"{}\"/>\n",
            self.num(center.x),
            self.num(center.y),
            self.num(radius),
            style.unwrap_or("")
        );
        self.emit("circle", &text)
    }

    pub fn rect(&mut self, top_left: Point, size: Size, style: Option<&str>) -> SvgResult<()> {
        self.ensure_alive()?;
        let text = format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"{}\"/>\n",
            self.num(top_left.x),
            self.num(top_left.y),
            self.num(size.width),
            self.num(size.height),
            style.unwrap_or("")
        );
        self.emit("rect", &text)
    }

    pub fn line(&mut self, start: Point, end: Point, style: Option<&str>) -> SvgResult<()> {
        self.ensure_alive()?;
        let text = format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" style=\"{}\"/>\n",
            self.num(start.x),
            self.num(start.y),
            self.num(end.x),
            self.num(end.y),
            style.unwrap_or("")
        );
        self.emit("line", &text)
    }

    pub fn group_begin(&mut self, attrs: Option<&str>) -> SvgResult<()> {
        self.ensure_alive()?;
        let text = match attrs {
            Some(attrs) if !attrs.is_empty() => format!("<g {attrs}>\n"),
            _ => "<g>\n".to_string(),
        };
        self.emit("g", &text)
    }

    /// Writes `</g>`. Nesting is not tracked here.
    pub fn group_end(&mut self) -> SvgResult<()> {
        self.ensure_alive()?;
        self.emit("/g", "</g>\n")
    }

    fn ensure_alive(&self) -> SvgResult<()> {
        if self.alive {
            Ok(())
        } else {
            Err(SvgError::State("svg context already destroyed"))
        }
    }

    fn num(&self, value: f64) -> String {
        self.number_format.format(value)
    }

    fn emit(&mut self, element: &'static str, text: &str) -> SvgResult<()> {
        check_chunk_len(element, text)?;
        trace!(element, bytes = text.len(), "emit");
        self.output.write_text(text).inspect_err(|err| {
            warn!(element, %err, "write rejected");
        })
    }
}

fn check_chunk_len(element: &str, text: &str) -> SvgResult<()> {
    if text.len() >= FORMAT_BUFFER_SIZE {
        warn!(element, bytes = text.len(), "element exceeds formatting buffer");
        return Err(SvgError::Io(format!(
            "<{element}> needs {} bytes, formatting buffer holds {}",
            text.len(),
            FORMAT_BUFFER_SIZE - 1
        )));
    }
    Ok(())
}
