//! Typed drawing API over a [`DataSink`].

use crate::emitter::{NumberFormat, SvgContext, SvgOutput};
use crate::error::{SvgError, SvgResult};
use crate::sink::DataSink;
use crate::types::{Attributes, Point, Size};
use tracing::warn;

/// Forwards emitted markup to a sink, in order, as one bulk write per chunk.
struct SinkOutput<S: DataSink> {
    sink: S,
}

impl<S: DataSink> SvgOutput for SinkOutput<S> {
    fn write_text(&mut self, text: &str) -> SvgResult<()> {
        if self.sink.write(text.as_bytes()) {
            Ok(())
        } else {
            Err(SvgError::Io("sink rejected markup".to_string()))
        }
    }

    fn cleanup(&mut self) -> SvgResult<()> {
        if self.sink.flush() {
            Ok(())
        } else {
            Err(SvgError::Io("sink flush failed".to_string()))
        }
    }
}

/// Streams an SVG document into a sink.
///
/// The prologue is written on construction. Call [`SvgWriter::finish`] to close the
/// document; it consumes the writer, so the closing tag is written at most once.
pub struct SvgWriter<S: DataSink> {
    context: SvgContext<SinkOutput<S>>,
    depth: usize,
}

impl<S: DataSink> SvgWriter<S> {
    pub fn new(sink: S, width: i32, height: i32) -> SvgResult<Self> {
        Self::with_number_format(sink, width, height, NumberFormat::default())
    }

    pub fn with_number_format(
        sink: S,
        width: i32,
        height: i32,
        number_format: NumberFormat,
    ) -> SvgResult<Self> {
        let context =
            SvgContext::create_with_format(SinkOutput { sink }, width, height, number_format)?;
        Ok(Self { context, depth: 0 })
    }

    /// Number of groups currently open.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn circle(&mut self, center: Point, radius: f64, style: &Attributes) -> SvgResult<()> {
        check_point("center", center)?;
        check_length("radius", radius)?;
        let style = style_string(style)?;
        self.context.circle(center, radius, Some(&style))
    }

    pub fn rectangle(&mut self, top_left: Point, size: Size, style: &Attributes) -> SvgResult<()> {
        check_point("top left", top_left)?;
        check_length("width", size.width)?;
        check_length("height", size.height)?;
        let style = style_string(style)?;
        self.context.rect(top_left, size, Some(&style))
    }

    pub fn line(&mut self, start: Point, end: Point, style: &Attributes) -> SvgResult<()> {
        check_point("start", start)?;
        check_point("end", end)?;
        let style = style_string(style)?;
        self.context.line(start, end, Some(&style))
    }

    /// Draws `points` as consecutive `<line>` segments sharing one style.
    ///
    /// Stops at the first segment the sink rejects.
    pub fn simple_path(&mut self, points: &[Point], style: &Attributes) -> SvgResult<()> {
        if points.len() < 2 {
            return Err(SvgError::InvalidArgument(format!(
                "path needs at least two points, got {}",
                points.len()
            )));
        }
        for point in points {
            check_point("path point", *point)?;
        }
        let style = style_string(style)?;
        for segment in points.windows(2) {
            self.context.line(segment[0], segment[1], Some(&style))?;
        }
        Ok(())
    }

    pub fn group_begin(&mut self, attrs: &Attributes) -> SvgResult<()> {
        attrs.validate().map_err(SvgError::InvalidArgument)?;
        self.context.group_begin(Some(&attrs.to_attribute_string()))?;
        self.depth += 1;
        Ok(())
    }

    pub fn group_end(&mut self) -> SvgResult<()> {
        if self.depth == 0 {
            return Err(SvgError::State("group end without matching group begin"));
        }
        self.context.group_end()?;
        self.depth -= 1;
        Ok(())
    }

    /// Closes open groups, writes `</svg>` and flushes the sink.
    ///
    /// Every step is attempted even after a failure; the first failure is returned.
    pub fn finish(mut self) -> SvgResult<()> {
        let mut first_error = None;
        if self.depth > 0 {
            warn!(depth = self.depth, "closing groups left open at finish");
        }
        while self.depth > 0 {
            if let Err(err) = self.context.group_end() {
                first_error.get_or_insert(err);
            }
            self.depth -= 1;
        }
        let destroyed = self.context.destroy();
        match first_error {
            Some(err) => Err(err),
            None => destroyed,
        }
    }
}

fn style_string(style: &Attributes) -> SvgResult<String> {
    style.validate_style().map_err(SvgError::InvalidArgument)?;
    Ok(style.to_style_string())
}

fn check_point(what: &str, point: Point) -> SvgResult<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(SvgError::InvalidArgument(format!(
            "{what} must be finite, got ({}, {})",
            point.x, point.y
        )))
    }
}

fn check_length(what: &str, value: f64) -> SvgResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SvgError::InvalidArgument(format!(
            "{what} must be a finite non-negative length, got {value}"
        )))
    }
}
