//! Scene documents: a JSON/JSON5 description of shapes to stream through a writer.

use crate::error::SvgResult;
use crate::sink::DataSink;
use crate::theme::Theme;
use crate::types::{Attributes, Point, Size};
use crate::writer::SvgWriter;
use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub width: Option<i32>,
    pub height: Option<i32>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Shape {
    Circle {
        center: Point,
        radius: f64,
        #[serde(default)]
        style: Attributes,
    },
    Rect {
        top_left: Point,
        size: Size,
        #[serde(default)]
        style: Attributes,
    },
    Line {
        start: Point,
        end: Point,
        #[serde(default)]
        style: Attributes,
    },
    Path {
        points: Vec<Point>,
        #[serde(default)]
        style: Attributes,
    },
    Group {
        #[serde(default)]
        attrs: Attributes,
        #[serde(default)]
        children: Vec<Shape>,
    },
}

impl Scene {
    /// Total number of shapes, counting group children.
    pub fn shape_count(&self) -> usize {
        fn count(shapes: &[Shape]) -> usize {
            shapes
                .iter()
                .map(|shape| match shape {
                    Shape::Group { children, .. } => 1 + count(children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.shapes)
    }
}

pub fn parse_scene(input: &str) -> anyhow::Result<Scene> {
    match serde_json::from_str::<Scene>(input) {
        Ok(scene) => Ok(scene),
        Err(json_err) => json5::from_str::<Scene>(input)
            .with_context(|| format!("Scene is neither valid JSON ({json_err}) nor JSON5")),
    }
}

/// Draws every shape in document order, stopping at the first failure.
///
/// Groups are closed on the way out of each nesting level; if drawing stops early, the
/// writer's `finish` closes whatever is still open.
pub fn draw_scene<S: DataSink>(
    scene: &Scene,
    theme: &Theme,
    writer: &mut SvgWriter<S>,
) -> SvgResult<()> {
    let shape_defaults = theme.shape_style();
    let stroke_defaults = theme.stroke_style();
    draw_shapes(&scene.shapes, &shape_defaults, &stroke_defaults, writer)
}

fn draw_shapes<S: DataSink>(
    shapes: &[Shape],
    shape_defaults: &Attributes,
    stroke_defaults: &Attributes,
    writer: &mut SvgWriter<S>,
) -> SvgResult<()> {
    for shape in shapes {
        match shape {
            Shape::Circle {
                center,
                radius,
                style,
            } => writer.circle(*center, *radius, &style.merged_under(shape_defaults))?,
            Shape::Rect {
                top_left,
                size,
                style,
            } => writer.rectangle(*top_left, *size, &style.merged_under(shape_defaults))?,
            Shape::Line { start, end, style } => {
                writer.line(*start, *end, &style.merged_under(stroke_defaults))?
            }
            Shape::Path { points, style } => {
                writer.simple_path(points, &style.merged_under(stroke_defaults))?
            }
            Shape::Group { attrs, children } => {
                writer.group_begin(attrs)?;
                draw_shapes(children, shape_defaults, stroke_defaults, writer)?;
                writer.group_end()?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::StringDataSink;

    const SCENE: &str = r#"{
        "width": 120,
        "height": 80,
        "shapes": [
            {"circle": {"center": {"x": 50, "y": 50}, "radius": 25}},
            {"group": {"attrs": {"id": "row"}, "children": [
                {"rect": {"topLeft": {"x": 0, "y": 0}, "size": {"width": 10, "height": 5}, "style": {"fill": "red"}}},
                {"path": {"points": [{"x": 0, "y": 0}, {"x": 5, "y": 5}, {"x": 10, "y": 0}]}}
            ]}},
            {"line": {"start": {"x": 1, "y": 2}, "end": {"x": 3, "y": 4}}}
        ]
    }"#;

    #[test]
    fn parses_json_scene() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.width, Some(120));
        assert_eq!(scene.shapes.len(), 3);
        assert_eq!(scene.shape_count(), 5);
        match &scene.shapes[1] {
            Shape::Group { attrs, children } => {
                assert_eq!(attrs.get("id"), Some("row"));
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn parses_json5_scene() {
        let scene = parse_scene(
            "{ shapes: [ { circle: { center: { x: 1, y: 2 }, radius: 3, style: { 'stroke-width': 2 } } }, ], }",
        )
        .unwrap();
        assert_eq!(scene.width, None);
        match &scene.shapes[0] {
            Shape::Circle { style, .. } => assert_eq!(style.get("stroke-width"), Some("2")),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_scene("{ shapes: [ { hexagon: {} } ] }").unwrap_err();
        assert!(err.to_string().contains("JSON5"));
    }

    #[test]
    fn draws_in_document_order() {
        let scene = parse_scene(SCENE).unwrap();
        let mut sink = StringDataSink::new();
        let mut writer = SvgWriter::new(&mut sink, 120, 80).unwrap();
        draw_scene(&scene, &Theme::plain(), &mut writer).unwrap();
        writer.finish().unwrap();
        let out = sink.into_string();
        let body: Vec<&str> = out.lines().skip(2).collect();
        assert_eq!(
            body,
            vec![
                "<circle cx=\"50\" cy=\"50\" r=\"25\" style=\"\"/>",
                "<g id=\"row\">",
                "<rect x=\"0\" y=\"0\" width=\"10\" height=\"5\" style=\"fill:red\"/>",
                "<line x1=\"0\" y1=\"0\" x2=\"5\" y2=\"5\" style=\"\"/>",
                "<line x1=\"5\" y1=\"5\" x2=\"10\" y2=\"0\" style=\"\"/>",
                "</g>",
                "<line x1=\"1\" y1=\"2\" x2=\"3\" y2=\"4\" style=\"\"/>",
                "</svg>",
            ]
        );
    }

    #[test]
    fn theme_fills_in_missing_style() {
        let scene = parse_scene(SCENE).unwrap();
        let mut sink = StringDataSink::new();
        let mut writer = SvgWriter::new(&mut sink, 120, 80).unwrap();
        draw_scene(&scene, &Theme::modern(), &mut writer).unwrap();
        writer.finish().unwrap();
        let out = sink.into_string();
        assert!(out.contains("style=\"stroke:#7A8AA6;stroke-width:1.4;fill:#F8FAFF\"/>"));
        assert!(out.contains("style=\"stroke:#7A8AA6;stroke-width:1.4;fill:red\"/>"));
        assert!(out.contains(
            "<line x1=\"1\" y1=\"2\" x2=\"3\" y2=\"4\" style=\"stroke:#7A8AA6;stroke-width:1.4\"/>"
        ));
    }

    #[test]
    fn invalid_shape_stops_drawing() {
        let scene = parse_scene(
            r#"{"shapes": [{"group": {"children": [{"path": {"points": [{"x": 0, "y": 0}]}}]}}, {"circle": {"center": {"x": 0, "y": 0}, "radius": 1}}]}"#,
        )
        .unwrap();
        let mut sink = StringDataSink::new();
        let mut writer = SvgWriter::new(&mut sink, 10, 10).unwrap();
        assert!(draw_scene(&scene, &Theme::plain(), &mut writer).is_err());
        assert_eq!(writer.depth(), 1);
        writer.finish().unwrap();
        let out = sink.into_string();
        assert!(!out.contains("<circle"));
        assert!(out.ends_with("<g>\n</g>\n</svg>\n"));
    }
}
