use std::path::Path;

use svg_stream_writer::{
    Attributes, Config, Point, Size, StringDataSource, SvgError, SvgWriter, XmlEntityKind,
    XmlReader, parse_scene, render_svg,
};

/// Streams `svg` back through the entity reader; panics on malformed markup.
fn assert_well_formed(svg: &str, fixture: &str) -> Vec<String> {
    let mut reader = XmlReader::new(StringDataSource::new(svg));
    let mut starts = Vec::new();
    let mut open = 0usize;
    let mut roots = 0usize;
    while let Some(entity) = reader
        .read_entity(true)
        .unwrap_or_else(|err| panic!("{fixture}: {err}"))
    {
        match entity.kind {
            XmlEntityKind::StartElement => {
                if open == 0 {
                    roots += 1;
                    assert_eq!(entity.name_data, "svg", "{fixture}: unexpected root");
                }
                open += 1;
                assert!(
                    entity.has_attribute("style")
                        || matches!(entity.name_data.as_str(), "svg" | "g"),
                    "{fixture}: <{}> without style attribute",
                    entity.name_data
                );
                starts.push(entity.name_data);
            }
            XmlEntityKind::EndElement => open -= 1,
            XmlEntityKind::CharData => unreachable!(),
        }
    }
    assert_eq!(open, 0, "{fixture}: unbalanced tags");
    assert_eq!(roots, 1, "{fixture}: expected exactly one <svg>");
    starts
}

fn render_fixture(path: &Path) -> String {
    let input = std::fs::read_to_string(path).expect("fixture read failed");
    let scene = parse_scene(&input).expect("parse failed");
    render_svg(&scene, &Config::default()).expect("render failed")
}

#[test]
fn render_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        ("basic/empty.json", 0),
        ("basic/shapes.json", 3),
        ("groups/nested.json5", 7),
        ("paths/zigzag.json5", 12),
    ];

    for (rel, elements) in candidates {
        let path = root.join(rel);
        assert!(path.exists(), "fixture missing: {}", rel);
        let svg = render_fixture(&path);
        let starts = assert_well_formed(&svg, rel);
        assert_eq!(starts.len() - 1, elements, "{rel}: element count");
    }
}

#[test]
fn nested_groups_keep_their_attributes() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/groups/nested.json5");
    let svg = render_fixture(&root);
    assert!(svg.contains("<g id=\"outer\" fill=\"none\" stroke=\"navy\">\n"));
    assert!(svg.contains("<g id=\"middle\">\n"));
    assert!(svg.contains("<g class=\"empty\">\n</g>\n"));
    assert!(svg.contains("style=\"fill:gold\""));
    assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
}

#[test]
fn full_sequence_round_trips() {
    let mut sink = svg_stream_writer::StringDataSink::new();
    let mut writer = SvgWriter::new(&mut sink, 640, 480).unwrap();
    let stroke = Attributes::new().with("stroke", "black");

    writer.group_begin(&Attributes::new().with("id", "frame")).unwrap();
    writer
        .rectangle(Point::new(0.0, 0.0), Size::new(640.0, 480.0), &stroke)
        .unwrap();
    writer.group_begin(&Attributes::new()).unwrap();
    writer
        .circle(Point::new(320.0, 240.0), 100.0, &Attributes::new())
        .unwrap();
    writer
        .line(Point::new(0.0, 0.0), Point::new(640.0, 480.0), &stroke)
        .unwrap();
    writer.group_end().unwrap();
    writer.group_end().unwrap();
    assert!(matches!(writer.group_end(), Err(SvgError::State(_))));
    writer.finish().unwrap();

    let svg = sink.into_string();
    let starts = assert_well_formed(&svg, "sequence");
    assert_eq!(starts, vec!["svg", "g", "rect", "g", "circle", "line"]);
    assert_eq!(svg.matches("<svg").count(), 1);
    assert_eq!(svg.matches("</svg>").count(), 1);
}

#[test]
fn rejected_byte_stops_the_document_where_it_failed() {
    struct Budget {
        left: usize,
        seen: Vec<u8>,
    }

    impl svg_stream_writer::DataSink for Budget {
        fn put(&mut self, byte: u8) -> bool {
            if self.left == 0 {
                return false;
            }
            self.left -= 1;
            self.seen.push(byte);
            true
        }
    }

    let mut probe = svg_stream_writer::StringDataSink::new();
    SvgWriter::new(&mut probe, 10, 10).unwrap().finish().unwrap();
    let prologue_len = probe.as_bytes().len() - "</svg>\n".len();

    let mut sink = Budget {
        left: prologue_len + 3,
        seen: Vec::new(),
    };
    let mut writer = SvgWriter::new(&mut sink, 10, 10).unwrap();
    let err = writer
        .circle(Point::new(5.0, 5.0), 2.0, &Attributes::new())
        .unwrap_err();
    assert!(err.is_io());
    assert!(writer.finish().unwrap_err().is_io());
    assert_eq!(sink.seen.len(), prologue_len + 3);
    assert!(sink.seen.ends_with(b"<ci"));
}
