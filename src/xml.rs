//! Streaming XML entity reader over a [`DataSource`], backed by `quick-xml`.

use crate::error::XmlError;
use crate::source::{DataSource, SourceReader};
use crate::types::Attributes;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::VecDeque;
use std::io::{self, BufReader};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEntityKind {
    StartElement,
    EndElement,
    CharData,
}

/// One unit of a document: an element boundary or a run of character data.
///
/// `name_data` is the element name for element entities and the text for
/// [`XmlEntityKind::CharData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlEntity {
    pub kind: XmlEntityKind,
    pub name_data: String,
    pub attributes: Attributes,
}

impl XmlEntity {
    pub fn start(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            kind: XmlEntityKind::StartElement,
            name_data: name.into(),
            attributes,
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        Self {
            kind: XmlEntityKind::EndElement,
            name_data: name.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn char_data(text: impl Into<String>) -> Self {
        Self {
            kind: XmlEntityKind::CharData,
            name_data: text.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }
}

enum Step {
    Start(XmlEntity),
    Empty(XmlEntity),
    End(String),
    Text(String),
    Eof,
    Skip,
}

pub struct XmlReader<S: DataSource> {
    reader: Reader<BufReader<SourceReader<S>>>,
    buf: Vec<u8>,
    pending: VecDeque<XmlEntity>,
    text: String,
    open: Vec<String>,
    finished: bool,
}

impl<S: DataSource> XmlReader<S> {
    pub fn new(source: S) -> Self {
        let reader = Reader::from_reader(BufReader::new(SourceReader { source }));
        Self {
            reader,
            buf: Vec::new(),
            pending: VecDeque::new(),
            text: String::new(),
            open: Vec::new(),
            finished: false,
        }
    }

    /// True once the input is exhausted and every entity has been returned.
    pub fn end(&self) -> bool {
        self.finished && self.pending.is_empty()
    }

    /// Returns the next entity, or `None` at end of input.
    ///
    /// Adjacent text and CDATA sections come back as a single `CharData` entity.
    /// With `skip_cdata` set, character data is dropped.
    pub fn read_entity(&mut self, skip_cdata: bool) -> Result<Option<XmlEntity>, XmlError> {
        loop {
            if let Some(entity) = self.pending.pop_front() {
                if skip_cdata && entity.kind == XmlEntityKind::CharData {
                    continue;
                }
                return Ok(Some(entity));
            }
            if self.finished {
                return Ok(None);
            }
            self.advance()?;
        }
    }

    fn advance(&mut self) -> Result<(), XmlError> {
        let position = self.reader.buffer_position();
        let step = match self.reader.read_event_into(&mut self.buf) {
            Ok(event) => convert(event, position),
            Err(quick_xml::Error::Io(err)) => {
                self.finished = true;
                Err(XmlError::Source(unshare(err)))
            }
            Err(err) => Err(syntax(position, err)),
        };
        self.buf.clear();
        let step = step.inspect_err(|err| {
            tracing::warn!(%err, "xml reader stopped");
        })?;

        match step {
            Step::Text(text) => self.text.push_str(&text),
            Step::Start(entity) => {
                self.flush_text();
                self.open.push(entity.name_data.clone());
                self.pending.push_back(entity);
            }
            Step::Empty(entity) => {
                self.flush_text();
                let name = entity.name_data.clone();
                self.pending.push_back(entity);
                self.pending.push_back(XmlEntity::end(name));
            }
            Step::End(name) => {
                self.flush_text();
                match self.open.pop() {
                    Some(open) if open == name => {}
                    Some(open) => {
                        return Err(XmlError::Syntax {
                            position,
                            message: format!("expected </{open}>, found </{name}>"),
                        });
                    }
                    None => {
                        return Err(XmlError::Syntax {
                            position,
                            message: format!("unexpected </{name}>"),
                        });
                    }
                }
                self.pending.push_back(XmlEntity::end(name));
            }
            Step::Eof => {
                self.flush_text();
                self.finished = true;
                if let Some(open) = self.open.last() {
                    return Err(XmlError::Syntax {
                        position,
                        message: format!("input ended inside <{open}>"),
                    });
                }
            }
            Step::Skip => {}
        }
        Ok(())
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.pending.push_back(XmlEntity::char_data(text));
        }
    }
}

fn convert(event: Event<'_>, position: usize) -> Result<Step, XmlError> {
    match event {
        Event::Start(start) => Ok(Step::Start(start_entity(&start, position)?)),
        Event::Empty(start) => Ok(Step::Empty(start_entity(&start, position)?)),
        Event::End(end) => Ok(Step::End(utf8(end.name().as_ref())?)),
        Event::Text(text) => {
            let text = text.unescape().map_err(|err| syntax(position, err))?;
            Ok(Step::Text(text.into_owned()))
        }
        Event::CData(cdata) => Ok(Step::Text(utf8(&cdata.into_inner())?)),
        Event::Eof => Ok(Step::Eof),
        _ => Ok(Step::Skip),
    }
}

fn start_entity(start: &BytesStart<'_>, position: usize) -> Result<XmlEntity, XmlError> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| syntax(position, err))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(|err| syntax(position, err))?;
        attributes.insert(key, value.into_owned());
    }
    Ok(XmlEntity::start(name, attributes))
}

fn utf8(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|err| XmlError::Encoding(err.to_string()))
}

fn unshare(err: Arc<io::Error>) -> io::Error {
    Arc::try_unwrap(err).unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string()))
}

fn syntax(position: usize, err: impl std::fmt::Display) -> XmlError {
    XmlError::Syntax {
        position,
        message: err.to_string(),
    }
}
