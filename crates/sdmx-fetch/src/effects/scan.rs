use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::{Element, FooterScanner, MarkupEvent};
use crate::error::{Error, Result};

struct XmlElement<'a, 'b> {
    start: &'a BytesStart<'b>,
    prefix: Option<&'a str>,
    local_name: &'a str,
}

impl<'a, 'b> XmlElement<'a, 'b> {
    fn new(start: &'a BytesStart<'b>) -> std::result::Result<Self, std::str::Utf8Error> {
        let name = start.name();
        let prefix = name
            .prefix()
            .map(|p| std::str::from_utf8(p.into_inner()))
            .transpose()?;
        let local_name = std::str::from_utf8(name.local_name().into_inner())?;
        Ok(Self {
            start,
            prefix,
            local_name,
        })
    }
}

impl Element for XmlElement<'_, '_> {
    fn prefix(&self) -> Option<&str> {
        self.prefix
    }

    fn local_name(&self) -> &str {
        self.local_name
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.start
            .try_get_attribute(name)
            .ok()
            .flatten()
            .and_then(|attr| attr.unescape_value().ok())
            .map(Cow::into_owned)
    }
}

/// Look for a deferred-result poll URL in the document at `path`.
///
/// Blocking; reads the file as a stream of events and stops at the first
/// poll URL, so large payloads are never held in memory.
pub fn scan_file(path: &Path) -> Result<Option<String>> {
    let file = File::open(path).map_err(Error::io(path))?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);
    scan_reader(reader, path)
}

pub(crate) async fn scan_file_blocking(path: PathBuf) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || scan_file(&path)).await?
}

fn scan_reader<R: BufRead>(mut reader: Reader<R>, path: &Path) -> Result<Option<String>> {
    let malformed = |message: String| Error::Malformed {
        path: path.to_path_buf(),
        message,
    };

    let mut scanner = FooterScanner::new();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            malformed(format!("{e} at byte {}", reader.error_position()))
        })?;

        match event {
            // Names that are not UTF-8 cannot be footer or text elements.
            Event::Start(start) => {
                if let Ok(element) = XmlElement::new(&start) {
                    scanner.feed(MarkupEvent::Start(&element));
                }
            }
            Event::Empty(start) => {
                if let Ok(element) = XmlElement::new(&start) {
                    scanner.feed(MarkupEvent::Start(&element));
                    scanner.feed(MarkupEvent::<XmlElement>::End);
                }
            }
            Event::End(_) => scanner.feed(MarkupEvent::<XmlElement>::End),
            // Payload text may use any declared encoding; only the poll URL
            // candidate is decoded.
            Event::Text(text) if scanner.wants_text() => {
                let text = text.unescape().map_err(|e| malformed(e.to_string()))?;
                scanner.feed(MarkupEvent::<XmlElement>::Text(&text));
            }
            Event::CData(data) if scanner.wants_text() => {
                let raw = data.into_inner();
                let text = std::str::from_utf8(&raw).map_err(|e| malformed(e.to_string()))?;
                scanner.feed(MarkupEvent::<XmlElement>::Text(text));
            }
            Event::Eof => break,
            _ => {}
        }

        if let Some(url) = scanner.poll_url() {
            return Ok(Some(url.to_owned()));
        }
        buf.clear();
    }

    Ok(None)
}
