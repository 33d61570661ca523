//! RSS normalization
//!
//! Turns an RSS (or minimal Atom) document into panel records. This is a pure
//! mapping step: no I/O, no markup scrubbing. The description keeps whatever
//! markup the feed embedded; stripping it is the renderer's job.
//!
//! Each `<item>` (or `<entry>`) becomes a record with these fields:
//!
//! | Field | From | Default |
//! |---|---|---|
//! | `title` | `<title>` | `"No title"` |
//! | `description` | `<description>` / `<summary>` | `"No description"` |
//! | `date` | `<pubDate>` / `<published>` / `<updated>`, as `%d %b %Y, %H:%M` | `"Unknown date"` |
//! | `link` | `<link>` text or `href` | `"#"` |
//! | `image` | first `<img src="...">` inside the description | `null` |

use std::sync::OnceLock;

use chrono::DateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use thiserror::Error;

use crate::record::Record;

/// Default number of items kept from a feed
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Display format for item dates
pub const DATE_FORMAT: &str = "%d %b %Y, %H:%M";

/// Why a document could not be normalized
#[derive(Debug, Error)]
pub enum RssError {
    /// The XML itself is malformed
    #[error("invalid XML at byte {position}: {reason}")]
    Xml {
        /// Reader position when the error was hit
        position: u64,
        /// Parser message
        reason: String,
    },

    /// Well-formed XML, but not a feed
    #[error("not an RSS document (root element: {0})")]
    NotAFeed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Date,
    Link,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"description" | b"summary" => Some(Self::Description),
            b"pubDate" | b"published" | b"updated" => Some(Self::Date),
            b"link" => Some(Self::Link),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ItemFields {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    link: Option<String>,
}

impl ItemFields {
    /// First occurrence wins, matching how feed readers pick `<title>[0]`
    fn set(&mut self, field: Field, value: String) {
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Date => &mut self.date,
            Field::Link => &mut self.link,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn into_record(self) -> Record {
        let description = self
            .description
            .unwrap_or_else(|| "No description".to_string());
        let image = extract_image(&description);
        let date = self
            .date
            .map_or_else(|| "Unknown date".to_string(), |d| format_date(&d));

        Record::new()
            .with("title", self.title.unwrap_or_else(|| "No title".to_string()))
            .with("description", description)
            .with("date", date)
            .with("link", self.link.unwrap_or_else(|| "#".to_string()))
            .with("image", image)
    }
}

fn is_root(name: &[u8]) -> bool {
    matches!(name, b"rss" | b"RDF" | b"feed")
}

fn is_item(name: &[u8]) -> bool {
    matches!(name, b"item" | b"entry")
}

fn href_of(element: &BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"href")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn img_src_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<img[^>]+src="([^">]+)""#).expect("valid img src regex"))
}

/// First `<img src="...">` URL embedded in a text field
#[must_use]
pub fn extract_image(text: &str) -> Option<String> {
    img_src_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Reformat an RFC 2822 / RFC 3339 date for display
///
/// Unparseable input is returned unchanged.
#[must_use]
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map_or_else(|_| raw.to_string(), |d| d.format(DATE_FORMAT).to_string())
}

/// Parse a feed document into at most `max_items` records
///
/// # Errors
///
/// Returns `RssError::Xml` for malformed XML and `RssError::NotAFeed` when
/// the root element is not `rss`, `RDF` or `feed`.
pub fn parse_feed(xml: &str, max_items: usize) -> Result<Vec<Record>, RssError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut saw_root = false;
    let mut depth = 0usize;
    let mut item: Option<(ItemFields, usize)> = None;
    let mut field: Option<(Field, usize)> = None;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| RssError::Xml {
            position: reader.error_position(),
            reason: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                let name = name.as_ref();

                if depth == 1 {
                    if !is_root(name) {
                        return Err(RssError::NotAFeed(
                            String::from_utf8_lossy(name).into_owned(),
                        ));
                    }
                    saw_root = true;
                } else if item.is_none() && is_item(name) {
                    item = Some((ItemFields::default(), depth));
                } else if let Some((fields, _)) = item.as_mut() {
                    if field.is_none() {
                        if let Some(f) = Field::from_name(name) {
                            if f == Field::Link {
                                if let Some(href) = href_of(&e) {
                                    fields.set(Field::Link, href);
                                }
                            }
                            field = Some((f, depth));
                            text.clear();
                        }
                    }
                }
            }
            Event::Empty(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if depth == 0 {
                    if !is_root(name) {
                        return Err(RssError::NotAFeed(
                            String::from_utf8_lossy(name).into_owned(),
                        ));
                    }
                    saw_root = true;
                } else if let Some((fields, _)) = item.as_mut() {
                    if name == b"link" {
                        if let Some(href) = href_of(&e) {
                            fields.set(Field::Link, href);
                        }
                    }
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    match t.unescape() {
                        Ok(s) => text.push_str(&s),
                        Err(_) => text.push_str(&String::from_utf8_lossy(t.as_ref())),
                    }
                }
            }
            Event::CData(c) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => {
                if let Some((f, field_depth)) = field {
                    if field_depth == depth {
                        if let Some((fields, _)) = item.as_mut() {
                            fields.set(f, text.trim().to_string());
                        }
                        field = None;
                        text.clear();
                    }
                }

                let closes_item = matches!(item, Some((_, d)) if d == depth)
                    && is_item(e.local_name().as_ref());
                if closes_item {
                    if let Some((fields, _)) = item.take() {
                        if records.len() < max_items {
                            records.push(fields.into_record());
                        }
                    }
                    if records.len() >= max_items {
                        break;
                    }
                }

                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(RssError::NotAFeed("none".to_string()));
    }

    Ok(records)
}
