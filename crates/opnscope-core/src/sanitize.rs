//! Streaming XML sanitizer.
//!
//! Rewrites a configuration stream, replacing sensitive leaf values by
//! category while preserving the XML structure — elements, attributes,
//! ordering, comments, and inter-element whitespace pass through
//! untouched. Memory stays bounded on large configurations: the input is
//! never materialized, only the element-name stack and the [`Mapper`] grow.
mod classify;
mod mapper;


pub use mapper::{Mapper, REDACTED};

use std::fmt;
use std::io::{BufRead, Write};

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::deadline::{Deadline, DeadlineExceeded};
use crate::enums::{Category, SanitizeMode};
use crate::normalize::{canonical_ip, normalize_hostname, normalize_mac, normalize_whitespace};
use crate::parse::ParseError;

use classify::Classifier;

/// How often the event loop checks the deadline.
const DEADLINE_CHECK_INTERVAL: usize = 512;

/// Options for one sanitization run.
#[derive(Debug, Clone, Copy)]
pub struct SanitizeOptions {
    /// Redaction strength.
    pub mode: SanitizeMode,
    /// Optional generator seed; recorded in the mapper JSON when set.
    pub seed: Option<u64>,
}

/// Counters exposed after a completed run.
///
/// `total_fields` counts every non-whitespace text leaf examined.
/// `redacted_fields` counts leaves that were replaced. `skipped_fields`
/// counts leaves that classified into a sensitive category which the active
/// mode's policy does not redact — leaves that never classify only appear
/// in `total_fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SanitizeStats {
    /// Text leaves examined.
    pub total_fields: usize,
    /// Leaves replaced with redacted values.
    pub redacted_fields: usize,
    /// Leaves classified but preserved by mode policy.
    pub skipped_fields: usize,
}

/// The result of a successful sanitization pass.
#[derive(Debug)]
pub struct SanitizeOutcome {
    /// Field counters.
    pub stats: SanitizeStats,
    /// The mapper, ready for serialization.
    pub mapper: Mapper,
}

/// Failure of the sanitizer.
#[derive(Debug)]
pub enum SanitizeError {
    /// The input is not well-formed XML.
    Parse(ParseError),
    /// A classification pattern failed to compile.
    Pattern(regex::Error),
    /// Reading the input or writing the output failed.
    Io {
        /// The underlying error message.
        detail: String,
    },
    /// The per-invocation deadline expired.
    Cancelled(DeadlineExceeded),
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => e.fmt(f),
            Self::Pattern(e) => write!(f, "classification pattern failed to compile: {e}"),
            Self::Io { detail } => write!(f, "I/O error during sanitization: {detail}"),
            Self::Cancelled(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SanitizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Pattern(e) => Some(e),
            Self::Cancelled(e) => Some(e),
            Self::Io { .. } => None,
        }
    }
}

impl From<DeadlineExceeded> for SanitizeError {
    fn from(e: DeadlineExceeded) -> Self {
        Self::Cancelled(e)
    }
}

/// Sanitizes an XML stream from `reader` into `writer`.
///
/// The pass is single-shot and strictly streaming: events are read,
/// possibly rewritten, and emitted in order. Each non-whitespace text leaf
/// is classified (element name first, then value shape, then parent path);
/// leaves whose category the mode redacts are replaced through the
/// [`Mapper`], which guarantees that one original value maps to exactly one
/// redacted value for the whole document.
///
/// # Errors
///
/// - [`SanitizeError::Parse`] for malformed XML, an empty stream, or a root
///   element other than `opnsense` (line numbers are best effort).
/// - [`SanitizeError::Io`] when reading or writing fails.
/// - [`SanitizeError::Cancelled`] when the deadline expires.
pub fn sanitize<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    options: &SanitizeOptions,
    deadline: &Deadline,
) -> Result<SanitizeOutcome, SanitizeError> {
    let classifier = Classifier::new().map_err(SanitizeError::Pattern)?;
    let mut mapper = Mapper::new(options.mode, options.seed);
    let mut stats = SanitizeStats::default();

    let mut xml_reader = Reader::from_reader(reader);
    let mut xml_writer = Writer::new(writer);

    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut line = 1usize;
    let mut buf: Vec<u8> = Vec::new();
    let mut events_since_check = 0usize;

    loop {
        events_since_check += 1;
        if events_since_check >= DEADLINE_CHECK_INTERVAL {
            events_since_check = 0;
            deadline.check()?;
        }

        buf.clear();
        let event = xml_reader
            .read_event_into(&mut buf)
            .map_err(|e| read_error(e, line))?;

        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                line += count_newlines(&start);
                check_root(&mut saw_root, &stack, &name, line)?;
                stack.push(name);
                xml_writer
                    .write_event(Event::Start(start))
                    .map_err(write_error)?;
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                line += count_newlines(&start);
                check_root(&mut saw_root, &stack, &name, line)?;
                xml_writer
                    .write_event(Event::Empty(start))
                    .map_err(write_error)?;
            }
            Event::End(end) => {
                if stack.pop().is_none() {
                    return Err(SanitizeError::Parse(ParseError {
                        line,
                        message: "closing tag without matching opening tag".to_owned(),
                    }));
                }
                // Section boundary: cheap place for a deadline check.
                if stack.len() <= 1 {
                    deadline.check()?;
                }
                xml_writer
                    .write_event(Event::End(end))
                    .map_err(write_error)?;
            }
            Event::Text(text) => {
                line += count_newlines(&text);
                // Entity references arrive as separate GeneralRef events,
                // so the text bytes here are literal content.
                let content = String::from_utf8_lossy(&text).into_owned();
                if content.trim().is_empty() || stack.is_empty() {
                    xml_writer
                        .write_event(Event::Text(text))
                        .map_err(write_error)?;
                    continue;
                }
                let replaced = examine_leaf(
                    &classifier,
                    &mut mapper,
                    &mut stats,
                    options.mode,
                    &stack,
                    content.trim(),
                );
                match replaced {
                    Some(redacted) => {
                        xml_writer
                            .write_event(Event::Text(BytesText::new(&redacted)))
                            .map_err(write_error)?;
                    }
                    None => {
                        xml_writer
                            .write_event(Event::Text(text))
                            .map_err(write_error)?;
                    }
                }
            }
            Event::CData(cdata) => {
                let raw = String::from_utf8_lossy(&cdata).into_owned();
                line += raw.bytes().filter(|b| *b == b'\n').count();
                if raw.trim().is_empty() || stack.is_empty() {
                    xml_writer
                        .write_event(Event::CData(cdata))
                        .map_err(write_error)?;
                    continue;
                }
                let replaced = examine_leaf(
                    &classifier,
                    &mut mapper,
                    &mut stats,
                    options.mode,
                    &stack,
                    raw.trim(),
                );
                match replaced {
                    Some(redacted) => {
                        xml_writer
                            .write_event(Event::Text(BytesText::new(&redacted)))
                            .map_err(write_error)?;
                    }
                    None => {
                        xml_writer
                            .write_event(Event::CData(cdata))
                            .map_err(write_error)?;
                    }
                }
            }
            Event::GeneralRef(reference) => {
                xml_writer
                    .write_event(Event::GeneralRef(reference))
                    .map_err(write_error)?;
            }
            Event::Decl(decl) => {
                xml_writer
                    .write_event(Event::Decl(decl))
                    .map_err(write_error)?;
            }
            Event::Comment(comment) => {
                line += count_newlines(&comment);
                xml_writer
                    .write_event(Event::Comment(comment))
                    .map_err(write_error)?;
            }
            Event::PI(pi) => {
                xml_writer
                    .write_event(Event::PI(pi))
                    .map_err(write_error)?;
            }
            Event::DocType(doctype) => {
                xml_writer
                    .write_event(Event::DocType(doctype))
                    .map_err(write_error)?;
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(SanitizeError::Parse(ParseError {
            line,
            message: format!("unclosed element '{open}'"),
        }));
    }
    if !saw_root {
        return Err(SanitizeError::Parse(ParseError {
            line: 1,
            message: "empty document: no root element".to_owned(),
        }));
    }

    Ok(SanitizeOutcome { stats, mapper })
}

/// Classifies one leaf and applies the mode policy, updating the counters.
///
/// Returns the redacted replacement, or `None` when the leaf passes
/// through.
fn examine_leaf(
    classifier: &Classifier,
    mapper: &mut Mapper,
    stats: &mut SanitizeStats,
    mode: SanitizeMode,
    stack: &[String],
    value: &str,
) -> Option<String> {
    stats.total_fields += 1;
    let (element, parents) = stack.split_last()?;
    let category = classifier.classify(element, parents, value)?;
    if !mode.redacts(category) {
        stats.skipped_fields += 1;
        return None;
    }
    stats.redacted_fields += 1;
    Some(mapper.redact(category, &normalize_for(category, value)))
}

/// Normalizes a value into the canonical form used to key the mapper, so
/// textual variants of the same value share one replacement.
fn normalize_for(category: Category, value: &str) -> String {
    match category {
        Category::PublicIp | Category::PrivateIp => {
            canonical_ip(value).unwrap_or_else(|| value.trim().to_owned())
        }
        Category::Mac => normalize_mac(value),
        Category::Hostname | Category::Domain | Category::Email => normalize_hostname(value),
        Category::Username => value.trim().to_owned(),
        Category::Password | Category::Secret | Category::PrivateKey | Category::Certificate => {
            normalize_whitespace(value)
        }
    }
}

/// Enforces the single-`opnsense`-root rule while streaming.
fn check_root(
    saw_root: &mut bool,
    stack: &[String],
    name: &str,
    line: usize,
) -> Result<(), SanitizeError> {
    if !stack.is_empty() {
        return Ok(());
    }
    if *saw_root {
        return Err(SanitizeError::Parse(ParseError {
            line,
            message: "multiple root elements".to_owned(),
        }));
    }
    if name != "opnsense" {
        return Err(SanitizeError::Parse(ParseError {
            line,
            message: format!("invalid root element '{name}': expected 'opnsense'"),
        }));
    }
    *saw_root = true;
    Ok(())
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|b| **b == b'\n').count()
}

fn read_error(error: quick_xml::Error, line: usize) -> SanitizeError {
    match error {
        quick_xml::Error::Io(e) => SanitizeError::Io {
            detail: e.to_string(),
        },
        other => SanitizeError::Parse(ParseError {
            line,
            message: other.to_string(),
        }),
    }
}

fn write_error(error: std::io::Error) -> SanitizeError {
    SanitizeError::Io {
        detail: error.to_string(),
    }
}
