//! Buffered XML parsing into the typed [`Document`] model.
//!
//! This is the parser used by the display, diff, and audit paths. It reads
//! the whole input, builds a lightweight element tree, checks the root
//! element, and binds the tree into a [`Document`]. Syntactic faults
//! surface as [`ParseError`] with a line number; semantic constraints are
//! only enforced on the [`parse_and_validate`] path so the tool can still
//! read real-world configurations that trip schema checks.
//!
//! The sanitizer deliberately does not use this module — it re-reads the
//! stream event-by-event so memory stays bounded on large configurations.
mod bind;


use std::fmt;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::model::Document;
use crate::validation::{ValidationError, validate_document};

/// A syntactic XML fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line of the fault, best effort (line 1 for an empty stream).
    pub line: usize,
    /// Short human-readable description.
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Failure of the combined parse-and-validate path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The input is not well-formed XML.
    Parse(ParseError),
    /// The input parsed but violates semantic constraints.
    Validation(Vec<ValidationError>),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => e.fmt(f),
            Self::Validation(errors) => {
                write!(f, "validation failed with {} error(s)", errors.len())?;
                if let Some(first) = errors.first() {
                    write!(f, ": {first}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<ParseError> for DocumentError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

/// A node in the lightweight element tree the binder works from.
///
/// Only what the binder needs: element name, attributes, children in
/// document order, and the concatenated text of direct text nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Element name as written (no namespace handling; `config.xml` uses none).
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
    /// Concatenated, trimmed text content of direct text nodes.
    pub text: String,
}

impl XmlElement {
    /// Returns the first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns all child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the trimmed text of the first child with the given name.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Returns the value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parses an OPNsense configuration document.
///
/// # Errors
///
/// [`ParseError`] for syntactic faults: empty stream, malformed XML,
/// a root element other than `opnsense`, or trailing content after the
/// root element. Semantic constraints are not enforced here.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    let root = parse_tree(input)?;
    Ok(bind::bind_document(&root))
}

/// Parses and then semantically validates a configuration document.
///
/// # Errors
///
/// - [`DocumentError::Parse`] when the input is not well-formed XML.
/// - [`DocumentError::Validation`] with every semantic violation found —
///   the validator never fails fast.
pub fn parse_and_validate(input: &str) -> Result<Document, DocumentError> {
    let document = parse(input)?;
    let errors = validate_document(&document);
    if errors.is_empty() {
        Ok(document)
    } else {
        Err(DocumentError::Validation(errors))
    }
}

/// Parses the input into an element tree rooted at `opnsense`.
///
/// # Errors
///
/// [`ParseError`] for any syntactic fault; see [`parse`].
pub fn parse_tree(input: &str) -> Result<XmlElement, ParseError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let pos = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(ParseError::new(
                        line_at(input, pos),
                        "multiple root elements",
                    ));
                }
                stack.push(element_from_start(input, pos, &start)?);
            }
            Ok(Event::Empty(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(ParseError::new(
                        line_at(input, pos),
                        "multiple root elements",
                    ));
                }
                let element = element_from_start(input, pos, &start)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    return Err(ParseError::new(
                        line_at(input, pos),
                        "closing tag without matching opening tag",
                    ));
                };
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(text)) => {
                // Entity references arrive as separate GeneralRef events,
                // so the text bytes here are literal content.
                let content = String::from_utf8_lossy(&text).into_owned();
                append_text(input, pos, &mut stack, &content)?;
            }
            Ok(Event::CData(cdata)) => {
                let content = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                append_text(input, pos, &mut stack, &content)?;
            }
            Ok(Event::GeneralRef(reference)) => {
                let resolved = resolve_reference(&reference).ok_or_else(|| {
                    ParseError::new(
                        line_at(input, pos),
                        format!(
                            "unresolvable entity reference '&{};'",
                            String::from_utf8_lossy(&reference)
                        ),
                    )
                })?;
                append_text(input, pos, &mut stack, &resolved)?;
            }
            Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::new(line_at(input, pos), e.to_string()));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::new(
            line_at(input, input.len()),
            format!("unclosed element '{}'", open.name),
        ));
    }

    let Some(root) = root else {
        return Err(ParseError::new(1, "empty document: no root element"));
    };

    if root.name != "opnsense" {
        return Err(ParseError::new(
            1,
            format!("invalid root element '{}': expected 'opnsense'", root.name),
        ));
    }

    Ok(root)
}

/// Builds an [`XmlElement`] from a start tag, decoding its attributes.
fn element_from_start(
    input: &str,
    pos: usize,
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<XmlElement, ParseError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            ParseError::new(line_at(input, pos), format!("bad attribute: {e}"))
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| {
                ParseError::new(line_at(input, pos), format!("bad attribute value: {e}"))
            })?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Attaches a completed element to its parent, or records it as the root.
fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

/// Appends text content to the innermost open element.
///
/// Non-whitespace text outside any element is a syntactic fault (the reader
/// trims whitespace-only text, so anything arriving here is meaningful).
fn append_text(
    input: &str,
    pos: usize,
    stack: &mut [XmlElement],
    content: &str,
) -> Result<(), ParseError> {
    let Some(open) = stack.last_mut() else {
        if content.trim().is_empty() {
            return Ok(());
        }
        return Err(ParseError::new(
            line_at(input, pos),
            "text content outside root element",
        ));
    };
    open.text.push_str(content);
    Ok(())
}

/// Resolves a predefined or numeric character reference.
fn resolve_reference(reference: &[u8]) -> Option<String> {
    match reference {
        b"amp" => Some("&".to_owned()),
        b"lt" => Some("<".to_owned()),
        b"gt" => Some(">".to_owned()),
        b"quot" => Some("\"".to_owned()),
        b"apos" => Some("'".to_owned()),
        numeric if numeric.first() == Some(&b'#') => {
            let body = &numeric[1..];
            let code = if body.first() == Some(&b'x') || body.first() == Some(&b'X') {
                u32::from_str_radix(std::str::from_utf8(&body[1..]).ok()?, 16).ok()?
            } else {
                std::str::from_utf8(body).ok()?.parse::<u32>().ok()?
            };
            char::from_u32(code).map(String::from)
        }
        _ => None,
    }
}

/// Returns the 1-based line number of a byte offset.
fn line_at(input: &str, byte_pos: usize) -> usize {
    let clamped = byte_pos.min(input.len());
    input.as_bytes()[..clamped]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}
