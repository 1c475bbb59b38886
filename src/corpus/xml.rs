//! Minimal element tree and entity handling for entity-XML corpora.
//!
//! Records are small (one dictionary entry, one character, one diagram), so each
//! one is parsed into an owned [`Element`] tree with quick-xml and then queried
//! by tag name. Text that fails to unescape is logged and dropped for that
//! element only; the rest of the record still decodes.

use crate::types::{LexiconError, Result, Tag};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Parsed markup element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written (e.g. `keb`, `svg`)
    pub name: String,
    /// Attributes as written, qualified names included (e.g. `kvg:element`)
    pub attributes: Vec<(String, String)>,
    /// Trimmed text content, `None` when empty or undecodable
    pub text: Option<String>,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    /// Parse one record into an element tree.
    ///
    /// # Arguments
    ///
    /// * `bytes` - UTF-8 markup with exactly one root element
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::MalformedRecord` if the bytes are not UTF-8, have no
    /// root or leave elements unclosed, and `LexiconError::XmlError` on syntax errors
    pub fn parse(bytes: &[u8]) -> Result<Element> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| LexiconError::malformed(format!("record is not UTF-8: {}", e)))?;
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<(Element, String)> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => {
                    stack.push((start_element(e), String::new()));
                }
                Event::Empty(ref e) => {
                    attach(&mut stack, &mut root, start_element(e));
                }
                Event::Text(ref e) => {
                    if let Some((element, buf)) = stack.last_mut() {
                        match e.unescape() {
                            Ok(unescaped) => buf.push_str(&unescaped),
                            Err(err) => tracing::warn!(
                                element = %element.name,
                                error = %err,
                                "Dropping undecodable text"
                            ),
                        }
                    }
                }
                Event::CData(e) => {
                    if let Some((_, buf)) = stack.last_mut() {
                        buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(_) => {
                    if let Some((mut element, buf)) = stack.pop() {
                        let trimmed = buf.trim();
                        if !trimmed.is_empty() {
                            element.text = Some(trimmed.to_string());
                        }
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((open, _)) = stack.last() {
            return Err(LexiconError::malformed(format!("unclosed <{}>", open.name)));
        }

        root.ok_or_else(|| LexiconError::malformed("no root element"))
    }

    /// Get attribute value by qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All elements with the given name in document order, `self` included.
    pub fn descendants(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        let mut stack = vec![self];

        while let Some(element) = stack.pop() {
            if element.name == name {
                found.push(element);
            }
            stack.extend(element.children.iter().rev());
        }

        found
    }

    /// Text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text of every descendant with the given name, skipping empty ones.
    pub fn texts(&self, name: &str) -> Vec<String> {
        self.descendants(name)
            .into_iter()
            .filter_map(|e| e.text().map(str::to_string))
            .collect()
    }
}

fn start_element(e: &BytesStart<'_>) -> Element {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        match attr {
            Ok(attr) => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                match attr.unescape_value() {
                    Ok(value) => attributes.push((key, value.into_owned())),
                    Err(err) => tracing::warn!(element = %name, attribute = %key, error = %err, "Dropping undecodable attribute"),
                }
            }
            Err(err) => tracing::warn!(element = %name, error = %err, "Dropping malformed attribute"),
        }
    }

    Element {
        name,
        attributes,
        ..Element::default()
    }
}

fn attach(stack: &mut [(Element, String)], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some((parent, _)) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Entity declarations captured from a corpus preamble.
///
/// JMdict-style corpora declare `<!ENTITY code "description">` once and then
/// reference `&code;` inside records. Before a record is parsed, references to
/// declared codes are replaced by the bare code, which is later resolved back to
/// a [`Tag`] so callers always see both code and description.
#[derive(Debug, Default)]
pub struct EntityTable {
    expansions: HashMap<String, String>,
    reference: Option<BytesRegex>,
}

impl EntityTable {
    /// Build a table from captured declarations.
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::RegexError` if the reference pattern cannot be compiled
    pub fn new(expansions: HashMap<String, String>) -> Result<Self> {
        if expansions.is_empty() {
            return Ok(Self::default());
        }

        let mut codes: Vec<&str> = expansions.keys().map(String::as_str).collect();
        codes.sort_unstable();
        let alternation = codes
            .iter()
            .map(|code| regex::escape(code))
            .collect::<Vec<_>>()
            .join("|");
        let reference = BytesRegex::new(&format!("&({});", alternation))?;

        Ok(Self {
            expansions,
            reference: Some(reference),
        })
    }

    /// Parse an `<!ENTITY code "description">` declaration line.
    ///
    /// # Returns
    ///
    /// `(code, description)`, or `None` if the line is not a well-formed declaration
    pub fn parse_declaration(line: &str) -> Option<(String, String)> {
        static DECLARATION: OnceLock<Regex> = OnceLock::new();
        let pattern = DECLARATION.get_or_init(|| {
            Regex::new(r#"^<!ENTITY (\S+?) "(.*?)""#).expect("entity declaration pattern is valid")
        });

        let caps = pattern.captures(line)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    /// Replace every `&code;` reference to a declared code with `code`.
    pub fn substitute<'a>(&self, bytes: &'a [u8]) -> Cow<'a, [u8]> {
        match &self.reference {
            Some(reference) => reference.replace_all(bytes, &b"$1"[..]),
            None => Cow::Borrowed(bytes),
        }
    }

    /// Description declared for a code.
    pub fn describe(&self, code: &str) -> Option<&str> {
        self.expansions.get(code).map(String::as_str)
    }

    /// Resolve a code into a tag.
    pub fn tag(&self, code: &str) -> Option<Tag> {
        self.describe(code).map(|description| Tag {
            code: code.to_string(),
            description: description.to_string(),
        })
    }

    /// Number of declared codes.
    pub fn len(&self) -> usize {
        self.expansions.len()
    }

    /// Check if no codes were declared.
    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }
}
