//! RSS and Atom entry extraction.
//!
//! A feed document is read into a small owned element tree with resolved
//! namespaces, then every RSS `item` and Atom `entry` is turned into a
//! [`RawEntry`]. Fields are picked with ordered tag-preference lists: the
//! first candidate child whose text is non-empty wins.
//!
//! # Field sources
//!
//! | Field | Candidates (in order) |
//! |-------|-----------------------|
//! | title | `title`, `atom:title` |
//! | link | `link` (href, then text), then `atom:link` with `rel="alternate"` or no `rel`, then the first `atom:link` |
//! | date | `pubDate`, `atom:updated`, `atom:published`, `updated`, `published` |
//! | summary | `description`, `summary`, `atom:summary`, `content`, `content:encoded` |
//!
//! A document that fails to parse contributes no entries.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use std::error::Error;
use tracing::{debug, instrument, warn};

use crate::dates::parse_date;
use crate::models::RawEntry;
use crate::utils::{strip_html, truncate, truncate_for_log};

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Maximum summary length in characters, before the ellipsis.
pub const MAX_SUMMARY_LENGTH: usize = 200;

/// Title used when an entry has none.
pub const TITLE_PLACEHOLDER: &str = "未命名标题";
/// Summary used when an entry has none.
pub const SUMMARY_PLACEHOLDER: &str = "暂无摘要";

/// A namespace-qualified element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    ns: Option<&'static str>,
    local: &'static str,
}

impl Tag {
    /// An element outside any namespace.
    pub const fn plain(local: &'static str) -> Self {
        Self { ns: None, local }
    }

    /// An element in the Atom namespace.
    pub const fn atom(local: &'static str) -> Self {
        Self { ns: Some(ATOM_NS), local }
    }

    /// An element in the RSS content module namespace.
    pub const fn content(local: &'static str) -> Self {
        Self { ns: Some(CONTENT_NS), local }
    }
}

const ITEM: Tag = Tag::plain("item");
const ENTRY: Tag = Tag::atom("entry");
const LINK: Tag = Tag::plain("link");
const ATOM_LINK: Tag = Tag::atom("link");

const TITLE_TAGS: &[Tag] = &[Tag::plain("title"), Tag::atom("title")];
const DATE_TAGS: &[Tag] = &[
    Tag::plain("pubDate"),
    Tag::atom("updated"),
    Tag::atom("published"),
    Tag::plain("updated"),
    Tag::plain("published"),
];
const SUMMARY_TAGS: &[Tag] = &[
    Tag::plain("description"),
    Tag::plain("summary"),
    Tag::atom("summary"),
    Tag::plain("content"),
    Tag::content("encoded"),
];

/// One element of the parsed document.
///
/// `text` holds only the character data that precedes the first child
/// element, which is where feeds put field values.
#[derive(Debug, Default)]
struct Element {
    ns: Option<String>,
    local: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn matches(&self, tag: Tag) -> bool {
        self.local == tag.local && self.ns.as_deref() == tag.ns
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given name.
    fn child(&self, tag: Tag) -> Option<&Element> {
        self.children.iter().find(|c| c.matches(tag))
    }

    /// All matching elements below this one, in document order.
    fn descendants<'a>(&'a self, tag: Tag, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.matches(tag) {
                out.push(child);
            }
            child.descendants(tag, out);
        }
    }

    fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// Text of the first candidate child that has non-empty text, or `""`.
///
/// Only the first child of each candidate name is considered, mirroring a
/// plain "find child by name" lookup.
fn first_text<'a>(element: &'a Element, tags: &[Tag]) -> &'a str {
    tags.iter()
        .filter_map(|tag| element.child(*tag))
        .map(Element::trimmed_text)
        .find(|text| !text.is_empty())
        .unwrap_or("")
}

/// `href` if present and non-empty, else the element text.
fn link_target(link: &Element) -> &str {
    match link.attr("href").map(str::trim) {
        Some(href) if !href.is_empty() => href,
        _ => link.trimmed_text(),
    }
}

/// Resolve an entry link.
///
/// The plain RSS `link` wins. Otherwise the Atom `link` with `rel="alternate"`
/// (or no `rel`) is preferred, falling back to the first Atom `link`.
fn entry_link(element: &Element) -> String {
    if let Some(link) = element.child(LINK) {
        let target = link_target(link);
        if !target.is_empty() {
            return target.to_string();
        }
    }

    let atom_links: Vec<&Element> = element
        .children
        .iter()
        .filter(|c| c.matches(ATOM_LINK))
        .collect();
    atom_links
        .iter()
        .find(|l| matches!(l.attr("rel"), None | Some("alternate")))
        .or_else(|| atom_links.first())
        .map(|l| link_target(l).to_string())
        .unwrap_or_default()
}

fn to_raw_entry(element: &Element, source: &str) -> RawEntry {
    let title = match first_text(element, TITLE_TAGS) {
        "" => TITLE_PLACEHOLDER,
        title => title,
    };
    let summary_raw = match first_text(element, SUMMARY_TAGS) {
        "" => SUMMARY_PLACEHOLDER,
        summary => summary,
    };

    RawEntry {
        title: title.to_string(),
        link: entry_link(element),
        source: source.to_string(),
        published_at: parse_date(first_text(element, DATE_TAGS)),
        summary: truncate(&strip_html(summary_raw), MAX_SUMMARY_LENGTH),
    }
}

/// Parse a feed document into raw entries.
///
/// RSS `item` elements come first, then Atom `entry` elements, each group in
/// document order. Unparseable input yields an empty vector.
#[instrument(level = "info", skip(xml), fields(bytes = xml.len()))]
pub fn parse_feed(xml: &str, source: &str) -> Vec<RawEntry> {
    match read_document(xml) {
        Ok(root) => {
            let mut elements = Vec::new();
            root.descendants(ITEM, &mut elements);
            root.descendants(ENTRY, &mut elements);

            let entries: Vec<RawEntry> = elements
                .into_iter()
                .map(|element| to_raw_entry(element, source))
                .collect();
            debug!(count = entries.len(), "Parsed feed entries");
            entries
        }
        Err(e) => {
            warn!(
                error = %e,
                preview = %truncate_for_log(xml.trim_start(), 120),
                "Feed is not well-formed XML; skipping"
            );
            Vec::new()
        }
    }
}

/// Read the whole document into an element tree.
fn read_document(xml: &str) -> Result<Element, Box<dyn Error>> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(start)) => {
                stack.push(open_element(ns, &start)?);
            }
            (ns, Event::Empty(start)) => {
                let element = open_element(ns, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::End(_)) => {
                let element = stack.pop().ok_or("unexpected closing tag")?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::Text(text)) => append_text(&mut stack, &unescape_lossy(&text)),
            (_, Event::CData(data)) => append_text(&mut stack, &String::from_utf8_lossy(&data)),
            (_, Event::GeneralRef(reference)) => {
                let name = String::from_utf8_lossy(&reference);
                append_text(&mut stack, &unescape_lossy(format!("&{name};").as_bytes()));
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(format!("document ended with {} unclosed element(s)", stack.len()).into());
    }
    root.ok_or_else(|| "document has no root element".into())
}

fn open_element(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Element, Box<dyn Error>> {
    let ns = match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(format!("unbound prefix {:?}", String::from_utf8_lossy(&prefix)).into());
        }
    };

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        attrs.push((key, unescape_lossy(&attr.value)));
    }

    Ok(Element {
        ns,
        local: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attrs,
        ..Element::default()
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), Box<dyn Error>> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err("content after the document element".into()),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        if current.children.is_empty() {
            current.text.push_str(text);
        }
    }
}

/// Decode and unescape character data; unknown entities are kept verbatim.
fn unescape_lossy(bytes: &[u8]) -> String {
    let raw = String::from_utf8_lossy(bytes);
    unescape(&raw)
        .map(|text| text.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
