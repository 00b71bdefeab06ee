// src/ingest/parse.rs
//! RSS 2.0 / RSS 1.0 (RDF) / Atom documents → `RawFeedItem`s.
//!
//! Elements are matched on (namespace, local name), so `media:title` never
//! shadows `title` and a feed may bind the Media RSS namespace to any prefix.
//! Undeclared `media:`/`dc:`/`content:` prefixes are still recognised.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::OnceCell;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use regex::Regex;

use crate::ingest::types::{MediaRef, RawFeedItem};

/// Nesting allowed below an item before the document is rejected.
const MAX_ITEM_DEPTH: usize = 32;

const NS_RSS1: &[u8] = b"http://purl.org/rss/1.0";
const NS_ATOM: &[u8] = b"http://www.w3.org/2005/Atom";
const NS_MEDIA: &[u8] = b"http://search.yahoo.com/mrss";
const NS_DC: &[u8] = b"http://purl.org/dc/elements/1.1";
const NS_CONTENT: &[u8] = b"http://purl.org/rss/1.0/modules/content";

/// XML vocabularies a feed item draws from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Vocab {
    /// No namespace, or the RSS 1.0 default namespace.
    #[default]
    Core,
    Atom,
    Media,
    Dc,
    Content,
    Other,
}

const RSS: &[Vocab] = &[Vocab::Core];
const ATOM: &[Vocab] = &[Vocab::Atom, Vocab::Core];
const MEDIA: &[Vocab] = &[Vocab::Media];
const DC: &[Vocab] = &[Vocab::Dc];
const CONTENT: &[Vocab] = &[Vocab::Content];

fn vocab(ns: &ResolveResult<'_>) -> Vocab {
    match ns {
        ResolveResult::Unbound => Vocab::Core,
        ResolveResult::Bound(Namespace(uri)) => {
            let uri: &[u8] = uri;
            // some publishers drop the trailing slash
            let uri = uri.strip_suffix(b"/").unwrap_or(uri);
            match uri {
                NS_RSS1 => Vocab::Core,
                NS_ATOM => Vocab::Atom,
                NS_MEDIA => Vocab::Media,
                NS_DC => Vocab::Dc,
                NS_CONTENT => Vocab::Content,
                _ => Vocab::Other,
            }
        }
        ResolveResult::Unknown(prefix) => match prefix.as_slice() {
            b"media" => Vocab::Media,
            b"dc" => Vocab::Dc,
            b"content" => Vocab::Content,
            b"atom" => Vocab::Atom,
            _ => Vocab::Other,
        },
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Rss,
    Rdf,
    Atom,
}

impl Format {
    fn from_root(local: &[u8]) -> Option<Self> {
        match local {
            b"rss" => Some(Self::Rss),
            b"RDF" => Some(Self::Rdf),
            b"feed" => Some(Self::Atom),
            _ => None,
        }
    }

    fn is_item(self, v: Vocab, local: &[u8]) -> bool {
        match self {
            // RSS 1.0 puts items next to the channel, RSS 2.0 inside it; both are found.
            Self::Rss | Self::Rdf => v == Vocab::Core && local == b"item",
            Self::Atom => ATOM.contains(&v) && local == b"entry",
        }
    }

    fn map(self, node: &Node) -> RawFeedItem {
        match self {
            Self::Rss | Self::Rdf => from_rss_item(node),
            Self::Atom => from_atom_entry(node),
        }
    }
}

/// One element of an item subtree.
#[derive(Debug, Default)]
struct Node {
    vocab: Vocab,
    name: String,
    attrs: Vec<(String, String)>,
    /// Text and CDATA of this element and everything below it.
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn children<'a>(
        &'a self,
        vocabs: &'a [Vocab],
        name: &'a str,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.children
            .iter()
            .filter(move |c| c.name == name && vocabs.contains(&c.vocab))
    }

    /// Trimmed text of the first matching child that has any.
    fn text_of(&self, vocabs: &[Vocab], name: &str) -> Option<String> {
        self.children(vocabs, name)
            .map(|c| c.text.trim())
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a feed document. The format is picked from the root element.
pub fn parse_feed(xml: &str) -> Result<Vec<RawFeedItem>> {
    let xml = scrub_html_entities_for_xml(xml);
    let mut reader = NsReader::from_str(&xml);

    let format = loop {
        match reader.read_event().context("reading feed root")? {
            Event::Start(e) => break root_format(&e)?,
            Event::Empty(e) => {
                root_format(&e)?;
                return Ok(Vec::new());
            }
            Event::Eof => bail!("empty feed document"),
            _ => {}
        }
    };

    let mut items = Vec::new();
    let mut depth = 1usize;
    while depth > 0 {
        let (v, event) = next_event(&mut reader)?;
        match event {
            Event::Start(e) if format.is_item(v, e.local_name().as_ref()) => {
                let node = read_node(&mut reader, v, &e, false, 0)?;
                items.push(format.map(&node));
            }
            Event::Empty(e) if format.is_item(v, e.local_name().as_ref()) => {
                let node = read_node(&mut reader, v, &e, true, 0)?;
                items.push(format.map(&node));
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => bail!("truncated feed document"),
            _ => {}
        }
    }
    Ok(items)
}

fn next_event<'i>(reader: &mut NsReader<&'i [u8]>) -> Result<(Vocab, Event<'i>)> {
    let (ns, event) = reader.read_resolved_event().context("reading feed xml")?;
    Ok((vocab(&ns), event))
}

fn root_format(root: &BytesStart<'_>) -> Result<Format> {
    match Format::from_root(root.local_name().as_ref()) {
        Some(f) => Ok(f),
        None => bail!(
            "feed not recognized: root element <{}>",
            String::from_utf8_lossy(root.name().as_ref())
        ),
    }
}

/// Read the element `start` opened (already consumed) down to its end tag.
fn read_node(
    reader: &mut NsReader<&[u8]>,
    vocab_of_start: Vocab,
    start: &BytesStart<'_>,
    empty: bool,
    depth: usize,
) -> Result<Node> {
    if depth > MAX_ITEM_DEPTH {
        bail!("feed item nested too deeply");
    }

    let mut node = Node {
        vocab: vocab_of_start,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attrs: start
            .attributes()
            .flatten()
            .filter_map(|a| {
                let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
                let value = a.unescape_value().ok()?.trim().to_string();
                Some((key, value))
            })
            .collect(),
        ..Node::default()
    };
    if empty {
        return Ok(node);
    }

    loop {
        let (v, event) = next_event(reader)?;
        match event {
            Event::Start(e) => {
                let child = read_node(reader, v, &e, false, depth + 1)?;
                node.text.push_str(&child.text);
                node.children.push(child);
            }
            Event::Empty(e) => node.children.push(read_node(reader, v, &e, true, depth + 1)?),
            Event::Text(t) => node.text.push_str(&text_content(&t)),
            Event::CData(c) => node.text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(_) => return Ok(node),
            Event::Eof => bail!("truncated feed document"),
            _ => {}
        }
    }
}

fn text_content(t: &BytesText<'_>) -> String {
    match t.unescape() {
        Ok(s) => s.into_owned(),
        // an HTML entity the scrub list doesn't know
        Err(_) => html_escape::decode_html_entities(&String::from_utf8_lossy(t)).into_owned(),
    }
}

fn from_rss_item(item: &Node) -> RawFeedItem {
    let pub_date = item
        .text_of(RSS, "pubDate")
        .or_else(|| item.text_of(DC, "date"));
    let description = item.text_of(RSS, "description");

    RawFeedItem {
        guid: item.text_of(RSS, "guid"),
        link: item.text_of(RSS, "link"),
        title: item.text_of(RSS, "title"),
        iso_date: pub_date.as_deref().and_then(to_iso_date),
        pub_date,
        content_snippet: description.as_deref().map(html_to_snippet),
        content: description,
        content_encoded: item.text_of(CONTENT, "encoded"),
        enclosures: url_refs(item.children(RSS, "enclosure"), "url"),
        media_content: media_refs(item, "content"),
        media_thumbnail: media_refs(item, "thumbnail"),
    }
}

fn from_atom_entry(entry: &Node) -> RawFeedItem {
    let links: Vec<&Node> = entry.children(ATOM, "link").collect();
    let link = links
        .iter()
        .find(|l| matches!(l.attr("rel"), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.attr("href"))
        .map(str::to_string);
    let enclosures = url_refs(
        links
            .iter()
            .copied()
            .filter(|l| l.attr("rel") == Some("enclosure")),
        "href",
    );

    let pub_date = entry
        .text_of(ATOM, "published")
        .or_else(|| entry.text_of(ATOM, "updated"));
    let content = entry
        .text_of(ATOM, "content")
        .or_else(|| entry.text_of(ATOM, "summary"));

    RawFeedItem {
        guid: entry.text_of(ATOM, "id"),
        link,
        title: entry.text_of(ATOM, "title").map(|t| html_to_snippet(&t)),
        iso_date: pub_date.as_deref().and_then(to_iso_date),
        pub_date,
        content_snippet: content.as_deref().map(html_to_snippet),
        content,
        content_encoded: None,
        enclosures,
        media_content: media_refs(entry, "content"),
        media_thumbnail: media_refs(entry, "thumbnail"),
    }
}

/// Direct `media:<name>` children first, then those inside `media:group`.
fn media_refs(item: &Node, name: &str) -> Vec<MediaRef> {
    let direct = item.children(MEDIA, name);
    let grouped = item
        .children(MEDIA, "group")
        .flat_map(move |g| g.children(MEDIA, name));
    url_refs(direct.chain(grouped), "url")
}

fn url_refs<'a>(nodes: impl IntoIterator<Item = &'a Node>, attr: &str) -> Vec<MediaRef> {
    nodes
        .into_iter()
        .map(|n| MediaRef {
            url: n.attr(attr).map(str::to_string),
        })
        .collect()
}

/// RFC 2822 (RSS) or RFC 3339 (Atom, dc:date) → `2025-05-01T10:00:00.000Z`.
pub fn to_iso_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| {
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        })
}

/// Strip tags, decode entities, collapse whitespace.
pub fn html_to_snippet(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)<[^>]+>").expect("tag regex"));
    let out = re_tags.replace_all(s, " ");

    let out = html_escape::decode_html_entities(&out);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// XML only knows five named entities; feeds use HTML ones anyway.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
