//! Markdown -> HTML -> flat list of printable blocks.
//!
//! The HTML produced by pulldown-cmark is walked tag by tag. Block tags
//! (headings, paragraphs, list items, table rows, rules) open and close
//! blocks; `<strong>`/`<b>` and `<em>`/`<i>` switch the style of the text
//! segments inside them. Anything else is ignored.

use pulldown_cmark::{html, Options, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl TextStyle {
    fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => TextStyle::Regular,
            (true, false) => TextStyle::Bold,
            (false, true) => TextStyle::Italic,
            (true, true) => TextStyle::BoldItalic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, segments: Vec<TextSegment> },
    Paragraph(Vec<TextSegment>),
    /// `marker` is `•` for unordered lists and `N.` for ordered ones.
    ListItem { marker: String, segments: Vec<TextSegment> },
    Rule,
}

impl Block {
    pub fn segments(&self) -> &[TextSegment] {
        match self {
            Block::Heading { segments, .. }
            | Block::Paragraph(segments)
            | Block::ListItem { segments, .. } => segments,
            Block::Rule => &[],
        }
    }

    pub fn plain_text(&self) -> String {
        self.segments().iter().map(|s| s.text.as_str()).collect()
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    html_to_blocks(&markdown_to_html(markdown))
}

pub fn html_to_blocks(html: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            match after.find('>') {
                Some(end) => {
                    builder.tag(&after[..end]);
                    rest = &after[end + 1..];
                }
                None => {
                    builder.text(rest);
                    break;
                }
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            builder.text(&rest[..end]);
            rest = &rest[end..];
        }
    }

    builder.finish()
}

enum PendingKind {
    Heading(u8),
    Paragraph,
    ListItem(String),
}

struct Pending {
    kind: PendingKind,
    segments: Vec<TextSegment>,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    current: Option<Pending>,
    bold: usize,
    italic: usize,
    /// One entry per open list: `None` for `<ul>`, the last number for `<ol>`.
    lists: Vec<Option<usize>>,
    in_pre: bool,
}

impl BlockBuilder {
    fn tag(&mut self, raw: &str) {
        let closing = raw.starts_with('/');
        let body = raw.trim_start_matches('/');
        let name = body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match (name.as_str(), closing) {
            ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", false) => {
                let level = name[1..].parse().unwrap_or(1);
                self.start(PendingKind::Heading(level));
            }
            ("p", false) => {
                // Loose list items wrap their text in <p>.
                let in_empty_item = matches!(
                    &self.current,
                    Some(Pending { kind: PendingKind::ListItem(_), segments }) if segments.is_empty()
                );
                if !in_empty_item {
                    self.start(PendingKind::Paragraph);
                }
            }
            ("li", false) => {
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        *n += 1;
                        format!("{n}.")
                    }
                    _ => "•".to_string(),
                };
                self.start(PendingKind::ListItem(marker));
            }
            ("ul", false) => {
                self.flush();
                self.lists.push(None);
            }
            ("ol", false) => {
                self.flush();
                let start = attribute(body, "start")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1);
                self.lists.push(Some(start.saturating_sub(1)));
            }
            ("ul" | "ol", true) => {
                self.flush();
                self.lists.pop();
            }
            ("strong" | "b", false) => self.bold += 1,
            ("strong" | "b", true) => self.bold = self.bold.saturating_sub(1),
            ("em" | "i", false) => self.italic += 1,
            ("em" | "i", true) => self.italic = self.italic.saturating_sub(1),
            ("hr", _) => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            ("br", _) => self.start(PendingKind::Paragraph),
            ("pre", false) => {
                self.in_pre = true;
                self.start(PendingKind::Paragraph);
            }
            ("pre", true) => {
                self.flush();
                self.in_pre = false;
            }
            ("tr", false) => self.start(PendingKind::Paragraph),
            ("td" | "th", false) => {
                if self.current.as_ref().is_some_and(|p| !p.segments.is_empty()) {
                    self.push_text(" | ");
                }
            }
            ("p" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "tr" | "blockquote", true)
            | ("blockquote", false) => self.flush(),
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        let decoded = decode_entities(raw);
        if self.in_pre {
            for (i, line) in decoded.split('\n').enumerate() {
                if i > 0 {
                    self.start(PendingKind::Paragraph);
                }
                self.push_text(line);
            }
            return;
        }

        let block_is_empty = self
            .current
            .as_ref()
            .map_or(true, |p| p.segments.is_empty());
        if block_is_empty && decoded.trim().is_empty() {
            return;
        }
        self.push_text(&decoded.replace('\n', " "));
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let style = TextStyle::from_flags(self.bold > 0, self.italic > 0);
        let pending = self.current.get_or_insert_with(|| Pending {
            kind: PendingKind::Paragraph,
            segments: Vec::new(),
        });
        match pending.segments.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => pending.segments.push(TextSegment {
                text: text.to_string(),
                style,
            }),
        }
    }

    fn start(&mut self, kind: PendingKind) {
        self.flush();
        self.current = Some(Pending {
            kind,
            segments: Vec::new(),
        });
    }

    fn flush(&mut self) {
        let Some(mut pending) = self.current.take() else {
            return;
        };
        if let Some(first) = pending.segments.first_mut() {
            first.text = first.text.trim_start().to_string();
        }
        if let Some(last) = pending.segments.last_mut() {
            last.text = last.text.trim_end().to_string();
        }
        pending.segments.retain(|s| !s.text.is_empty());
        if pending.segments.iter().all(|s| s.text.trim().is_empty()) {
            return;
        }

        let segments = pending.segments;
        self.blocks.push(match pending.kind {
            PendingKind::Heading(level) => Block::Heading { level, segments },
            PendingKind::Paragraph => Block::Paragraph(segments),
            PendingKind::ListItem(marker) => Block::ListItem { marker, segments },
        });
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

fn attribute<'a>(tag_body: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = tag_body.find(&needle)? + needle.len();
    let len = tag_body[start..].find('"')?;
    Some(&tag_body[start..start + len])
}

/// Decode the entities pulldown-cmark emits plus numeric references.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| entity(&candidate[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
