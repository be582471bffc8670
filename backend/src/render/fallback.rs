//! Font-free rendering with printpdf's builtin Helvetica.
//!
//! Helvetica only covers Latin-1, so text is transliterated to ASCII first
//! (NFKD, combining marks stripped, everything else non-ASCII dropped). The
//! text is laid out line by line as written; Markdown is only interpreted
//! when an embedded font is available.

use crate::error::RenderError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::io::BufWriter;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 20.0;
const LINE_HEIGHT_MM: f64 = 6.0;
const FONT_SIZE: u8 = 11;
/// Characters per line at 11pt Helvetica inside the margins.
pub const WRAP_WIDTH: usize = 90;

/// Unicode NFKD, drop combining marks, drop what is still not ASCII.
pub fn transliterate(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect()
}

/// Break `text` into lines of at most `width` characters at word boundaries.
/// Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while let Some((split, _)) = word.char_indices().nth(width) {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (head, tail) = word.split_at(split);
            lines.push(head.to_string());
            word = tail;
        }
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The printable lines of raw `text`: every source line is transliterated
/// and wrapped on its own, blank source lines are kept.
pub fn layout(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source in text.lines() {
        let wrapped = wrap(&transliterate(source), width);
        if wrapped.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrapped);
        }
    }
    lines
}

/// Write `text` as is, without Markdown interpretation, so every ASCII
/// character of the input reaches the page.
pub fn render(title: &str, text: &str) -> Result<Vec<u8>, RenderError> {
    let (doc, page, layer) = PdfDocument::new(
        transliterate(title),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1".to_string(),
    );
    let font: IndirectFontRef = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;

    let mut current: PdfLayerReference = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    for line in layout(text, WRAP_WIDTH) {
        if y < MARGIN_MM {
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                "Layer 1".to_string(),
            );
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        if !line.is_empty() {
            current.use_text(line, FONT_SIZE.into(), Mm(MARGIN_MM), Mm(y), &font);
        }
        y -= LINE_HEIGHT_MM;
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).map_err(pdf_error)?;
    writer
        .into_inner()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn pdf_error<E: std::fmt::Debug>(e: E) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Content;
    use lopdf::{Document, Object};
    use pretty_assertions::assert_eq;

    /// Every string shown with `Tj`, page by page.
    fn shown_text(pdf: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(pdf).unwrap();
        let mut shown = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            for op in content.operations.iter().filter(|op| op.operator == "Tj") {
                for operand in &op.operands {
                    if let Object::String(bytes, _) = operand {
                        shown.push(String::from_utf8_lossy(bytes).into_owned());
                    }
                }
            }
        }
        shown
    }

    #[test]
    fn transliteration_strips_accents_and_non_latin() {
        assert_eq!(transliterate("Café naïve"), "Cafe naive");
        assert_eq!(transliterate("数学 Algebra ①"), " Algebra 1");
        assert!(transliterate("课程大纲").is_empty());
    }

    #[test]
    fn wrapping_keeps_every_word() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let lines = wrap(text, 16);
        assert!(lines.iter().all(|l| l.len() <= 16));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(wrap("abcdefghij xy", 4), vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn markup_characters_are_laid_out_verbatim() {
        let text = "# Title\n\nUse a <div> element; compute 2*3*4 and __init__ or **x** \
                    [docs](http://a.b) \\o/\n- item";
        let lines = layout(text, 30);
        let words: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
        assert_eq!(words, text.split_whitespace().collect::<Vec<_>>());
        assert_eq!(lines[0], "# Title");
        assert_eq!(lines[1], "");
    }

    #[test]
    fn ascii_text_round_trips_through_the_pdf() {
        let text = "Use a <div> element; compute 2*3*4 and __init__ or **x** \
                    [docs](http://a.b) \\o/\n\n1. first\n2. second (a+b)^2";
        let bytes = render("Round trip", text).unwrap();

        let shown = shown_text(&bytes);
        let words: Vec<&str> = shown.iter().flat_map(|l| l.split_whitespace()).collect();
        assert_eq!(words, text.split_whitespace().collect::<Vec<_>>());
    }

    #[test]
    fn long_text_continues_on_new_pages() {
        let text = (0..200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let bytes = render("Long", &text).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1);
        assert_eq!(shown_text(&bytes).len(), 200);
    }

    #[test]
    fn non_latin_text_renders_without_its_glyphs() {
        let text = "# 第一章 函数\n\n函数是数学的基础。Functions are basic.";
        let lines = layout(text, WRAP_WIDTH);
        assert!(lines.iter().all(|l| l.is_ascii()));
        assert!(lines.iter().any(|l| l.contains("Functions are basic.")));

        let bytes = render("课程", text).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(shown_text(&bytes).iter().all(|l| l.is_ascii()));
    }
}
