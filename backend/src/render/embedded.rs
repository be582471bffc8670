//! Layout with genpdf and a TTF family loaded from disk.

use crate::error::RenderError;
use crate::render::blocks::{Block, TextSegment, TextStyle};
use genpdf::elements::{Break, LinearLayout, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator};

const BODY_FONT_SIZE: u8 = 11;

pub fn render(
    family: FontFamily<FontData>,
    title: &str,
    blocks: &[Block],
) -> Result<Vec<u8>, RenderError> {
    let mut doc = configure_document(family, title);

    for block in blocks {
        match block {
            Block::Heading { level, .. } => {
                doc.push(Break::new(0.5));
                // Headings are bold whatever the inline styles inside them.
                let style = Style::new().bold().with_font_size(heading_size(*level));
                doc.push(Paragraph::new(StyledString::new(block.plain_text(), style)));
                doc.push(Break::new(0.3));
            }
            Block::Paragraph(segments) => {
                let mut p = Paragraph::new("");
                push_segments_into_paragraph(&mut p, segments);
                doc.push(p);
            }
            Block::ListItem { marker, segments } => {
                let mut p = Paragraph::new("");
                p.push(StyledString::new(format!("{marker} "), Style::new()));
                push_segments_into_paragraph(&mut p, segments);
                let mut layout = LinearLayout::vertical();
                layout.push(p);
                doc.push(layout);
            }
            Block::Rule => doc.push(Break::new(1)),
        }
    }

    let mut bytes = Vec::new();
    doc.render(&mut bytes)?;
    Ok(bytes)
}

fn configure_document(family: FontFamily<FontData>, title: &str) -> Document {
    let mut doc = Document::new(family);
    doc.set_title(title);
    doc.set_font_size(BODY_FONT_SIZE);
    doc.set_line_spacing(1.25);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(20);
    doc.set_page_decorator(decorator);
    doc
}

fn heading_size(level: u8) -> u8 {
    match level {
        1 => 20,
        2 => 16,
        3 => 14,
        _ => 12,
    }
}

fn push_segments_into_paragraph(p: &mut Paragraph, segments: &[TextSegment]) {
    for seg in segments {
        let style = match seg.style {
            TextStyle::Regular => Style::new(),
            TextStyle::Bold => Style::new().bold(),
            TextStyle::Italic => Style::new().italic(),
            TextStyle::BoldItalic => Style::new().bold().italic(),
        };
        p.push(StyledString::new(seg.text.clone(), style));
    }
}
