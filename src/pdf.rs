use crate::canvas::{Command, Document, Page};
use crate::font::Base14Font;
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::types::{Color, Pt, Size};
use fixed::types::I32F32;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub title: Option<String>,
    pub producer: String,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            title: None,
            producer: "homeready".to_string(),
        }
    }
}

const PDF_HEADER: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const RESOURCES_ID: usize = 3;
const FIRST_FONT_ID: usize = 4;

struct FontResource {
    resource: String,
    object_id: usize,
}

struct PdfStreamWriter<'a, W: Write> {
    writer: &'a mut W,
    offset: usize,
    offsets: Vec<usize>,
    hasher: Sha256,
    page_content_bytes: Vec<usize>,
    replaced_glyphs: usize,
}

impl<'a, W: Write> PdfStreamWriter<'a, W> {
    fn new(writer: &'a mut W, object_count: usize) -> io::Result<Self> {
        let mut out = Self {
            writer,
            offset: 0,
            offsets: vec![0; object_count + 1],
            hasher: Sha256::new(),
            page_content_bytes: Vec::new(),
            replaced_glyphs: 0,
        };
        write_bytes(out.writer, PDF_HEADER, &mut out.offset)?;
        Ok(out)
    }

    fn object(&mut self, obj_id: usize, body: &str) -> io::Result<()> {
        self.hasher.update(body.as_bytes());
        write_pdf_object(
            self.writer,
            &mut self.offset,
            &mut self.offsets,
            obj_id,
            body,
        )
    }

    fn finish(self, info_id: usize) -> io::Result<usize> {
        let PdfStreamWriter {
            writer,
            mut offset,
            offsets,
            hasher,
            ..
        } = self;
        let id = hex_digest(&hasher.finalize());

        let xref_start = offset;
        write_str(writer, &format!("xref\n0 {}\n", offsets.len()), &mut offset)?;
        write_str(writer, "0000000000 65535 f \n", &mut offset)?;
        for entry in offsets.iter().skip(1) {
            write_str(writer, &format!("{:010} 00000 n \n", entry), &mut offset)?;
        }
        let trailer = format!(
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R /ID [<{}> <{}>] >>\nstartxref\n{}\n%%EOF\n",
            offsets.len(),
            CATALOG_ID,
            info_id,
            id,
            id,
            xref_start
        );
        write_str(writer, &trailer, &mut offset)?;
        writer.flush()?;
        Ok(offset)
    }
}

/// Serializes `document` into `writer` and returns the number of bytes written.
///
/// Output depends only on the document and options, so the same input always
/// produces identical bytes.
pub fn write_pdf<W: Write>(
    document: &Document,
    options: &PdfOptions,
    writer: &mut W,
    metrics: Option<&mut DocumentMetrics>,
) -> io::Result<usize> {
    let fonts = collect_used_font_names(document);
    let font_map = build_font_map(&fonts);
    let page_count = document.pages.len();
    let first_page_object = FIRST_FONT_ID + fonts.len();
    // Each page owns a content stream followed by its page dictionary.
    let page_ids: Vec<usize> = (0..page_count)
        .map(|index| first_page_object + index * 2 + 1)
        .collect();
    let info_id = first_page_object + page_count * 2;

    let mut pdf = PdfStreamWriter::new(writer, info_id)?;

    pdf.object(
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID),
    )?;
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");
    pdf.object(
        PAGES_ID,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids, page_count
        ),
    )?;
    let resource_entries = font_map
        .values()
        .map(|font| (font.resource.clone(), font.object_id))
        .collect::<Vec<_>>();
    pdf.object(
        RESOURCES_ID,
        &format!("<< /Font {} >>", font_resources(&resource_entries)),
    )?;
    for (name, font) in &font_map {
        pdf.object(font.object_id, &font_object(name))?;
    }

    for (index, page) in document.pages.iter().enumerate() {
        let content_id = first_page_object + index * 2;
        let (content, replaced) = render_page(page, document.page_size.height, &font_map);
        pdf.replaced_glyphs += replaced;
        pdf.page_content_bytes.push(content.len());
        pdf.object(content_id, &stream_object(&content))?;
        pdf.object(
            page_ids[index],
            &page_object(document.page_size, content_id),
        )?;
    }

    pdf.object(info_id, &info_object(options))?;

    if pdf.replaced_glyphs > 0 {
        warn!(
            replaced = pdf.replaced_glyphs,
            "characters outside WinAnsi were replaced"
        );
    }
    let page_content_bytes = std::mem::take(&mut pdf.page_content_bytes);
    let total_bytes = pdf.finish(info_id)?;
    debug!(pages = page_count, bytes = total_bytes, "pdf written");

    if let Some(metrics) = metrics {
        metrics.total_bytes = total_bytes;
        for (page_index, content_bytes) in page_content_bytes.iter().enumerate() {
            if metrics.pages.len() <= page_index {
                metrics
                    .pages
                    .resize_with(page_index + 1, PageMetrics::default);
            }
            let entry = &mut metrics.pages[page_index];
            if entry.page_number == 0 {
                entry.page_number = page_index + 1;
            }
            entry.content_bytes = *content_bytes;
        }
    }

    Ok(total_bytes)
}

pub fn document_to_pdf(document: &Document, options: &PdfOptions) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_pdf(document, options, &mut bytes, None)?;
    Ok(bytes)
}

fn collect_used_font_names(document: &Document) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for page in &document.pages {
        // The canvas resets to Helvetica at every page boundary.
        let mut current_font = "Helvetica".to_string();
        for cmd in &page.commands {
            match cmd {
                Command::SetFontName(name) => current_font = name.clone(),
                Command::DrawString { .. } => {
                    names.insert(current_font.clone());
                }
                _ => {}
            }
        }
    }
    names
}

fn build_font_map(fonts: &BTreeSet<String>) -> BTreeMap<String, FontResource> {
    fonts
        .iter()
        .enumerate()
        .map(|(index, name)| {
            (
                name.clone(),
                FontResource {
                    resource: format!("F{}", index + 1),
                    object_id: FIRST_FONT_ID + index,
                },
            )
        })
        .collect()
}

fn font_object(name: &str) -> String {
    let base = Base14Font::from_name(name)
        .map(|font| font.pdf_name().to_string())
        .unwrap_or_else(|| sanitize_font_name(name));
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base
    )
}

fn font_resources(fonts: &[(String, usize)]) -> String {
    let mut entries = Vec::new();
    for (resource, font_id) in fonts {
        entries.push(format!("/{} {} 0 R", resource, font_id));
    }
    format!("<< {} >>", entries.join(" "))
}

fn sanitize_font_name(name: &str) -> String {
    let mut out = String::new();
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
        } else if ch == ' ' {
            out.push('-');
        }
    }
    if out.is_empty() {
        "Helvetica".to_string()
    } else {
        out
    }
}

fn page_object(page_size: Size, content_id: usize) -> String {
    format!(
        "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources {} 0 R /Contents {} 0 R >>",
        PAGES_ID,
        fmt_pt(page_size.width),
        fmt_pt(page_size.height),
        RESOURCES_ID,
        content_id
    )
}

// Returns the content stream and the count of characters replaced during encoding.
fn render_page(
    page: &Page,
    page_height: Pt,
    font_map: &BTreeMap<String, FontResource>,
) -> (String, usize) {
    let mut out = String::new();
    let mut replaced = 0usize;
    let mut current_font_size = Pt::from_f32(12.0);
    let mut current_font_name = "Helvetica".to_string();

    for cmd in &page.commands {
        match cmd {
            Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
            Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetFontName(name) => {
                current_font_name = name.clone();
            }
            Command::SetFontSize(size) => {
                current_font_size = *size;
            }
            Command::MoveTo { x, y } => {
                out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::LineTo { x, y } => {
                out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::Stroke => out.push_str("S\n"),
            Command::DrawString { x, y, text } => {
                let resource = font_map
                    .get(&current_font_name)
                    .map(|v| v.resource.as_str())
                    .unwrap_or("F1");
                let encoded = encode_winansi_pdf_string(text);
                replaced += encoded.replaced;
                out.push_str("BT\n");
                out.push_str(&format!("/{} {} Tf\n", resource, fmt_pt(current_font_size)));
                out.push_str(&format!(
                    "{} {} Td\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - current_font_size)
                ));
                out.push_str(&format!("({}) Tj\n", encoded.text));
                out.push_str("ET\n");
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nf\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::StrokeRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nS\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
        }
    }

    (out, replaced)
}

fn stream_object(content: &str) -> String {
    let length = content.len();
    format!("<< /Length {} >>\nstream\n{}\nendstream", length, content)
}

fn info_object(options: &PdfOptions) -> String {
    let mut entries: Vec<String> = Vec::new();
    if let Some(title) = options.title.as_deref() {
        entries.push(format!(
            "/Title ({})",
            encode_winansi_pdf_string(title).text
        ));
    }
    entries.push(format!(
        "/Producer ({})",
        escape_pdf_string(&options.producer)
    ));
    format!("<< {} >>", entries.join(" "))
}

fn write_pdf_object<W: Write>(
    writer: &mut W,
    offset: &mut usize,
    offsets: &mut [usize],
    obj_id: usize,
    body: &str,
) -> io::Result<()> {
    if let Some(slot) = offsets.get_mut(obj_id) {
        *slot = *offset;
    }
    write_str(writer, &format!("{} 0 obj\n", obj_id), offset)?;
    write_bytes(writer, body.as_bytes(), offset)?;
    write_bytes(writer, b"\nendobj\n", offset)?;
    Ok(())
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn write_str<W: Write>(writer: &mut W, data: &str, offset: &mut usize) -> io::Result<()> {
    write_bytes(writer, data.as_bytes(), offset)
}

fn hex_digest(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn escape_pdf_string(input: &str) -> String {
    let mut out = String::new();
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

struct WinAnsiEncoded {
    text: String,
    replaced: usize,
}

fn encode_winansi_pdf_string(input: &str) -> WinAnsiEncoded {
    let mut out = String::new();
    let mut replaced = 0usize;
    for ch in input.chars() {
        match ch {
            '\u{2265}' => {
                out.push_str(">=");
                continue;
            }
            '\u{2264}' => {
                out.push_str("<=");
                continue;
            }
            _ => {}
        }

        let byte = match ch {
            '\u{0000}'..='\u{007F}' => ch as u8,
            '\u{00A0}'..='\u{00FF}' => ch as u8,
            // cp1252 extensions
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => {
                replaced += 1;
                b'?'
            }
        };

        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if !(0x20..0x7f).contains(&b) => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }

    WinAnsiEncoded {
        text: out,
        replaced,
    }
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    let milli: i64 = scaled.to_num();
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        format!("{}{}", sign, int_part)
    } else {
        let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
        while s.ends_with('0') {
            s.pop();
        }
        s
    }
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn color_to_pdf_fill(color: Color) -> String {
    format!("{} {} {} rg\n", fmt(color.r), fmt(color.g), fmt(color.b))
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!("{} {} {} RG\n", fmt(color.r), fmt(color.g), fmt(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn sample_document() -> Document {
        let mut canvas = Canvas::new(Size::letter());
        canvas.set_fill_color(Color::rgb8(37, 99, 235));
        canvas.draw_rect(
            Pt::from_f32(54.0),
            Pt::from_f32(54.0),
            Pt::from_f32(100.0),
            Pt::from_f32(20.0),
        );
        canvas.set_font_name("Helvetica-Bold");
        canvas.draw_string(Pt::from_f32(54.0), Pt::from_f32(54.0), "Home (Ready)");
        canvas.show_page();
        canvas.draw_string(Pt::from_f32(54.0), Pt::from_f32(54.0), "page two");
        canvas.finish()
    }

    #[test]
    fn format_milli_trims_trailing_zeros() {
        assert_eq!(format_milli(0), "0");
        assert_eq!(format_milli(12_000), "12");
        assert_eq!(format_milli(12_500), "12.5");
        assert_eq!(format_milli(-1_250), "-1.25");
        assert_eq!(fmt(0.5), "0.5");
    }

    #[test]
    fn winansi_escapes_delimiters_and_replaces_unsupported() {
        let encoded = encode_winansi_pdf_string("(a\\b) caf\u{e9} \u{2713}");
        assert_eq!(encoded.text, "\\(a\\\\b\\) caf\\351 ?");
        assert_eq!(encoded.replaced, 1);
        assert_eq!(encode_winansi_pdf_string("\u{2264}3").text, "<=3");
    }

    #[test]
    fn render_page_flips_y_axis() {
        let mut canvas = Canvas::new(Size::letter());
        canvas.draw_rect(
            Pt::from_f32(10.0),
            Pt::from_f32(20.0),
            Pt::from_f32(30.0),
            Pt::from_f32(40.0),
        );
        canvas.draw_string(Pt::from_f32(10.0), Pt::from_f32(20.0), "x");
        let document = canvas.finish();
        let font_map = build_font_map(&collect_used_font_names(&document));
        let (content, replaced) = render_page(&document.pages[0], Pt::from_f32(792.0), &font_map);
        assert_eq!(replaced, 0);
        assert!(content.contains("10 732 30 40 re\nf\n"));
        // Baseline sits one font size below the top of the em box.
        assert!(content.contains("/F1 12 Tf\n10 760 Td\n(x) Tj\n"));
    }

    #[test]
    fn only_used_fonts_are_declared() {
        let fonts = collect_used_font_names(&sample_document());
        assert_eq!(
            fonts.into_iter().collect::<Vec<_>>(),
            vec!["Helvetica".to_string(), "Helvetica-Bold".to_string()]
        );
    }

    #[test]
    fn output_is_deterministic_and_well_formed() {
        let options = PdfOptions {
            title: Some("Readiness".to_string()),
            ..PdfOptions::default()
        };
        let first = document_to_pdf(&sample_document(), &options).expect("pdf");
        let second = document_to_pdf(&sample_document(), &options).expect("pdf");
        assert_eq!(first, second);
        assert!(first.starts_with(b"%PDF-1.7\n"));
        assert!(first.ends_with(b"%%EOF\n"));
        let text = String::from_utf8_lossy(&first);
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding"));
        assert!(text.contains("/Title (Readiness)"));
        assert!(text.contains("/ID [<"));
    }

    #[test]
    fn metrics_receive_sizes() {
        let document = sample_document();
        let mut metrics = DocumentMetrics::default();
        let mut bytes = Vec::new();
        let written = write_pdf(
            &document,
            &PdfOptions::default(),
            &mut bytes,
            Some(&mut metrics),
        )
        .expect("pdf");
        assert_eq!(written, bytes.len());
        assert_eq!(metrics.total_bytes, bytes.len());
        assert_eq!(metrics.page_count(), 2);
        assert!(metrics.pages.iter().all(|page| page.content_bytes > 0));
        assert_eq!(metrics.pages[1].page_number, 2);
    }
}
