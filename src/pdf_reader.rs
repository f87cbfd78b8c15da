use std::collections::BTreeMap;
use std::panic;
use std::path::Path;

use encoding_rs::{UTF_16BE, WINDOWS_1252};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::ExtractError;
use crate::model::PageText;
use crate::options::PageSelection;
use crate::table_parse::split_line_into_cells;

/// Ruling primitives (`re` rectangles, `l` segments) a page must draw before
/// it is treated as carrying a grid.
const MIN_RULING_PRIMITIVES: usize = 2;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(&bytes[2..]);
        if !had_errors && !utf16.is_empty() {
            return utf16.into_owned();
        }
    }

    if let Some(name) = encoding {
        let lower = name.to_ascii_lowercase();
        if lower.contains("identity-h") || lower.contains("ucs2") || lower.contains("utf16") {
            let (utf16, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
            if !had_errors && !utf16.is_empty() {
                return utf16.into_owned();
            }
        }
    }

    // Latin documents without a usable encoding entry are almost always
    // WinAnsi in practice.
    let (latin, _, _) = WINDOWS_1252.decode(bytes);
    latin.into_owned()
}

fn extraction_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut non_empty_lines = 0_i64;
    let mut multi_cell_lines = 0_i64;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        non_empty_lines += 1;
        if split_line_into_cells(line).len() >= 2 {
            multi_cell_lines += 1;
        }
    }

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    multi_cell_lines * 50 + non_empty_lines - broken_penalty
}

fn choose_best_text(candidates: Vec<String>) -> String {
    candidates
        .into_iter()
        .max_by_key(|text| extraction_quality_score(text))
        .unwrap_or_default()
}

fn page_content(document: &Document, page_id: ObjectId) -> Option<Content> {
    let raw_content = document.get_page_content(page_id).ok()?;
    Content::decode(&raw_content).ok()
}

fn extract_text_from_content(
    document: &Document,
    page_id: ObjectId,
    content: &Content,
) -> Option<String> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    text.push_str(&decode_pdf_bytes(encoding, bytes));
                }
                Object::Array(items) => {
                    collect_text(text, encoding, items);
                }
                // Large negative kerning inside TJ is a visual gap.
                Object::Integer(value) if *value < -100 => text.push(' '),
                Object::Real(value) if *value < -100.0 => text.push(' '),
                _ => {}
            }
        }
    }

    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn count_ruling_primitives(content: &Content) -> usize {
    content
        .operations
        .iter()
        .filter(|operation| matches!(operation.operator.as_str(), "re" | "l"))
        .count()
}

/// Reads the text of every selected page, picking the most table-like of
/// several extraction paths, and notes whether each page draws ruling.
pub(crate) fn read_pdf_pages(
    input_pdf: &Path,
    selection: &PageSelection,
) -> Result<Vec<PageText>, ExtractError> {
    let bytes = std::fs::read(input_pdf)?;
    let document = Document::load_mem(&bytes)?;
    let pages_map = document.get_pages();

    // pdf-extract panics on some inputs lopdf reads fine (for example a font
    // missing from the page resources); the lopdf paths still run then.
    let pdf_extract_pages =
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes)) {
            Ok(Ok(text)) => {
                let pages = split_text_into_pages(&text);
                (pages.len() == pages_map.len()).then_some(pages)
            }
            Ok(Err(error)) => {
                debug!("pdf-extract could not read '{}': {error}", input_pdf.display());
                None
            }
            Err(_) => {
                debug!("pdf-extract panicked on '{}'", input_pdf.display());
                None
            }
        };

    let mut pages = Vec::new();
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        if !selection.contains(*page_no) {
            continue;
        }

        let content = page_content(&document, *page_id);
        let mut candidates = Vec::new();
        if let Some(text) = pdf_extract_pages
            .as_ref()
            .and_then(|all| all.get(index).cloned())
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }
        if let Some(text) = content
            .as_ref()
            .and_then(|content| extract_text_from_content(&document, *page_id, content))
        {
            candidates.push(text);
        }
        if let Some(text) = document
            .extract_text(&[*page_no])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }

        let ruling = content.as_ref().map_or(0, count_ruling_primitives);
        debug!(
            "page {page_no}: {} text candidate(s), {ruling} ruling primitive(s)",
            candidates.len()
        );

        pages.push(PageText {
            page_number: *page_no,
            text: choose_best_text(candidates),
            ruled: ruling >= MIN_RULING_PRIMITIVES,
        });
    }

    if pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }

    Ok(pages)
}
