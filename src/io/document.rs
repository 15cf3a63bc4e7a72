//! Word-processor document text extraction
//!
//! A `.docx` file is a zip package whose body lives in `word/document.xml`.
//! Paragraph text is recovered from the `<w:t>` runs of each `<w:p>` element,
//! one output line per paragraph.

use crate::io::decode::{decode_lenient, read_bounded};
use crate::types::AnalyzerError;
use regex::{Captures, Regex};
use std::io::{Read, Seek};
use std::sync::LazyLock;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*[^/])?>(.*?)</w:p>|<w:p(?:\s[^>]*)?/>").unwrap());

// Text runs, tabs and line breaks in document order
static RUN_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*[^/])?>(.*?)</w:t>|<w:tab(?:\s[^>]*)?/>|<w:br(?:\s[^>]*)?/>")
        .unwrap()
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(lt|gt|quot|apos|amp|#[xX][0-9a-fA-F]+|#[0-9]+);").unwrap());

/// Extract paragraph text from a `.docx` package
///
/// # Arguments
///
/// * `reader` - Seekable source of the package bytes
/// * `limit` - Size limit for the document part
/// * `source_name` - Name used in error messages
///
/// # Returns
///
/// * `Ok(String)` - Paragraph texts, each followed by a newline
/// * `Err(AnalyzerError)` - The package or its document part is unreadable
pub fn extract_docx<R: Read + Seek>(
    reader: R,
    limit: u64,
    source_name: &str,
) -> Result<String, AnalyzerError> {
    let mut package = ZipArchive::new(reader)
        .map_err(|e| AnalyzerError::extraction_failure(source_name, e))?;
    let part = package
        .by_name(DOCUMENT_PART)
        .map_err(|e| AnalyzerError::extraction_failure(source_name, e))?;
    let xml = decode_lenient(&read_bounded(part, limit, source_name)?);

    Ok(paragraphs_to_text(&xml))
}

/// Convert WordprocessingML body XML into newline-separated paragraph text
pub fn paragraphs_to_text(xml: &str) -> String {
    let mut text = String::new();

    for paragraph in PARAGRAPH.captures_iter(xml) {
        if let Some(body) = paragraph.get(1) {
            for token in RUN_TOKEN.captures_iter(body.as_str()) {
                match token.get(1) {
                    Some(run) => text.push_str(&unescape_xml(run.as_str())),
                    None if token[0].starts_with("<w:tab") => text.push('\t'),
                    None => text.push('\n'),
                }
            }
        }
        text.push('\n');
    }

    text
}

// Resolved in one pass so `&amp;lt;` stays literal
fn unescape_xml(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let resolved = match &caps[1] {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                reference => {
                    let hex = reference
                        .strip_prefix("#x")
                        .or_else(|| reference.strip_prefix("#X"));
                    let code = match hex {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => reference[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            resolved.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
