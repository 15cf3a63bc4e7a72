//! Lenient text decoding and bounded reads
//!
//! Log archives routinely contain stray non-UTF-8 bytes. Decoding never fails:
//! invalid sequences are dropped. Every decompressed stream is read through a
//! size cap so a small compressed member cannot expand without bound.

use crate::types::AnalyzerError;
use std::io::Read;

/// Decode bytes as UTF-8, dropping invalid sequences
pub fn decode_lenient(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Read a stream to the end, failing if it yields more than `limit` bytes
///
/// # Arguments
///
/// * `reader` - Stream to drain (file, decoder, archive member)
/// * `limit` - Maximum number of bytes accepted
/// * `source_name` - Name used in error messages
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The full content
/// * `Err(AnalyzerError::MemberTooLarge)` - The stream exceeded `limit`
/// * `Err(AnalyzerError::ExtractionFailure)` - The stream could not be read
pub fn read_bounded<R: Read>(
    reader: R,
    limit: u64,
    source_name: &str,
) -> Result<Vec<u8>, AnalyzerError> {
    let mut buffer = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(|e| AnalyzerError::extraction_failure(source_name, e))?;

    if buffer.len() as u64 > limit {
        return Err(AnalyzerError::member_too_large(source_name, limit));
    }

    Ok(buffer)
}
