//! Zip archive member extraction
//!
//! Walks every member of a zip archive, decompressing nested gzip members and
//! decoding plain text, log and CSV members. A member that cannot be read is
//! logged and skipped; it never aborts the rest of the archive.

use crate::io::decode::{decode_lenient, read_bounded};
use crate::types::AnalyzerError;
use flate2::read::MultiGzDecoder;
use std::io::{Read, Seek};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Text recovered from one archive member (or from a single input file)
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMember {
    /// Member path inside the archive, or the file name for single inputs
    pub name: String,

    pub text: String,
}

/// How a member's bytes are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Gzip-compressed text
    Gzip,

    /// Plain `.log`, `.txt` or `.csv` text
    Text,

    /// Anything else; skipped
    Unsupported,
}

impl MemberKind {
    /// Classify a member by its name
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".gz") {
            MemberKind::Gzip
        } else if [".log", ".txt", ".csv"].iter().any(|ext| lower.ends_with(ext)) {
            MemberKind::Text
        } else {
            MemberKind::Unsupported
        }
    }
}

/// Members recovered from an archive plus the number that failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveContents {
    pub members: Vec<ExtractedMember>,
    pub failed: usize,
}

/// Extract every supported member of a zip archive
///
/// # Arguments
///
/// * `reader` - Seekable source of the archive bytes
/// * `limit` - Per-member decompressed size limit
///
/// # Returns
///
/// * `Ok(ArchiveContents)` - Members in archive order, with a failure count
/// * `Err(AnalyzerError)` - The archive directory itself could not be read
pub fn read_archive<R: Read + Seek>(
    reader: R,
    limit: u64,
) -> Result<ArchiveContents, AnalyzerError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut contents = ArchiveContents::default();

    for index in 0..archive.len() {
        let mut member = match archive.by_index(index) {
            Ok(member) => member,
            Err(e) => {
                warn!(index, error = %e, "Failed to open archive member");
                contents.failed += 1;
                continue;
            }
        };

        if member.is_dir() {
            continue;
        }

        let name = member.name().to_string();
        let bytes = match MemberKind::from_name(&name) {
            MemberKind::Gzip => read_bounded(MultiGzDecoder::new(&mut member), limit, &name),
            MemberKind::Text => read_bounded(&mut member, limit, &name),
            MemberKind::Unsupported => {
                debug!(member = %name, "Skipping unsupported archive member");
                continue;
            }
        };

        match bytes {
            Ok(bytes) => {
                let text = decode_lenient(&bytes);
                info!(member = %name, chars = text.len(), "Extracted archive member");
                contents.members.push(ExtractedMember { name, text });
            }
            Err(e) => {
                warn!(member = %name, error = %e, "Failed to extract archive member");
                contents.failed += 1;
            }
        }
    }

    Ok(contents)
}
