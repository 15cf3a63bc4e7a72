//! Content extraction from heterogeneous log containers
//!
//! Turns a single input path into text, whatever it is wrapped in:
//!
//! ```text
//! .gz           → decompress → lenient decode
//! .zip          → every member (.gz decompressed, .log/.txt/.csv decoded)
//! .docx / .doc  → paragraph text, raw lenient decode when not a package
//! anything else → magic-byte sniff, then lenient decode
//! ```
//!
//! Extraction never fails outright. Problems are logged and the affected
//! member is skipped; an empty result is the caller's signal that nothing
//! usable was found.

use crate::io::archive::{read_archive, ExtractedMember};
use crate::io::decode::{decode_lenient, read_bounded};
use crate::io::document::extract_docx;
use crate::types::AnalyzerError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{error, info, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Container format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Gzip,
    Zip,
    Document,
    PlainText,
}

impl ContainerKind {
    /// Detect the container kind of a file
    ///
    /// The extension decides for known formats. Otherwise the first bytes are
    /// sniffed for gzip and zip signatures, defaulting to plain text.
    pub fn detect(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("gz") => ContainerKind::Gzip,
            Some("zip") => ContainerKind::Zip,
            Some("docx") | Some("doc") => ContainerKind::Document,
            Some("log") | Some("txt") | Some("csv") => ContainerKind::PlainText,
            _ => Self::sniff(path),
        }
    }

    fn sniff(path: &Path) -> Self {
        let mut header = [0u8; 4];
        let read = File::open(path)
            .and_then(|mut file| file.read(&mut header))
            .unwrap_or(0);

        match &header[..read] {
            [a, b, ..] if [*a, *b] == GZIP_MAGIC => ContainerKind::Gzip,
            bytes if bytes == ZIP_MAGIC => ContainerKind::Zip,
            _ => ContainerKind::PlainText,
        }
    }
}

/// Everything recovered from one input path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted members; a single entry for non-archive inputs
    pub members: Vec<ExtractedMember>,

    /// Members that could not be extracted
    pub failed: usize,

    /// Input was a multi-member archive (members carry provenance)
    pub is_archive: bool,
}

impl Extraction {
    /// Concatenate all members into one blob
    ///
    /// A `# Content from <member>` header precedes each member when more
    /// than one is combined; a lone member is returned verbatim.
    pub fn combined_text(&self) -> String {
        match self.members.as_slice() {
            [] => String::new(),
            [only] => only.text.clone(),
            members => members
                .iter()
                .map(|member| format!("\n# Content from {}\n{}\n", member.name, member.text))
                .collect(),
        }
    }
}

/// Unwraps input files into text
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    /// Per-file / per-member decompressed size limit
    max_member_bytes: u64,
}

impl ContentExtractor {
    /// Create an extractor with the given per-member size limit
    pub fn new(max_member_bytes: u64) -> Self {
        Self { max_member_bytes }
    }

    /// Extract an input path into a single text blob
    ///
    /// Never fails: any failure yields an empty string, which callers treat
    /// as "no content found".
    pub fn extract(&self, path: &Path) -> String {
        let text = self.extract_members(path).combined_text();
        info!(path = %path.display(), chars = text.len(), "Extracted content");
        text
    }

    /// Extract an input path member by member
    ///
    /// Archives yield one entry per supported member, in archive order. Any
    /// other input yields a single member named after the file.
    pub fn extract_members(&self, path: &Path) -> Extraction {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let kind = ContainerKind::detect(path);
        let result = match kind {
            ContainerKind::Zip => return self.extract_zip(path, &name),
            ContainerKind::Gzip => self.extract_gzip(path, &name),
            ContainerKind::Document => Ok(self.extract_document(path, &name)),
            ContainerKind::PlainText => self.extract_plain(path, &name),
        };

        match result {
            Ok(text) => Extraction {
                members: vec![ExtractedMember { name, text }],
                failed: 0,
                is_archive: false,
            },
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to extract content");
                Extraction {
                    members: Vec::new(),
                    failed: 1,
                    is_archive: false,
                }
            }
        }
    }

    fn open(&self, path: &Path, name: &str) -> Result<BufReader<File>, AnalyzerError> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| AnalyzerError::extraction_failure(name, e))
    }

    fn extract_plain(&self, path: &Path, name: &str) -> Result<String, AnalyzerError> {
        let bytes = read_bounded(self.open(path, name)?, self.max_member_bytes, name)?;
        Ok(decode_lenient(&bytes))
    }

    fn extract_gzip(&self, path: &Path, name: &str) -> Result<String, AnalyzerError> {
        let decoder = MultiGzDecoder::new(self.open(path, name)?);
        let bytes = read_bounded(decoder, self.max_member_bytes, name)?;
        Ok(decode_lenient(&bytes))
    }

    fn extract_zip(&self, path: &Path, name: &str) -> Extraction {
        let contents = self
            .open(path, name)
            .and_then(|file| read_archive(file, self.max_member_bytes));

        match contents {
            Ok(contents) => {
                info!(
                    path = %path.display(),
                    members = contents.members.len(),
                    failed = contents.failed,
                    "Extracted zip archive"
                );
                Extraction {
                    members: contents.members,
                    failed: contents.failed,
                    is_archive: true,
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read zip archive");
                Extraction {
                    members: Vec::new(),
                    failed: 1,
                    is_archive: true,
                }
            }
        }
    }

    fn extract_document(&self, path: &Path, name: &str) -> String {
        let parsed = self
            .open(path, name)
            .and_then(|file| extract_docx(file, self.max_member_bytes, name));

        match parsed {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Not a readable document package, decoding raw bytes");
                self.extract_plain(path, name).unwrap_or_else(|e| {
                    error!(path = %path.display(), error = %e, "Failed to read document");
                    String::new()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use rstest::rstest;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const LIMIT: u64 = 1024 * 1024;

    fn gzip(text: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text).unwrap();
        encoder.finish().unwrap()
    }

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn write_zip(dir: &TempDir, name: &str, members: &[(&str, Vec<u8>)]) -> PathBuf {
        let path = dir.path().join(name);
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        for (member, bytes) in members {
            if member.ends_with('/') {
                writer.add_directory(*member, options).unwrap();
            } else {
                writer.start_file(*member, options).unwrap();
                writer.write_all(bytes).unwrap();
            }
        }
        writer.finish().unwrap();
        path
    }

    #[rstest]
    #[case::gzip("app.log.gz", ContainerKind::Gzip)]
    #[case::zip("bundle.ZIP", ContainerKind::Zip)]
    #[case::docx("report.docx", ContainerKind::Document)]
    #[case::doc("report.doc", ContainerKind::Document)]
    #[case::log("app.log", ContainerKind::PlainText)]
    fn test_detect_by_extension(#[case] name: &str, #[case] expected: ContainerKind) {
        assert_eq!(ContainerKind::detect(Path::new(name)), expected);
    }

    #[test]
    fn test_detect_sniffs_magic_bytes() {
        let dir = TempDir::new().unwrap();
        let gz = write_file(&dir, "export.bin", &gzip(b"hello"));
        let zip = write_zip(&dir, "bundle.dat", &[("a.log", b"x".to_vec())]);
        let text = write_file(&dir, "noext", b"plain");

        assert_eq!(ContainerKind::detect(&gz), ContainerKind::Gzip);
        assert_eq!(ContainerKind::detect(&zip), ContainerKind::Zip);
        assert_eq!(ContainerKind::detect(&text), ContainerKind::PlainText);
    }

    #[test]
    fn test_extract_plain_text_drops_invalid_bytes() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.log", b"balance\xff sync");

        let extractor = ContentExtractor::new(LIMIT);

        assert_eq!(extractor.extract(&path), "balance sync");
    }

    #[test]
    fn test_extract_gzip() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.log.gz", &gzip(b"compressed log\n"));

        let extractor = ContentExtractor::new(LIMIT);

        assert_eq!(extractor.extract(&path), "compressed log\n");
    }

    #[test]
    fn test_extract_corrupt_gzip_returns_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "broken.gz", b"definitely not gzip");

        let extractor = ContentExtractor::new(LIMIT);
        let extraction = extractor.extract_members(&path);

        assert!(extraction.members.is_empty());
        assert_eq!(extraction.failed, 1);
        assert_eq!(extractor.extract(&path), "");
    }

    #[test]
    fn test_extract_missing_file_returns_empty() {
        let extractor = ContentExtractor::new(LIMIT);
        assert_eq!(extractor.extract(Path::new("/nonexistent/app.log")), "");
    }

    #[test]
    fn test_extract_zip_tags_each_member() {
        let dir = TempDir::new().unwrap();
        let path = write_zip(
            &dir,
            "logs.zip",
            &[
                ("day1/", Vec::new()),
                ("day1/a.log.gz", gzip(b"first")),
                ("day1/b.txt", b"second".to_vec()),
                ("readme.md", b"ignored".to_vec()),
            ],
        );

        let extractor = ContentExtractor::new(LIMIT);
        let extraction = extractor.extract_members(&path);

        assert!(extraction.is_archive);
        assert_eq!(extraction.members.len(), 2);
        assert_eq!(
            extractor.extract(&path),
            "\n# Content from day1/a.log.gz\nfirst\n\n# Content from day1/b.txt\nsecond\n"
        );
    }

    #[test]
    fn test_single_member_zip_matches_direct_extraction() {
        let dir = TempDir::new().unwrap();
        let content = b"2024-01-01T00:00:00.000Z START RequestId: abc\nbody line\n";
        let gz_path = write_file(&dir, "only.log.gz", &gzip(content));
        let zip_path = write_zip(&dir, "only.zip", &[("nested/only.log.gz", gzip(content))]);

        let extractor = ContentExtractor::new(LIMIT);

        assert_eq!(extractor.extract(&zip_path), extractor.extract(&gz_path));
    }

    #[test]
    fn test_extract_oversized_gzip_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bomb.gz", &gzip(&vec![b'a'; 10_000]));

        let extractor = ContentExtractor::new(100);

        assert_eq!(extractor.extract(&path), "");
    }

    #[test]
    fn test_extract_docx_paragraphs() {
        let dir = TempDir::new().unwrap();
        let path = write_zip(
            &dir,
            "logs.docx",
            &[(
                "word/document.xml",
                b"<w:body><w:p><w:r><w:t>first paragraph</w:t></w:r></w:p><w:p><w:r><w:t>second</w:t></w:r></w:p></w:body>".to_vec(),
            )],
        );

        let extractor = ContentExtractor::new(LIMIT);

        assert_eq!(extractor.extract(&path), "first paragraph\nsecond\n");
    }

    #[test]
    fn test_extract_legacy_doc_falls_back_to_raw_text() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "old.doc", b"raw \xfelegacy text");

        let extractor = ContentExtractor::new(LIMIT);

        assert_eq!(extractor.extract(&path), "raw legacy text");
    }
}
