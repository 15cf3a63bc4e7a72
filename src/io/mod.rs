//! I/O module
//!
//! Handles getting text out of input containers and writing CSV results.
//!
//! # Components
//!
//! - `content_extractor` - Container detection and text extraction per input path
//! - `archive` - Zip member iteration with nested gzip support
//! - `document` - Paragraph text from word-processor documents
//! - `decode` - Lenient UTF-8 decoding and size-bounded reads
//! - `csv_format` - CSV output serialization

pub mod archive;
pub mod content_extractor;
pub mod csv_format;
pub mod decode;
pub mod document;

pub use archive::ExtractedMember;
pub use content_extractor::{ContainerKind, ContentExtractor, Extraction};
pub use csv_format::{
    write_alerts_csv, write_anomalies_csv, write_balances_csv, write_behaviour_csv,
    write_records_csv, write_summary_csv, write_trends_csv,
};
