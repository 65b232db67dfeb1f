//! Extraction engine for teaching-assignment pages of the Univalle academic
//! portal: HTML in, typed activity records out.

pub mod parser;
pub mod period;
pub mod quality;
pub mod records;

pub use parser::{extract_records, process_document, Extraction};
pub use quality::{validate_records, QualityReport};
pub use records::{Activity, ActivityRecord, PersonalInfo};
