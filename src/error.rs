//! Error types
//!
//! Data-quality problems (a source returning nothing, an unknown CRD, a
//! malformed payload) are not errors here: evaluators encode them as
//! non-compliant sections so the report shape stays constant. The enums
//! below cover programmer errors only, which are allowed to fail loudly.

use thiserror::Error;

/// Report assembly errors. Raised when the orchestration layer hands the
/// builder an incomplete set of sections.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Required section '{section}' was never set before build()")]
    MissingSection { section: &'static str },
}

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Report assembly error: {0}")]
    Report(#[from] ReportError),
}
