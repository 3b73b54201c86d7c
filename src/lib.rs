//! CRD-Verify - Identity-Match & Multi-Criterion Evaluation Engine
//!
//! Verifies a claimed financial-industry identity against records fetched
//! from regulatory registries (BrokerCheck, IAPD, FINRA/SEC disciplinary and
//! arbitration, NFA) and renders one deterministic, ordered compliance
//! report with an aggregated final verdict.
//!
//! The engine is synchronous and side-effect-free per invocation: evaluating
//! a claim is a pure function of the claim and the already-fetched source
//! records. Fetching, caching, batch ingestion and report persistence belong
//! to external collaborators.
//!
//! ## Quick Start
//!
//! ```rust
//! use crd_verify::{Claim, DataSource, EngineConfig, EvaluationReportDirector, SourceRecord};
//!
//! let claim = Claim {
//!     reference_id: "EMP-001".to_string(),
//!     first_name: "John".to_string(),
//!     last_name: "Doe".to_string(),
//!     crd_number: Some("12345".to_string()),
//!     ..Claim::default()
//! };
//!
//! let mut record = SourceRecord::new(DataSource::FinraBrokerCheck);
//! record.crd_number = Some("12345".to_string());
//! record.fetched_name = Some("John Doe".to_string());
//! record.bc_scope = Some("Active".to_string());
//!
//! let director = EvaluationReportDirector::new(EngineConfig::default());
//! let report = director.evaluate_claim(&claim, &[record]).unwrap();
//! assert!(report.search_evaluation.compliance);
//! ```

// Core error handling
pub mod error;

// Data model: claims, source records, alerts, source tags
pub mod alerts;
pub mod claim;
pub mod records;
pub mod sources;

// Engine configuration
pub mod config;

// Name matching: nickname equivalence + fuzzy scoring
pub mod matcher;
pub mod nicknames;

// Per-criterion evaluation, report assembly and orchestration
pub mod evaluation;

// Public re-exports for the evaluation pipeline
pub use alerts::{Alert, AlertSeverity};
pub use claim::Claim;
pub use config::{load_config, EngineConfig, MatchTier};
pub use error::{EngineError, ReportError};
pub use evaluation::{
    EvaluationReport, EvaluationReportBuilder, EvaluationReportDirector, EvaluationSection,
    LicenseScope, ReportSummary,
};
pub use matcher::{MatchResult, NameMatcher, NamePartKind};
pub use nicknames::{nickname_index, NicknameIndex};
pub use records::{Employment, Exam, SourceRecord};
pub use sources::DataSource;
