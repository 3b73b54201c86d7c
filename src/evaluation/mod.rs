//! Multi-criterion evaluation
//!
//! This module provides:
//! - Typed report sections, one per compliance dimension
//! - Pure per-criterion evaluators
//! - The report builder and the director that runs the fixed pipeline

pub mod director;
pub mod evaluators;
pub mod report;
pub mod sections;

pub use director::EvaluationReportDirector;
pub use report::{EvaluationReport, EvaluationReportBuilder, ReportSummary};
pub use sections::{EvaluationSection, FinalEvaluation, LicenseScope};
