//! Recovery case lifecycle: intake, allocation to agencies, SLA tracking, and
//! re-scoring, backed by pluggable storage.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod sla;

#[cfg(test)]
mod tests;

pub use domain::{
    Agency, Case, CaseFilter, CaseId, CasePatch, CaseStatus, NewCase, Page, SlaRecord,
};
pub use import::{agencies_from_path, agencies_from_reader, CaseImportError, CaseImporter};
pub use repository::{AgencyDirectory, CaseRepository, MemoryCaseStore, RepositoryError};
pub use router::case_router;
pub use service::{
    CaseService, CaseServiceError, ValidationError, DEFAULT_CASE_SEQUENCE_START, MAX_CASE_SEQUENCE,
};
pub use sla::{evaluate_sla, SlaEvaluation};
