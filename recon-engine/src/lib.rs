//! recon-engine library interface
//!
//! Upload-and-reconcile orchestration for transaction files: classify by
//! filename, validate content, push through the remote pipeline
//! (submit → parse → synchronize → reconcile) and report one audit record
//! per file.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::config::ReconConfig;
pub use crate::error::StageError;
pub use crate::models::{AuditRecord, AuditReport, TerminalStatus, UploadRequest};
pub use crate::services::FlowOrchestrator;
