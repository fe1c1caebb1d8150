//! Data models for the reconciliation workflow

pub mod audit;
pub mod counts;
pub mod job;

pub use audit::{AuditRecord, AuditReport, ExecutionLog, TerminalStatus};
pub use counts::{DetectedCounts, RecordCounts, SyncState};
pub use job::{JobSession, JobState, StateTransition, UploadJob, UploadRequest};
