//! Service modules for the reconciliation workflow
//!
//! Leaf-first: classification and validation (pure), the remote pipeline
//! client, the two pollers, and the orchestrator that sequences them.

pub mod attempt;
pub mod classifier;
pub mod content_validator;
pub mod file_intake;
pub mod flow_orchestrator;
pub mod pipeline_client;
pub mod reconcile_poller;
pub mod response_parser;
pub mod sync_poller;

pub use attempt::AttemptOutcome;
pub use classifier::{classify, Classification, Classifier, RuleSet};
pub use content_validator::{ContentValidator, ValidationOutcome};
pub use file_intake::{collect_inputs, load_request, IntakeError, IntakeResult};
pub use flow_orchestrator::{BatchStatistics, FlowOrchestrator};
pub use pipeline_client::PipelineClient;
pub use reconcile_poller::{poll_reconcile, ReconcileOutcome, ReconcileStop};
pub use sync_poller::{poll_sync, SyncOutcome, SyncResult};
