//! Synchronization poller
//!
//! The synchronize endpoint is idempotent but eventually consistent: it can
//! report 0/0 for a while even when records exist. The poller calls it once,
//! and only if that reports nothing does it retry on a fixed interval until
//! non-zero counts appear or the attempt budget runs out.

use crate::config::PollingSettings;
use crate::models::SyncState;
use crate::services::attempt::AttemptOutcome;
use crate::services::pipeline_client::PipelineClient;

/// How synchronization ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// Remote side reported non-zero counts
    Confirmed(SyncState),
    /// Budget exhausted at 0/0: there is genuinely no data
    ConfirmedEmpty,
    /// The opening call could not reach the endpoint at all
    Unreachable(String),
}

impl SyncResult {
    /// Counts to carry forward; zero unless confirmed
    pub fn state(&self) -> SyncState {
        match self {
            SyncResult::Confirmed(state) => *state,
            _ => SyncState::default(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, SyncResult::Confirmed(_))
    }
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub result: SyncResult,
    /// Synchronize calls issued, including the opening one
    pub attempts: u32,
    pub log: Vec<String>,
}

/// Poll the synchronize stage until it confirms data or the budget runs out
///
/// `expected_total` is the parse-trigger's processed + failed count and is
/// only used for reporting.
pub async fn poll_sync(
    client: &PipelineClient,
    expected_total: u64,
    settings: &PollingSettings,
) -> SyncOutcome {
    let mut log = Vec::new();

    match AttemptOutcome::from_result(client.synchronize().await, true) {
        AttemptOutcome::Observed(state) if !state.is_empty() => {
            log.push(format!(
                "Synchronize confirmed {} processed / {} failed on first call",
                state.processed_count, state.failed_count
            ));
            return SyncOutcome {
                result: SyncResult::Confirmed(state),
                attempts: 1,
                log,
            };
        }
        AttemptOutcome::Observed(_) => {
            log.push(format!(
                "Synchronize reported 0/0 (expected {} records), waiting for remote processing",
                expected_total
            ));
        }
        AttemptOutcome::Transient(e) => {
            tracing::warn!(error = %e, "Synchronize call failed, will retry");
            log.push(format!("Synchronize call failed, will retry: {}", e));
        }
        AttemptOutcome::Fatal(e) => {
            tracing::error!(error = %e, "Synchronize endpoint unreachable, aborting synchronization");
            log.push(format!("Synchronize endpoint unreachable: {}", e));
            return SyncOutcome {
                result: SyncResult::Unreachable(e.to_string()),
                attempts: 1,
                log,
            };
        }
    }

    let mut attempts = 1;
    for retry in 1..=settings.sync_max_attempts {
        tokio::time::sleep(settings.sync_interval()).await;
        attempts += 1;

        match AttemptOutcome::from_result(client.synchronize().await, false) {
            AttemptOutcome::Observed(state) if !state.is_empty() => {
                log.push(format!(
                    "Synchronize confirmed {} processed / {} failed on retry {}/{}",
                    state.processed_count, state.failed_count, retry, settings.sync_max_attempts
                ));
                return SyncOutcome {
                    result: SyncResult::Confirmed(state),
                    attempts,
                    log,
                };
            }
            AttemptOutcome::Observed(_) => {
                tracing::debug!(retry, "Synchronize still 0/0");
                log.push(format!(
                    "Synchronize retry {}/{}: still 0/0",
                    retry, settings.sync_max_attempts
                ));
            }
            AttemptOutcome::Transient(e) | AttemptOutcome::Fatal(e) => {
                tracing::warn!(retry, error = %e, "Synchronize retry failed");
                log.push(format!(
                    "Synchronize retry {}/{} failed: {}",
                    retry, settings.sync_max_attempts, e
                ));
            }
        }
    }

    log.push(format!(
        "Synchronize reported no data after {} calls, concluding empty",
        attempts
    ));

    SyncOutcome {
        result: SyncResult::ConfirmedEmpty,
        attempts,
        log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_zero_unless_confirmed() {
        assert_eq!(
            SyncResult::Confirmed(SyncState::new(4, 1)).state(),
            SyncState::new(4, 1)
        );
        assert!(SyncResult::ConfirmedEmpty.state().is_empty());
        assert!(SyncResult::Unreachable("x".to_string()).state().is_empty());
        assert!(!SyncResult::ConfirmedEmpty.is_confirmed());
    }
}
