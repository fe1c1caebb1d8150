//! Reconciliation poller
//!
//! Calls the reconcile stage repeatedly until the reconciled-id count reaches
//! the target, stops changing, or the size-adaptive attempt budget is spent.
//! Larger files get more attempts since remote reconciliation work scales
//! with record count.

use crate::config::PollingSettings;
use crate::services::attempt::AttemptOutcome;
use crate::services::pipeline_client::PipelineClient;

/// Why the poller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStop {
    /// Observed count equals a non-zero target
    TargetReached,
    /// Observed count stopped changing
    Stable,
    /// Attempt budget spent without reaching target or stability
    BudgetExhausted,
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Last observed reconciled-id count (0 if no call succeeded)
    pub observed: u64,
    pub attempts: u32,
    pub budget: u32,
    pub stop: ReconcileStop,
    pub log: Vec<String>,
}

/// Poll the reconcile stage toward `target_count`
pub async fn poll_reconcile(
    client: &PipelineClient,
    target_count: u64,
    line_count: usize,
    settings: &PollingSettings,
) -> ReconcileOutcome {
    let budget = settings.reconcile_budget(line_count);
    let mut log = vec![format!(
        "Reconcile target {} with budget of {} attempts ({} lines)",
        target_count, budget, line_count
    )];

    let mut last_observed: Option<u64> = None;
    let mut unchanged = 0;
    let mut attempts = 0;

    for attempt in 1..=budget {
        if attempt > 1 {
            tokio::time::sleep(settings.reconcile_interval()).await;
        }
        attempts = attempt;

        let count = match AttemptOutcome::from_result(client.reconcile().await, false) {
            AttemptOutcome::Observed(count) => count,
            AttemptOutcome::Transient(e) | AttemptOutcome::Fatal(e) => {
                tracing::warn!(attempt, error = %e, "Reconcile attempt failed");
                log.push(format!("Reconcile attempt {}/{} failed: {}", attempt, budget, e));
                continue;
            }
        };

        log.push(format!(
            "Reconcile attempt {}/{}: {} ids reconciled",
            attempt, budget, count
        ));

        if target_count > 0 && count == target_count {
            log.push("Reconcile target reached".to_string());
            return ReconcileOutcome {
                observed: count,
                attempts,
                budget,
                stop: ReconcileStop::TargetReached,
                log,
            };
        }

        if last_observed == Some(count) {
            unchanged += 1;
        } else {
            unchanged = 0;
        }
        last_observed = Some(count);

        if unchanged >= settings.stability_repeats {
            log.push(format!(
                "Reconcile count stable at {} for {} attempts, stopping",
                count,
                unchanged + 1
            ));
            return ReconcileOutcome {
                observed: count,
                attempts,
                budget,
                stop: ReconcileStop::Stable,
                log,
            };
        }
    }

    let observed = last_observed.unwrap_or(0);
    log.push(format!(
        "Reconcile budget exhausted at {} of {} ids",
        observed, target_count
    ));

    ReconcileOutcome {
        observed,
        attempts,
        budget,
        stop: ReconcileStop::BudgetExhausted,
        log,
    }
}
