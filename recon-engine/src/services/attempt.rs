//! Outcome of a single poll attempt

use crate::error::StageError;

/// What one call inside a polling loop produced
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The call returned a value
    Observed(T),
    /// The call failed; the loop counts the attempt and carries on
    Transient(StageError),
    /// The call failed in a way that makes further polling pointless
    Fatal(StageError),
}

impl<T> AttemptOutcome<T> {
    /// Only an unreachable endpoint on the opening call is fatal
    pub fn from_result(result: Result<T, StageError>, opening_call: bool) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Observed(value),
            Err(e) if opening_call && e.is_unreachable() => AttemptOutcome::Fatal(e),
            Err(e) => AttemptOutcome::Transient(e),
        }
    }
}
