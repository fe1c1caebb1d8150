//! Intake: classification and content validation
//!
//! No network calls happen here; both early exits are skips, not errors.

use super::{FlowOrchestrator, PhaseResult, Terminal};
use crate::models::{JobSession, JobState, TerminalStatus, UploadJob, UploadRequest};
use crate::services::classifier::Classification;
use crate::services::content_validator;

impl FlowOrchestrator {
    /// Classify and validate a request into an upload job
    pub(super) fn phase_intake(
        &self,
        session: &mut JobSession,
        request: UploadRequest,
    ) -> PhaseResult<UploadJob> {
        let UploadRequest {
            bytes,
            filename,
            queue: requested_queue,
        } = request;

        let classification = match requested_queue.as_deref() {
            Some(queue) => self.classifier.classify_in(&filename, queue),
            None => self.classifier.classify(&filename),
        };

        let (queue, subscription_id) = match classification {
            Classification::Matched {
                queue,
                subscription_id,
            } => (queue, subscription_id),
            Classification::NotFound => {
                let detail = match requested_queue {
                    Some(queue) => format!("No rule in queue '{}' matches {}", queue, filename),
                    None => format!("No classification rule matches {}", filename),
                };
                session.record(&detail);
                return Err(Terminal::early(TerminalStatus::SkippedNoRuleMatch, detail));
            }
        };

        session.queue = Some(queue.clone());
        session.subscription_id = Some(subscription_id.clone());
        session.transition_to(JobState::Classified);
        session.record(format!(
            "Classified into queue {} with subscription {}",
            queue, subscription_id
        ));

        let text = content_validator::decode_lossy(&bytes);
        let validation = self.validator.validate(&filename, &text);
        if !validation.is_valid {
            session.record(format!(
                "Content rejected: {} ({} lines)",
                validation.reason, validation.line_count
            ));
            return Err(Terminal::early(
                TerminalStatus::SkippedInvalidContent,
                validation.reason,
            ));
        }

        session.transition_to(JobState::Validated);
        session.record(format!("Content accepted ({} lines)", validation.line_count));

        let raw_bytes = if self.config.upload.normalize_crlf {
            normalize_crlf(bytes)
        } else {
            bytes
        };

        Ok(UploadJob {
            job_id: session.job_id,
            raw_bytes,
            filename,
            subscription_id,
            destination_queue: queue,
            line_count: validation.line_count,
        })
    }
}

/// Replace every CRLF pair with a bare LF
pub(super) fn normalize_crlf(bytes: Vec<u8>) -> Vec<u8> {
    if !bytes.windows(2).any(|pair| pair == b"\r\n") {
        return bytes;
    }

    let mut normalized = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().peekable();
    while let Some(&byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        normalized.push(byte);
    }
    normalized
}
