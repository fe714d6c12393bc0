//! Admin publishing forms.
//!
//! A [`FormController`] owns one draft. Submitting validates the draft, writes
//! one document, and clears the draft on success. While a submission is in
//! flight the form's [`SubmitGate`] is engaged and further submissions of the
//! same form are turned away; the gate is released on every exit path.

mod drafts;

pub use drafts::*;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::db::{now_millis, Repository};
use crate::models::{Collection, Document};

/// Prompt returned while another submission of the same form is running.
pub const SUBMIT_IN_PROGRESS_PROMPT: &str = "A submission is already in progress";

/// A form that publishes one document per submission.
pub trait AdminForm {
    /// Record type shown back to the admin after publishing.
    type Record;

    const COLLECTION: Collection;
    const SUCCESS_MESSAGE: &'static str;
    const FAILURE_MESSAGE: &'static str;

    /// Check required fields. `Err` carries the prompt shown to the admin.
    fn validate(&self) -> Result<(), &'static str>;

    /// Document body with string fields trimmed.
    fn to_document(&self) -> serde_json::Value;

    /// Reset the fields that are cleared after a successful submit.
    fn clear(&mut self);

    fn project(document: &Document, now_ms: i64) -> Self::Record;

    /// The gate this form's submissions share.
    fn gate(gates: &FormGates) -> &SubmitGate;
}

/// Result of one submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome<R> {
    /// Validation failed; nothing was written.
    Invalid { prompt: &'static str },
    /// Another submission of this form holds the gate; nothing was written.
    Busy { prompt: &'static str },
    Published { record: R, message: &'static str },
    /// The store rejected the write.
    Failed { message: &'static str },
}

/// The "submit disabled" flag of one admin form, shared by every request.
#[derive(Debug, Default)]
pub struct SubmitGate {
    engaged: AtomicBool,
}

impl SubmitGate {
    /// Engage the gate, or `None` when a submission already holds it.
    fn try_engage(&self) -> Option<SubmittingGuard<'_>> {
        self.engaged
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmittingGuard(self))
    }
}

/// Releases the gate when dropped.
struct SubmittingGuard<'a>(&'a SubmitGate);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.engaged.store(false, Ordering::Release);
    }
}

/// One gate per admin form.
#[derive(Debug, Default)]
pub struct FormGates {
    resources: SubmitGate,
    jobs: SubmitGate,
    notices: SubmitGate,
}

impl FormGates {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Drives submission of one draft.
pub struct FormController<'g, F> {
    draft: F,
    gate: &'g SubmitGate,
}

impl<'g, F: AdminForm> FormController<'g, F> {
    pub fn new(draft: F, gate: &'g SubmitGate) -> Self {
        Self { draft, gate }
    }

    pub fn into_draft(self) -> F {
        self.draft
    }

    pub async fn submit(&mut self, repo: &Repository) -> SubmitOutcome<F::Record> {
        if let Err(prompt) = self.draft.validate() {
            tracing::debug!(collection = %F::COLLECTION, prompt, "Rejected form submission");
            return SubmitOutcome::Invalid { prompt };
        }

        let gate = self.gate;
        let Some(_guard) = gate.try_engage() else {
            tracing::debug!(collection = %F::COLLECTION, "Submission already in progress");
            return SubmitOutcome::Busy {
                prompt: SUBMIT_IN_PROGRESS_PROMPT,
            };
        };

        match repo
            .add_document(F::COLLECTION, self.draft.to_document())
            .await
        {
            Ok(document) => {
                tracing::info!(collection = %F::COLLECTION, id = %document.id, "Published document");
                self.draft.clear();
                SubmitOutcome::Published {
                    record: F::project(&document, now_millis()),
                    message: F::SUCCESS_MESSAGE,
                }
            }
            Err(e) => {
                tracing::error!(collection = %F::COLLECTION, "Publish failed: {}", e);
                SubmitOutcome::Failed {
                    message: F::FAILURE_MESSAGE,
                }
            }
        }
    }
}
