//! Write path: validate via the host form, post, then refresh.

use uci_core::{RecordDraft, RegistryError};

use crate::{DashboardController, DashboardView, RegistryTransport};

/// Entry form hosting the seven record fields.
pub trait RecordForm {
    /// Host-native required-field validation.
    fn check_validity(&self) -> bool;
    /// Toggle the marker that makes the host display validation feedback.
    fn set_validated(&mut self, validated: bool);
    fn draft(&self) -> RecordDraft;
    fn reset(&mut self);
}

/// The button that triggers a submission.
pub trait SubmitControl {
    fn label(&self) -> String;
    fn set_label(&mut self, label: &str);
    fn set_enabled(&mut self, enabled: bool);
}

/// Blocking user-facing message.
pub trait Notifier {
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The host form rejected the input; nothing was sent.
    Invalid,
    /// The registry accepted the record and the form was cleared.
    Saved,
    /// The registry or the network refused; `message` was shown to the user.
    Rejected { message: String },
}

/// A submission in flight. Holds what is needed to restore the control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    draft: RecordDraft,
    original_label: String,
}

impl Submission {
    pub fn draft(&self) -> &RecordDraft {
        &self.draft
    }

    pub fn original_label(&self) -> &str {
        &self.original_label
    }
}

/// Appends records to the registry.
#[derive(Debug, Clone)]
pub struct RecordSubmitter {
    busy_label: String,
    rejected_message: String,
    unreachable_message: String,
}

impl Default for RecordSubmitter {
    fn default() -> Self {
        Self {
            busy_label: "Guardando...".to_string(),
            rejected_message: "Error al guardar".to_string(),
            unreachable_message: "No se pudo guardar el registro".to_string(),
        }
    }
}

impl RecordSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, post, and on success refresh `dashboard` through the normal
    /// read path. The control is restored whatever the outcome.
    pub async fn submit<F, C, N, T, V>(
        &self,
        form: &mut F,
        control: &mut C,
        notifier: &mut N,
        transport: &T,
        dashboard: &mut DashboardController<V>,
    ) -> SubmitOutcome
    where
        F: RecordForm,
        C: SubmitControl,
        N: Notifier,
        T: RegistryTransport + ?Sized,
        V: DashboardView,
    {
        let Some(submission) = self.prepare(form, control) else {
            return SubmitOutcome::Invalid;
        };
        let _restore = RestoreOnDrop {
            control,
            label: submission.original_label.clone(),
        };

        let result = transport.append_record(submission.draft()).await;
        let outcome = self.finish(result, form, notifier);
        if outcome == SubmitOutcome::Saved {
            dashboard.refresh(transport).await;
        }
        outcome
    }

    /// Check the form and put the control into its busy state. Returns
    /// `None` when the host form is invalid.
    pub fn prepare<F, C>(&self, form: &mut F, control: &mut C) -> Option<Submission>
    where
        F: RecordForm,
        C: SubmitControl,
    {
        if !form.check_validity() {
            form.set_validated(true);
            return None;
        }

        let original_label = control.label();
        control.set_enabled(false);
        control.set_label(&self.busy_label);

        Some(Submission {
            draft: form.draft(),
            original_label,
        })
    }

    /// Settle the form for the post `result`. On failure the form keeps its
    /// values so the user can correct them.
    pub fn finish<F, N>(
        &self,
        result: Result<(), RegistryError>,
        form: &mut F,
        notifier: &mut N,
    ) -> SubmitOutcome
    where
        F: RecordForm,
        N: Notifier,
    {
        let message = match result {
            Ok(()) => {
                tracing::info!("registry record saved");
                form.reset();
                form.set_validated(false);
                return SubmitOutcome::Saved;
            }
            Err(RegistryError::Application { detail }) => detail
                .filter(|detail| !detail.trim().is_empty())
                .unwrap_or_else(|| self.rejected_message.clone()),
            Err(RegistryError::Transport(reason)) => {
                tracing::warn!(%reason, "registry unreachable while saving");
                self.unreachable_message.clone()
            }
        };

        tracing::warn!(%message, "registry record not saved");
        notifier.alert(&message);
        SubmitOutcome::Rejected { message }
    }

    /// Re-enable the control and put its label back.
    pub fn release<C: SubmitControl>(&self, submission: Submission, control: &mut C) {
        restore_control(control, &submission.original_label);
    }
}

fn restore_control<C: SubmitControl + ?Sized>(control: &mut C, label: &str) {
    control.set_enabled(true);
    control.set_label(label);
}

/// Puts the control back when dropped, including when a pending submit is
/// cancelled.
struct RestoreOnDrop<'c, C: SubmitControl> {
    control: &'c mut C,
    label: String,
}

impl<C: SubmitControl> Drop for RestoreOnDrop<'_, C> {
    fn drop(&mut self) {
        restore_control(self.control, &self.label);
    }
}
