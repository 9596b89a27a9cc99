//! Public form page state machine.
//!
//! ```text
//! Loading ──template──▶ Ready ──submit ok──▶ Submitted
//!    │                    │ ▲
//!    │                    └─┘ submit failed (feedback shown, still editable)
//!    ├──not found──▶ NotFound
//!    └──error / malformed schema──▶ Unavailable
//! ```
//!
//! The page owns the [`ThemeContext`] for the template it displays. Branding is applied before
//! the page becomes `Ready`, so the form body never renders with the default palette.
//!
//! At most one submission is in flight: [`FormPage::begin_submit`] refuses while a previous
//! attempt has not been settled with [`FormPage::finish_submit`], and a reload is refused for
//! as long as that attempt is pending.
//!
//! Fetches are ticketed: when a second fetch starts before the first settles, only the second
//! one may settle the page.

use crate::outcome::{build_submission_payload, SubmissionError, TemplateError};
use crate::session::{FormSession, ValidationFailure};
use crate::theme::ThemeContext;
use crate::CoreError;
use ctrls_forms::{FormTemplate, SubmissionPayload, SubmissionReceipt};
use ctrls_types::PublicId;

/// Feedback left on an editable form after a failed attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitFeedback {
    /// Mandatory patient fields were blank; nothing was sent.
    Local(ValidationFailure),
    /// The backend or the network rejected the attempt.
    Remote(SubmissionError),
}

impl SubmitFeedback {
    /// Text to show next to the submit button.
    pub fn user_message(&self) -> String {
        match self {
            SubmitFeedback::Local(failure) => failure.user_message().to_string(),
            SubmitFeedback::Remote(err) => err.user_message(),
        }
    }
}

/// A template that is ready to be filled in.
#[derive(Clone, Debug)]
pub struct ReadyForm {
    pub template: FormTemplate,
    pub session: FormSession,
    pub feedback: Option<SubmitFeedback>,
    submitting: bool,
}

impl ReadyForm {
    /// True between [`FormPage::begin_submit`] and [`FormPage::finish_submit`].
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

#[derive(Clone, Debug)]
pub enum PageState {
    Loading,
    NotFound,
    /// The form cannot be shown. `template` is kept when it was fetched but its schema was
    /// malformed, so the clinic header can still be rendered.
    Unavailable {
        template: Option<FormTemplate>,
        reason: String,
    },
    Ready(ReadyForm),
    Submitted {
        template: FormTemplate,
        receipt: SubmissionReceipt,
    },
}

/// Why [`FormPage::begin_submit`] did not produce a payload.
#[derive(Debug, thiserror::Error)]
pub enum SubmitBlocked {
    #[error("form is not ready for submission")]
    NotReady,
    #[error("a submission is already in progress")]
    InFlight,
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),
    #[error("failed to build submission payload: {0}")]
    Payload(CoreError),
}

/// A (re)fetch was requested while a submission is still pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot reload the form while a submission is in progress")]
pub struct ReloadBlocked;

/// Identifies one template fetch. Only the most recently issued ticket can settle the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Clone, Debug)]
pub struct FormPage {
    state: PageState,
    theme: ThemeContext,
    load_generation: u64,
}

impl Default for FormPage {
    fn default() -> Self {
        Self::new()
    }
}

impl FormPage {
    /// A page waiting for its template.
    pub fn new() -> Self {
        Self {
            state: PageState::Loading,
            theme: ThemeContext::new(),
            load_generation: 0,
        }
    }

    /// Current display state.
    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Theme derived from the most recently loaded template.
    pub fn theme(&self) -> &ThemeContext {
        &self.theme
    }

    /// Enter the loading state ahead of a (re)fetch. The current theme stays until the new
    /// template settles.
    ///
    /// # Returns
    ///
    /// The ticket the fetch must hand back to [`FormPage::on_template_loaded`]. Issuing a new
    /// ticket makes every earlier one stale.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadBlocked`] while a submission is in flight; the page is left untouched so
    /// the pending attempt still settles on the session it was built from.
    pub fn start_loading(&mut self) -> Result<LoadTicket, ReloadBlocked> {
        if self.is_submitting() {
            return Err(ReloadBlocked);
        }
        self.load_generation += 1;
        self.state = PageState::Loading;
        Ok(LoadTicket(self.load_generation))
    }

    /// Settle a template fetch.
    ///
    /// On success the branding is applied first, then the schema is parsed. A malformed schema
    /// makes the page `Unavailable` instead of failing.
    ///
    /// # Arguments
    ///
    /// * `ticket` - returned by the [`FormPage::start_loading`] call that began this fetch.
    /// * `result` - the fetch outcome.
    ///
    /// # Returns
    ///
    /// `false` when `ticket` was superseded by a later fetch; the result is dropped and neither
    /// the state nor the theme change.
    pub fn on_template_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<FormTemplate, TemplateError>,
    ) -> bool {
        if ticket.0 != self.load_generation {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.load_generation,
                "dropping superseded template fetch"
            );
            return false;
        }

        let template = match result {
            Ok(template) => template,
            Err(TemplateError::NotFound) => {
                self.theme.clear();
                self.state = PageState::NotFound;
                return true;
            }
            Err(err) => {
                self.theme.clear();
                self.state = PageState::Unavailable {
                    template: None,
                    reason: err.to_string(),
                };
                return true;
            }
        };

        self.theme.apply_template(&template);

        self.state = match template.fields() {
            Ok(fields) => {
                tracing::info!(
                    public_id = %template.public_id,
                    fields = fields.len(),
                    "form template ready"
                );
                PageState::Ready(ReadyForm {
                    template,
                    session: FormSession::new(fields),
                    feedback: None,
                    submitting: false,
                })
            }
            Err(err) => {
                tracing::warn!(
                    public_id = %template.public_id,
                    "form unavailable: {err}"
                );
                PageState::Unavailable {
                    template: Some(template),
                    reason: err.to_string(),
                }
            }
        };
        true
    }

    /// The editable session, when the page is `Ready`.
    pub fn session_mut(&mut self) -> Option<&mut FormSession> {
        match &mut self.state {
            PageState::Ready(form) => Some(&mut form.session),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&FormSession> {
        match &self.state {
            PageState::Ready(form) => Some(&form.session),
            _ => None,
        }
    }

    /// Identifier of the template currently on the page.
    ///
    /// # Returns
    ///
    /// `None` while loading or after a not-found, and also for an unavailable page whose
    /// template never arrived.
    pub fn public_id(&self) -> Option<&PublicId> {
        match &self.state {
            PageState::Ready(form) => Some(&form.template.public_id),
            PageState::Submitted { template, .. } => Some(&template.public_id),
            PageState::Unavailable {
                template: Some(template),
                ..
            } => Some(&template.public_id),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(&self.state, PageState::Ready(form) if form.submitting)
    }

    /// Validate locally and, if that passes, mark a submission as in flight.
    ///
    /// Local validation failures are recorded as feedback and no payload is produced.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitBlocked`] when the page is not ready, an attempt is already in flight,
    /// mandatory patient fields are blank, or the payload cannot be built.
    pub fn begin_submit(&mut self) -> Result<(PublicId, SubmissionPayload), SubmitBlocked> {
        let form = match &mut self.state {
            PageState::Ready(form) => form,
            _ => return Err(SubmitBlocked::NotReady),
        };
        if form.submitting {
            return Err(SubmitBlocked::InFlight);
        }

        let patient = match form.session.validate_for_submit() {
            Ok(patient) => patient,
            Err(failure) => {
                form.feedback = Some(SubmitFeedback::Local(failure.clone()));
                return Err(SubmitBlocked::Invalid(failure));
            }
        };
        let payload = build_submission_payload(&patient, form.session.answers())
            .map_err(SubmitBlocked::Payload)?;

        form.submitting = true;
        form.feedback = None;
        Ok((form.template.public_id.clone(), payload))
    }

    /// Settle the in-flight submission.
    ///
    /// Success moves the page to `Submitted`. Failure keeps the form editable with the error as
    /// feedback so the patient can correct and resubmit.
    pub fn finish_submit(&mut self, result: Result<SubmissionReceipt, SubmissionError>) {
        let form = match &mut self.state {
            PageState::Ready(form) if form.submitting => form,
            _ => {
                tracing::debug!("ignoring submission result with no attempt in flight");
                return;
            }
        };
        form.submitting = false;

        match result {
            Ok(receipt) => {
                tracing::info!(
                    public_id = %form.template.public_id,
                    submission_id = ?receipt.submission_id,
                    "form submitted"
                );
                let template = form.template.clone();
                self.state = PageState::Submitted { template, receipt };
            }
            Err(err) => {
                tracing::warn!(public_id = %form.template.public_id, "submission rejected: {err}");
                form.feedback = Some(SubmitFeedback::Remote(err));
            }
        }
    }
}
