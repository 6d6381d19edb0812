//! One handler per user action. Each gathers its input from the document,
//! describes one request, and turns the decoded body into patches.

use crate::{
    dom::{Document, NodeId},
    lock::SubmissionLock,
    notify::Notification,
    patch::UiPatch,
};
use serde_json::Value;
use tether_types::{ActionRequest, Result};

pub(crate) mod client;
pub(crate) mod comment;
pub(crate) mod follow;
pub(crate) mod rating;
pub(crate) mod status;

/// what started a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Trigger {
    PollStatus(String),
    CreateClient,
    SubmitComment,
    ToggleFollow,
    /// index into the page's rating buttons.
    Rate(usize),
}

/// the request plus whatever the completion step needs to find again.
#[derive(Debug, Clone)]
pub(crate) struct Prepared {
    pub request: ActionRequest,
    /// disabled while the request is in flight.
    pub control: Option<NodeId>,
    /// shown on the control while in flight, the old label comes back after.
    pub busy_label: Option<&'static str>,
    pub form: Option<NodeId>,
}

impl Prepared {
    pub(crate) fn new(request: ActionRequest) -> Self {
        Self {
            request,
            control: None,
            busy_label: None,
            form: None,
        }
    }

    pub(crate) fn control(mut self, control: Option<NodeId>) -> Self {
        self.control = control;
        self
    }

    pub(crate) fn busy_label(mut self, label: &'static str) -> Self {
        self.busy_label = Some(label);
        self
    }

    pub(crate) fn form(mut self, form: NodeId) -> Self {
        self.form = Some(form);
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub patches: Vec<UiPatch>,
    pub notice: Option<Notification>,
    pub follow_up: Vec<Trigger>,
}

pub(crate) trait Handler {
    fn name(&self) -> &'static str;

    /// `None` for pure reads, which never take the lock.
    fn lock(&self) -> Option<&SubmissionLock>;

    fn prepare(&self, doc: &Document) -> Result<Prepared>;

    /// only called with a 2xx json body. a body lacking what the handler
    /// needs must come back as `Error::ShapeMismatch`.
    fn complete(&self, doc: &Document, prepared: &Prepared, body: Value) -> Result<Outcome>;
}
