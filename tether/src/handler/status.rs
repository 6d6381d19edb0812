use super::{Handler, Outcome, Prepared};
use crate::{dom::Document, lock::SubmissionLock};
use serde_json::Value;
use tether_types::{action::Action, Result};

/// read-only status check for a freshly created client.
pub(crate) struct StatusPoll {
    client_id: String,
}

impl StatusPoll {
    pub(crate) fn new(client_id: String) -> Self {
        Self { client_id }
    }
}

impl Handler for StatusPoll {
    fn name(&self) -> &'static str {
        "status"
    }

    fn lock(&self) -> Option<&SubmissionLock> {
        None
    }

    fn prepare(&self, _doc: &Document) -> Result<Prepared> {
        let action = Action::PollStatus {
            client_id: self.client_id.clone(),
        };
        Ok(Prepared::new(action.into_request()))
    }

    // the payload shape belongs to the backend; it is only logged.
    fn complete(&self, _doc: &Document, _prepared: &Prepared, body: Value) -> Result<Outcome> {
        log::info!("[status] client {}: {}", self.client_id, body);
        Ok(Outcome::default())
    }
}
