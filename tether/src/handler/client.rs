use super::{Handler, Outcome, Prepared, Trigger};
use crate::{dom::Document, lock::SubmissionLock, notify::Notification, token::TokenProvider};
use serde_json::Value;
use std::sync::Arc;
use tether_types::{
    action::Action,
    response::{CreatedClient, Expected},
    Error, Result,
};

pub(crate) const NAME_INPUT: &str = "clientName";
pub(crate) const CHANNEL_INPUT: &str = "clientChannel";
pub(crate) const CREATE_BUTTON: &str = "createClient";

pub(crate) struct CreateClient {
    tokens: Arc<dyn TokenProvider>,
    lock: SubmissionLock,
}

impl CreateClient {
    pub(crate) fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens,
            lock: SubmissionLock::default(),
        }
    }
}

fn input_value(doc: &Document, id: &str) -> Result<String> {
    let node = doc
        .by_id(id)
        .ok_or_else(|| Error::MissingElement(format!("#{}", id)))?;
    Ok(doc.attr(node, "value").unwrap_or_default().to_owned())
}

impl Handler for CreateClient {
    fn name(&self) -> &'static str {
        "create client"
    }

    fn lock(&self) -> Option<&SubmissionLock> {
        Some(&self.lock)
    }

    fn prepare(&self, doc: &Document) -> Result<Prepared> {
        let action = Action::CreateClient {
            name: input_value(doc, NAME_INPUT)?,
            channel: input_value(doc, CHANNEL_INPUT)?,
        };
        let token = self.tokens.token().ok_or(Error::MissingToken)?;
        let request = action.into_request().with_token(token);
        Ok(Prepared::new(request).control(doc.by_id(CREATE_BUTTON)))
    }

    fn complete(&self, _doc: &Document, _prepared: &Prepared, body: Value) -> Result<Outcome> {
        let created = CreatedClient::from_value(body)?;
        log::info!("[create client] id {} token {}.", created.client_id, created.token);
        let notice = Notification::success(
            "Client created successfully!",
            format!("Client ID: {}, Token: {}", created.client_id, created.token),
        );
        Ok(Outcome {
            patches: Vec::new(),
            notice: Some(notice),
            follow_up: vec![Trigger::PollStatus(created.client_id.to_string())],
        })
    }
}
