use super::{Handler, Outcome, Prepared};
use crate::{
    dom::{Document, NodeId},
    lock::SubmissionLock,
    patch::{Target, UiPatch},
    token::TokenProvider,
};
use serde_json::Value;
use std::sync::Arc;
use tether_types::{
    action::Action,
    response::{Expected, RatingSum},
    Error, FieldValue, Result,
};

pub(crate) const BUTTONS: &str = "rating-buttons";
pub(crate) const SUM: &str = "rating-sum";

/// bound to one rating button, so every button has its own lock.
pub(crate) struct SubmitRating {
    button: NodeId,
    tokens: Arc<dyn TokenProvider>,
    lock: SubmissionLock,
}

impl SubmitRating {
    pub(crate) fn new(button: NodeId, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            button,
            tokens,
            lock: SubmissionLock::default(),
        }
    }
}

impl Handler for SubmitRating {
    fn name(&self) -> &'static str {
        "rating"
    }

    fn lock(&self) -> Option<&SubmissionLock> {
        Some(&self.lock)
    }

    fn prepare(&self, doc: &Document) -> Result<Prepared> {
        let data = |name: &str| FieldValue::parse_lossy(doc.attr(self.button, name).unwrap_or_default());
        let action = Action::SubmitRating {
            article_id: data("data-article"),
            value: data("data-value"),
        };
        let token = self.tokens.token().ok_or(Error::MissingToken)?;
        Ok(Prepared::new(action.into_request().with_token(token)).control(Some(self.button)))
    }

    // shown verbatim, never recomputed locally.
    fn complete(&self, _doc: &Document, _prepared: &Prepared, body: Value) -> Result<Outcome> {
        let sum = RatingSum::from_value(body)?;
        Ok(Outcome {
            patches: vec![UiPatch::SetText {
                target: Target::Within(self.button, SUM.to_owned()),
                text: sum.rating_sum.to_string(),
            }],
            ..Outcome::default()
        })
    }
}
