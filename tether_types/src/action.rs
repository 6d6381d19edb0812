use crate::{ActionRequest, Encoding, FieldValue, Method};
use serde::{Deserialize, Serialize};
use urlencoding::encode;

/// the five endpoint calls, one per handler.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Action {
    PollStatus { client_id: String },
    CreateClient { name: String, channel: String },
    CreateComment { article_id: String, fields: Vec<(String, FieldValue)> },
    ToggleFollow { slug: String },
    SubmitRating { article_id: FieldValue, value: FieldValue },
}

impl Action {
    pub fn method(&self) -> Method {
        match self {
            Action::PollStatus { .. } => Method::Get,
            _ => Method::Post,
        }
    }

    pub fn encoding(&self) -> Encoding {
        match self {
            Action::PollStatus { .. } | Action::ToggleFollow { .. } => Encoding::None,
            Action::CreateClient { .. } => Encoding::Json,
            Action::CreateComment { .. } | Action::SubmitRating { .. } => Encoding::Multipart,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Action::PollStatus { client_id } => format!("/get_status/{}", encode(client_id)),
            Action::CreateClient { .. } => "/telegram/create_client".to_owned(),
            Action::CreateComment { article_id, .. } => {
                format!("/articles/{}/comments/create/", encode(article_id))
            }
            Action::ToggleFollow { slug } => format!("/user/follow/{}/", encode(slug)),
            Action::SubmitRating { .. } => "/rating/".to_owned(),
        }
    }

    /// the anti-forgery token is not part of the action, callers attach it
    /// with [`ActionRequest::with_token`].
    pub fn into_request(self) -> ActionRequest {
        let req = ActionRequest::new(self.method(), self.path(), self.encoding());
        match self {
            Action::PollStatus { .. } | Action::ToggleFollow { .. } => req,
            Action::CreateClient { name, channel } => req.field("name", name).field("channel", channel),
            Action::CreateComment { fields, .. } => fields
                .into_iter()
                .fold(req, |req, (name, value)| req.field(name, value)),
            Action::SubmitRating { article_id, value } => req.field("article_id", article_id).field("value", value),
        }
    }
}
