use super::{Handler, Outcome, Prepared};
use crate::{
    dom::{Document, ElementSpec},
    lock::SubmissionLock,
    patch::{Target, UiPatch},
    token::TokenProvider,
};
use serde_json::Value;
use std::sync::Arc;
use tether_types::{
    action::Action,
    response::{Expected, FollowState},
    Error, Result,
};

pub(crate) const BUTTON: &str = "btn-follow";
pub(crate) const FOLLOWERS: &str = "followers-box";
const PRIMARY: &str = "btn-primary";
const DANGER: &str = "btn-danger";

pub(crate) struct ToggleFollow {
    tokens: Arc<dyn TokenProvider>,
    lock: SubmissionLock,
}

impl ToggleFollow {
    pub(crate) fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens,
            lock: SubmissionLock::default(),
        }
    }
}

fn entry_id(slug: &str) -> String {
    format!("user-slug-{}", slug)
}

fn follower_entry(slug: &str, url: &str, avatar: &str) -> ElementSpec {
    ElementSpec::new("div").class("col-md-2").id(entry_id(slug)).child(
        ElementSpec::new("a").attr("href", url).child(
            ElementSpec::new("img")
                .attr("src", avatar)
                .class("img-fluid rounded-1")
                .attr("alt", slug),
        ),
    )
}

impl Handler for ToggleFollow {
    fn name(&self) -> &'static str {
        "follow"
    }

    fn lock(&self) -> Option<&SubmissionLock> {
        Some(&self.lock)
    }

    fn prepare(&self, doc: &Document) -> Result<Prepared> {
        let button = doc
            .first_by_class(BUTTON)
            .ok_or_else(|| Error::MissingElement(format!(".{}", BUTTON)))?;
        let action = Action::ToggleFollow {
            slug: doc.attr(button, "data-slug").unwrap_or_default().to_owned(),
        };
        let token = self.tokens.token().ok_or(Error::MissingToken)?;
        Ok(Prepared::new(action.into_request().with_token(token)).control(Some(button)))
    }

    fn complete(&self, doc: &Document, prepared: &Prepared, body: Value) -> Result<Outcome> {
        let state = FollowState::from_value(body)?;
        let button = prepared
            .control
            .ok_or_else(|| Error::MissingElement(format!(".{}", BUTTON)))?;
        let (from, to) = if doc.has_class(button, PRIMARY) {
            (PRIMARY, DANGER)
        } else {
            (DANGER, PRIMARY)
        };
        let entry = match (state.status, &state.get_absolute_url, &state.avatar) {
            (true, Some(url), Some(avatar)) => UiPatch::Append {
                parent: Target::Class(FOLLOWERS.to_owned()),
                element: follower_entry(&state.slug, url, avatar),
            },
            _ => UiPatch::Remove(Target::Id(entry_id(&state.slug))),
        };
        log::info!("[follow] {} now {}.", state.slug, if state.status { "followed" } else { "unfollowed" });
        Ok(Outcome {
            patches: vec![
                UiPatch::SwapClass {
                    target: Target::Node(button),
                    from: from.to_owned(),
                    to: to.to_owned(),
                },
                entry,
                UiPatch::SetText {
                    target: Target::Node(button),
                    text: state.message.unwrap_or_default(),
                },
            ],
            ..Outcome::default()
        })
    }
}
