use super::{Handler, Outcome, Prepared};
use crate::{
    dom::{Document, ElementSpec, NodeId},
    lock::SubmissionLock,
    patch::{Target, UiPatch},
    token::TokenProvider,
};
use serde_json::Value;
use std::sync::Arc;
use tether_types::{
    action::Action,
    response::{CreatedComment, Expected},
    Error, FieldValue, Result,
};

pub(crate) const FORM: &str = "commentForm";
pub(crate) const CONTENT_FIELD: &str = "content";
pub(crate) const PARENT_FIELD: &str = "parent";
pub(crate) const SUBMIT: &str = "commentSubmit";
pub(crate) const ROOT_THREAD: &str = "nested-comments";
pub(crate) const REPLY_BUTTON: &str = "btn-reply";
const BUSY_LABEL: &str = "Waiting for server response";

pub(crate) struct CreateComment {
    tokens: Arc<dyn TokenProvider>,
    lock: SubmissionLock,
}

impl CreateComment {
    pub(crate) fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            tokens,
            lock: SubmissionLock::default(),
        }
    }
}

fn comment_form(doc: &Document) -> Result<NodeId> {
    doc.form(FORM)
        .ok_or_else(|| Error::MissingElement(format!("form[name={}]", FORM)))
}

fn thread_id(id: impl std::fmt::Display) -> String {
    format!("comment-thread-{}", id)
}

/// the thread block for one comment, reply control included so it can be
/// answered straight away.
pub(crate) fn comment_markup(comment: &CreatedComment) -> ElementSpec {
    let id = comment.id.to_string();
    let avatar = ElementSpec::new("div").class("col-md-2").child(
        ElementSpec::new("img")
            .attr("src", comment.avatar.as_str())
            .attr("style", "width: 120px;height: 120px;object-fit: cover;")
            .attr("alt", comment.author.as_str()),
    );
    let body = ElementSpec::new("div")
        .class("card-body")
        .child(
            ElementSpec::new("h6")
                .class("card-title")
                .child(ElementSpec::new("a").attr("href", comment.get_absolute_url.as_str()).text(comment.author.as_str())),
        )
        .child(ElementSpec::new("p").class("card-text").text(comment.content.as_str()))
        .child(
            ElementSpec::new("a")
                .class("btn btn-sm btn-dark")
                .class(REPLY_BUTTON)
                .attr("href", format!("#{}", FORM))
                .attr("data-comment-id", id.as_str())
                .attr("data-comment-username", comment.author.as_str())
                .text("Reply"),
        )
        .child(ElementSpec::new("hr"))
        .child(ElementSpec::new("time").text(comment.time_create.as_str()));
    ElementSpec::new("ul").id(thread_id(&id)).child(
        ElementSpec::new("li").class("card border-0").child(
            ElementSpec::new("div")
                .class("row")
                .child(avatar)
                .child(ElementSpec::new("div").class("col-md-10").child(body)),
        ),
    )
}

/// pre-fills the form to answer the comment behind `button`. local only.
pub(crate) fn reply_patches(doc: &Document, button: NodeId) -> Result<Vec<UiPatch>> {
    let form = comment_form(doc)?;
    let field = |name: &str| {
        doc.field(form, name)
            .map(Target::Node)
            .ok_or_else(|| Error::MissingElement(format!("[name={}]", name)))
    };
    let username = doc.attr(button, "data-comment-username").unwrap_or_default();
    let comment_id = doc.attr(button, "data-comment-id").unwrap_or_default();
    Ok(vec![
        UiPatch::SetValue {
            target: field(CONTENT_FIELD)?,
            value: format!("{}, ", username),
        },
        UiPatch::SetValue {
            target: field(PARENT_FIELD)?,
            value: comment_id.to_owned(),
        },
    ])
}

impl Handler for CreateComment {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn lock(&self) -> Option<&SubmissionLock> {
        Some(&self.lock)
    }

    fn prepare(&self, doc: &Document) -> Result<Prepared> {
        let form = comment_form(doc)?;
        let action = Action::CreateComment {
            article_id: doc.attr(form, "data-article-id").unwrap_or_default().to_owned(),
            fields: doc
                .form_fields(form)
                .into_iter()
                .map(|(name, value)| (name, FieldValue::Text(value)))
                .collect(),
        };
        let token = self.tokens.token().ok_or(Error::MissingToken)?;
        let request = action.into_request().with_token(token);
        Ok(Prepared::new(request)
            .control(doc.field(form, SUBMIT))
            .busy_label(BUSY_LABEL)
            .form(form))
    }

    fn complete(&self, _doc: &Document, prepared: &Prepared, body: Value) -> Result<Outcome> {
        let comment = CreatedComment::from_value(body)?;
        log::info!("[comment] comment {} created.", comment.id);
        let thread = match (&comment.parent_id, comment.is_child) {
            (Some(parent_id), true) => Target::Id(thread_id(parent_id)),
            _ => Target::Class(ROOT_THREAD.to_owned()),
        };
        let mut patches = vec![UiPatch::Append {
            parent: thread,
            element: comment_markup(&comment),
        }];
        if let Some(form) = prepared.form {
            patches.push(UiPatch::ResetForm(Target::Node(form)));
        }
        Ok(Outcome {
            patches,
            ..Outcome::default()
        })
    }
}
