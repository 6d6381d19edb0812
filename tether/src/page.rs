use crate::{
    dom::{Document, NodeId},
    handler::{
        client::CreateClient, comment, comment::CreateComment, follow::ToggleFollow, rating, rating::SubmitRating,
        status::StatusPoll, Handler, Outcome, Prepared, Trigger,
    },
    lock::SubmissionGuard,
    notify::Notification,
    patch::{Target, UiPatch},
    token::TokenProvider,
};
use std::{collections::HashMap, sync::Arc};
use tether_types::{ActionRequest, ActionResult, Error, Result};

pub(crate) type Ticket = u64;

/// a request ready to go out; its ticket comes back with the result.
#[derive(Debug)]
pub(crate) struct Submission {
    pub ticket: Ticket,
    pub request: ActionRequest,
}

struct Pending {
    trigger: Trigger,
    prepared: Prepared,
    /// control text before the busy label went up.
    label: Option<String>,
    guard: Option<SubmissionGuard>,
}

/// one loaded page: the document plus the handlers bound to it.
pub(crate) struct Page {
    document: Document,
    create_client: CreateClient,
    comment: CreateComment,
    follow: ToggleFollow,
    ratings: Vec<SubmitRating>,
    pending: HashMap<Ticket, Pending>,
    next_ticket: Ticket,
    notices: Vec<Notification>,
}

impl Page {
    pub(crate) fn new(document: Document, tokens: Arc<dyn TokenProvider>) -> Self {
        let ratings = document
            .all_by_class(rating::BUTTONS)
            .into_iter()
            .map(|button| SubmitRating::new(button, tokens.clone()))
            .collect();
        Self {
            create_client: CreateClient::new(tokens.clone()),
            comment: CreateComment::new(tokens.clone()),
            follow: ToggleFollow::new(tokens),
            ratings,
            document,
            pending: HashMap::new(),
            next_ticket: 0,
            notices: Vec::new(),
        }
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn notices(&self) -> &[Notification] {
        &self.notices
    }

    pub(crate) fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn with_handler<R, F>(&self, trigger: &Trigger, f: F) -> Result<R>
    where
        F: FnOnce(&dyn Handler) -> Result<R>,
    {
        match trigger {
            Trigger::PollStatus(client_id) => f(&StatusPoll::new(client_id.clone())),
            Trigger::CreateClient => f(&self.create_client),
            Trigger::SubmitComment => f(&self.comment),
            Trigger::ToggleFollow => f(&self.follow),
            Trigger::Rate(n) => match self.ratings.get(*n) {
                Some(handler) => f(handler),
                None => Err(Error::MissingElement(format!(".{}[{}]", rating::BUTTONS, n))),
            },
        }
    }

    fn notify(&mut self, notice: Notification) {
        log::info!("[notice] {}: {}", notice.title, notice.text);
        self.notices.push(notice);
    }

    /// Idle -> Submitting. Takes the handler's lock, disables its control and
    /// hands back the request to send. A held lock yields `Error::Busy` and
    /// leaves everything untouched.
    pub(crate) fn begin(&mut self, trigger: Trigger) -> Result<Submission> {
        let document = &self.document;
        let prepared = self.with_handler(&trigger, |handler| {
            let guard = match handler.lock() {
                Some(lock) => Some(lock.try_acquire().ok_or(Error::Busy)?),
                None => None,
            };
            let prepared = handler.prepare(document)?;
            debug_assert_eq!(guard.is_some(), prepared.request.is_state_changing(), "{}", handler.name());
            Ok((handler.name(), guard, prepared))
        });
        let (name, guard, prepared) = match prepared {
            Ok(prepared) => prepared,
            Err(Error::Busy) => {
                log::debug!("{:?} ignored, still submitting.", trigger);
                return Err(Error::Busy);
            }
            Err(e) => {
                log::warn!("{:?} not submitted: {}", trigger, e);
                self.notify(Notification::from_error(&e));
                return Err(e);
            }
        };

        let mut label = None;
        if let (Some(control), true) = (prepared.control, guard.is_some()) {
            let mut patches = vec![UiPatch::SetDisabled {
                target: Target::Node(control),
                disabled: true,
            }];
            if let Some(busy) = prepared.busy_label {
                label = Some(self.document.text(control));
                patches.push(UiPatch::SetText {
                    target: Target::Node(control),
                    text: busy.to_owned(),
                });
            }
            self.document.apply_all(&patches)?;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let request = prepared.request.clone();
        log::info!("[{}] #{} {} {}", name, ticket, request.method.as_str(), request.path);
        self.pending.insert(
            ticket,
            Pending {
                trigger,
                prepared,
                label,
                guard,
            },
        );
        Ok(Submission { ticket, request })
    }

    /// Submitting -> Idle. Re-enables the control, then patches the document
    /// or shows the error. Returns the follow-up triggers to run next.
    pub(crate) fn complete(&mut self, ticket: Ticket, result: ActionResult) -> Vec<Trigger> {
        let pending = match self.pending.remove(&ticket) {
            Some(pending) => pending,
            None => {
                log::warn!("result for unknown submission #{} dropped.", ticket);
                return Vec::new();
            }
        };
        if let (Some(control), true) = (pending.prepared.control, pending.guard.is_some()) {
            let mut patches = vec![UiPatch::SetDisabled {
                target: Target::Node(control),
                disabled: false,
            }];
            if let Some(label) = &pending.label {
                patches.push(UiPatch::SetText {
                    target: Target::Node(control),
                    text: label.clone(),
                });
            }
            self.document.apply_all(&patches).ok();
        }

        let document = &self.document;
        let outcome = result.into_result().and_then(|body| {
            self.with_handler(&pending.trigger, |handler| {
                handler.complete(document, &pending.prepared, body)
            })
        });
        match outcome {
            Ok(Outcome {
                patches,
                notice,
                follow_up,
            }) => {
                log::info!("#{} done.", ticket);
                if let Err(e) = self.document.apply_all(&patches) {
                    self.notify(Notification::from_error(&e));
                }
                if let Some(notice) = notice {
                    self.notify(notice);
                }
                follow_up
            }
            Err(e) => {
                match &e {
                    Error::TransportFailure { status, message } => {
                        log::warn!("#{} failed with status {:?}: {}", ticket, status, message)
                    }
                    other => log::warn!("#{} failed: {}", ticket, other),
                }
                self.notify(Notification::from_error(&e));
                Vec::new()
            }
        }
    }

    /// the newest reply control on the page, if any.
    pub(crate) fn latest_reply_button(&self) -> Option<NodeId> {
        self.document.all_by_class(comment::REPLY_BUTTON).pop()
    }

    /// local action: point the comment form at the comment behind `button`.
    pub(crate) fn reply(&mut self, button: NodeId) -> Result<()> {
        let patches = comment::reply_patches(&self.document, button)?;
        self.document.apply_all(&patches)
    }
}
