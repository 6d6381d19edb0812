use crate::{
    page::{Submission, Ticket},
    transport::{HttpTransport, Transport},
};
use crossbeam_channel::{Receiver, Sender};
use std::{sync::Arc, time::Duration};
use tether_types::ActionResult;
use tokio::runtime::Runtime;

/// ui -> message thread.
#[derive(Debug)]
pub(crate) enum Request {
    Perform(Submission),
    // graceful exit,
    Shutdown,
}

impl Request {
    pub(crate) fn send(self, s: &Sender<Request>) -> anyhow::Result<()> {
        s.send(self)?;
        Ok(())
    }
}

/// key press, already mapped to what the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    CreateClient,
    SubmitComment,
    Reply,
    ToggleFollow,
    Rate(usize),
}

/// input and message threads -> ui.
#[derive(Debug)]
pub(crate) enum Update {
    Quit,
    Command(Command),
    Completed { ticket: Ticket, result: ActionResult },
}

/// runs every submission on the runtime as it arrives; results go back to
/// the ui tagged with their ticket, in whatever order they finish.
pub(crate) fn handle(s: Sender<Update>, r: Receiver<Request>, transport: HttpTransport) -> anyhow::Result<()> {
    let async_rt = Runtime::new()?;
    let transport = Arc::new(transport);
    while let Ok(req) = r.recv() {
        let Submission { ticket, request } = match req {
            Request::Perform(submission) => submission,
            Request::Shutdown => break,
        };
        let s = s.clone();
        let transport = transport.clone();
        async_rt.spawn(async move {
            let result = transport.send(&request).await;
            log::debug!("#{} settled, success: {}.", ticket, result.is_success());
            if s.send(Update::Completed { ticket, result }).is_err() {
                log::warn!("ui gone, result of #{} dropped.", ticket);
            }
        });
    }
    async_rt.shutdown_timeout(Duration::from_secs(3));
    Ok(())
}
