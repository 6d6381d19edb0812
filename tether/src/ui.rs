use crate::{
    handler::Trigger,
    message::{Command, Request, Update},
    page::Page,
};
use crossbeam_channel::{Receiver, Sender};
use std::io::stdout;
use tether_types::{ActionResult, Error};
use termion::{raw::IntoRawMode, screen::AlternateScreen};
use tui::{
    backend::{Backend, TermionBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

struct App<'a> {
    page: Page,
    info: Spans<'a>,
}

impl App<'_> {
    fn new(page: Page) -> Self {
        Self {
            page,
            info: Self::default_info(),
        }
    }

    fn draw_page<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let title = format!("page ({} in flight)", self.page.in_flight());
        let main = Block::default().borders(Borders::ALL).title(title);
        let items: Vec<ListItem> = self.page.document().outline().into_iter().map(ListItem::new).collect();
        let list = List::new(items).block(main);
        f.render_widget(list, area);
    }

    fn default_info<'a>() -> Spans<'a> {
        Spans::from(vec![
            Span::from("c create client  m comment  r reply  f follow  1-9 rate  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::from(" to quit"),
        ])
    }

    fn draw_info<B: Backend>(&self, f: &mut Frame<B>, area: Rect) {
        let infomation_block = Block::default().borders(Borders::ALL);
        let info = Paragraph::new(self.info.clone())
            .block(infomation_block)
            .wrap(Wrap { trim: true });
        f.render_widget(info, area);
    }

    fn set_info(&mut self, msg: String) {
        let info = Spans::from(vec![Span::from(msg)]);
        self.info = info;
    }

    fn set_info_err(&mut self, err: String) {
        let info = Spans::from(vec![Span::styled(err, Style::default().fg(Color::LightRed))]);
        self.info = info;
    }

    /// latest notice into the info bar.
    fn show_notice(&mut self) {
        let notice = match self.page.notices().last() {
            Some(notice) => notice,
            None => return,
        };
        let color = if notice.is_error() {
            Color::LightRed
        } else {
            Color::LightGreen
        };
        self.info = Spans::from(vec![
            Span::from(notice.at.format("%H:%M:%S ").to_string()),
            Span::styled(notice.title.clone(), Style::default().fg(color)),
            Span::from(" "),
            Span::from(notice.text.clone()),
        ]);
    }

    fn draw<B: Backend>(&self, f: &mut Frame<B>) {
        // get layout
        let size = f.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(0)
            .constraints([Constraint::Max(size.height.saturating_sub(3)), Constraint::Max(3)].as_ref())
            .split(f.size());
        // draw
        self.draw_page(f, chunks[0]);
        self.draw_info(f, chunks[1]);
    }

    fn submit(&mut self, trigger: Trigger, s: &Sender<Request>) {
        let submission = match self.page.begin(trigger) {
            Ok(submission) => submission,
            Err(Error::Busy) => {
                self.set_info("still waiting for the server.".to_string());
                return;
            }
            Err(_) => {
                self.show_notice();
                return;
            }
        };
        let ticket = submission.ticket;
        if Request::Perform(submission).send(s).is_err() {
            log::error!("message thread gone, #{} abandoned.", ticket);
            let result = ActionResult::Failure {
                status: None,
                message: "network worker stopped".to_owned(),
            };
            self.page.complete(ticket, result);
            self.show_notice();
        }
    }

    fn command(&mut self, command: Command, s: &Sender<Request>) {
        let trigger = match command {
            Command::CreateClient => Trigger::CreateClient,
            Command::SubmitComment => Trigger::SubmitComment,
            Command::ToggleFollow => Trigger::ToggleFollow,
            Command::Rate(n) if n < self.page.rating_count() => Trigger::Rate(n),
            Command::Rate(n) => {
                self.set_info_err(format!("no rating button {}.", n + 1));
                return;
            }
            Command::Reply => {
                match self.page.latest_reply_button() {
                    Some(button) => match self.page.reply(button) {
                        Ok(()) => self.set_info("replying.".to_string()),
                        Err(e) => self.set_info_err(e.to_string()),
                    },
                    None => self.set_info_err("no comment to reply to.".to_string()),
                }
                return;
            }
        };
        self.submit(trigger, s);
    }
}

pub(crate) fn run(page: Page, s: Sender<Request>, r: Receiver<Update>) -> anyhow::Result<()> {
    let stdout = stdout().into_raw_mode()?;
    let stdout = AlternateScreen::from(stdout);
    let backend = TermionBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    // set up app
    let mut app = App::new(page);
    loop {
        terminal.draw(|f| app.draw(f))?;
        match r.recv()? {
            Update::Quit => {
                // result is not important.
                Request::Shutdown.send(&s).ok();
                break;
            }
            Update::Command(command) => app.command(command, &s),
            Update::Completed { ticket, result } => {
                let follow_up = app.page.complete(ticket, result);
                app.show_notice();
                for trigger in follow_up {
                    app.submit(trigger, &s);
                }
            }
        }
    }
    Ok(())
}
