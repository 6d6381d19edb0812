use crate::message::{Command, Update};
use crossbeam_channel::Sender;
use std::io::stdin;
use termion::{
    event::{Event, Key},
    input::TermRead,
};

fn command(event: &Event) -> Option<Command> {
    let command = match event {
        Event::Key(Key::Char('c')) => Command::CreateClient,
        Event::Key(Key::Char('m')) => Command::SubmitComment,
        Event::Key(Key::Char('r')) => Command::Reply,
        Event::Key(Key::Char('f')) => Command::ToggleFollow,
        Event::Key(Key::Char(ch @ '1'..='9')) => Command::Rate(*ch as usize - '1' as usize),
        _ => return None,
    };
    Some(command)
}

pub(crate) fn handle(s: Sender<Update>) -> anyhow::Result<()> {
    let stdin = stdin();
    for c in stdin.events() {
        let c = c?;
        if let Event::Key(Key::Char('q')) = c {
            s.send(Update::Quit)?;
            return Ok(());
        }
        match command(&c) {
            Some(command) => s.send(Update::Command(command))?,
            None => log::trace!("{:?} received.", c),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::command;
    use crate::message::Command;
    use termion::event::{Event, Key};

    #[test]
    fn digits_pick_rating_buttons() {
        assert_eq!(command(&Event::Key(Key::Char('1'))), Some(Command::Rate(0)));
        assert_eq!(command(&Event::Key(Key::Char('9'))), Some(Command::Rate(8)));
        assert_eq!(command(&Event::Key(Key::Char('0'))), None);
    }

    #[test]
    fn letters_map_to_actions() {
        assert_eq!(command(&Event::Key(Key::Char('f'))), Some(Command::ToggleFollow));
        assert_eq!(command(&Event::Key(Key::Ctrl('f'))), None);
    }
}
