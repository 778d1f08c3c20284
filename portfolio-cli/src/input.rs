use crate::session::Key;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HostAction {
    Quit,
    Key(Key),
    Redraw,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<HostAction>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                if let Some(action) = map_key(k) {
                    out.push(action);
                }
                if out.len() >= 32 {
                    break;
                }
            }
            Event::Resize(_, _) => out.push(HostAction::Redraw),
            _ => {}
        }
    }
    Ok(out)
}

pub(crate) fn map_key(ev: KeyEvent) -> Option<HostAction> {
    let ctrl = ev.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl {
        return match ev.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(HostAction::Quit),
            KeyCode::Char('k') | KeyCode::Char('K') => Some(HostAction::Key(Key::Chord)),
            KeyCode::Char('w') | KeyCode::Char('W') => Some(HostAction::Key(Key::Close)),
            _ => None,
        };
    }

    let key = match ev.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Esc => Key::Esc,
        KeyCode::F(2) => Key::Minimize,
        KeyCode::F(11) => Key::Fullscreen,
        _ => return None,
    };
    Some(HostAction::Key(key))
}
