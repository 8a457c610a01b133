use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::board::Direction;
use crate::rules::{Level, LEVEL_COUNT};
use crate::session::Intent;

/// What a key press asks for. Cursor movement and theme live in the
/// presentation layer; everything else goes to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Session(Intent),
    Move(Direction),
    ToggleAtCursor,
    ToggleTheme,
    Quit,
}

pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    let cmd = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Command::Quit,
        KeyCode::Up | KeyCode::Char('k') => Command::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') => Command::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') => Command::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') => Command::Move(Direction::Right),
        KeyCode::Char(' ') | KeyCode::Enter => Command::ToggleAtCursor,
        KeyCode::Char('s') => Command::Session(Intent::Start),
        KeyCode::Char('e') => Command::Session(Intent::StopEarlyOrReplay),
        KeyCode::Char('c') => Command::Session(Intent::Check),
        KeyCode::Char('x') => Command::Session(Intent::ClearSelections),
        KeyCode::Char('n') => Command::Session(Intent::NextLevel),
        KeyCode::Char('r') => Command::Session(Intent::Reset),
        KeyCode::Char('t') => Command::ToggleTheme,
        KeyCode::Char(d) => {
            let n = d.to_digit(10).filter(|n| (1..=LEVEL_COUNT).contains(n))?;
            Command::Session(Intent::SelectLevel(Level::new(n)))
        }
        _ => return None,
    };
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn game_keys_map_to_intents() {
        assert_eq!(
            command_for_key(key(KeyCode::Char('s'))),
            Some(Command::Session(Intent::Start))
        );
        assert_eq!(
            command_for_key(key(KeyCode::Char('e'))),
            Some(Command::Session(Intent::StopEarlyOrReplay))
        );
        assert_eq!(
            command_for_key(key(KeyCode::Char('c'))),
            Some(Command::Session(Intent::Check))
        );
        assert_eq!(
            command_for_key(key(KeyCode::Char('r'))),
            Some(Command::Session(Intent::Reset))
        );
    }

    #[test]
    fn digits_select_builtin_levels_only() {
        assert_matches!(
            command_for_key(key(KeyCode::Char('3'))),
            Some(Command::Session(Intent::SelectLevel(l))) if l == Level::new(3)
        );
        assert_eq!(command_for_key(key(KeyCode::Char('0'))), None);
        assert_eq!(command_for_key(key(KeyCode::Char('6'))), None);
    }

    #[test]
    fn movement_and_toggle() {
        assert_eq!(
            command_for_key(key(KeyCode::Left)),
            Some(Command::Move(Direction::Left))
        );
        assert_eq!(
            command_for_key(key(KeyCode::Char('j'))),
            Some(Command::Move(Direction::Down))
        );
        assert_eq!(
            command_for_key(key(KeyCode::Enter)),
            Some(Command::ToggleAtCursor)
        );
    }

    #[test]
    fn quit_keys() {
        assert_eq!(command_for_key(key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(
            command_for_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn unbound_keys_are_none() {
        assert_eq!(command_for_key(key(KeyCode::Char('z'))), None);
        assert_eq!(command_for_key(key(KeyCode::Tab)), None);
    }
}
