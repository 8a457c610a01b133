use std::time::Duration;

use tracing::debug;

use crate::board;
use crate::config::{toggle_theme, Config, ConfigStore, Theme};
use crate::input::Command;
use crate::runtime::GameEvent;
use crate::scheduler::Scheduler;
use crate::session::Session;

/// Presentation-side state wrapped around a session: board cursor,
/// theme preference and the quit flag.
#[derive(Debug)]
pub struct App<S: Scheduler, C: ConfigStore> {
    pub session: Session<S>,
    pub cursor: usize,
    pub config: Config,
    pub should_quit: bool,
    store: C,
}

impl<S: Scheduler, C: ConfigStore> App<S, C> {
    pub fn new(session: Session<S>, config: Config, store: C) -> Self {
        Self {
            session,
            cursor: board::index(board::EDGE / 2, board::EDGE / 2),
            config,
            should_quit: false,
            store,
        }
    }

    pub fn theme(&self) -> Theme {
        self.config.theme
    }

    /// Feed one runtime event in. Returns true when the screen should be redrawn.
    pub fn handle_event(&mut self, event: GameEvent) -> bool {
        match event {
            GameEvent::Tick => self.session.pump() > 0,
            GameEvent::Resize => true,
            GameEvent::Command(cmd) => self.run(cmd),
        }
    }

    /// How long the loop may sleep before a session timer comes due.
    pub fn until_next_timer(&self) -> Option<Duration> {
        self.session
            .scheduler()
            .until_next_due()
            .map(Duration::from_millis)
    }

    pub fn run(&mut self, cmd: Command) -> bool {
        debug!(?cmd, "command");
        match cmd {
            Command::Quit => self.should_quit = true,
            Command::Move(dir) => self.cursor = board::step(self.cursor, dir),
            Command::ToggleAtCursor => self.session.toggle(self.cursor),
            Command::ToggleTheme => {
                toggle_theme(&self.store, &mut self.config);
            }
            Command::Session(intent) => self.session.apply(intent),
        }
        true
    }
}
