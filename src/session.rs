use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::board;
use crate::config::Config;
use crate::evaluate::{evaluate, Tally, Verdict};
use crate::rules::{active_set, Level};
use crate::scheduler::{Fired, Millis, Scheduler, TimerId, TimerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Showing,
    Selection,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub flash_interval: Millis,
    pub show_duration: Millis,
    pub auto_advance: Millis,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            flash_interval: 600,
            show_duration: 10_000,
            auto_advance: 1_400,
        }
    }
}

impl From<&Config> for Timings {
    fn from(cfg: &Config) -> Self {
        Self {
            flash_interval: cfg.flash_interval_ms,
            show_duration: cfg.show_duration_ms,
            auto_advance: cfg.auto_advance_ms,
        }
    }
}

/// Everything the player can ask the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    StopEarlyOrReplay,
    ClearSelections,
    Check,
    NextLevel,
    Reset,
    SelectLevel(Level),
    Toggle(usize),
}

#[derive(Debug, Default)]
struct Timers {
    flash: Option<TimerId>,
    show: Option<TimerId>,
    advance: Option<TimerId>,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::Flash => &mut self.flash,
            TimerKind::ShowDuration => &mut self.show,
            TimerKind::AutoAdvance => &mut self.advance,
        }
    }
}

/// One game session: the only place game state changes.
///
/// User intents come in through the public methods (or [`Session::apply`]),
/// timer expiries through [`Session::pump`]. Both run on the caller's
/// thread, so no two mutations overlap.
#[derive(Debug)]
pub struct Session<S: Scheduler> {
    scheduler: S,
    timings: Timings,
    phase: Phase,
    level: Level,
    active: BTreeSet<usize>,
    selection: BTreeSet<usize>,
    results: BTreeMap<usize, Verdict>,
    flash_on: bool,
    timers: Timers,
}

impl<S: Scheduler> Session<S> {
    pub fn new(scheduler: S, timings: Timings, level: Level) -> Self {
        Self {
            scheduler,
            timings,
            phase: Phase::Idle,
            level,
            active: active_set(level),
            selection: BTreeSet::new(),
            results: BTreeMap::new(),
            flash_on: false,
            timers: Timers::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn active_set(&self) -> &BTreeSet<usize> {
        &self.active
    }

    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.selection
    }

    pub fn results(&self) -> &BTreeMap<usize, Verdict> {
        &self.results
    }

    pub fn tally(&self) -> Tally {
        Tally::of(&self.results)
    }

    pub fn verdict(&self, pos: usize) -> Option<Verdict> {
        self.results.get(&pos).copied()
    }

    pub fn is_selected(&self, pos: usize) -> bool {
        self.selection.contains(&pos)
    }

    /// Rule highlight, only shown while the pattern is on screen
    pub fn visible_active(&self, pos: usize) -> bool {
        self.phase == Phase::Showing && self.active.contains(&pos)
    }

    pub fn flashing(&self, pos: usize) -> bool {
        self.visible_active(pos) && self.flash_on
    }

    pub fn auto_advance_pending(&self) -> bool {
        self.timers.advance.is_some()
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Start => self.start(),
            Intent::StopEarlyOrReplay => self.stop_early_or_replay(),
            Intent::ClearSelections => self.clear_selections(),
            Intent::Check => self.check(),
            Intent::NextLevel => self.next_level(),
            Intent::Reset => self.reset(),
            Intent::SelectLevel(level) => self.select_level(level),
            Intent::Toggle(pos) => self.toggle(pos),
        }
    }

    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = %self.phase, "start ignored outside idle");
            return;
        }
        self.begin_showing();
    }

    /// Stops the show early while showing; otherwise replays the pattern.
    pub fn stop_early_or_replay(&mut self) {
        match self.phase {
            Phase::Idle => debug!("replay ignored while idle"),
            Phase::Showing => {
                self.cancel(TimerKind::Flash);
                self.cancel(TimerKind::ShowDuration);
                self.flash_on = false;
                self.enter(Phase::Selection);
            }
            Phase::Selection | Phase::Result => self.begin_showing(),
        }
    }

    pub fn clear_selections(&mut self) {
        match self.phase {
            // a pending auto-advance stays armed
            Phase::Selection | Phase::Result => {
                self.selection.clear();
                self.results.clear();
            }
            Phase::Idle | Phase::Showing => {
                debug!(phase = %self.phase, "clear ignored");
            }
        }
    }

    pub fn check(&mut self) {
        if self.phase != Phase::Selection {
            debug!(phase = %self.phase, "check ignored outside selection");
            return;
        }

        let evaluation = evaluate(&self.selection, &self.active);
        let perfect = evaluation.is_perfect();
        info!(
            level = self.level.get(),
            correct = evaluation.tally.correct,
            wrong = evaluation.tally.wrong,
            missed = evaluation.tally.missed,
            perfect,
            "answer checked"
        );
        self.results = evaluation.results;

        if perfect {
            self.arm_once(TimerKind::AutoAdvance, self.timings.auto_advance);
        }
        self.enter(Phase::Result);
    }

    pub fn next_level(&mut self) {
        self.cancel_all();
        self.set_level(self.level.next());
        self.begin_showing();
    }

    pub fn reset(&mut self) {
        self.cancel_all();
        self.selection.clear();
        self.results.clear();
        self.flash_on = false;
        self.enter(Phase::Idle);
    }

    pub fn select_level(&mut self, level: Level) {
        self.set_level(level);
        if self.phase != Phase::Idle {
            self.begin_showing();
        }
    }

    pub fn toggle(&mut self, pos: usize) {
        if self.phase != Phase::Selection {
            debug!(phase = %self.phase, pos, "toggle ignored outside selection");
            return;
        }
        if !board::contains(pos) {
            debug!(pos, "toggle ignored for position off the board");
            return;
        }
        if !self.selection.remove(&pos) {
            self.selection.insert(pos);
        }
    }

    /// Deliver every timer that has come due. Returns how many fired.
    pub fn pump(&mut self) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due() {
            self.on_timer(timer);
            fired += 1;
        }
        fired
    }

    fn on_timer(&mut self, fired: Fired) {
        if *self.timers.slot(fired.kind) != Some(fired.id) {
            debug!(kind = %fired.kind, "stale timer dropped");
            return;
        }

        match fired.kind {
            TimerKind::Flash => {
                self.flash_on = !self.flash_on;
            }
            TimerKind::ShowDuration => {
                self.timers.show = None;
                self.cancel(TimerKind::Flash);
                self.flash_on = false;
                self.enter(Phase::Selection);
            }
            TimerKind::AutoAdvance => {
                self.timers.advance = None;
                self.set_level(self.level.next());
                self.begin_showing();
            }
        }
    }

    fn begin_showing(&mut self) {
        self.cancel_all();
        self.selection.clear();
        self.results.clear();
        self.active = active_set(self.level);
        self.flash_on = true;
        self.arm_repeating(TimerKind::Flash, self.timings.flash_interval);
        self.arm_once(TimerKind::ShowDuration, self.timings.show_duration);
        self.enter(Phase::Showing);
    }

    fn set_level(&mut self, level: Level) {
        if level != self.level {
            info!(from = self.level.get(), to = level.get(), "level changed");
        }
        self.level = level;
        self.active = active_set(level);
    }

    fn enter(&mut self, phase: Phase) {
        if phase != self.phase {
            info!(from = %self.phase, to = %phase, level = self.level.get(), "phase changed");
        }
        self.phase = phase;
    }

    // Every arm cancels the slot's previous timer first.
    fn arm_once(&mut self, kind: TimerKind, delay: Millis) {
        self.cancel(kind);
        let id = self.scheduler.schedule_once(delay, kind);
        *self.timers.slot(kind) = Some(id);
    }

    fn arm_repeating(&mut self, kind: TimerKind, period: Millis) {
        self.cancel(kind);
        let id = self.scheduler.schedule_repeating(period, kind);
        *self.timers.slot(kind) = Some(id);
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(id) = self.timers.slot(kind).take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_all(&mut self) {
        self.cancel(TimerKind::Flash);
        self.cancel(TimerKind::ShowDuration);
        self.cancel(TimerKind::AutoAdvance);
    }
}

impl<S: Scheduler> Drop for Session<S> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
