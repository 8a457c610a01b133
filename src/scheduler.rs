use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds on the scheduler's clock
pub type Millis = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// What a timer is for. The session dispatches on this when the timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    Flash,
    ShowDuration,
    AutoAdvance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    pub at: Millis,
}

/// Timer capability used by the session.
///
/// Timers are yielded one at a time by [`Scheduler::pop_due`], so a timer
/// cancelled while another one is being handled is never yielded.
pub trait Scheduler {
    fn now(&self) -> Millis;
    fn schedule_once(&mut self, delay: Millis, kind: TimerKind) -> TimerId;
    fn schedule_repeating(&mut self, period: Millis, kind: TimerKind) -> TimerId;
    /// Returns true if the timer was still live.
    fn cancel(&mut self, id: TimerId) -> bool;
    /// Next timer whose deadline has passed, earliest first.
    fn pop_due(&mut self) -> Option<Fired>;
    fn is_live(&self, id: TimerId) -> bool;
    fn live_timers(&self) -> usize;
    /// Earliest pending deadline
    fn next_due(&self) -> Option<Millis>;

    /// Time left until the earliest pending deadline, zero if already due.
    fn until_next_due(&self) -> Option<Millis> {
        let now = self.now();
        self.next_due().map(|due| due.saturating_sub(now))
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    kind: TimerKind,
    due: Millis,
    period: Option<Millis>,
}

/// Pending timers shared by both scheduler implementations
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: BTreeMap<TimerId, Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, due: Millis, period: Option<Millis>, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, Entry { kind, due, period });
        id
    }

    pub fn once(&mut self, now: Millis, delay: Millis, kind: TimerKind) -> TimerId {
        self.insert(now.saturating_add(delay), None, kind)
    }

    pub fn repeating(&mut self, now: Millis, period: Millis, kind: TimerKind) -> TimerId {
        // a zero period would fire forever within one pump
        let period = period.max(1);
        self.insert(now.saturating_add(period), Some(period), kind)
    }

    pub fn remove(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.entries.values().map(|e| e.due).min()
    }

    /// Pop the earliest timer due at or before `limit`. Ties go to the older timer.
    /// Repeating timers are re-armed one period later.
    pub fn pop_due(&mut self, limit: Millis) -> Option<Fired> {
        let (&id, &entry) = self
            .entries
            .iter()
            .filter(|(_, e)| e.due <= limit)
            .min_by_key(|(id, e)| (e.due, **id))?;

        match entry.period {
            // a repeating timer with no deadline left on the clock retires
            Some(period) => match entry.due.checked_add(period) {
                Some(next) => {
                    if let Some(e) = self.entries.get_mut(&id) {
                        e.due = next;
                    }
                }
                None => {
                    self.entries.remove(&id);
                }
            },
            None => {
                self.entries.remove(&id);
            }
        }

        Some(Fired {
            id,
            kind: entry.kind,
            at: entry.due,
        })
    }
}

/// Virtual clock for tests and replays. Time only moves through
/// [`ManualScheduler::advance_by`]; while draining, the clock sits at the
/// deadline of the timer being handled so follow-up timers are scheduled
/// relative to it.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    clock: Millis,
    target: Millis,
    queue: TimerQueue,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_by(&mut self, millis: Millis) {
        self.target = self.target.saturating_add(millis);
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Millis {
        self.clock
    }

    fn schedule_once(&mut self, delay: Millis, kind: TimerKind) -> TimerId {
        self.queue.once(self.clock, delay, kind)
    }

    fn schedule_repeating(&mut self, period: Millis, kind: TimerKind) -> TimerId {
        self.queue.repeating(self.clock, period, kind)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.queue.remove(id)
    }

    fn pop_due(&mut self) -> Option<Fired> {
        match self.queue.pop_due(self.target) {
            Some(fired) => {
                self.clock = fired.at;
                Some(fired)
            }
            None => {
                self.clock = self.target;
                None
            }
        }
    }

    fn is_live(&self, id: TimerId) -> bool {
        self.queue.contains(id)
    }

    fn live_timers(&self) -> usize {
        self.queue.len()
    }

    fn next_due(&self) -> Option<Millis> {
        self.queue.next_due()
    }
}

/// Scheduler driven by the real monotonic clock
#[derive(Debug)]
pub struct WallClockScheduler {
    origin: Instant,
    queue: TimerQueue,
}

impl WallClockScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: TimerQueue::new(),
        }
    }
}

impl Default for WallClockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for WallClockScheduler {
    fn now(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }

    fn schedule_once(&mut self, delay: Millis, kind: TimerKind) -> TimerId {
        let now = self.now();
        self.queue.once(now, delay, kind)
    }

    fn schedule_repeating(&mut self, period: Millis, kind: TimerKind) -> TimerId {
        let now = self.now();
        self.queue.repeating(now, period, kind)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.queue.remove(id)
    }

    fn pop_due(&mut self) -> Option<Fired> {
        let now = self.now();
        self.queue.pop_due(now)
    }

    fn is_live(&self, id: TimerId) -> bool {
        self.queue.contains(id)
    }

    fn live_timers(&self) -> usize {
        self.queue.len()
    }

    fn next_due(&self) -> Option<Millis> {
        self.queue.next_due()
    }
}

/// Lets a caller keep a handle on a scheduler that a session also uses.
impl<S: Scheduler> Scheduler for Rc<RefCell<S>> {
    fn now(&self) -> Millis {
        self.borrow().now()
    }

    fn schedule_once(&mut self, delay: Millis, kind: TimerKind) -> TimerId {
        self.borrow_mut().schedule_once(delay, kind)
    }

    fn schedule_repeating(&mut self, period: Millis, kind: TimerKind) -> TimerId {
        self.borrow_mut().schedule_repeating(period, kind)
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        self.borrow_mut().cancel(id)
    }

    fn pop_due(&mut self) -> Option<Fired> {
        self.borrow_mut().pop_due()
    }

    fn is_live(&self, id: TimerId) -> bool {
        self.borrow().is_live(id)
    }

    fn live_timers(&self) -> usize {
        self.borrow().live_timers()
    }

    fn next_due(&self) -> Option<Millis> {
        self.borrow().next_due()
    }
}
