use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Verdict {
    Correct,
    Wrong,
    Missed,
}

/// Per-verdict counts over a result map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: usize,
    pub wrong: usize,
    pub missed: usize,
}

impl Tally {
    pub fn of(results: &BTreeMap<usize, Verdict>) -> Self {
        results.values().fold(Tally::default(), |mut t, v| {
            match v {
                Verdict::Correct => t.correct += 1,
                Verdict::Wrong => t.wrong += 1,
                Verdict::Missed => t.missed += 1,
            }
            t
        })
    }
}

/// Outcome of comparing a selection against the active set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub results: BTreeMap<usize, Verdict>,
    pub tally: Tally,
    pub selected: usize,
}

impl Evaluation {
    /// Nothing wrong, nothing missed, and at least one pick made.
    pub fn is_perfect(&self) -> bool {
        self.tally.wrong == 0 && self.tally.missed == 0 && self.selected > 0
    }
}

pub fn evaluate(selection: &BTreeSet<usize>, active: &BTreeSet<usize>) -> Evaluation {
    let mut results = BTreeMap::new();

    for &pos in selection {
        let verdict = if active.contains(&pos) {
            Verdict::Correct
        } else {
            Verdict::Wrong
        };
        results.insert(pos, verdict);
    }
    for &pos in active.difference(selection) {
        results.insert(pos, Verdict::Missed);
    }

    let tally = Tally::of(&results);
    Evaluation {
        results,
        tally,
        selected: selection.len(),
    }
}
