use std::collections::BTreeSet;
use std::fmt;

use tracing::warn;

use crate::board::{self, CELLS, EDGE};

/// Number of levels that ship with a rule
pub const LEVEL_COUNT: u32 = 5;

/// A level selects one rule. Values without a rule are allowed and simply
/// have nothing to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u32);

impl Level {
    pub const FIRST: Level = Level(1);

    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// The level after this one, wrapping from the last built-in level to the first.
    pub fn next(self) -> Self {
        if self.0 >= LEVEL_COUNT {
            Self::FIRST
        } else {
            Self(self.0 + 1)
        }
    }

    pub fn rule(self) -> Option<Rule> {
        Rule::for_level(self)
    }

    /// Every level that has a built-in rule, in order
    pub fn builtin() -> impl Iterator<Item = Level> {
        (1..=LEVEL_COUNT).map(Level)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::FIRST
    }
}

impl From<u32> for Level {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Rule {
    #[strum(to_string = "Even indices")]
    EvenIndices,
    #[strum(to_string = "Diagonals")]
    Diagonals,
    #[strum(to_string = "Prime indices")]
    Primes,
    #[strum(to_string = "Center cluster")]
    CenterCluster,
    #[strum(to_string = "(row+col) % 3 == 0")]
    RowColMod3,
}

impl Rule {
    pub fn for_level(level: Level) -> Option<Rule> {
        match level.get() {
            1 => Some(Rule::EvenIndices),
            2 => Some(Rule::Diagonals),
            3 => Some(Rule::Primes),
            4 => Some(Rule::CenterCluster),
            5 => Some(Rule::RowColMod3),
            _ => None,
        }
    }

    pub fn matches(self, i: usize) -> bool {
        let (row, col) = board::row_col(i);
        match self {
            Rule::EvenIndices => i % 2 == 0,
            Rule::Diagonals => row == col || row + col == EDGE - 1,
            Rule::Primes => is_prime(i),
            Rule::CenterCluster => center_cluster().contains(&i),
            Rule::RowColMod3 => (row + col) % 3 == 0,
        }
    }

    pub fn positions(self) -> BTreeSet<usize> {
        (0..CELLS).filter(|&i| self.matches(i)).collect()
    }
}

/// Positions the rule for `level` lights up. Unknown levels yield an empty set.
pub fn active_set(level: Level) -> BTreeSet<usize> {
    match level.rule() {
        Some(rule) => rule.positions(),
        None => {
            warn!(level = level.get(), "no rule defined for level");
            BTreeSet::new()
        }
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

fn center_cluster() -> Vec<usize> {
    let center = (EDGE / 2) as isize;
    let mut cells = vec![board::index(center as usize, center as usize)];
    for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
        let (r, c) = (center + dr, center + dc);
        if (0..EDGE as isize).contains(&r) && (0..EDGE as isize).contains(&c) {
            cells.push(board::index(r as usize, c as usize));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn level_one_is_even_indices() {
        let s = active_set(Level::new(1));
        assert_eq!(s, set(&[0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24]));
        assert_eq!(s.len(), 13);
    }

    #[test]
    fn level_two_is_both_diagonals() {
        assert_eq!(
            active_set(Level::new(2)),
            set(&[0, 4, 6, 8, 12, 16, 18, 20, 24])
        );
    }

    #[test]
    fn level_three_is_primes() {
        assert_eq!(
            active_set(Level::new(3)),
            set(&[2, 3, 5, 7, 11, 13, 17, 19, 23])
        );
    }

    #[test]
    fn level_four_is_center_cluster() {
        assert_eq!(active_set(Level::new(4)), set(&[7, 11, 12, 13, 17]));
    }

    #[test]
    fn level_five_is_row_col_mod_three() {
        let s = active_set(Level::new(5));
        assert_eq!(s, set(&[0, 3, 7, 11, 14, 15, 18, 22]));
        for i in 0..CELLS {
            let (row, col) = board::row_col(i);
            assert_eq!(s.contains(&i), (row + col) % 3 == 0);
        }
    }

    #[test]
    fn active_set_is_idempotent() {
        for level in Level::builtin() {
            assert_eq!(active_set(level), active_set(level));
        }
    }

    #[test]
    fn unknown_level_is_empty() {
        assert!(active_set(Level::new(0)).is_empty());
        assert!(active_set(Level::new(6)).is_empty());
        assert!(active_set(Level::new(99)).is_empty());
    }

    #[test]
    fn next_wraps_after_last_level() {
        assert_eq!(Level::new(1).next(), Level::new(2));
        assert_eq!(Level::new(4).next(), Level::new(5));
        assert_eq!(Level::new(5).next(), Level::new(1));
        assert_eq!(Level::new(9).next(), Level::new(1));
        assert_eq!(Level::new(0).next(), Level::new(1));
    }

    #[test]
    fn primes_by_trial_division() {
        let primes: Vec<usize> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn rule_labels() {
        assert_eq!(Rule::EvenIndices.to_string(), "Even indices");
        assert_eq!(Rule::RowColMod3.to_string(), "(row+col) % 3 == 0");
        assert_eq!(Level::builtin().count(), LEVEL_COUNT as usize);
        assert!(Level::builtin().all(|l| l.rule().is_some()));
    }
}
