use std::cmp::Ordering;

use rayon::prelude::*;

use crate::evaluate::{Evaluation, evaluate};
use crate::index::GroupingIndex;
use crate::models::{CANDIDATE_COUNT, Candidate};

/// All admissible candidates tied for best: most winners first, then the
/// smallest payout.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontier {
    pub winner_count: usize,
    pub payout_sum: f64,
    pub candidates: Vec<Candidate>,
    /// Set when nothing was admissible and `0000` stands in.
    pub fallback: bool,
}

impl Frontier {
    pub fn empty() -> Self {
        Self {
            winner_count: 0,
            payout_sum: 0.0,
            candidates: Vec::new(),
            fallback: false,
        }
    }

    pub fn fallback() -> Self {
        Self {
            winner_count: 0,
            payout_sum: 0.0,
            candidates: vec![Candidate::FALLBACK],
            fallback: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn offer(&mut self, eval: Evaluation, prize_pool: f64) {
        if !eval.is_admissible(prize_pool) {
            return;
        }
        if self.is_empty() {
            self.reset(eval);
            return;
        }
        match rank(eval.winner_count, eval.payout_sum, self.winner_count, self.payout_sum) {
            Ordering::Greater => self.reset(eval),
            Ordering::Equal => self.candidates.push(eval.candidate),
            Ordering::Less => {}
        }
    }

    /// Combines two partial frontiers with the same ordering `offer` uses.
    pub fn merge(mut self, mut other: Frontier) -> Frontier {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        match rank(other.winner_count, other.payout_sum, self.winner_count, self.payout_sum) {
            Ordering::Greater => other,
            Ordering::Equal => {
                self.candidates.append(&mut other.candidates);
                self
            }
            Ordering::Less => self,
        }
    }

    fn reset(&mut self, eval: Evaluation) {
        self.winner_count = eval.winner_count;
        self.payout_sum = eval.payout_sum;
        self.candidates.clear();
        self.candidates.push(eval.candidate);
    }

    fn or_fallback(self) -> Frontier {
        if self.is_empty() {
            log::debug!("No admissible candidate, falling back to {}", Candidate::FALLBACK);
            Frontier::fallback()
        } else {
            self
        }
    }
}

/// `Greater` when (a_count, a_payout) beats (b_count, b_payout).
fn rank(a_count: usize, a_payout: f64, b_count: usize, b_payout: f64) -> Ordering {
    a_count.cmp(&b_count).then_with(|| {
        b_payout
            .partial_cmp(&a_payout)
            .unwrap_or(Ordering::Equal)
    })
}

/// Scans 0000..=9999 in order.
pub fn select_optimal(index: &GroupingIndex, prize_pool: f64) -> Frontier {
    Candidate::all()
        .fold(Frontier::empty(), |mut frontier, candidate| {
            frontier.offer(evaluate(index, candidate), prize_pool);
            frontier
        })
        .or_fallback()
}

/// Same result as [`select_optimal`], with the range split across the rayon pool.
pub fn select_optimal_parallel(index: &GroupingIndex, prize_pool: f64) -> Frontier {
    let mut frontier = (0..CANDIDATE_COUNT)
        .into_par_iter()
        .filter_map(Candidate::new)
        .fold(Frontier::empty, |mut frontier, candidate| {
            frontier.offer(evaluate(index, candidate), prize_pool);
            frontier
        })
        .reduce(Frontier::empty, Frontier::merge);
    frontier.candidates.sort_unstable();
    frontier.or_fallback()
}
