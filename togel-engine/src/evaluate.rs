use crate::index::GroupingIndex;
use crate::models::{BetRecord, BetType, Candidate};
use crate::normalize::BetBook;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub candidate: Candidate,
    pub winner_count: usize,
    pub payout_sum: f64,
}

impl Evaluation {
    /// The house never pays out more than the pool.
    pub fn is_admissible(&self, prize_pool: f64) -> bool {
        self.payout_sum <= prize_pool
    }
}

/// Winner count and payout of `candidate`, from three bucket reads.
pub fn evaluate(index: &GroupingIndex, candidate: Candidate) -> Evaluation {
    let mut winner_count = 0;
    let mut payout_sum = 0.0;
    for bet_type in BetType::ALL {
        let key = candidate.suffix(bet_type);
        winner_count += index.lookup(bet_type, key).len();
        payout_sum += index.payout(bet_type, key);
    }
    Evaluation {
        candidate,
        winner_count,
        payout_sum,
    }
}

/// Winning records of `candidate`: 2D matches first, then 3D, then 4D,
/// each in upload order.
pub fn winners(book: &BetBook, candidate: Candidate) -> Vec<&BetRecord> {
    BetType::ALL
        .iter()
        .flat_map(|&bet_type| book.index.lookup(bet_type, candidate.suffix(bet_type)))
        .map(|&pos| &book.records[pos])
        .collect()
}
