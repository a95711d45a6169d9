use crate::index::GroupingIndex;
use crate::models::{BetRecord, BetType, ExclusionSet, PayoutBasis, RawRow};

/// Normalized batch: every surviving record plus the index built over them.
#[derive(Debug, Clone)]
pub struct BetBook {
    pub records: Vec<BetRecord>,
    pub index: GroupingIndex,
    pub malformed_fields: usize,
}

impl BetBook {
    pub fn total_players(&self) -> usize {
        self.records.len()
    }

    pub fn total_stake(&self) -> f64 {
        self.records.iter().map(|r| r.stake).sum()
    }
}

/// Parses a money or multiplier cell. Blank cells are zero; `None` means the
/// cell held something that is not a finite number.
pub fn coerce_amount(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn pad_digits(raw: &str, bet_type: Option<BetType>) -> String {
    let digits = raw.trim();
    match bet_type {
        Some(t) => format!("{:0>width$}", digits, width = t.width()),
        None => digits.to_string(),
    }
}

pub struct Normalizer<'a> {
    exclusions: &'a ExclusionSet,
    basis: PayoutBasis,
    malformed_fields: usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(exclusions: &'a ExclusionSet, basis: PayoutBasis) -> Self {
        Self {
            exclusions,
            basis,
            malformed_fields: 0,
        }
    }

    pub fn malformed_fields(&self) -> usize {
        self.malformed_fields
    }

    /// `None` for rows belonging to an excluded user.
    pub fn normalize(&mut self, row: &RawRow) -> Option<BetRecord> {
        if self.exclusions.contains(&row.user) {
            return None;
        }

        let stake = self.amount(row, "Bayar", &row.bayar);
        let multiplier = self.amount(row, "x", &row.x);
        let bet_amount = self.amount(row, "Bet", &row.bet);

        let bet_type = BetType::from_invoice(&row.inv);
        if bet_type.is_none() {
            log::debug!("Invoice '{}' has no recognised bet type, row cannot win", row.inv);
        }

        let potential_payout = match self.basis {
            PayoutBasis::Bet => bet_amount * multiplier,
            PayoutBasis::Bayar => stake * multiplier,
        };

        Some(BetRecord {
            user: row.user.clone(),
            invoice: row.inv.clone(),
            bet_type,
            target_digits: pad_digits(&row.tebak, bet_type),
            stake,
            multiplier,
            bet_amount,
            potential_payout,
        })
    }

    fn amount(&mut self, row: &RawRow, column: &str, raw: &str) -> f64 {
        match coerce_amount(raw) {
            Some(v) => v,
            None => {
                log::warn!(
                    "Non-numeric {} '{}' on invoice '{}', counted as 0",
                    column,
                    raw,
                    row.inv
                );
                self.malformed_fields += 1;
                0.0
            }
        }
    }
}

/// Normalizes a batch and indexes the surviving records in row order.
pub fn normalize_rows<'r, I>(rows: I, exclusions: &ExclusionSet, basis: PayoutBasis) -> BetBook
where
    I: IntoIterator<Item = &'r RawRow>,
{
    let mut normalizer = Normalizer::new(exclusions, basis);
    let records: Vec<BetRecord> = rows
        .into_iter()
        .filter_map(|row| normalizer.normalize(row))
        .collect();
    let index = GroupingIndex::build(&records);

    BetBook {
        records,
        index,
        malformed_fields: normalizer.malformed_fields(),
    }
}
