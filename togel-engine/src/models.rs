use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Every four-digit outcome from 0000 to 9999.
pub const CANDIDATE_COUNT: u16 = 10_000;

pub const DEFAULT_PROFIT_PERCENTAGE: f64 = 20.0;

/// Upload columns, in the order they appear in the reference CSV.
pub const CSV_COLUMNS: [&str; 6] = ["User", "Inv", "Bet", "x", "Bayar", "Tebak"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetType {
    TwoD,
    ThreeD,
    FourD,
}

impl BetType {
    pub const ALL: [BetType; 3] = [BetType::TwoD, BetType::ThreeD, BetType::FourD];

    /// Number of trailing digits of the winning number that must match.
    pub fn width(&self) -> usize {
        match self {
            BetType::TwoD => 2,
            BetType::ThreeD => 3,
            BetType::FourD => 4,
        }
    }

    pub fn key_space(&self) -> usize {
        match self {
            BetType::TwoD => 100,
            BetType::ThreeD => 1_000,
            BetType::FourD => 10_000,
        }
    }

    /// Bet type encoded in the first two characters of an invoice tag.
    pub fn from_invoice(invoice: &str) -> Option<BetType> {
        match invoice.get(..2) {
            Some("2D") => Some(BetType::TwoD),
            Some("3D") => Some(BetType::ThreeD),
            Some("4D") => Some(BetType::FourD),
            _ => None,
        }
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetType::TwoD => write!(f, "2D"),
            BetType::ThreeD => write!(f, "3D"),
            BetType::FourD => write!(f, "4D"),
        }
    }
}

/// A four-digit outcome, stored as its decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate(u16);

impl Candidate {
    pub const FALLBACK: Candidate = Candidate(0);

    pub fn new(value: u16) -> Option<Candidate> {
        (value < CANDIDATE_COUNT).then_some(Candidate(value))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Candidate> {
        (0..CANDIDATE_COUNT).map(Candidate)
    }

    /// Trailing digits a bet of `bet_type` is compared against.
    pub fn suffix(&self, bet_type: BetType) -> u16 {
        self.0 % bet_type.key_space() as u16
    }

    /// Accepts one to four decimal digits; shorter input is left-padded.
    pub fn parse(raw: &str) -> Result<Candidate> {
        let s = raw.trim();
        if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            bail!("Invalid candidate '{}': expected 1-4 decimal digits", raw);
        }
        let value: u16 = s
            .parse()
            .with_context(|| format!("Invalid candidate '{}'", raw))?;
        match Candidate::new(value) {
            Some(candidate) => Ok(candidate),
            None => bail!("Candidate {} out of range", value),
        }
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// One uploaded row, exactly as decoded from the CSV cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub user: String,
    pub inv: String,
    pub bet: String,
    pub x: String,
    pub bayar: String,
    pub tebak: String,
}

/// Which amount the multiplier is applied to when pricing a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PayoutBasis {
    /// `Bet * x`
    #[default]
    Bet,
    /// `Bayar * x`
    Bayar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BetRecord {
    pub user: String,
    pub invoice: String,
    pub bet_type: Option<BetType>,
    pub target_digits: String,
    pub stake: f64,
    pub multiplier: f64,
    pub bet_amount: f64,
    pub potential_payout: f64,
}

impl BetRecord {
    /// Position in the grouping index. `None` when the record cannot win:
    /// unknown bet type, or digits that do not fit the bet type's width.
    pub fn index_key(&self) -> Option<(BetType, u16)> {
        let bet_type = self.bet_type?;
        digit_key(&self.target_digits, bet_type).map(|key| (bet_type, key))
    }

    pub fn matches(&self, candidate: Candidate) -> bool {
        self.index_key()
            .is_some_and(|(bet_type, key)| candidate.suffix(bet_type) == key)
    }
}

/// Integer value of a digit string that is exactly as wide as `bet_type`.
pub fn digit_key(digits: &str, bet_type: BetType) -> Option<u16> {
    let bytes = digits.as_bytes();
    if bytes.len() != bet_type.width() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(bytes.iter().fold(0u16, |acc, &b| acc * 10 + u16::from(b - b'0')))
}

/// Users whose rows are dropped before any aggregation.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    users: Vec<String>,
    lookup: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = ExclusionSet::default();
        for user in users {
            let user = user.into();
            if set.lookup.insert(user.clone()) {
                set.users.push(user);
            }
        }
        set
    }

    /// Comma-separated list, entries trimmed, empty entries dropped.
    pub fn parse(raw: &str) -> Self {
        ExclusionSet::new(parse_excluded_users(raw))
    }

    pub fn contains(&self, user: &str) -> bool {
        self.lookup.contains(user)
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

pub fn parse_excluded_users(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate_profit_percentage(pct: f64) -> Result<()> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        bail!("Profit percentage must be between 0 and 100.");
    }
    Ok(())
}

/// Form-field flavour of the profit percentage: absent or blank means the default.
pub fn parse_profit_percentage(raw: Option<&str>) -> Result<f64> {
    let pct = match raw.map(str::trim) {
        None | Some("") => DEFAULT_PROFIT_PERCENTAGE,
        Some(s) => s
            .parse::<f64>()
            .with_context(|| format!("Profit percentage '{}' is not a number", s))?,
    };
    validate_profit_percentage(pct)?;
    Ok(pct)
}
