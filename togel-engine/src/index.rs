use crate::models::{BetRecord, BetType};

#[derive(Debug, Clone, Default)]
struct Bucket {
    records: Vec<usize>,
    payout: f64,
}

/// Buckets for one bet type, addressed by the integer value of the digits.
#[derive(Debug, Clone)]
struct DigitGroup {
    buckets: Vec<Bucket>,
}

impl DigitGroup {
    fn new(bet_type: BetType) -> Self {
        Self {
            buckets: vec![Bucket::default(); bet_type.key_space()],
        }
    }

    fn bucket(&self, key: u16) -> Option<&Bucket> {
        self.buckets.get(key as usize)
    }
}

/// Records grouped by bet type and target digits.
///
/// Each group is a dense array with one bucket per possible key, so a
/// lookup is a single array access. Buckets hold positions into the
/// record slice the index was built from, in insertion order, together
/// with the running payout sum of those records.
#[derive(Debug, Clone)]
pub struct GroupingIndex {
    groups: [DigitGroup; 3],
    indexed: usize,
}

impl Default for GroupingIndex {
    fn default() -> Self {
        Self {
            groups: BetType::ALL.map(DigitGroup::new),
            indexed: 0,
        }
    }
}

impl GroupingIndex {
    pub fn build(records: &[BetRecord]) -> Self {
        let mut index = GroupingIndex::default();
        for (pos, record) in records.iter().enumerate() {
            index.insert(pos, record);
        }
        index
    }

    /// Records that can never win (unknown type, bad digits) are ignored.
    pub fn insert(&mut self, pos: usize, record: &BetRecord) -> bool {
        let Some((bet_type, key)) = record.index_key() else {
            return false;
        };
        let bucket = &mut self.group_mut(bet_type).buckets[key as usize];
        bucket.records.push(pos);
        bucket.payout += record.potential_payout;
        self.indexed += 1;
        true
    }

    /// Positions of the records wagering `key` under `bet_type`. Unknown
    /// keys give an empty slice.
    pub fn lookup(&self, bet_type: BetType, key: u16) -> &[usize] {
        self.group(bet_type)
            .bucket(key)
            .map(|b| b.records.as_slice())
            .unwrap_or(&[])
    }

    /// Sum of `potential_payout` over the bucket, accumulated in insertion order.
    pub fn payout(&self, bet_type: BetType, key: u16) -> f64 {
        self.group(bet_type).bucket(key).map_or(0.0, |b| b.payout)
    }

    pub fn indexed_records(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    fn group(&self, bet_type: BetType) -> &DigitGroup {
        &self.groups[Self::slot(bet_type)]
    }

    fn group_mut(&mut self, bet_type: BetType) -> &mut DigitGroup {
        &mut self.groups[Self::slot(bet_type)]
    }

    fn slot(bet_type: BetType) -> usize {
        match bet_type {
            BetType::TwoD => 0,
            BetType::ThreeD => 1,
            BetType::FourD => 2,
        }
    }
}
