use anyhow::Result;
use rand::Rng;

use crate::config::DrawConfig;
use crate::evaluate::{evaluate, winners};
use crate::models::{BetRecord, Candidate, RawRow, validate_profit_percentage};
use crate::normalize::{BetBook, normalize_rows};
use crate::selector::{Frontier, select_optimal, select_optimal_parallel};

#[derive(Debug, Clone)]
pub struct DrawResult {
    pub winning_number: Candidate,
    pub winners: Vec<BetRecord>,
    pub total_stake: f64,
    pub company_revenue: f64,
    pub prize_pool: f64,
    pub total_players: usize,
    pub total_winners: usize,
    /// Percentage of players who won, 0 when there are no players.
    pub win_rate: f64,
    pub payout_sum: f64,
    pub frontier_size: usize,
    pub fallback: bool,
    pub profit_percentage: f64,
    pub excluded_users: Vec<String>,
    pub malformed_fields: usize,
}

/// Splits stakes into `(company_revenue, prize_pool)`.
pub fn split_revenue(total_stake: f64, profit_percentage: f64) -> (f64, f64) {
    let profit_ratio = profit_percentage / 100.0;
    (total_stake * profit_ratio, total_stake * (1.0 - profit_ratio))
}

pub fn win_rate(total_winners: usize, total_players: usize) -> f64 {
    if total_players == 0 {
        0.0
    } else {
        total_winners as f64 / total_players as f64 * 100.0
    }
}

/// An upload with no records draws the `0000` fallback. Records that were
/// kept but never indexed still leave all 10,000 numbers in play.
pub fn find_frontier(book: &BetBook, prize_pool: f64, parallel: bool) -> Frontier {
    if book.records.is_empty() {
        log::debug!("No records to draw against, falling back to {}", Candidate::FALLBACK);
        return Frontier::fallback();
    }
    if book.index.is_empty() {
        log::debug!("None of {} record(s) can match a number", book.records.len());
    }
    if parallel {
        select_optimal_parallel(&book.index, prize_pool)
    } else {
        select_optimal(&book.index, prize_pool)
    }
}

/// Uniform pick among equally good candidates.
pub fn pick_candidate<R: Rng>(frontier: &Frontier, rng: &mut R) -> Candidate {
    match frontier.candidates.len() {
        0 => Candidate::FALLBACK,
        1 => frontier.candidates[0],
        n => frontier.candidates[rng.random_range(0..n)],
    }
}

/// Runs the search over an already normalized book.
pub fn resolve_draw<R: Rng>(book: &BetBook, config: &DrawConfig, rng: &mut R) -> Result<DrawResult> {
    validate_profit_percentage(config.profit_percentage)?;

    let total_stake = book.total_stake();
    let total_players = book.total_players();
    let (company_revenue, prize_pool) = split_revenue(total_stake, config.profit_percentage);

    let frontier = find_frontier(book, prize_pool, config.parallel);
    log::debug!(
        "Frontier: {} candidate(s) with {} winner(s), payout {:.2}",
        frontier.len(),
        frontier.winner_count,
        frontier.payout_sum
    );

    let winning_number = pick_candidate(&frontier, rng);
    let chosen: Vec<BetRecord> = if frontier.fallback {
        Vec::new()
    } else {
        winners(book, winning_number).into_iter().cloned().collect()
    };
    let payout_sum = if frontier.fallback {
        0.0
    } else {
        evaluate(&book.index, winning_number).payout_sum
    };
    let total_winners = chosen.len();

    log::info!(
        "Draw {}: {}/{} winner(s), payout {:.2} of pool {:.2}",
        winning_number,
        total_winners,
        total_players,
        payout_sum,
        prize_pool
    );

    Ok(DrawResult {
        winning_number,
        winners: chosen,
        total_stake,
        company_revenue,
        prize_pool,
        total_players,
        total_winners,
        win_rate: win_rate(total_winners, total_players),
        payout_sum,
        frontier_size: frontier.len(),
        fallback: frontier.fallback,
        profit_percentage: config.profit_percentage,
        excluded_users: config.exclusions().users().to_vec(),
        malformed_fields: book.malformed_fields,
    })
}

/// Validates, normalizes, indexes, searches and picks, in that order.
pub fn run_draw<R: Rng>(rows: &[RawRow], config: &DrawConfig, rng: &mut R) -> Result<DrawResult> {
    config.validate()?;
    let book = normalize_rows(rows, &config.exclusions(), config.payout_basis);
    resolve_draw(&book, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PayoutBasis;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn row(user: &str, inv: &str, bet: &str, x: &str, bayar: &str, tebak: &str) -> RawRow {
        RawRow {
            user: user.to_string(),
            inv: inv.to_string(),
            bet: bet.to_string(),
            x: x.to_string(),
            bayar: bayar.to_string(),
            tebak: tebak.to_string(),
        }
    }

    fn config() -> DrawConfig {
        DrawConfig {
            parallel: false,
            ..DrawConfig::default()
        }
    }

    fn scenario_rows() -> Vec<RawRow> {
        vec![
            row("ani", "2D-1", "500", "1", "100", "7"),
            row("budi", "3D-2", "300", "1", "50", "107"),
            row("cici", "4D-3", "50", "1", "10", "9107"),
        ]
    }

    #[test]
    fn test_split_revenue() {
        let (revenue, pool) = split_revenue(160.0, 20.0);
        assert!((revenue - 32.0).abs() < 1e-9);
        assert!((pool - 128.0).abs() < 1e-9);
        assert_eq!(split_revenue(160.0, 100.0).1, 0.0);
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(1, 4), 25.0);
    }

    #[test]
    fn test_scenario_totals_and_no_winner() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = run_draw(&scenario_rows(), &config(), &mut rng).unwrap();
        assert!((result.total_stake - 160.0).abs() < 1e-9);
        assert!((result.prize_pool - 128.0).abs() < 1e-9);
        assert!((result.company_revenue - 32.0).abs() < 1e-9);
        assert_eq!(result.total_players, 3);
        assert_eq!(result.total_winners, 0);
        assert!(result.winners.is_empty());
        assert!(!result.winning_number.to_string().ends_with("07"));
        assert_eq!(result.frontier_size, 9_900);
    }

    #[test]
    fn test_empty_upload() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = run_draw(&[], &config(), &mut rng).unwrap();
        assert_eq!(result.total_players, 0);
        assert_eq!(result.win_rate, 0.0);
        assert_eq!(result.winning_number.to_string(), "0000");
        assert!(result.winners.is_empty());
        assert!(result.fallback);
    }

    #[test]
    fn test_only_unknown_types_draws_from_every_number() {
        let rows = vec![
            row("ani", "ZZ-1", "10", "1", "100", "45"),
            row("budi", "ZZ-2", "10", "1", "100", "0000"),
        ];
        let mut seen = HashSet::new();
        for seed in 0..20 {
            let result = run_draw(&rows, &config(), &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(!result.fallback);
            assert_eq!(result.frontier_size, 10_000);
            assert_eq!(result.total_players, 2);
            assert_eq!(result.total_winners, 0);
            seen.insert(result.winning_number);
        }
        assert!(seen.len() > 1);

        let book = normalize_rows(&rows, &config().exclusions(), PayoutBasis::Bet);
        assert_eq!(find_frontier(&book, 160.0, true).len(), 10_000);
        let empty = normalize_rows(&Vec::<RawRow>::new(), &config().exclusions(), PayoutBasis::Bet);
        assert!(find_frontier(&empty, 160.0, true).fallback);
    }

    #[test]
    fn test_invalid_profit_rejected_before_processing() {
        let mut rng = StdRng::seed_from_u64(1);
        let bad = DrawConfig {
            profit_percentage: -5.0,
            ..config()
        };
        assert!(run_draw(&scenario_rows(), &bad, &mut rng).is_err());
    }

    #[test]
    fn test_winners_match_and_stay_within_pool() {
        let rows = vec![
            row("ani", "2D-1", "10", "2", "100", "45"),
            row("budi", "3D-2", "10", "3", "100", "345"),
            row("cici", "4D-3", "10", "4", "100", "2345"),
            row("dodi", "2D-4", "100", "9", "100", "12"),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let result = run_draw(&rows, &config(), &mut rng).unwrap();

        // 2345 hits three tickets for 90 against a pool of 320.
        assert_eq!(result.winning_number.to_string(), "2345");
        assert_eq!(result.total_winners, 3);
        assert!((result.payout_sum - 90.0).abs() < 1e-9);
        assert!(result.payout_sum <= result.prize_pool);
        assert!(result.winners.iter().all(|w| w.matches(result.winning_number)));
        let users: Vec<&str> = result.winners.iter().map(|w| w.user.as_str()).collect();
        assert_eq!(users, vec!["ani", "budi", "cici"]);
        assert!((result.win_rate - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_excluded_users_never_counted() {
        let rows = vec![
            row("ani", "2D-1", "10", "2", "100", "45"),
            row("boss", "2D-2", "10", "2", "1000", "45"),
            row("budi", "2D-3", "10", "2", "100", "45"),
        ];
        let cfg = DrawConfig {
            excluded_users: vec!["boss".to_string()],
            ..config()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let result = run_draw(&rows, &cfg, &mut rng).unwrap();
        assert_eq!(result.total_players, 2);
        assert!((result.total_stake - 200.0).abs() < 1e-9);
        assert!(result.winners.iter().all(|w| w.user != "boss"));
        assert_eq!(result.excluded_users, vec!["boss"]);
    }

    #[test]
    fn test_revenue_invariant_holds() {
        let mut rng = StdRng::seed_from_u64(11);
        for pct in [0.0, 12.5, 20.0, 33.3, 100.0] {
            let cfg = DrawConfig {
                profit_percentage: pct,
                ..config()
            };
            let result = run_draw(&scenario_rows(), &cfg, &mut rng).unwrap();
            assert!((result.company_revenue + result.prize_pool - result.total_stake).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tie_break_picks_within_frontier() {
        let rows = vec![row("ani", "2D-1", "10", "2", "100", "45")];
        let book = normalize_rows(&rows, &config().exclusions(), PayoutBasis::Bet);
        let (_, pool) = split_revenue(book.total_stake(), 20.0);
        let frontier = find_frontier(&book, pool, false);
        assert_eq!(frontier.len(), 100);

        let mut seen = HashSet::new();
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = resolve_draw(&book, &config(), &mut rng).unwrap();
            assert!(frontier.candidates.contains(&result.winning_number));
            assert_eq!(result.total_winners, 1);
            seen.insert(result.winning_number);
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_same_seed_same_draw() {
        let rows = vec![row("ani", "2D-1", "10", "2", "100", "45")];
        let a = run_draw(&rows, &config(), &mut StdRng::seed_from_u64(8)).unwrap();
        let b = run_draw(&rows, &config(), &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a.winning_number, b.winning_number);
    }

    #[test]
    fn test_payout_basis_changes_admissibility() {
        // Bet*x = 20 fits the pool of 80; Bayar*x = 200 does not.
        let rows = vec![row("ani", "2D-1", "10", "2", "100", "45")];
        let mut rng = StdRng::seed_from_u64(4);
        let by_bet = run_draw(&rows, &config(), &mut rng).unwrap();
        assert_eq!(by_bet.total_winners, 1);

        let cfg = DrawConfig {
            payout_basis: PayoutBasis::Bayar,
            ..config()
        };
        let by_bayar = run_draw(&rows, &cfg, &mut rng).unwrap();
        assert_eq!(by_bayar.total_winners, 0);
    }

    #[test]
    fn test_unknown_type_counts_but_cannot_win() {
        let rows = vec![
            row("ani", "ZZ-1", "1", "1", "100", "45"),
            row("budi", "2D-2", "1", "1", "100", "45"),
        ];
        let mut rng = StdRng::seed_from_u64(4);
        let result = run_draw(&rows, &config(), &mut rng).unwrap();
        assert_eq!(result.total_players, 2);
        assert_eq!(result.total_winners, 1);
        assert_eq!(result.winners[0].user, "budi");
    }
}
