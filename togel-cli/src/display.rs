use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportSummary;
use togel_engine::evaluate::Evaluation;
use togel_engine::models::BetRecord;
use togel_engine::resolver::DrawResult;
use togel_engine::selector::Frontier;

fn money(v: f64) -> String {
    format!("{:.2}", v)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_import_summary(summary: &ImportSummary) {
    println!("Import finished:");
    println!("  Lines read  : {}", summary.total_records);
    println!("  Accepted    : {}", summary.accepted);
    if summary.unreadable > 0 {
        println!("  Unreadable  : {}", summary.unreadable);
    }
}

pub fn display_draw(result: &DrawResult) {
    println!("\nWinning number: {}\n", result.winning_number);

    let mut table = new_table(vec!["Total Bayar", "Company revenue", "Prize pool", "Payout", "Players", "Winners", "Win %"]);
    table.add_row(vec![
        money(result.total_stake),
        format!("{} ({}%)", money(result.company_revenue), result.profit_percentage),
        money(result.prize_pool),
        money(result.payout_sum),
        result.total_players.to_string(),
        result.total_winners.to_string(),
        format!("{:.2}", result.win_rate),
    ]);
    println!("{table}");

    if result.fallback && result.total_players == 0 {
        println!("No bets to draw against, fell back to {}.", result.winning_number);
    } else if result.fallback {
        println!("No admissible number, fell back to {}.", result.winning_number);
    } else if result.frontier_size > 1 {
        println!("Picked at random among {} equally good numbers.", result.frontier_size);
    }
    if !result.excluded_users.is_empty() {
        println!("Excluded users: {}", result.excluded_users.join(", "));
    }
    if result.malformed_fields > 0 {
        println!("{} non-numeric cell(s) counted as 0.", result.malformed_fields);
    }

    display_winners(&result.winners.iter().collect::<Vec<_>>());
}

pub fn display_winners(winners: &[&BetRecord]) {
    if winners.is_empty() {
        println!("\nNo winners.");
        return;
    }

    println!("\nWinners\n");
    let mut table = new_table(vec!["#", "Inv", "User", "Type", "Tebak", "Payout"]);
    for (i, record) in winners.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            record.invoice.clone(),
            record.user.clone(),
            record.bet_type.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            record.target_digits.clone(),
            money(record.potential_payout),
        ]);
    }
    println!("{table}");
}

pub fn display_frontier(frontier: &Frontier, prize_pool: f64, limit: usize) {
    println!("\nPrize pool: {}", money(prize_pool));
    if frontier.fallback {
        println!("No admissible number; the draw falls back to {}.", frontier.candidates[0]);
        return;
    }
    println!(
        "{} number(s) with {} winner(s) and payout {}\n",
        frontier.len(),
        frontier.winner_count,
        money(frontier.payout_sum)
    );

    let shown: Vec<String> = frontier
        .candidates
        .iter()
        .take(limit)
        .map(|c| c.to_string())
        .collect();
    let mut table = new_table(vec!["Numbers"]);
    for chunk in shown.chunks(10) {
        table.add_row(vec![chunk.join("  ")]);
    }
    println!("{table}");
    if frontier.len() > limit {
        println!("... {} more", frontier.len() - limit);
    }
}

pub fn display_evaluation(eval: &Evaluation, winners: &[&BetRecord], prize_pool: f64) {
    let verdict = if eval.is_admissible(prize_pool) {
        Cell::new("admissible").fg(Color::Green)
    } else {
        Cell::new("over pool").fg(Color::Red)
    };

    let mut table = new_table(vec!["Number", "Winners", "Payout", "Prize pool", "Verdict"]);
    table.add_row(vec![
        Cell::new(eval.candidate.to_string()),
        Cell::new(eval.winner_count.to_string()),
        Cell::new(money(eval.payout_sum)),
        Cell::new(money(prize_pool)),
        verdict,
    ]);
    println!("{table}");

    display_winners(winners);
}
