use serde::{Deserialize, Serialize};

use crate::resolver::DrawResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub inv: String,
    pub user: String,
}

/// Response body handed to the presentation layer. Field names are part of
/// the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawReport {
    pub winning_number: String,
    pub winners: Vec<WinnerEntry>,
    pub total_bayar: f64,
    pub company_revenue: f64,
    pub prize_pool: f64,
    pub total_players: usize,
    pub total_winners: usize,
    pub winning_percentage: String,
    pub profit_percentage: f64,
    pub excluded_users: Vec<String>,
}

impl From<&DrawResult> for DrawReport {
    fn from(result: &DrawResult) -> Self {
        Self {
            winning_number: result.winning_number.to_string(),
            winners: result
                .winners
                .iter()
                .map(|r| WinnerEntry {
                    inv: r.invoice.clone(),
                    user: r.user.clone(),
                })
                .collect(),
            total_bayar: result.total_stake,
            company_revenue: result.company_revenue,
            prize_pool: result.prize_pool,
            total_players: result.total_players,
            total_winners: result.total_winners,
            winning_percentage: format!("{:.2}", result.win_rate),
            profit_percentage: result.profit_percentage,
            excluded_users: result.excluded_users.clone(),
        }
    }
}
