use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::models::{DEFAULT_PROFIT_PERCENTAGE, ExclusionSet, PayoutBasis, validate_profit_percentage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    pub profit_percentage: f64,
    pub excluded_users: Vec<String>,
    pub payout_basis: PayoutBasis,
    pub parallel: bool,
    /// Fixes the tie-break; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            profit_percentage: DEFAULT_PROFIT_PERCENTAGE,
            excluded_users: Vec::new(),
            payout_basis: PayoutBasis::Bet,
            parallel: true,
            seed: None,
        }
    }
}

impl DrawConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {:?}", path))?;
        let config: DrawConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid JSON in {:?}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_profit_percentage(self.profit_percentage)
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::new(
            self.excluded_users
                .iter()
                .map(|u| u.trim())
                .filter(|u| !u.is_empty()),
        )
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default_config() {
        let config = DrawConfig::default();
        assert_eq!(config.profit_percentage, 20.0);
        assert!(config.excluded_users.is_empty());
        assert_eq!(config.payout_basis, PayoutBasis::Bet);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DrawConfig =
            serde_json::from_str(r#"{"profit_percentage": 35, "payout_basis": "bayar"}"#).unwrap();
        assert_eq!(config.profit_percentage, 35.0);
        assert_eq!(config.payout_basis, PayoutBasis::Bayar);
        assert!(config.parallel);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = DrawConfig {
            profit_percentage: 120.0,
            ..DrawConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exclusions_are_trimmed() {
        let config = DrawConfig {
            excluded_users: vec![" ani ".to_string(), "".to_string(), "budi".to_string()],
            ..DrawConfig::default()
        };
        let set = config.exclusions();
        assert_eq!(set.users(), &["ani".to_string(), "budi".to_string()]);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = DrawConfig {
            seed: Some(99),
            ..DrawConfig::default()
        };
        let a: u32 = config.rng().random();
        let b: u32 = config.rng().random();
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("togel_config_test.json");
        std::fs::write(&path, r#"{"excluded_users": ["ani"], "seed": 5}"#).unwrap();
        let config = DrawConfig::load(&path).unwrap();
        assert_eq!(config.excluded_users, vec!["ani"]);
        assert_eq!(config.seed, Some(5));
        let _ = std::fs::remove_file(&path);
    }
}
