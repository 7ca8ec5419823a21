//! Bot configuration settings and environment variable handling

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use crate::errors::{BotError, BotResult};
use crate::types::{FeeTable, VenueFees};

// Configuration constants
pub const DEFAULT_SYMBOL: &str = "XLM";
pub const DEFAULT_QUOTE_CURRENCIES: &str = "USDT,USD";
pub const DEFAULT_EXCHANGES: &str = "binance,kraken";
pub const DEFAULT_MIN_PROFIT_PCT: Decimal = dec!(0.5);
pub const DEFAULT_TRADE_AMOUNT: Decimal = dec!(100);
pub const DEFAULT_FEE_PERCENT_ASSUMPTION: Decimal = dec!(0.2); // 0.1% taker per leg
pub const DEFAULT_SAFETY_MARGIN: Decimal = dec!(0.98);
pub const DEFAULT_DRY_RUN_BALANCE: Decimal = dec!(1000);
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 5;
pub const MIN_CHECK_INTERVAL_SECS: u64 = 1;

pub const CREDENTIAL_VARS: [&str; 4] = [
    "BINANCE_API_KEY",
    "BINANCE_API_SECRET",
    "KRAKEN_API_KEY",
    "KRAKEN_API_SECRET",
];

pub const BINANCE_API_URL: &str = "https://api.binance.us";
pub const KRAKEN_API_URL: &str = "https://api.kraken.com";

/// Parameters the detection core needs; everything else in [`Config`] is for
/// the outer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionConfig {
    pub min_profit_pct: Decimal,
    pub reference_notional: Decimal,
    pub fee_percent_assumption: Decimal,
    pub safety_margin: Decimal,
    pub fees: FeeTable,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_profit_pct: DEFAULT_MIN_PROFIT_PCT,
            reference_notional: DEFAULT_TRADE_AMOUNT,
            fee_percent_assumption: DEFAULT_FEE_PERCENT_ASSUMPTION,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            fees: FeeTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub symbol: String,
    pub quote_currencies: Vec<String>,
    pub exchanges: Vec<String>,
    pub detection: DetectionConfig,
    pub check_interval_secs: u64,
    pub dry_run: bool,
    pub dry_run_balance: Decimal,
    pub binance_credentials: Option<Credentials>,
    pub kraken_credentials: Option<Credentials>,
    pub binance_api_url: String,
    pub kraken_api_url: String,
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,
}

impl Config {
    /// Reads the process environment (after `.env` was loaded) and validates.
    pub fn load() -> BotResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let decimal = |key: &str, default: Decimal| -> BotResult<Decimal> {
            match get(key) {
                Some(raw) => Decimal::from_str(&raw)
                    .map_err(|e| BotError::config(key, format!("'{}' is not a number: {}", raw, e))),
                None => Ok(default),
            }
        };
        let list = |key: &str, default: &str| -> Vec<String> {
            get(key)
                .unwrap_or_else(|| default.to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };
        let credentials = |key_var: &str, secret_var: &str| match (
            credential_value(&lookup, key_var),
            credential_value(&lookup, secret_var),
        ) {
            (Some(api_key), Some(api_secret)) => Some(Credentials { api_key, api_secret }),
            _ => None,
        };

        let exchanges: Vec<String> = list("EXCHANGES", DEFAULT_EXCHANGES)
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect();

        let mut fees = FeeTable::new();
        for venue in &exchanges {
            let key = format!("{}_TAKER_FEE_PCT", venue.to_uppercase());
            if get(&key).is_some() {
                fees.insert(venue.clone(), VenueFees::taker(decimal(&key, dec!(0.1))?));
            }
        }

        let config = Self {
            symbol: get("SYMBOL").unwrap_or_else(|| DEFAULT_SYMBOL.to_string()).to_uppercase(),
            quote_currencies: list("QUOTE_CURRENCIES", DEFAULT_QUOTE_CURRENCIES)
                .into_iter()
                .map(|s| s.to_uppercase())
                .collect(),
            exchanges,
            detection: DetectionConfig {
                min_profit_pct: decimal("MIN_PROFIT_PERCENTAGE", DEFAULT_MIN_PROFIT_PCT)?,
                reference_notional: decimal("TRADE_AMOUNT_USD", DEFAULT_TRADE_AMOUNT)?,
                fee_percent_assumption: decimal("FEE_PERCENT_ASSUMPTION", DEFAULT_FEE_PERCENT_ASSUMPTION)?,
                safety_margin: decimal("SAFETY_MARGIN_FACTOR", DEFAULT_SAFETY_MARGIN)?,
                fees,
            },
            check_interval_secs: get("CHECK_INTERVAL_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS)
                .max(MIN_CHECK_INTERVAL_SECS),
            dry_run: get("DRY_RUN")
                .map(|s| s.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            dry_run_balance: decimal("DRY_RUN_BALANCE", DEFAULT_DRY_RUN_BALANCE)?,
            binance_credentials: credentials("BINANCE_API_KEY", "BINANCE_API_SECRET"),
            kraken_credentials: credentials("KRAKEN_API_KEY", "KRAKEN_API_SECRET"),
            binance_api_url: get("BINANCE_API_URL").unwrap_or_else(|| BINANCE_API_URL.to_string()),
            kraken_api_url: get("KRAKEN_API_URL").unwrap_or_else(|| KRAKEN_API_URL.to_string()),
            max_consecutive_errors: get("MAX_CONSECUTIVE_ERRORS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            circuit_breaker_cooldown_secs: get("CIRCUIT_BREAKER_COOLDOWN_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(300), // 5 minutes
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BotResult<()> {
        let d = &self.detection;
        if d.min_profit_pct <= Decimal::ZERO {
            return Err(BotError::config("MIN_PROFIT_PERCENTAGE", "must be positive"));
        }
        if d.reference_notional <= Decimal::ZERO {
            return Err(BotError::config("TRADE_AMOUNT_USD", "must be positive"));
        }
        if d.fee_percent_assumption < Decimal::ZERO {
            return Err(BotError::config("FEE_PERCENT_ASSUMPTION", "must not be negative"));
        }
        if d.safety_margin <= Decimal::ZERO || d.safety_margin > Decimal::ONE {
            return Err(BotError::config("SAFETY_MARGIN_FACTOR", "must be in (0, 1]"));
        }
        if self.exchanges.len() < 2 {
            return Err(BotError::config("EXCHANGES", "at least two exchanges are required"));
        }
        if self.quote_currencies.is_empty() {
            return Err(BotError::config("QUOTE_CURRENCIES", "at least one quote currency is required"));
        }
        if self.dry_run_balance < Decimal::ZERO {
            return Err(BotError::config("DRY_RUN_BALANCE", "must not be negative"));
        }
        if !self.dry_run {
            for venue in &self.exchanges {
                if self.credentials_for(venue).is_none() {
                    return Err(BotError::config(
                        &format!("{}_API_KEY", venue.to_uppercase()),
                        "API credentials are required for live trading",
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn credentials_for(&self, venue: &str) -> Option<&Credentials> {
        match venue {
            "binance" => self.binance_credentials.as_ref(),
            "kraken" => self.kraken_credentials.as_ref(),
            _ => None,
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn circuit_breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_cooldown_secs)
    }
}

/// A credential variable's value, with blanks and `your_...` template
/// placeholders treated as unset.
pub fn credential_value<F>(lookup: F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.contains("your_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> BotResult<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = load(&[]).unwrap();

        assert_eq!(config.symbol, "XLM");
        assert_eq!(config.quote_currencies, vec!["USDT", "USD"]);
        assert_eq!(config.exchanges, vec!["binance", "kraken"]);
        assert_eq!(config.detection.min_profit_pct, dec!(0.5));
        assert_eq!(config.detection.reference_notional, dec!(100));
        assert_eq!(config.detection.fee_percent_assumption, dec!(0.2));
        assert_eq!(config.detection.safety_margin, dec!(0.98));
        assert_eq!(config.check_interval(), Duration::from_secs(5));
        assert!(config.dry_run);
        assert_eq!(config.binance_api_url, BINANCE_API_URL);
    }

    #[test]
    fn overrides_are_parsed_and_normalised() {
        let config = load(&[
            ("SYMBOL", "ada"),
            ("QUOTE_CURRENCIES", " usd "),
            ("EXCHANGES", "Binance, Kraken"),
            ("MIN_PROFIT_PERCENTAGE", "1.25"),
            ("KRAKEN_TAKER_FEE_PCT", "0.26"),
            ("CHECK_INTERVAL_SECONDS", "0"),
        ])
        .unwrap();

        assert_eq!(config.symbol, "ADA");
        assert_eq!(config.quote_currencies, vec!["USD"]);
        assert_eq!(config.exchanges, vec!["binance", "kraken"]);
        assert_eq!(config.detection.min_profit_pct, dec!(1.25));
        assert_eq!(config.detection.fees.for_venue("kraken").taker_pct, dec!(0.26));
        assert_eq!(config.detection.fees.for_venue("binance"), VenueFees::default());
        assert_eq!(config.check_interval_secs, MIN_CHECK_INTERVAL_SECS);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            load(&[("MIN_PROFIT_PERCENTAGE", "0")]),
            Err(BotError::Config { field, .. }) if field == "MIN_PROFIT_PERCENTAGE"
        ));
        assert!(matches!(
            load(&[("TRADE_AMOUNT_USD", "-5")]),
            Err(BotError::Config { field, .. }) if field == "TRADE_AMOUNT_USD"
        ));
        assert!(matches!(
            load(&[("SAFETY_MARGIN_FACTOR", "1.5")]),
            Err(BotError::Config { .. })
        ));
        assert!(matches!(load(&[("EXCHANGES", "binance")]), Err(BotError::Config { .. })));
        assert!(matches!(load(&[("TRADE_AMOUNT_USD", "lots")]), Err(BotError::Config { .. })));
    }

    #[test]
    fn live_mode_requires_credentials() {
        assert!(load(&[("DRY_RUN", "false")]).is_err());

        let config = load(&[
            ("DRY_RUN", "false"),
            ("BINANCE_API_KEY", "k1"),
            ("BINANCE_API_SECRET", "s1"),
            ("KRAKEN_API_KEY", "k2"),
            ("KRAKEN_API_SECRET", "s2"),
        ])
        .unwrap();
        assert!(!config.dry_run);
        assert_eq!(config.credentials_for("kraken").unwrap().api_key, "k2");
    }

    #[test]
    fn template_placeholders_are_not_credentials() {
        let lookup = |key: &str| match key {
            "BINANCE_API_KEY" => Some("your_binance_api_key".to_string()),
            "BINANCE_API_SECRET" => Some("  real-secret ".to_string()),
            _ => None,
        };

        assert_eq!(credential_value(lookup, "BINANCE_API_KEY"), None);
        assert_eq!(credential_value(lookup, "BINANCE_API_SECRET").as_deref(), Some("real-secret"));
        assert_eq!(credential_value(lookup, "KRAKEN_API_KEY"), None);

        assert!(load(&[
            ("DRY_RUN", "false"),
            ("BINANCE_API_KEY", "your_binance_api_key"),
            ("BINANCE_API_SECRET", "s1"),
            ("KRAKEN_API_KEY", "k2"),
            ("KRAKEN_API_SECRET", "s2"),
        ])
        .is_err());
    }
}
