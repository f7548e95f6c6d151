use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::cli::Cli;
use crate::error::AnalyzerError;
use crate::model::{Condition, PropertyRecord};

/// Script defaults, the lowest rung of the precedence ladder.
pub mod defaults {
    use crate::model::Condition;

    pub const LOAN_TERM: u32 = 30;
    pub const VACANCY_RATE: f64 = 5.0;
    pub const PROPERTY_MGMT_FEE: f64 = 0.0;
    pub const MAINTENANCE_PERCENT: f64 = 1.0;
    pub const CAPEX_PERCENT: f64 = 1.0;
    pub const UTILITIES_MONTHLY: f64 = 0.0;
    pub const PROPERTY_AGE: u32 = 20;
    pub const CONDITION: Condition = Condition::Good;
    pub const SQUARE_FEET: f64 = 1400.0;
    pub const USE_DYNAMIC_CAPEX: bool = false;
    pub const INVESTMENT_HORIZON: u32 = 5;
    pub const FETCH_REAL_APPRECIATION: bool = true;
    pub const HISTORICAL_METRIC: &str = "median_sale_price_5_year_cagr_appreciation";
}

/// One neighborhood entry in the config's appreciation table.
#[derive(Debug, Clone, Deserialize)]
pub struct NeighborhoodEntry {
    pub short_term_outlook: Option<String>,
    pub long_term_outlook: Option<String>,
    /// Annual appreciation in percent.
    pub historical_appreciation: Option<f64>,
}

/// The JSON config file. Every assumption is optional; unknown keys are
/// ignored so the file can be shared with other tooling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub down_payment: Option<f64>,
    pub rate: Option<f64>,
    pub insurance: Option<f64>,
    pub misc_monthly: Option<f64>,
    pub loan_term: Option<u32>,
    pub vacancy_rate: Option<f64>,
    pub property_mgmt_fee: Option<f64>,
    pub maintenance_percent: Option<f64>,
    pub capex_percent: Option<f64>,
    pub utilities_monthly: Option<f64>,
    pub property_age: Option<u32>,
    pub property_condition: Option<Condition>,
    pub square_feet: Option<f64>,
    pub use_dynamic_capex: Option<bool>,
    pub appreciation_rate: Option<f64>,
    pub neighborhood: Option<String>,
    pub investment_horizon: Option<u32>,
    pub fetch_real_appreciation: Option<bool>,
    pub use_historical_metric: Option<String>,
    pub target_city: Option<String>,
    pub neighborhood_appreciation_data: HashMap<String, NeighborhoodEntry>,
    pub zip_to_neighborhood_mapping: HashMap<String, String>,
}

/// Loads the config file. A missing file is fine (all defaults); an unreadable
/// or malformed one is fatal.
pub fn load(path: &Path) -> Result<ConfigFile, AnalyzerError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(ConfigFile::default());
        }
        Err(source) => {
            return Err(AnalyzerError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&text).map_err(|source| AnalyzerError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Financial assumptions after the CLI > config > default merge, before the
/// listing row is folded in.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    pub down_payment: f64,
    pub rate: f64,
    pub insurance: f64,
    pub misc_monthly: f64,
    pub loan_term: u32,
    pub vacancy_rate: f64,
    pub property_mgmt_fee: f64,
    pub maintenance_percent: f64,
    pub capex_percent: f64,
    pub utilities_monthly: f64,
    pub property_age: u32,
    pub property_condition: Condition,
    pub square_feet: f64,
    pub use_dynamic_capex: bool,
    pub appreciation_rate: Option<f64>,
    pub investment_horizon: u32,
    pub fetch_real_appreciation: bool,
    pub historical_metric: String,
    pub historical_city: Option<String>,
}

/// Merges CLI flags over config values over script defaults, field by field.
/// The four fields with no script default must come from the CLI or config.
pub fn resolve(cli: &Cli, config: &ConfigFile) -> Result<ResolvedParams, AnalyzerError> {
    let mut missing = Vec::new();
    let mut require = |name: &'static str, value: Option<f64>| {
        value.unwrap_or_else(|| {
            missing.push(name);
            0.0
        })
    };

    let down_payment = require("down-payment", cli.down_payment.or(config.down_payment));
    let rate = require("rate", cli.rate.or(config.rate));
    let insurance = require("insurance", cli.insurance.or(config.insurance));
    let misc_monthly = require("misc-monthly", cli.misc_monthly.or(config.misc_monthly));

    if !missing.is_empty() {
        return Err(AnalyzerError::MissingParameters(missing.join(", ")));
    }

    let params = ResolvedParams {
        down_payment,
        rate,
        insurance,
        misc_monthly,
        loan_term: cli
            .loan_term
            .or(config.loan_term)
            .unwrap_or(defaults::LOAN_TERM),
        vacancy_rate: cli
            .vacancy_rate
            .or(config.vacancy_rate)
            .unwrap_or(defaults::VACANCY_RATE),
        property_mgmt_fee: cli
            .property_mgmt_fee
            .or(config.property_mgmt_fee)
            .unwrap_or(defaults::PROPERTY_MGMT_FEE),
        maintenance_percent: cli
            .maintenance_percent
            .or(config.maintenance_percent)
            .unwrap_or(defaults::MAINTENANCE_PERCENT),
        capex_percent: cli
            .capex_percent
            .or(config.capex_percent)
            .unwrap_or(defaults::CAPEX_PERCENT),
        utilities_monthly: cli
            .utilities_monthly
            .or(config.utilities_monthly)
            .unwrap_or(defaults::UTILITIES_MONTHLY),
        property_age: cli
            .property_age
            .or(config.property_age)
            .unwrap_or(defaults::PROPERTY_AGE),
        property_condition: cli
            .property_condition
            .or(config.property_condition)
            .unwrap_or(defaults::CONDITION),
        square_feet: cli
            .square_feet
            .or(config.square_feet)
            .unwrap_or(defaults::SQUARE_FEET),
        use_dynamic_capex: cli
            .use_dynamic_capex
            .or(config.use_dynamic_capex)
            .unwrap_or(defaults::USE_DYNAMIC_CAPEX),
        appreciation_rate: cli.appreciation_rate.or(config.appreciation_rate),
        investment_horizon: cli
            .investment_horizon
            .or(config.investment_horizon)
            .unwrap_or(defaults::INVESTMENT_HORIZON),
        fetch_real_appreciation: cli
            .fetch_real_appreciation
            .or(config.fetch_real_appreciation)
            .unwrap_or(defaults::FETCH_REAL_APPRECIATION),
        historical_metric: cli
            .historical_metric
            .clone()
            .or_else(|| config.use_historical_metric.clone())
            .unwrap_or_else(|| defaults::HISTORICAL_METRIC.to_string()),
        historical_city: cli
            .historical_city
            .clone()
            .or_else(|| config.target_city.clone()),
    };
    debug!(?params, "resolved effective parameters");
    Ok(params)
}

/// Picks the neighborhood key for the run: CLI flag, then the zip table, then
/// a lower-cased city bucket, then the config-level neighborhood, then
/// "default". Never fails.
pub fn resolve_neighborhood(
    cli_neighborhood: Option<&str>,
    record: &PropertyRecord,
    config: &ConfigFile,
) -> String {
    if let Some(n) = cli_neighborhood {
        return n.to_string();
    }
    if let Some(zip) = record.zip.as_deref() {
        if let Some(key) = config.zip_to_neighborhood_mapping.get(zip) {
            debug!(zip, neighborhood = %key, "inferred neighborhood from zip");
            return key.clone();
        }
        debug!(zip, "zip not present in zip_to_neighborhood_mapping");
    }
    if let Some(city) = record.city.as_deref() {
        let bucket = city.to_lowercase();
        if config.neighborhood_appreciation_data.contains_key(&bucket) {
            debug!(city, "falling back to per-city appreciation bucket");
            return bucket;
        }
    }
    if let Some(n) = &config.neighborhood {
        return n.clone();
    }
    "default".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["cashflow_analyzer", "--address", "x"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    fn record_with(zip: Option<&str>, city: Option<&str>) -> PropertyRecord {
        PropertyRecord {
            price: Some(465_000.0),
            tax_information_raw: None,
            estimated_rent_raw: None,
            sqft: None,
            year_built_raw: None,
            zip: zip.map(str::to_string),
            city: city.map(str::to_string),
        }
    }

    #[test]
    fn cli_beats_config_beats_default() {
        let config: ConfigFile = serde_json::from_str(
            r#"{"down_payment": 1.0, "rate": 2.0, "insurance": 3.0, "misc_monthly": 4.0,
                "loan_term": 15, "vacancy_rate": 8.0}"#,
        )
        .unwrap();
        let params = resolve(&cli(&["--rate", "9.9", "--loan-term", "20"]), &config).unwrap();
        assert_eq!(params.rate, 9.9);
        assert_eq!(params.loan_term, 20);
        assert_eq!(params.down_payment, 1.0);
        assert_eq!(params.vacancy_rate, 8.0);
        // Untouched by CLI and config: script default.
        assert_eq!(params.investment_horizon, defaults::INVESTMENT_HORIZON);
    }

    #[test]
    fn missing_required_parameters_are_named() {
        let err = resolve(&cli(&["--down-payment", "50000"]), &ConfigFile::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("rate"));
        assert!(msg.contains("insurance"));
        assert!(msg.contains("misc-monthly"));
        assert!(!msg.contains("down-payment"));
    }

    #[test]
    fn unknown_config_keys_are_ignored() {
        let config: ConfigFile =
            serde_json::from_str(r#"{"rate": 5.0, "streamlit_port": 8501}"#).unwrap();
        assert_eq!(config.rate, Some(5.0));
    }

    #[test]
    fn neighborhood_prefers_cli_then_zip() {
        let config: ConfigFile = serde_json::from_str(
            r#"{"neighborhood": "from_config",
                "zip_to_neighborhood_mapping": {"80212": "sloan_lake"}}"#,
        )
        .unwrap();
        let record = record_with(Some("80212"), Some("Denver"));
        assert_eq!(
            resolve_neighborhood(Some("manual"), &record, &config),
            "manual"
        );
        assert_eq!(resolve_neighborhood(None, &record, &config), "sloan_lake");
    }

    #[test]
    fn unmapped_zip_falls_back_without_failing() {
        let config: ConfigFile = serde_json::from_str(
            r#"{"neighborhood_appreciation_data": {"denver": {"historical_appreciation": 4.0}},
                "zip_to_neighborhood_mapping": {"80212": "sloan_lake"}}"#,
        )
        .unwrap();
        // Unmapped zip, but the city has a bucket entry.
        let record = record_with(Some("99999"), Some("Denver"));
        assert_eq!(resolve_neighborhood(None, &record, &config), "denver");
        // No zip, no city, no config neighborhood: the default key.
        let bare = record_with(None, None);
        assert_eq!(resolve_neighborhood(None, &bare, &config), "default");
    }
}
