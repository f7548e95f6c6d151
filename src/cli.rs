use std::path::PathBuf;

use clap::Parser;

use crate::model::Condition;

/// Real estate cashflow and appreciation analyzer.
///
/// Pulls one listing from the local database, merges financial assumptions
/// from CLI flags, the JSON config file, and built-in defaults, then prints a
/// full investment report.
#[derive(Parser, Debug, Clone)]
#[command(name = "cashflow_analyzer", version, about)]
pub struct Cli {
    /// Full property address as stored in the listings table
    #[arg(long)]
    pub address: String,

    /// Path to the listings SQLite database
    #[arg(long, default_value = "data/listings.db")]
    pub db_path: PathBuf,

    /// Path to the JSON config file
    #[arg(long, default_value = "config/cashflow_config.json")]
    pub config_path: PathBuf,

    /// Path to the historical neighborhood-appreciation database
    #[arg(long, default_value = "data/neighborhood_analysis.db")]
    pub historical_db_path: PathBuf,

    /// Metric name to read from the historical database
    #[arg(long)]
    pub historical_metric: Option<String>,

    /// City used to disambiguate the neighborhood in the historical database
    #[arg(long)]
    pub historical_city: Option<String>,

    /// Down payment amount in dollars
    #[arg(long)]
    pub down_payment: Option<f64>,

    /// Annual interest rate in percent, e.g. 6.75
    #[arg(long)]
    pub rate: Option<f64>,

    /// Annual insurance cost in dollars
    #[arg(long)]
    pub insurance: Option<f64>,

    /// Miscellaneous monthly costs in dollars
    #[arg(long)]
    pub misc_monthly: Option<f64>,

    /// Loan term in years
    #[arg(long)]
    pub loan_term: Option<u32>,

    /// Vacancy rate in percent of gross rent
    #[arg(long)]
    pub vacancy_rate: Option<f64>,

    /// Property management fee in percent of gross rent
    #[arg(long)]
    pub property_mgmt_fee: Option<f64>,

    /// Annual maintenance reserve in percent of property value
    #[arg(long)]
    pub maintenance_percent: Option<f64>,

    /// Annual CapEx reserve in percent of property value
    #[arg(long)]
    pub capex_percent: Option<f64>,

    /// Monthly utilities paid by the landlord
    #[arg(long)]
    pub utilities_monthly: Option<f64>,

    /// Property age in years, used when the listing has no usable year built
    #[arg(long)]
    pub property_age: Option<u32>,

    /// Property condition
    #[arg(long, value_enum)]
    pub property_condition: Option<Condition>,

    /// Square footage, used when the listing has none
    #[arg(long)]
    pub square_feet: Option<f64>,

    /// Use the per-component CapEx schedule instead of a flat percent
    #[arg(long, value_name = "BOOL")]
    pub use_dynamic_capex: Option<bool>,

    /// Manual annual appreciation rate in percent; overrides every other source
    #[arg(long)]
    pub appreciation_rate: Option<f64>,

    /// Neighborhood key; inferred from the listing zip code when absent
    #[arg(long)]
    pub neighborhood: Option<String>,

    /// Investment holding period in years
    #[arg(long)]
    pub investment_horizon: Option<u32>,

    /// Consult the historical database / market feed for the appreciation rate
    #[arg(long, value_name = "BOOL")]
    pub fetch_real_appreciation: Option<bool>,

    /// Print the CapEx component reference guide and exit
    #[arg(long)]
    pub capex_guide: bool,

    /// Enable debug tracing of resolver and selector decisions
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_invocation_parses() {
        let cli = Cli::try_parse_from(["cashflow_analyzer", "--address", "123 Main St"]).unwrap();
        assert_eq!(cli.address, "123 Main St");
        assert!(cli.down_payment.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn address_is_required() {
        assert!(Cli::try_parse_from(["cashflow_analyzer"]).is_err());
    }

    #[test]
    fn bool_flags_take_explicit_values() {
        let cli = Cli::try_parse_from([
            "cashflow_analyzer",
            "--address",
            "x",
            "--use-dynamic-capex",
            "true",
            "--fetch-real-appreciation",
            "false",
            "--property-condition",
            "fair",
        ])
        .unwrap();
        assert_eq!(cli.use_dynamic_capex, Some(true));
        assert_eq!(cli.fetch_real_appreciation, Some(false));
        assert_eq!(cli.property_condition, Some(Condition::Fair));
    }
}
