use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One listing row as stored in the listings database. Raw fields stay raw;
/// normalization happens in `parse`.
#[derive(Debug, Clone)]
pub struct PropertyRecord {
    pub price: Option<f64>,
    pub tax_information_raw: Option<String>,
    pub estimated_rent_raw: Option<String>,
    pub sqft: Option<f64>,
    pub year_built_raw: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poor => write!(f, "poor"),
            Self::Fair => write!(f, "fair"),
            Self::Good => write!(f, "good"),
            Self::Excellent => write!(f, "excellent"),
        }
    }
}

/// Market-direction label attached to an appreciation rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    ManualOverride,
    Unknown,
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryStrong => write!(f, "very_strong"),
            Self::Strong => write!(f, "strong"),
            Self::Moderate => write!(f, "moderate"),
            Self::Weak => write!(f, "weak"),
            Self::ManualOverride => write!(f, "manual_override"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Outlook {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "very_strong" => Ok(Self::VeryStrong),
            "strong" => Ok(Self::Strong),
            "moderate" => Ok(Self::Moderate),
            "weak" => Ok(Self::Weak),
            "manual_override" => Ok(Self::ManualOverride),
            _ => Err(()),
        }
    }
}

/// Fully resolved inputs for one analysis run. Built once from the resolved
/// CLI/config parameters plus the listing row, then read-only.
#[derive(Debug, Clone)]
pub struct EffectiveParameters {
    pub purchase_price: f64,
    pub square_feet: Option<f64>,
    pub property_age: u32,
    pub condition: Condition,
    pub down_payment: f64,
    /// Annual interest rate in percent, e.g. 6.75.
    pub annual_rate: f64,
    pub loan_term_years: u32,
    pub annual_insurance: f64,
    pub misc_monthly: f64,
    pub utilities_monthly: f64,
    /// Percent of gross rent held back for vacancy.
    pub vacancy_rate: f64,
    /// Percent of gross rent paid to property management.
    pub mgmt_fee_rate: f64,
    pub maintenance_percent: f64,
    pub capex_percent: f64,
    pub use_dynamic_capex: bool,
    pub neighborhood: String,
    pub investment_horizon: u32,
    pub appreciation_override: Option<f64>,
    pub fetch_real_appreciation: bool,
    pub historical_metric: String,
    pub historical_city: Option<String>,
}

impl EffectiveParameters {
    pub fn loan_amount(&self) -> f64 {
        self.purchase_price - self.down_payment
    }

    pub fn down_payment_percent(&self) -> f64 {
        if self.purchase_price > 0.0 {
            self.down_payment / self.purchase_price * 100.0
        } else {
            0.0
        }
    }
}

/// Which appreciation source won, and what it said.
#[derive(Debug, Clone)]
pub struct AppreciationDecision {
    /// Annual appreciation rate in percent.
    pub rate: f64,
    pub outlook: Outlook,
    pub source: String,
    /// Precedence rank of the winning source, 1 = manual override.
    pub rank: u8,
}

#[derive(Debug, Clone)]
pub struct CashflowResult {
    pub gross_rent: f64,
    pub rent_missing: bool,
    pub vacancy_allowance: f64,
    pub management_fee: f64,
    pub mortgage_payment: f64,
    pub monthly_taxes: f64,
    pub tax_parse_failed: bool,
    pub monthly_insurance: f64,
    pub maintenance_reserve: f64,
    /// Maintenance percent after the age/condition adjustment; equals the
    /// configured percent outside dynamic mode.
    pub maintenance_percent_effective: f64,
    pub capex_reserve: f64,
    pub capex_percent_effective: f64,
    pub capex_breakdown: Option<crate::capex::CapexBreakdown>,
    pub utilities: f64,
    pub misc: f64,
    pub total_expenses: f64,
    pub net_monthly_cashflow: f64,
    pub annual_cashflow: f64,
    pub cash_on_cash_roi: f64,
    /// NOI-based cap rate, only computed in dynamic-capex mode.
    pub cap_rate: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ProjectionResult {
    pub horizon_years: u32,
    pub future_value: f64,
    pub appreciation_amount: f64,
    pub equity_from_paydown: f64,
    pub remaining_balance: f64,
    pub total_equity: f64,
    pub total_cashflow: f64,
    pub total_profit: f64,
    pub total_roi: f64,
    pub annualized_roi: f64,
}

#[derive(Debug, Clone)]
pub struct MetricScore {
    pub label: &'static str,
    pub rating: String,
    pub points: f64,
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    /// Normalized 0-10.
    pub overall: f64,
    pub tier: &'static str,
    pub metrics: Vec<MetricScore>,
}

#[cfg(test)]
pub(crate) fn test_params() -> EffectiveParameters {
    EffectiveParameters {
        purchase_price: 465_000.0,
        square_feet: Some(1650.0),
        property_age: 20,
        condition: Condition::Good,
        down_payment: 350_000.0,
        annual_rate: 6.75,
        loan_term_years: 30,
        annual_insurance: 1800.0,
        misc_monthly: 113.63,
        utilities_monthly: 0.0,
        vacancy_rate: 5.0,
        mgmt_fee_rate: 0.0,
        maintenance_percent: 0.0,
        capex_percent: 0.0,
        use_dynamic_capex: false,
        neighborhood: "sloan_lake".to_string(),
        investment_horizon: 10,
        appreciation_override: None,
        fetch_real_appreciation: false,
        historical_metric: "median_sale_price_5_year_cagr_appreciation".to_string(),
        historical_city: Some("Denver".to_string()),
    }
}
