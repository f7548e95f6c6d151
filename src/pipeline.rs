use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::appreciation::{self, SelectorContext};
use crate::capex::{CapexModel, ComponentSchedule, PercentOfPrice};
use crate::cashflow;
use crate::cli::Cli;
use crate::config::{self, ConfigFile, ResolvedParams};
use crate::error::AnalyzerError;
use crate::loader::{self, SqliteHistory};
use crate::model::{
    AppreciationDecision, CashflowResult, EffectiveParameters, PropertyRecord, ProjectionResult,
    ScoreResult,
};
use crate::parse;
use crate::projection;
use crate::report;
use crate::score;

/// Everything one run produces, before rendering.
#[derive(Debug)]
pub struct Analysis {
    pub address: String,
    pub params: EffectiveParameters,
    pub decision: AppreciationDecision,
    pub cashflow: CashflowResult,
    pub projection: ProjectionResult,
    pub score: ScoreResult,
}

/// Full run: config, listing, normalization, rate selection, arithmetic,
/// report. `today` is injected so the output is a pure function of inputs.
pub fn run(cli: &Cli, today: NaiveDate) -> Result<String, AnalyzerError> {
    if cli.capex_guide {
        return Ok(report::capex_guide());
    }
    let analysis = analyze(cli, today)?;
    Ok(report::render(
        &analysis.address,
        today,
        &analysis.params,
        &analysis.decision,
        &analysis.cashflow,
        &analysis.projection,
        &analysis.score,
    ))
}

pub fn analyze(cli: &Cli, today: NaiveDate) -> Result<Analysis, AnalyzerError> {
    let config = config::load(&cli.config_path)?;
    let resolved = config::resolve(cli, &config)?;

    let record = loader::fetch_property(&cli.db_path, &cli.address)?
        .ok_or_else(|| AnalyzerError::PropertyNotFound(cli.address.clone()))?;
    debug!(?record, "fetched listing");

    let params = build_effective(cli, &config, &resolved, &record, today)?;

    let (monthly_taxes, tax_parse_failed) = monthly_taxes(&record);
    let (gross_rent, rent_missing) = gross_rent(&record);

    let history = SqliteHistory::new(cli.historical_db_path.clone());
    let decision = appreciation::select_rate(&SelectorContext {
        manual_rate: params.appreciation_override,
        fetch_real: params.fetch_real_appreciation,
        metric: &params.historical_metric,
        city: params.historical_city.as_deref(),
        neighborhood: &params.neighborhood,
        table: &config.neighborhood_appreciation_data,
        history: &history,
    });
    info!(
        rate = decision.rate,
        outlook = %decision.outlook,
        source = %decision.source,
        "appreciation rate selected"
    );

    let capex_model: Box<dyn CapexModel> = if params.use_dynamic_capex {
        Box::new(ComponentSchedule)
    } else {
        Box::new(PercentOfPrice {
            percent: params.capex_percent,
        })
    };
    let cashflow = cashflow::compute(
        &params,
        gross_rent,
        rent_missing,
        monthly_taxes,
        tax_parse_failed,
        capex_model.as_ref(),
    );
    let projection = projection::project(&params, decision.rate, cashflow.net_monthly_cashflow);
    let score = score::score(&cashflow, &projection);

    Ok(Analysis {
        address: cli.address.clone(),
        params,
        decision,
        cashflow,
        projection,
        score,
    })
}

/// Folds the listing row into the resolved assumptions. Listing values win
/// for square footage and age; the down payment is clamped into the price.
fn build_effective(
    cli: &Cli,
    config: &ConfigFile,
    resolved: &ResolvedParams,
    record: &PropertyRecord,
    today: NaiveDate,
) -> Result<EffectiveParameters, AnalyzerError> {
    use chrono::Datelike;

    let purchase_price = record
        .price
        .filter(|p| *p > 0.0)
        .ok_or_else(|| AnalyzerError::MissingPrice(cli.address.clone()))?;

    let mut down_payment = resolved.down_payment;
    if down_payment > purchase_price {
        info!(
            down_payment,
            purchase_price, "down payment exceeds price; clamping loan to $0"
        );
        down_payment = purchase_price;
    } else if down_payment < 0.0 {
        info!("negative down payment; using $0");
        down_payment = 0.0;
    }

    let square_feet = record
        .sqft
        .filter(|v| *v > 0.0)
        .or_else(|| Some(resolved.square_feet).filter(|v| *v > 0.0));

    let property_age = match record.year_built_raw.as_deref() {
        Some(raw) => match parse::property_age_from_year_built(raw, today.year()) {
            Some(age) => age,
            None => {
                debug!(year_built = raw, "unusable year built, using resolved age");
                resolved.property_age
            }
        },
        None => resolved.property_age,
    };

    let neighborhood = config::resolve_neighborhood(cli.neighborhood.as_deref(), record, config);
    let historical_city = record
        .city
        .clone()
        .or_else(|| resolved.historical_city.clone());

    Ok(EffectiveParameters {
        purchase_price,
        square_feet,
        property_age,
        condition: resolved.property_condition,
        down_payment,
        annual_rate: resolved.rate,
        loan_term_years: resolved.loan_term,
        annual_insurance: resolved.insurance,
        misc_monthly: resolved.misc_monthly,
        utilities_monthly: resolved.utilities_monthly,
        vacancy_rate: resolved.vacancy_rate,
        mgmt_fee_rate: resolved.property_mgmt_fee,
        maintenance_percent: resolved.maintenance_percent,
        capex_percent: resolved.capex_percent,
        use_dynamic_capex: resolved.use_dynamic_capex,
        neighborhood,
        investment_horizon: resolved.investment_horizon,
        appreciation_override: resolved.appreciation_rate,
        fetch_real_appreciation: resolved.fetch_real_appreciation,
        historical_metric: resolved.historical_metric.clone(),
        historical_city,
    })
}

fn monthly_taxes(record: &PropertyRecord) -> (f64, bool) {
    match record.tax_information_raw.as_deref() {
        Some(raw) => match parse::parse_money(raw) {
            Ok(annual) => (annual / 12.0, false),
            Err(e) => {
                debug!(error = %e, "could not parse tax information, using $0");
                (0.0, true)
            }
        },
        None => {
            debug!("listing has no tax information");
            (0.0, true)
        }
    }
}

fn gross_rent(record: &PropertyRecord) -> (f64, bool) {
    match record.estimated_rent_raw.as_deref() {
        Some(raw) => match parse::parse_money(raw) {
            Ok(rent) => (rent, false),
            Err(e) => {
                warn!(error = %e, "could not parse estimated rent, using $0");
                (0.0, true)
            }
        },
        None => {
            warn!("no estimated rent on the listing, using $0");
            (0.0, true)
        }
    }
}
