use crate::capex::{self, CapexModel};
use crate::model::{CashflowResult, EffectiveParameters};

/// Standard fixed-rate amortization payment. A zero rate degenerates to
/// straight-line principal, not a division by zero.
pub fn mortgage_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    if principal <= 0.0 || term_years == 0 {
        return 0.0;
    }
    let n = f64::from(term_years * 12);
    let r = annual_rate_percent / 100.0 / 12.0;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * (r * growth) / (growth - 1.0)
}

/// Aggregates the monthly ledger. Nothing is rounded here; presentation
/// rounding happens in the report.
pub fn compute(
    params: &EffectiveParameters,
    gross_rent: f64,
    rent_missing: bool,
    monthly_taxes: f64,
    tax_parse_failed: bool,
    capex_model: &dyn CapexModel,
) -> CashflowResult {
    let mortgage_payment = mortgage_payment(params.loan_amount(), params.annual_rate, params.loan_term_years);
    let monthly_insurance = params.annual_insurance / 12.0;
    let vacancy_allowance = gross_rent * params.vacancy_rate / 100.0;
    let management_fee = gross_rent * params.mgmt_fee_rate / 100.0;

    let maintenance_percent_effective = if params.use_dynamic_capex {
        params.maintenance_percent
            * capex::age_multiplier(params.property_age)
            * capex::condition_multiplier(params.condition)
    } else {
        params.maintenance_percent
    };
    let maintenance_reserve = params.purchase_price * maintenance_percent_effective / 100.0 / 12.0;

    let reserve = capex_model.reserve(
        params.purchase_price,
        params.square_feet,
        params.property_age,
        params.condition,
    );

    let total_expenses = mortgage_payment
        + monthly_taxes
        + monthly_insurance
        + params.misc_monthly
        + params.utilities_monthly
        + vacancy_allowance
        + management_fee
        + maintenance_reserve
        + reserve.monthly;
    let net_monthly_cashflow = gross_rent - total_expenses;
    let annual_cashflow = net_monthly_cashflow * 12.0;
    let cash_on_cash_roi = if params.down_payment > 0.0 {
        annual_cashflow / params.down_payment * 100.0
    } else {
        0.0
    };

    // NOI leaves debt service out; only meaningful with the full dynamic
    // expense picture.
    let cap_rate = if params.use_dynamic_capex && params.purchase_price > 0.0 {
        let operating_monthly = total_expenses - mortgage_payment;
        let annual_noi = (gross_rent - operating_monthly) * 12.0;
        Some(annual_noi / params.purchase_price * 100.0)
    } else {
        None
    };

    CashflowResult {
        gross_rent,
        rent_missing,
        vacancy_allowance,
        management_fee,
        mortgage_payment,
        monthly_taxes,
        tax_parse_failed,
        monthly_insurance,
        maintenance_reserve,
        maintenance_percent_effective,
        capex_reserve: reserve.monthly,
        capex_percent_effective: reserve.percent_of_value,
        capex_breakdown: reserve.breakdown,
        utilities: params.utilities_monthly,
        misc: params.misc_monthly,
        total_expenses,
        net_monthly_cashflow,
        annual_cashflow,
        cash_on_cash_roi,
        cap_rate,
    }
}
