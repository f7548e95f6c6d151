use crate::model::{EffectiveParameters, ProjectionResult};

/// Outstanding principal after `months_paid` payments of a fixed-rate loan.
pub fn remaining_balance(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
    months_paid: u32,
) -> f64 {
    if principal <= 0.0 || term_years == 0 {
        return 0.0;
    }
    let n = f64::from(term_years * 12);
    let p = f64::from(months_paid);
    if p >= n {
        return 0.0;
    }
    let r = annual_rate_percent / 100.0 / 12.0;
    if r == 0.0 {
        let payment = principal / n;
        return (principal - payment * p).max(0.0);
    }
    let growth_n = (1.0 + r).powf(n);
    let growth_p = (1.0 + r).powf(p);
    principal * (growth_n - growth_p) / (growth_n - 1.0)
}

/// Compounds appreciation and loan paydown over the holding period. Cashflow
/// is held flat across the horizon; no reinvestment or rate drift is modeled.
pub fn project(
    params: &EffectiveParameters,
    appreciation_rate: f64,
    net_monthly_cashflow: f64,
) -> ProjectionResult {
    let price = params.purchase_price;
    let horizon = params.investment_horizon;
    let future_value = price * (1.0 + appreciation_rate / 100.0).powi(horizon as i32);
    let appreciation_amount = future_value - price;

    let loan = params.loan_amount();
    let remaining = remaining_balance(loan, params.annual_rate, params.loan_term_years, horizon * 12);
    let equity_from_paydown = loan - remaining;
    let total_equity = future_value - remaining;
    let total_cashflow = net_monthly_cashflow * 12.0 * f64::from(horizon);
    let total_profit = total_equity + total_cashflow - params.down_payment;

    let total_roi = if params.down_payment > 0.0 {
        total_profit / params.down_payment * 100.0
    } else {
        0.0
    };
    let annualized_roi = if params.down_payment > 0.0 && horizon > 0 {
        let base = 1.0 + total_roi / 100.0;
        if base > 0.0 {
            (base.powf(1.0 / f64::from(horizon)) - 1.0) * 100.0
        } else {
            0.0
        }
    } else {
        0.0
    };

    ProjectionResult {
        horizon_years: horizon,
        future_value,
        appreciation_amount,
        equity_from_paydown,
        remaining_balance: remaining,
        total_equity,
        total_cashflow,
        total_profit,
        total_roi,
        annualized_roi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_params;

    #[test]
    fn balance_starts_at_principal_and_ends_at_zero() {
        let loan = 115_000.0;
        assert!((remaining_balance(loan, 6.75, 30, 0) - loan).abs() < 1e-6);
        assert!(remaining_balance(loan, 6.75, 30, 360).abs() < 1e-6);
        // One month short of payoff is a small positive number.
        let near_end = remaining_balance(loan, 6.75, 30, 359);
        assert!(near_end > 0.0 && near_end < 1000.0);
    }

    #[test]
    fn zero_rate_balance_is_straight_line() {
        assert!((remaining_balance(120_000.0, 0.0, 10, 60) - 60_000.0).abs() < 1e-9);
    }

    #[test]
    fn balance_decreases_monotonically() {
        let mut last = f64::INFINITY;
        for months in [0, 60, 120, 240, 360] {
            let bal = remaining_balance(115_000.0, 6.75, 30, months);
            assert!(bal < last || (bal == 0.0 && last == 0.0));
            last = bal;
        }
    }

    #[test]
    fn projection_matches_reference_run() {
        let params = test_params();
        // Net cashflow from the reference ledger, 7% manual appreciation.
        let result = project(&params, 7.0, 470.4844);
        assert!((result.future_value - 914_725.38).abs() < 0.5);
        assert!((result.total_roi - 149.45).abs() < 0.1);
        assert!((result.annualized_roi - 9.57).abs() < 0.05);
        // Identity: total equity splits into paydown, appreciation, and the
        // down payment.
        let rebuilt =
            params.down_payment + result.equity_from_paydown + result.appreciation_amount;
        assert!((result.total_equity - rebuilt).abs() < 1e-6);
    }

    #[test]
    fn zero_down_payment_degenerates_to_zero_roi() {
        let mut params = test_params();
        params.down_payment = 0.0;
        let result = project(&params, 7.0, 100.0);
        assert_eq!(result.total_roi, 0.0);
        assert_eq!(result.annualized_roi, 0.0);
    }

    #[test]
    fn horizon_past_term_pays_the_loan_off() {
        let mut params = test_params();
        params.loan_term_years = 5;
        params.investment_horizon = 10;
        let result = project(&params, 3.0, 0.0);
        assert_eq!(result.remaining_balance, 0.0);
        assert!((result.equity_from_paydown - params.loan_amount()).abs() < 1e-9);
    }
}
