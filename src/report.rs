use chrono::NaiveDate;

use crate::capex::{CapexBreakdown, CAPEX_COMPONENTS};
use crate::model::{
    AppreciationDecision, CashflowResult, EffectiveParameters, ProjectionResult, ScoreResult,
};

const WIDTH: usize = 80;
const LABEL_WIDTH: usize = 35;

fn hr(ch: char, length: usize) -> String {
    ch.to_string().repeat(length)
}

fn section_title(title: &str) -> String {
    let title = title.to_uppercase();
    let padding = WIDTH.saturating_sub(title.len() + 4) / 2;
    let rule = hr('-', padding);
    format!("{rule} {title} {rule}")
}

fn label_value(label: &str, value: &str) -> String {
    format!("{label:<LABEL_WIDTH$} {value}")
}

/// `$1,234.56`, sign between the `$` and the digits.
pub fn currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let fraction = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let dollars_grouped: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("${sign}{dollars_grouped}.{fraction:02}")
}

pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

pub fn render(
    address: &str,
    date: NaiveDate,
    params: &EffectiveParameters,
    decision: &AppreciationDecision,
    cashflow: &CashflowResult,
    projection: &ProjectionResult,
    score: &ScoreResult,
) -> String {
    let mut out = String::new();

    push_line(&mut out, &hr('=', WIDTH));
    push_line(&mut out, &format!("REAL ESTATE INVESTMENT ANALYSIS: {address}"));
    push_line(&mut out, &format!("Analysis Date: {}", date.format("%B %d, %Y")));
    push_line(&mut out, &hr('=', WIDTH));

    push_line(&mut out, "");
    push_line(&mut out, &section_title("Property & Loan Details"));
    push_line(&mut out, &label_value("Purchase Price:", &currency(params.purchase_price)));
    let sqft = match params.square_feet {
        Some(sqft) => format!("{sqft:.0} sq ft"),
        None => "N/A".to_string(),
    };
    push_line(&mut out, &label_value("Square Footage:", &sqft));
    push_line(&mut out, &label_value("Property Age:", &format!("{} years", params.property_age)));
    push_line(
        &mut out,
        &label_value("Property Condition:", &params.condition.to_string().to_uppercase()),
    );
    push_line(
        &mut out,
        &label_value(
            "Down Payment:",
            &format!(
                "{} ({})",
                currency(params.down_payment),
                percent(params.down_payment_percent())
            ),
        ),
    );
    push_line(&mut out, &label_value("Loan Amount:", &currency(params.loan_amount())));
    push_line(&mut out, &label_value("Interest Rate:", &percent(params.annual_rate)));
    push_line(
        &mut out,
        &label_value("Loan Term:", &format!("{} years", params.loan_term_years)),
    );

    push_line(&mut out, "");
    push_line(&mut out, &section_title("Monthly Cashflow Analysis"));
    let rent_note = if cashflow.rent_missing {
        " (No rent found)"
    } else {
        ""
    };
    push_line(
        &mut out,
        &label_value(
            "Gross Monthly Rent:",
            &format!("{}{}", currency(cashflow.gross_rent), rent_note),
        ),
    );
    push_line(
        &mut out,
        &label_value(
            "Vacancy Allowance:",
            &format!(
                "{} ({})",
                currency(cashflow.vacancy_allowance),
                percent(params.vacancy_rate)
            ),
        ),
    );
    push_line(
        &mut out,
        &label_value(
            "Management Fee:",
            &format!(
                "{} ({})",
                currency(cashflow.management_fee),
                percent(params.mgmt_fee_rate)
            ),
        ),
    );
    push_line(&mut out, &label_value("Mortgage (P&I):", &currency(cashflow.mortgage_payment)));
    let tax_note = if cashflow.tax_parse_failed {
        " (Could not parse)"
    } else {
        ""
    };
    push_line(
        &mut out,
        &label_value(
            "Property Taxes:",
            &format!("{}{}", currency(cashflow.monthly_taxes), tax_note),
        ),
    );
    push_line(&mut out, &label_value("Insurance:", &currency(cashflow.monthly_insurance)));
    push_line(
        &mut out,
        &label_value(
            "Maintenance Reserve:",
            &format!(
                "{} ({} annual)",
                currency(cashflow.maintenance_reserve),
                percent(cashflow.maintenance_percent_effective)
            ),
        ),
    );
    push_line(
        &mut out,
        &label_value(
            "CapEx Reserve:",
            &format!(
                "{} ({} of value)",
                currency(cashflow.capex_reserve),
                percent(cashflow.capex_percent_effective)
            ),
        ),
    );
    push_line(&mut out, &label_value("Utilities (Landlord):", &currency(cashflow.utilities)));
    push_line(&mut out, &label_value("Misc. Monthly Costs:", &currency(cashflow.misc)));
    push_line(&mut out, &hr('-', 40));
    push_line(
        &mut out,
        &label_value("Total Monthly Expenses:", &currency(cashflow.total_expenses)),
    );
    push_line(&mut out, &hr('-', 40));
    push_line(
        &mut out,
        &label_value("Net Monthly Cashflow:", &currency(cashflow.net_monthly_cashflow)),
    );
    push_line(&mut out, &label_value("Annual Cashflow:", &currency(cashflow.annual_cashflow)));
    push_line(
        &mut out,
        &label_value("Cash-on-Cash ROI:", &percent(cashflow.cash_on_cash_roi)),
    );
    if let Some(cap) = cashflow.cap_rate {
        push_line(&mut out, &label_value("Cap Rate (NOI Based):", &percent(cap)));
    }

    push_line(&mut out, "");
    push_line(
        &mut out,
        &section_title(&format!("Long-Term Projection ({} Years)", projection.horizon_years)),
    );
    push_line(
        &mut out,
        &label_value(
            "Investment Horizon:",
            &format!("{} years", projection.horizon_years),
        ),
    );
    push_line(
        &mut out,
        &label_value(
            "Annual Appreciation Rate:",
            &format!(
                "{} (Outlook: {}, Source: {})",
                percent(decision.rate),
                decision.outlook,
                decision.source
            ),
        ),
    );
    push_line(
        &mut out,
        &label_value("Est. Future Property Value:", &currency(projection.future_value)),
    );
    push_line(
        &mut out,
        &label_value(
            "Total Property Appreciation:",
            &currency(projection.appreciation_amount),
        ),
    );
    push_line(
        &mut out,
        &label_value("Equity from Paydown:", &currency(projection.equity_from_paydown)),
    );
    push_line(
        &mut out,
        &label_value("Remaining Loan Balance:", &currency(projection.remaining_balance)),
    );
    push_line(
        &mut out,
        &label_value("Total Equity at Horizon:", &currency(projection.total_equity)),
    );
    push_line(
        &mut out,
        &label_value(
            "Total Cashflow during Horizon:",
            &currency(projection.total_cashflow),
        ),
    );
    push_line(&mut out, &hr('-', 40));
    push_line(
        &mut out,
        &label_value("Total Estimated Profit:", &currency(projection.total_profit)),
    );
    push_line(
        &mut out,
        &label_value("Total ROI (on initial equity):", &percent(projection.total_roi)),
    );
    push_line(
        &mut out,
        &label_value("Annualized ROI (on equity):", &percent(projection.annualized_roi)),
    );

    if let Some(breakdown) = &cashflow.capex_breakdown {
        render_capex_breakdown(&mut out, breakdown);
    }

    push_line(&mut out, "");
    push_line(&mut out, &section_title("Deal Analysis & Summary"));
    let metric_values = [
        currency(cashflow.net_monthly_cashflow),
        percent(cashflow.cash_on_cash_roi),
        cashflow.cap_rate.map_or("N/A".to_string(), percent),
        percent(projection.annualized_roi),
    ];
    for (metric, value) in score.metrics.iter().zip(metric_values.iter()) {
        push_line(
            &mut out,
            &label_value(
                &format!("{}:", metric.label),
                &format!("{} (Rating: {}, Score: {:.1})", value, metric.rating, metric.points),
            ),
        );
    }
    push_line(&mut out, &hr('-', 40));
    push_line(
        &mut out,
        &label_value(
            "Overall Investment Score:",
            &format!("{:.1}/10 ({})", score.overall, score.tier),
        ),
    );
    push_line(&mut out, &hr('-', 40));

    push_line(&mut out, "");
    push_line(&mut out, "Key Performance Indicators:");
    for metric in &score.metrics {
        push_line(&mut out, &format!("  - {}: {}", metric.label, metric.rating));
    }
    push_line(&mut out, &hr('=', WIDTH));

    out
}

fn render_capex_breakdown(out: &mut String, breakdown: &CapexBreakdown) {
    push_line(out, "");
    push_line(out, &section_title("Detailed CapEx Breakdown"));
    push_line(
        out,
        &format!(
            "{:<24} {:>18} {:>12} {:>18}",
            "Component", "Repl. Cost", "Lifespan", "Monthly Res."
        ),
    );
    push_line(out, &hr('-', WIDTH));
    let mut components: Vec<_> = breakdown.components.iter().collect();
    components.sort_by_key(|c| c.name);
    for comp in components {
        push_line(
            out,
            &format!(
                "{:<24} {:>18} {:>12} {:>18}",
                title_case(comp.name),
                currency(comp.replacement_cost),
                format!("{:.1} yrs", comp.lifespan_years),
                currency(comp.monthly_reserve),
            ),
        );
    }
    push_line(out, &hr('-', WIDTH));
    push_line(
        out,
        &label_value("Total Monthly CapEx Reserve:", &currency(breakdown.total_monthly)),
    );
}

/// Reference table behind `--capex-guide`.
pub fn capex_guide() -> String {
    let mut out = String::new();
    push_line(&mut out, &section_title("CapEx Components Reference Guide"));
    push_line(
        &mut out,
        "This guide shows typical CapEx components, default lifespans, and costs.",
    );
    push_line(
        &mut out,
        "Values are adjusted by property age and condition in dynamic analysis.",
    );
    push_line(&mut out, &hr('-', WIDTH));
    push_line(
        &mut out,
        &format!("{:<20} {:<20} {:<30}", "Component", "Typical Lifespan", "Cost Basis"),
    );
    push_line(&mut out, &hr('-', WIDTH));
    for comp in CAPEX_COMPONENTS {
        let cost_basis = if comp.cost_per_sqft > 0.0 {
            format!("${:.2}/sqft + ${:.2}", comp.cost_per_sqft, comp.cost_base)
        } else {
            format!("${:.2} base", comp.cost_base)
        };
        push_line(
            &mut out,
            &format!(
                "{:<20} {:<20} {:<30}",
                title_case(comp.name),
                format!("{:.0} years", comp.lifespan_years),
                cost_basis
            ),
        );
    }
    push_line(&mut out, &hr('-', WIDTH));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_formatting() {
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(745.886), "$745.89");
        assert_eq!(currency(914_725.381), "$914,725.38");
        assert_eq!(currency(-470.49), "$-470.49");
        assert_eq!(currency(1_234_567.5), "$1,234,567.50");
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(percent(6.75), "6.75%");
        assert_eq!(percent(149.454), "149.45%");
    }

    #[test]
    fn section_titles_are_centered_and_uppercased() {
        let title = section_title("Deal Analysis & Summary");
        assert!(title.contains("DEAL ANALYSIS & SUMMARY"));
        assert!(title.starts_with('-'));
        assert!(title.len() <= WIDTH);
    }

    #[test]
    fn title_casing_component_names() {
        assert_eq!(title_case("water_heater"), "Water Heater");
        assert_eq!(title_case("roof"), "Roof");
    }

    #[test]
    fn guide_lists_every_component() {
        let guide = capex_guide();
        assert!(guide.contains("Water Heater"));
        assert!(guide.contains("Driveway"));
        assert!(guide.contains("$5.50/sqft"));
        assert!(guide.contains("$900.00 base"));
        assert!(guide.matches('\n').count() >= CAPEX_COMPONENTS.len() + 5);
    }
}
