use crate::model::{CashflowResult, MetricScore, ProjectionResult, ScoreResult};

// Contribution bounds across the four metrics. The raw sum lands in
// [-7, 9] and is stretched onto 0-10.
const MIN_RAW: f64 = -7.0;
const MAX_RAW: f64 = 9.0;

pub fn rate_cashflow(net_monthly: f64) -> (f64, &'static str) {
    if net_monthly > 300.0 {
        (2.5, "Excellent")
    } else if net_monthly > 100.0 {
        (1.5, "Good")
    } else if net_monthly > 0.0 {
        (0.5, "Fair")
    } else if net_monthly == 0.0 {
        (0.0, "Neutral")
    } else if net_monthly > -100.0 {
        (-0.5, "Poor")
    } else if net_monthly > -300.0 {
        (-1.5, "Very Poor")
    } else {
        (-2.5, "Extremely Poor")
    }
}

pub fn rate_cash_on_cash(coc: f64) -> (f64, &'static str) {
    if coc > 12.0 {
        (2.5, "Excellent")
    } else if coc > 8.0 {
        (1.5, "Good")
    } else if coc > 5.0 {
        (0.5, "Fair")
    } else if coc > 2.0 {
        (0.0, "Neutral")
    } else if coc >= 0.0 {
        (-0.5, "Poor")
    } else {
        (-1.5, "Very Poor")
    }
}

/// Cap rate only exists in dynamic-capex mode; without it the metric sits out
/// of the rubric at zero contribution.
pub fn rate_cap_rate(cap: Option<f64>) -> (f64, &'static str) {
    let Some(cap) = cap else {
        return (0.0, "N/A (Requires Dynamic CapEx mode)");
    };
    if cap > 7.0 {
        (2.0, "Excellent")
    } else if cap > 5.5 {
        (1.0, "Good")
    } else if cap > 4.0 {
        (0.0, "Fair")
    } else if cap > 2.5 {
        (-1.0, "Poor")
    } else {
        (-2.0, "Very Poor")
    }
}

pub fn rate_annualized_roi(annual_roi: f64) -> (f64, &'static str) {
    if annual_roi > 15.0 {
        (2.0, "Excellent")
    } else if annual_roi > 10.0 {
        (1.0, "Good")
    } else if annual_roi > 7.0 {
        (0.5, "Fair")
    } else if annual_roi > 4.0 {
        (0.0, "Neutral")
    } else if annual_roi >= 0.0 {
        (-0.5, "Poor")
    } else {
        (-1.0, "Very Poor")
    }
}

pub fn tier_for(overall: f64) -> &'static str {
    if overall >= 8.5 {
        "Excellent Investment Prospect!"
    } else if overall >= 6.5 {
        "Good Investment Prospect"
    } else if overall >= 4.0 {
        "Fair Investment Prospect, Potential Upsides"
    } else if overall >= 2.0 {
        "Marginal Investment, Consider Carefully"
    } else {
        "Poor Investment Prospect"
    }
}

pub fn score(cashflow: &CashflowResult, projection: &ProjectionResult) -> ScoreResult {
    let (cf_points, cf_rating) = rate_cashflow(cashflow.net_monthly_cashflow);
    let (coc_points, coc_rating) = rate_cash_on_cash(cashflow.cash_on_cash_roi);
    let (cap_points, cap_rating) = rate_cap_rate(cashflow.cap_rate);
    let (roi_points, roi_rating) = rate_annualized_roi(projection.annualized_roi);

    let metrics = vec![
        MetricScore {
            label: "Net Monthly Cashflow",
            rating: cf_rating.to_string(),
            points: cf_points,
        },
        MetricScore {
            label: "Cash-on-Cash ROI",
            rating: coc_rating.to_string(),
            points: coc_points,
        },
        MetricScore {
            label: "Cap Rate (NOI Based)",
            rating: cap_rating.to_string(),
            points: cap_points,
        },
        MetricScore {
            label: "Annualized Total ROI",
            rating: roi_rating.to_string(),
            points: roi_points,
        },
    ];

    let raw: f64 = metrics.iter().map(|m| m.points).sum();
    let overall = ((raw - MIN_RAW) / (MAX_RAW - MIN_RAW) * 10.0).clamp(0.0, 10.0);

    ScoreResult {
        overall,
        tier: tier_for(overall),
        metrics,
    }
}
