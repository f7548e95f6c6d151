use std::collections::HashMap;

use tracing::debug;

use crate::config::NeighborhoodEntry;
use crate::model::{AppreciationDecision, Outlook};

/// Read accessor for the most recent historical appreciation metric. A
/// trait so the selector can run against a stub in tests.
pub trait HistoricalSource {
    fn latest_metric(&self, metric: &str, city: Option<&str>, neighborhood: &str) -> Option<f64>;
}

/// Everything a rate source may consult. Built once per run.
pub struct SelectorContext<'a> {
    pub manual_rate: Option<f64>,
    pub fetch_real: bool,
    pub metric: &'a str,
    pub city: Option<&'a str>,
    pub neighborhood: &'a str,
    pub table: &'a HashMap<String, NeighborhoodEntry>,
    pub history: &'a dyn HistoricalSource,
}

/// Annualized 5-year averages for the stub market feed.
const MARKET_FEED_5YR_AVG: &[(&str, f64)] = &[
    ("five_points", 6.8),
    ("highland", 6.2),
    ("cherry_creek", 5.9),
    ("wash_park", 6.5),
    ("stapleton", 5.7),
    ("lodo", 6.0),
    ("downtown", 5.8),
    ("capitol_hill", 5.6),
    ("baker", 5.5),
    ("city_park", 6.1),
];

/// Rate reported by a source when every lookup comes up dry.
pub const GLOBAL_FALLBACK_RATE: f64 = 0.0;

pub fn outlook_for_rate(rate: f64) -> Outlook {
    if rate >= 8.0 {
        Outlook::VeryStrong
    } else if rate >= 5.0 {
        Outlook::Strong
    } else if rate >= 2.0 {
        Outlook::Moderate
    } else {
        Outlook::Weak
    }
}

trait RateSource {
    fn name(&self) -> &'static str;
    fn pick(&self, ctx: &SelectorContext<'_>) -> Option<AppreciationDecision>;
}

/// Rank 1. A rate given on the command line wins outright; nothing later in
/// the chain is consulted.
struct ManualOverride;

impl RateSource for ManualOverride {
    fn name(&self) -> &'static str {
        "manual override"
    }

    fn pick(&self, ctx: &SelectorContext<'_>) -> Option<AppreciationDecision> {
        ctx.manual_rate.map(|rate| AppreciationDecision {
            rate,
            outlook: Outlook::ManualOverride,
            source: "CLI Manual Rate Override".to_string(),
            rank: 0,
        })
    }
}

/// Rank 2. Latest qualifying metric from the historical database.
struct HistoricalDb;

impl RateSource for HistoricalDb {
    fn name(&self) -> &'static str {
        "historical database"
    }

    fn pick(&self, ctx: &SelectorContext<'_>) -> Option<AppreciationDecision> {
        let rate = ctx
            .history
            .latest_metric(ctx.metric, ctx.city, ctx.neighborhood)?;
        Some(AppreciationDecision {
            rate,
            outlook: outlook_for_rate(rate),
            source: format!("Historical DB ({})", ctx.metric),
            rank: 0,
        })
    }
}

/// Rank 3. Built-in snapshot of the external appreciation feed.
struct MarketFeed;

impl RateSource for MarketFeed {
    fn name(&self) -> &'static str {
        "market feed"
    }

    fn pick(&self, ctx: &SelectorContext<'_>) -> Option<AppreciationDecision> {
        if !ctx.fetch_real {
            return None;
        }
        let key = ctx.neighborhood.to_lowercase().replace(' ', "_");
        let (_, rate) = MARKET_FEED_5YR_AVG.iter().find(|(name, _)| *name == key)?;
        Some(AppreciationDecision {
            rate: *rate,
            outlook: outlook_for_rate(*rate),
            source: "Market Feed (5yr avg)".to_string(),
            rank: 0,
        })
    }
}

/// Rank 4. The config file's neighborhood table, ending at its `default`
/// entry.
struct ConfigTable;

impl ConfigTable {
    fn decision_from(entry: &NeighborhoodEntry, source: String) -> Option<AppreciationDecision> {
        let rate = entry.historical_appreciation?;
        let outlook = entry
            .long_term_outlook
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Outlook::Unknown);
        Some(AppreciationDecision {
            rate,
            outlook,
            source,
            rank: 0,
        })
    }
}

impl RateSource for ConfigTable {
    fn name(&self) -> &'static str {
        "config table"
    }

    fn pick(&self, ctx: &SelectorContext<'_>) -> Option<AppreciationDecision> {
        let name = ctx.neighborhood;
        let variants = [
            name.to_string(),
            name.replace('_', " "),
            name.replace(' ', "_"),
        ];
        for key in &variants {
            if *key == "default" {
                continue;
            }
            if let Some(entry) = ctx.table.get(key) {
                if let Some(decision) =
                    Self::decision_from(entry, format!("Config Table ('{key}')"))
                {
                    return Some(decision);
                }
                debug!(key = %key, "config table entry has no appreciation figure");
            }
        }
        let entry = ctx.table.get("default")?;
        Self::decision_from(entry, "Config Table (default)".to_string())
    }
}

/// Evaluates the sources in precedence order; the first answer wins. Always
/// yields exactly one decision.
pub fn select_rate(ctx: &SelectorContext<'_>) -> AppreciationDecision {
    let sources: [&dyn RateSource; 4] = [&ManualOverride, &HistoricalDb, &MarketFeed, &ConfigTable];
    for (index, source) in sources.iter().enumerate() {
        if let Some(mut decision) = source.pick(ctx) {
            decision.rank = index as u8 + 1;
            debug!(
                source = source.name(),
                rate = decision.rate,
                outlook = %decision.outlook,
                "appreciation source selected"
            );
            return decision;
        }
        debug!(source = source.name(), "appreciation source had no answer");
    }
    AppreciationDecision {
        rate: GLOBAL_FALLBACK_RATE,
        outlook: Outlook::Unknown,
        source: "Built-in Fallback".to_string(),
        rank: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubHistory(Option<f64>);

    impl HistoricalSource for StubHistory {
        fn latest_metric(&self, _: &str, _: Option<&str>, _: &str) -> Option<f64> {
            self.0
        }
    }

    fn table(json: &str) -> HashMap<String, NeighborhoodEntry> {
        serde_json::from_str(json).unwrap()
    }

    fn ctx<'a>(
        manual: Option<f64>,
        fetch_real: bool,
        neighborhood: &'a str,
        table: &'a HashMap<String, NeighborhoodEntry>,
        history: &'a dyn HistoricalSource,
    ) -> SelectorContext<'a> {
        SelectorContext {
            manual_rate: manual,
            fetch_real,
            metric: "median_sale_price_5_year_cagr_appreciation",
            city: Some("Denver"),
            neighborhood,
            table,
            history,
        }
    }

    #[test]
    fn manual_override_dominates_everything() {
        let table = table(r#"{"sloan_lake": {"historical_appreciation": 4.5}}"#);
        let history = StubHistory(Some(6.1));
        let decision = select_rate(&ctx(Some(7.0), true, "sloan_lake", &table, &history));
        assert_eq!(decision.rate, 7.0);
        assert_eq!(decision.outlook, Outlook::ManualOverride);
        assert_eq!(decision.source, "CLI Manual Rate Override");
        assert_eq!(decision.rank, 1);
    }

    #[test]
    fn historical_hit_beats_feed_and_table() {
        let table = table(r#"{"five_points": {"historical_appreciation": 4.5}}"#);
        let history = StubHistory(Some(6.1));
        let decision = select_rate(&ctx(None, true, "five_points", &table, &history));
        assert_eq!(decision.rate, 6.1);
        assert_eq!(decision.outlook, Outlook::Strong);
        assert_eq!(
            decision.source,
            "Historical DB (median_sale_price_5_year_cagr_appreciation)"
        );
        assert_eq!(decision.rank, 2);
    }

    #[test]
    fn feed_answers_when_history_is_dry() {
        let table = table("{}");
        let history = StubHistory(None);
        let decision = select_rate(&ctx(None, true, "Five Points", &table, &history));
        assert_eq!(decision.rate, 6.8);
        assert_eq!(decision.rank, 3);
        assert_eq!(decision.outlook, Outlook::Strong);
    }

    #[test]
    fn dry_history_with_fetch_real_disabled_lands_on_the_table() {
        let table = table(
            r#"{"sloan_lake": {"historical_appreciation": 4.5, "long_term_outlook": "strong"}}"#,
        );
        let history = StubHistory(None);
        let decision = select_rate(&ctx(None, false, "sloan_lake", &table, &history));
        assert_eq!(decision.rate, 4.5);
        assert_eq!(decision.outlook, Outlook::Strong);
        assert_eq!(decision.source, "Config Table ('sloan_lake')");
        assert_eq!(decision.rank, 4);
    }

    #[test]
    fn table_tries_space_and_underscore_variants() {
        let table = table(
            r#"{"sloan lake": {"historical_appreciation": 4.0, "long_term_outlook": "moderate"}}"#,
        );
        let history = StubHistory(None);
        let decision = select_rate(&ctx(None, false, "sloan_lake", &table, &history));
        assert_eq!(decision.rate, 4.0);
        assert_eq!(decision.source, "Config Table ('sloan lake')");
    }

    #[test]
    fn unmapped_neighborhood_lands_on_the_default_entry() {
        let table = table(
            r#"{"default": {"historical_appreciation": 3.5, "long_term_outlook": "moderate"}}"#,
        );
        let history = StubHistory(None);
        let decision = select_rate(&ctx(None, false, "nowhere_special", &table, &history));
        assert_eq!(decision.rate, 3.5);
        assert_eq!(decision.outlook, Outlook::Moderate);
        assert_eq!(decision.source, "Config Table (default)");
        assert_eq!(decision.rank, 4);
    }

    #[test]
    fn entry_without_a_rate_falls_to_default() {
        let table = table(
            r#"{"sloan_lake": {"long_term_outlook": "strong"},
                "default": {"historical_appreciation": 3.5}}"#,
        );
        let history = StubHistory(None);
        let decision = select_rate(&ctx(None, false, "sloan_lake", &table, &history));
        assert_eq!(decision.source, "Config Table (default)");
    }

    #[test]
    fn empty_world_ends_at_the_builtin_fallback() {
        let table = table("{}");
        let history = StubHistory(None);
        let decision = select_rate(&ctx(None, false, "nowhere", &table, &history));
        assert_eq!(decision.rate, GLOBAL_FALLBACK_RATE);
        assert_eq!(decision.outlook, Outlook::Unknown);
        assert_eq!(decision.source, "Built-in Fallback");
        assert_eq!(decision.rank, 5);
    }

    #[test]
    fn outlook_bands() {
        assert_eq!(outlook_for_rate(9.0), Outlook::VeryStrong);
        assert_eq!(outlook_for_rate(8.0), Outlook::VeryStrong);
        assert_eq!(outlook_for_rate(6.1), Outlook::Strong);
        assert_eq!(outlook_for_rate(3.0), Outlook::Moderate);
        assert_eq!(outlook_for_rate(1.0), Outlook::Weak);
        assert_eq!(outlook_for_rate(-2.0), Outlook::Weak);
    }
}
