use tracing::debug;

use crate::model::Condition;

/// One line of the component schedule: how long it lasts and what replacing
/// it costs. Costs are per square foot, a flat base, or both.
#[derive(Debug, Clone, Copy)]
pub struct CapexComponent {
    pub name: &'static str,
    pub lifespan_years: f64,
    pub cost_base: f64,
    pub cost_per_sqft: f64,
}

pub const CAPEX_COMPONENTS: &[CapexComponent] = &[
    CapexComponent { name: "roof", lifespan_years: 25.0, cost_base: 0.0, cost_per_sqft: 5.5 },
    CapexComponent { name: "hvac", lifespan_years: 18.0, cost_base: 4500.0, cost_per_sqft: 1.5 },
    CapexComponent { name: "water_heater", lifespan_years: 10.0, cost_base: 900.0, cost_per_sqft: 0.0 },
    CapexComponent { name: "electrical", lifespan_years: 35.0, cost_base: 1800.0, cost_per_sqft: 0.0 },
    CapexComponent { name: "plumbing", lifespan_years: 45.0, cost_base: 0.0, cost_per_sqft: 2.0 },
    CapexComponent { name: "flooring", lifespan_years: 10.0, cost_base: 0.0, cost_per_sqft: 3.5 },
    CapexComponent { name: "appliances", lifespan_years: 12.0, cost_base: 3000.0, cost_per_sqft: 0.0 },
    CapexComponent { name: "bathroom_fixtures", lifespan_years: 18.0, cost_base: 1000.0, cost_per_sqft: 0.0 },
    CapexComponent { name: "interior_paint", lifespan_years: 6.0, cost_base: 0.0, cost_per_sqft: 1.0 },
    CapexComponent { name: "cabinets", lifespan_years: 18.0, cost_base: 0.0, cost_per_sqft: 1.25 },
    CapexComponent { name: "exterior_paint", lifespan_years: 8.0, cost_base: 0.0, cost_per_sqft: 1.5 },
    CapexComponent { name: "windows", lifespan_years: 20.0, cost_base: 0.0, cost_per_sqft: 1.75 },
    CapexComponent { name: "driveway", lifespan_years: 25.0, cost_base: 3000.0, cost_per_sqft: 0.0 },
];

pub fn condition_multiplier(condition: Condition) -> f64 {
    match condition {
        Condition::Excellent => 0.7,
        Condition::Good => 1.0,
        Condition::Fair => 1.3,
        Condition::Poor => 1.7,
    }
}

pub fn age_multiplier(age: u32) -> f64 {
    if age <= 5 {
        0.6
    } else if age <= 15 {
        0.9
    } else if age <= 30 {
        1.1
    } else if age <= 50 {
        1.3
    } else {
        1.5
    }
}

#[derive(Debug, Clone)]
pub struct ComponentReserve {
    pub name: &'static str,
    /// Replacement cost after the age/condition adjustment.
    pub replacement_cost: f64,
    /// Lifespan after the condition adjustment.
    pub lifespan_years: f64,
    pub annual_reserve: f64,
    pub monthly_reserve: f64,
}

#[derive(Debug, Clone)]
pub struct CapexBreakdown {
    pub components: Vec<ComponentReserve>,
    pub total_annual: f64,
    pub total_monthly: f64,
}

#[derive(Debug, Clone)]
pub struct CapexEstimate {
    pub monthly: f64,
    pub annual: f64,
    /// Annualized reserve as a percent of property value.
    pub percent_of_value: f64,
    pub breakdown: Option<CapexBreakdown>,
}

/// Strategy for sizing the capital-expenditure reserve.
pub trait CapexModel {
    fn reserve(
        &self,
        price: f64,
        sqft: Option<f64>,
        age: u32,
        condition: Condition,
    ) -> CapexEstimate;
}

/// Flat annual percent of the purchase price.
pub struct PercentOfPrice {
    pub percent: f64,
}

impl CapexModel for PercentOfPrice {
    fn reserve(&self, price: f64, _sqft: Option<f64>, _age: u32, _cond: Condition) -> CapexEstimate {
        let annual = price * self.percent / 100.0;
        CapexEstimate {
            monthly: annual / 12.0,
            annual,
            percent_of_value: self.percent,
            breakdown: None,
        }
    }
}

/// Per-component schedule scaled by age and condition. Components priced per
/// square foot contribute nothing when the listing has no usable footage.
pub struct ComponentSchedule;

impl CapexModel for ComponentSchedule {
    fn reserve(&self, price: f64, sqft: Option<f64>, age: u32, condition: Condition) -> CapexEstimate {
        let cond_mult = condition_multiplier(condition);
        let age_mult = age_multiplier(age);
        if sqft.is_none() {
            debug!("no usable square footage; per-sqft capex components priced at base cost only");
        }
        let sqft = sqft.unwrap_or(0.0);

        let mut components = Vec::with_capacity(CAPEX_COMPONENTS.len());
        let mut total_annual = 0.0;
        for comp in CAPEX_COMPONENTS {
            let lifespan = comp.lifespan_years / cond_mult;
            let raw_cost = comp.cost_per_sqft * sqft + comp.cost_base;
            let replacement_cost = raw_cost * cond_mult * age_mult;
            let annual_reserve = if lifespan > 0.0 {
                replacement_cost / lifespan
            } else {
                0.0
            };
            total_annual += annual_reserve;
            components.push(ComponentReserve {
                name: comp.name,
                replacement_cost,
                lifespan_years: lifespan,
                annual_reserve,
                monthly_reserve: annual_reserve / 12.0,
            });
        }

        let percent_of_value = if price > 0.0 {
            total_annual / price * 100.0
        } else {
            0.0
        };
        CapexEstimate {
            monthly: total_annual / 12.0,
            annual: total_annual,
            percent_of_value,
            breakdown: Some(CapexBreakdown {
                components,
                total_annual,
                total_monthly: total_annual / 12.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_price_is_flat() {
        let est = PercentOfPrice { percent: 1.0 }.reserve(465_000.0, None, 90, Condition::Poor);
        assert!((est.annual - 4650.0).abs() < 1e-9);
        assert!((est.monthly - 387.5).abs() < 1e-9);
        assert!(est.breakdown.is_none());
    }

    #[test]
    fn worse_condition_never_lowers_the_reserve() {
        let order = [
            Condition::Excellent,
            Condition::Good,
            Condition::Fair,
            Condition::Poor,
        ];
        let mut last = 0.0;
        for cond in order {
            let est = ComponentSchedule.reserve(465_000.0, Some(1650.0), 20, cond);
            assert!(
                est.monthly > last,
                "{cond} reserve {} not above {last}",
                est.monthly
            );
            last = est.monthly;
        }
    }

    #[test]
    fn older_property_never_lowers_the_reserve() {
        let mut last = 0.0;
        for age in [3, 10, 20, 40, 70] {
            let est = ComponentSchedule.reserve(465_000.0, Some(1650.0), age, Condition::Good);
            assert!(est.monthly > last);
            last = est.monthly;
        }
    }

    #[test]
    fn missing_sqft_keeps_base_costs_only() {
        let est = ComponentSchedule.reserve(465_000.0, None, 20, Condition::Good);
        let breakdown = est.breakdown.unwrap();
        let roof = breakdown.components.iter().find(|c| c.name == "roof").unwrap();
        let hvac = breakdown.components.iter().find(|c| c.name == "hvac").unwrap();
        assert_eq!(roof.replacement_cost, 0.0);
        // hvac keeps its base cost: 4500 * 1.0 * 1.1.
        assert!((hvac.replacement_cost - 4950.0).abs() < 1e-9);
        assert!(est.monthly > 0.0);
    }

    #[test]
    fn good_condition_at_mid_age_matches_hand_math() {
        // water_heater: base 900, lifespan 10, good/age 20 -> cost 990, annual 99.
        let est = ComponentSchedule.reserve(100_000.0, Some(1000.0), 20, Condition::Good);
        let wh = est
            .breakdown
            .unwrap()
            .components
            .into_iter()
            .find(|c| c.name == "water_heater")
            .unwrap();
        assert!((wh.replacement_cost - 990.0).abs() < 1e-9);
        assert!((wh.lifespan_years - 10.0).abs() < 1e-9);
        assert!((wh.annual_reserve - 99.0).abs() < 1e-9);
    }
}
