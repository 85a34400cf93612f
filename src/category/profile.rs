//! Category profiles: growth bounds and seasonal regimes per commodity class.
//!
//! The table is immutable once built. The binary loads it once at start-up
//! (built-in values, or a JSON file) and passes it by reference into every
//! forecast.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Category;
use crate::error::ForecastError;

/// Peak or harvest month selector.
///
/// Vegetables key their months by commodity; every other category uses one set
/// for all of its members. In JSON a list maps to `Flat` and an object to
/// `PerCommodity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeasonalMonths {
    Flat(BTreeSet<u32>),
    PerCommodity(BTreeMap<String, BTreeSet<u32>>),
}

impl SeasonalMonths {
    fn flat(months: &[u32]) -> Self {
        SeasonalMonths::Flat(months.iter().copied().collect())
    }

    /// Months for a concrete commodity (lower-case name).
    ///
    /// A commodity missing from a `PerCommodity` map has no seasonal months.
    pub fn months_for(&self, commodity: &str) -> BTreeSet<u32> {
        match self {
            SeasonalMonths::Flat(set) => set.clone(),
            SeasonalMonths::PerCommodity(map) => map.get(commodity).cloned().unwrap_or_default(),
        }
    }

    fn all_months(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            SeasonalMonths::Flat(set) => Box::new(set.iter().copied()),
            SeasonalMonths::PerCommodity(map) => Box::new(map.values().flat_map(|s| s.iter().copied())),
        }
    }
}

/// Parameter bundle for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryProfile {
    /// Lower clamp on the compound annual growth rate.
    pub min_growth: f64,
    /// Upper clamp on the compound annual growth rate.
    pub max_growth: f64,
    /// Bounds of the per-month random multiplier.
    pub volatility_range: (f64, f64),
    pub peak_months: Option<SeasonalMonths>,
    pub harvest_months: Option<SeasonalMonths>,
    pub peak_factor: f64,
    pub harvest_factor: f64,
    /// Floor for monthly values, as a fraction of the last actual price.
    pub min_threshold: f64,
}

impl CategoryProfile {
    fn validate(&self, category: Category) -> Result<(), ForecastError> {
        let bad = |what: &str| ForecastError::Config(format!("{category}: {what}"));

        let finite = [
            self.min_growth,
            self.max_growth,
            self.volatility_range.0,
            self.volatility_range.1,
            self.peak_factor,
            self.harvest_factor,
            self.min_threshold,
        ];
        if !finite.iter().all(|v| v.is_finite()) {
            return Err(bad("all numeric parameters must be finite"));
        }
        if self.min_growth > self.max_growth {
            return Err(bad("min_growth must be <= max_growth"));
        }
        let (lo, hi) = self.volatility_range;
        if !(lo > 0.0 && lo <= hi) {
            return Err(bad("volatility_range must satisfy 0 < lo <= hi"));
        }
        if self.peak_factor <= 0.0 || self.harvest_factor <= 0.0 {
            return Err(bad("peak_factor and harvest_factor must be > 0"));
        }
        if self.min_threshold < 0.0 {
            return Err(bad("min_threshold must be >= 0"));
        }
        for months in [&self.peak_months, &self.harvest_months].into_iter().flatten() {
            if let Some(m) = months.all_months().find(|m| !(1..=12).contains(m)) {
                return Err(bad(&format!("month {m} is outside 1..=12")));
            }
        }
        Ok(())
    }
}

/// The five category profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileTable {
    vegetables: CategoryProfile,
    pulses: CategoryProfile,
    oils: CategoryProfile,
    cereals: CategoryProfile,
    others: CategoryProfile,
}

impl ProfileTable {
    /// Built-in parameters.
    pub fn builtin() -> Self {
        let per_commodity = |entries: &[(&str, [u32; 3])]| {
            SeasonalMonths::PerCommodity(
                entries
                    .iter()
                    .map(|(name, months)| (name.to_string(), months.iter().copied().collect()))
                    .collect(),
            )
        };

        Self {
            vegetables: CategoryProfile {
                min_growth: 0.08,
                max_growth: 0.25,
                volatility_range: (0.85, 1.15),
                peak_months: Some(per_commodity(&[
                    ("onion", [7, 8, 9]),
                    ("potato", [11, 12, 1]),
                    ("tomato", [6, 7, 8]),
                ])),
                harvest_months: Some(per_commodity(&[
                    ("onion", [1, 2, 3]),
                    ("potato", [2, 3, 4]),
                    ("tomato", [2, 3, 4]),
                ])),
                peak_factor: 1.4,
                harvest_factor: 0.9,
                min_threshold: 0.9,
            },
            pulses: CategoryProfile {
                min_growth: 0.06,
                max_growth: 0.18,
                volatility_range: (0.95, 1.08),
                peak_months: Some(SeasonalMonths::flat(&[10, 11, 12])),
                harvest_months: Some(SeasonalMonths::flat(&[2, 3, 4])),
                peak_factor: 1.2,
                harvest_factor: 0.95,
                min_threshold: 0.95,
            },
            oils: CategoryProfile {
                min_growth: 0.05,
                max_growth: 0.15,
                volatility_range: (0.97, 1.06),
                peak_months: Some(SeasonalMonths::flat(&[11, 12, 1])),
                harvest_months: Some(SeasonalMonths::flat(&[3, 4, 5])),
                peak_factor: 1.15,
                harvest_factor: 0.95,
                min_threshold: 0.97,
            },
            cereals: CategoryProfile {
                min_growth: 0.04,
                max_growth: 0.12,
                volatility_range: (0.98, 1.05),
                peak_months: Some(SeasonalMonths::flat(&[8, 9, 10])),
                harvest_months: Some(SeasonalMonths::flat(&[3, 4, 5])),
                peak_factor: 1.1,
                harvest_factor: 0.97,
                min_threshold: 0.98,
            },
            others: CategoryProfile {
                min_growth: 0.03,
                max_growth: 0.10,
                volatility_range: (0.99, 1.02),
                peak_months: Some(SeasonalMonths::flat(&[11, 12, 1])),
                harvest_months: None,
                peak_factor: 1.05,
                harvest_factor: 1.0,
                min_threshold: 0.99,
            },
        }
    }

    /// Parse and validate a JSON profile table.
    pub fn from_json_str(s: &str) -> Result<Self, ForecastError> {
        let table: ProfileTable =
            serde_json::from_str(s).map_err(|e| ForecastError::Config(format!("Invalid profile JSON: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    /// Read a JSON profile table from disk.
    pub fn from_json_path(path: &Path) -> Result<Self, ForecastError> {
        let text = fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("Failed to read profile file '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ForecastError> {
        serde_json::to_string_pretty(self).map_err(|e| ForecastError::Config(format!("Profile JSON encode: {e}")))
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        for category in Category::ALL {
            self.get(category).validate(category)?;
        }
        Ok(())
    }

    pub fn get(&self, category: Category) -> &CategoryProfile {
        match category {
            Category::Vegetables => &self.vegetables,
            Category::Pulses => &self.pulses,
            Category::Oils => &self.oils,
            Category::Cereals => &self.cereals,
            Category::Others => &self.others,
        }
    }

    /// Resolve the seasonal regime of one commodity.
    pub fn regime(&self, category: Category, commodity: &str) -> SeasonalRegime {
        let profile = self.get(category);
        let key = commodity.to_lowercase();
        let months = |m: &Option<SeasonalMonths>| m.as_ref().map(|m| m.months_for(&key)).unwrap_or_default();

        let regime = SeasonalRegime {
            peak: months(&profile.peak_months),
            harvest: months(&profile.harvest_months),
            peak_factor: profile.peak_factor,
            harvest_factor: profile.harvest_factor,
        };
        if regime.peak.is_empty() && regime.harvest.is_empty() {
            tracing::warn!(commodity, %category, "no seasonal months configured; seasonal factor stays 1.0");
        }
        regime
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Peak/harvest months and factors for one concrete commodity.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalRegime {
    pub peak: BTreeSet<u32>,
    pub harvest: BTreeSet<u32>,
    pub peak_factor: f64,
    pub harvest_factor: f64,
}

impl SeasonalRegime {
    pub fn is_peak(&self, month: u32) -> bool {
        self.peak.contains(&month)
    }

    pub fn is_harvest(&self, month: u32) -> bool {
        self.harvest.contains(&month)
    }

    /// Harvest discount, never below zero however volatile the history.
    fn harvest_discount(&self, volatility: f64) -> f64 {
        (self.harvest_factor - 0.2 * volatility).max(0.0)
    }

    /// Factor applied to a yearly step. Peak wins over harvest.
    pub fn yearly_factor(&self, month: u32, volatility: f64) -> f64 {
        if self.is_peak(month) {
            self.peak_factor + 0.8 * volatility
        } else if self.is_harvest(month) {
            self.harvest_discount(volatility)
        } else {
            1.0
        }
    }

    /// Factor applied to a monthly value. Peak and harvest multiply if a month is in both.
    pub fn monthly_factor(&self, month: u32, volatility: f64) -> f64 {
        let mut factor = 1.0;
        if self.is_peak(month) {
            factor *= self.peak_factor + volatility;
        }
        if self.is_harvest(month) {
            factor *= self.harvest_discount(volatility);
        }
        factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn builtin_table_is_valid() {
        ProfileTable::builtin().validate().unwrap();
    }

    #[test]
    fn vegetables_resolve_months_per_commodity() {
        let table = ProfileTable::builtin();
        let onion = table.regime(Category::Vegetables, "Onion");
        assert_eq!(onion.peak, BTreeSet::from([7, 8, 9]));
        assert_eq!(onion.harvest, BTreeSet::from([1, 2, 3]));

        let potato = table.regime(Category::Vegetables, "POTATO");
        assert_eq!(potato.peak, BTreeSet::from([11, 12, 1]));
    }

    #[test]
    fn others_have_no_harvest_months() {
        let table = ProfileTable::builtin();
        let sugar = table.regime(Category::Others, "sugar");
        assert!(sugar.harvest.is_empty());
        assert_eq!(sugar.monthly_factor(3, 0.1), 1.0);
        assert_relative_eq!(sugar.yearly_factor(12, 0.1), 1.05 + 0.08, epsilon = 1e-12);
    }

    #[test]
    fn onion_peak_month_uses_peak_factor() {
        let regime = ProfileTable::builtin().regime(Category::Vegetables, "Onion");
        let vol = 0.2;
        assert_relative_eq!(regime.yearly_factor(8, vol), 1.4 + 0.8 * vol, epsilon = 1e-12);
        assert_relative_eq!(regime.yearly_factor(2, vol), 0.9 - 0.2 * vol, epsilon = 1e-12);
        assert_eq!(regime.yearly_factor(5, vol), 1.0);
        assert_relative_eq!(regime.monthly_factor(8, vol), 1.4 + vol, epsilon = 1e-12);
        assert_eq!(regime.yearly_factor(2, 6.0), 0.0);
        assert_eq!(regime.monthly_factor(2, 6.0), 0.0);
    }

    #[test]
    fn json_round_trip_keeps_variants() {
        let table = ProfileTable::builtin();
        let json = table.to_json_pretty().unwrap();
        let back = ProfileTable::from_json_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn json_rejects_out_of_range_month() {
        let mut table = ProfileTable::builtin();
        table.cereals.peak_months = Some(SeasonalMonths::flat(&[13]));
        let json = serde_json::to_string(&table).unwrap();
        let err = ProfileTable::from_json_str(&json).unwrap_err();
        assert!(matches!(err, ForecastError::Config(msg) if msg.contains("cereals")));
    }

    #[test]
    fn json_rejects_inverted_growth_bounds() {
        let mut table = ProfileTable::builtin();
        table.oils.min_growth = 0.5;
        let json = serde_json::to_string(&table).unwrap();
        assert!(ProfileTable::from_json_str(&json).is_err());
    }
}
