use crate::error::KpiError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The universal industry tag. A KPI declaring it applies to every industry.
pub const ALL_INDUSTRIES: &str = "all";

// ---------------------------------------------------------------------------
// BusinessFunction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessFunction {
    Marketing,
    Sales,
    Delivery,
    People,
    Finance,
    Systems,
}

impl BusinessFunction {
    pub fn all() -> &'static [BusinessFunction] {
        &[
            BusinessFunction::Marketing,
            BusinessFunction::Sales,
            BusinessFunction::Delivery,
            BusinessFunction::People,
            BusinessFunction::Finance,
            BusinessFunction::Systems,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BusinessFunction::Marketing => "marketing",
            BusinessFunction::Sales => "sales",
            BusinessFunction::Delivery => "delivery",
            BusinessFunction::People => "people",
            BusinessFunction::Finance => "finance",
            BusinessFunction::Systems => "systems",
        }
    }
}

impl fmt::Display for BusinessFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BusinessFunction {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marketing" => Ok(BusinessFunction::Marketing),
            "sales" => Ok(BusinessFunction::Sales),
            "delivery" | "operations" => Ok(BusinessFunction::Delivery),
            "people" | "team" => Ok(BusinessFunction::People),
            "finance" | "profit" => Ok(BusinessFunction::Finance),
            "systems" => Ok(BusinessFunction::Systems),
            _ => Err(KpiError::UnknownFunction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Catalog priority. Ordered so that `Essential < Recommended < Advanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Essential,
    Recommended,
    Advanced,
}

impl Tier {
    pub fn all() -> &'static [Tier] {
        &[Tier::Essential, Tier::Recommended, Tier::Advanced]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Essential => "essential",
            Tier::Recommended => "recommended",
            Tier::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "essential" => Ok(Tier::Essential),
            "recommended" => Ok(Tier::Recommended),
            "advanced" => Ok(Tier::Advanced),
            _ => Err(KpiError::UnknownTier(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Currency,
    Percentage,
    Number,
    Days,
    Ratio,
    Score,
}

impl Unit {
    pub fn all() -> &'static [Unit] {
        &[
            Unit::Currency,
            Unit::Percentage,
            Unit::Number,
            Unit::Days,
            Unit::Ratio,
            Unit::Score,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Currency => "currency",
            Unit::Percentage => "percentage",
            Unit::Number => "number",
            Unit::Days => "days",
            Unit::Ratio => "ratio",
            Unit::Score => "score",
        }
    }

    /// Units whose year-over-year targets are checked for growth sanity.
    pub fn is_growth(self) -> bool {
        matches!(self, Unit::Currency | Unit::Number)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Unit {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "currency" => Ok(Unit::Currency),
            "percentage" | "percent" => Ok(Unit::Percentage),
            "number" | "count" => Ok(Unit::Number),
            "days" => Ok(Unit::Days),
            "ratio" => Ok(Unit::Ratio),
            "score" => Ok(Unit::Score),
            _ => Err(KpiError::UnknownUnit(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annually => "annually",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "annually" | "annual" | "yearly" => Ok(Frequency::Annually),
            _ => Err(KpiError::UnknownFrequency(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Revenue-based maturity bucket.
///
/// Bands (annual revenue): foundation < 250k, growth < 1M, scale < 5M,
/// mature otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Foundation,
    Growth,
    Scale,
    Mature,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[Stage::Foundation, Stage::Growth, Stage::Scale, Stage::Mature]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Foundation => "foundation",
            Stage::Growth => "growth",
            Stage::Scale => "scale",
            Stage::Mature => "mature",
        }
    }

    pub fn from_annual_revenue(revenue: f64) -> Stage {
        if revenue < 250_000.0 {
            Stage::Foundation
        } else if revenue < 1_000_000.0 {
            Stage::Growth
        } else if revenue < 5_000_000.0 {
            Stage::Scale
        } else {
            Stage::Mature
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "foundation" => Ok(Stage::Foundation),
            "growth" => Ok(Stage::Growth),
            "scale" => Ok(Stage::Scale),
            "mature" => Ok(Stage::Mature),
            _ => Err(KpiError::UnknownStage(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn unit_roundtrip() {
        for unit in Unit::all() {
            assert_eq!(Unit::from_str(unit.as_str()).unwrap(), *unit);
        }
    }

    #[test]
    fn unit_aliases_and_case() {
        assert_eq!(Unit::from_str("Percent").unwrap(), Unit::Percentage);
        assert_eq!(Unit::from_str(" CURRENCY ").unwrap(), Unit::Currency);
        assert_eq!(Unit::from_str("count").unwrap(), Unit::Number);
    }

    #[test]
    fn unknown_unit_is_error() {
        let err = Unit::from_str("furlongs").unwrap_err();
        assert!(matches!(err, KpiError::UnknownUnit(ref u) if u == "furlongs"));
    }

    #[test]
    fn growth_units() {
        assert!(Unit::Currency.is_growth());
        assert!(Unit::Number.is_growth());
        assert!(!Unit::Percentage.is_growth());
        assert!(!Unit::Days.is_growth());
    }

    #[test]
    fn function_roundtrip() {
        for f in BusinessFunction::all() {
            assert_eq!(BusinessFunction::from_str(f.as_str()).unwrap(), *f);
        }
        assert!(BusinessFunction::from_str("astrology").is_err());
    }

    #[test]
    fn tier_ordering() {
        assert!(Tier::Essential < Tier::Recommended);
        assert!(Tier::Recommended < Tier::Advanced);
    }

    #[test]
    fn stage_from_revenue_bands() {
        assert_eq!(Stage::from_annual_revenue(0.0), Stage::Foundation);
        assert_eq!(Stage::from_annual_revenue(249_999.0), Stage::Foundation);
        assert_eq!(Stage::from_annual_revenue(250_000.0), Stage::Growth);
        assert_eq!(Stage::from_annual_revenue(1_000_000.0), Stage::Scale);
        assert_eq!(Stage::from_annual_revenue(5_000_000.0), Stage::Mature);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Frequency::Quarterly).unwrap();
        assert_eq!(json, "\"quarterly\"");
        let stage: Stage = serde_yaml::from_str("scale").unwrap();
        assert_eq!(stage, Stage::Scale);
    }
}
