use crate::config::QuarterWindow;
use crate::model::UnitId;
use serde::Serialize;
use std::fmt;

/// Soll/Ist d'une unité sur une fenêtre (année, mois, trimestre).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deviation {
    pub unit: UnitId,
    pub target: usize,
    pub actual: usize,
    /// actual - target
    pub diff: i64,
}

impl Deviation {
    pub fn new(unit: UnitId, target: usize, actual: usize) -> Self {
        Self {
            unit,
            target,
            actual,
            diff: actual as i64 - target as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunCount {
    pub unit: UnitId,
    pub runs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreferenceHits {
    pub unit: UnitId,
    pub hits: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCell {
    pub month: YearMonth,
    pub unit: UnitId,
    pub actual: usize,
    pub hits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyQuota {
    pub month: YearMonth,
    pub working_days: usize,
    pub deviation: Deviation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterSkew {
    pub window: QuarterWindow,
    pub working_days: usize,
    pub rows: Vec<Deviation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCounts {
    pub unit: UnitId,
    /// Même ordre que `WeekdayDistribution::names`.
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayDistribution {
    pub names: Vec<String>,
    pub rows: Vec<WeekdayCounts>,
}
