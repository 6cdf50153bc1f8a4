//! Sums over completed diet entries for the analytics endpoints.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::day::DayRange;
use crate::models::diet_entry::DietEntry;
use crate::services::nutrition::{round_half_up, NutritionTargets};

pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTotals {
    pub fn add(&mut self, entry: &DietEntry) {
        self.calories += i64::from(entry.calories);
        self.protein += entry.protein;
        self.carbs += entry.carbs;
        self.fats += entry.fats;
    }
}

pub fn sum<'a>(entries: impl IntoIterator<Item = &'a DietEntry>) -> MacroTotals {
    entries.into_iter().fold(MacroTotals::default(), |mut acc, e| {
        acc.add(e);
        acc
    })
}

/// The seven days ending on `today`, inclusive.
pub fn week_ending(today: NaiveDate) -> DayRange {
    DayRange::new(today - Duration::days(WEEK_DAYS - 1), today)
}

/// The fixed 30-day window ending on `today`.
pub fn month_ending(today: NaiveDate) -> DayRange {
    DayRange::new(today - Duration::days(MONTH_DAYS), today)
}

#[derive(Debug, Serialize)]
pub struct RemainingTotals {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub consumed: MacroTotals,
    pub targets: NutritionTargets,
    pub remaining: RemainingTotals,
}

pub fn daily_summary(date: NaiveDate, entries: &[DietEntry], targets: NutritionTargets) -> DailySummary {
    let consumed = sum(entries.iter().filter(|e| e.date == date));
    DailySummary {
        date,
        remaining: RemainingTotals {
            calories: i64::from(targets.calories) - consumed.calories,
            protein: f64::from(targets.protein) - consumed.protein,
            carbs: f64::from(targets.carbs) - consumed.carbs,
            fats: f64::from(targets.fats) - consumed.fats,
        },
        consumed,
        targets,
    }
}

/// One bucket per day in `range`, zero-filled where nothing was eaten.
pub fn daily_series(range: DayRange, entries: &[DietEntry]) -> BTreeMap<NaiveDate, MacroTotals> {
    let mut series: BTreeMap<NaiveDate, MacroTotals> = range
        .start
        .iter_days()
        .take_while(|d| *d <= range.end)
        .map(|d| (d, MacroTotals::default()))
        .collect();
    for entry in entries {
        if let Some(bucket) = series.get_mut(&entry.date) {
            bucket.add(entry);
        }
    }
    series
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyAverage {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fats: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthlySummary {
    pub total: MacroTotals,
    pub average: DailyAverage,
    pub days: i64,
}

/// Averages over a fixed 30 days regardless of the calendar month.
pub fn monthly_summary(entries: &[DietEntry]) -> MonthlySummary {
    let total = sum(entries);
    let days = MONTH_DAYS as f64;
    MonthlySummary {
        average: DailyAverage {
            calories: round_half_up(total.calories as f64 / days) as i64,
            protein: round_half_up(total.protein / days) as i64,
            carbs: round_half_up(total.carbs / days) as i64,
            fats: round_half_up(total.fats / days) as i64,
        },
        total,
        days: MONTH_DAYS,
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MacroGrams {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MacroCalories {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub total: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MacroPercentages {
    pub protein: i64,
    pub carbs: i64,
    pub fats: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MacroBreakdown {
    pub grams: MacroGrams,
    pub calories: MacroCalories,
    pub percentages: MacroPercentages,
}

pub fn macro_breakdown(totals: &MacroTotals) -> MacroBreakdown {
    let protein = totals.protein * 4.0;
    let carbs = totals.carbs * 4.0;
    let fats = totals.fats * 9.0;
    let total = protein + carbs + fats;
    let share = |part: f64| {
        if total > 0.0 {
            round_half_up(part / total * 100.0) as i64
        } else {
            0
        }
    };
    MacroBreakdown {
        grams: MacroGrams {
            protein: totals.protein,
            carbs: totals.carbs,
            fats: totals.fats,
        },
        percentages: MacroPercentages {
            protein: share(protein),
            carbs: share(carbs),
            fats: share(fats),
        },
        calories: MacroCalories {
            protein,
            carbs,
            fats,
            total,
        },
    }
}
