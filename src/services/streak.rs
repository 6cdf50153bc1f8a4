use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

/// `completed` holds the days a habit was completed, newest first.
pub fn compute(completed: &[NaiveDate], today: NaiveDate) -> Streak {
    if completed.is_empty() {
        return Streak::default();
    }

    let days: HashSet<NaiveDate> = completed.iter().copied().collect();
    let mut current = 0u32;
    let mut expected = today;
    while days.contains(&expected) {
        current += 1;
        expected -= Duration::days(1);
    }

    let mut best = 0u32;
    let mut run = 1u32;
    for pair in completed.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
        } else {
            best = best.max(run);
            run = 1;
        }
    }
    best = best.max(run);

    Streak { current, best }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn ago(days: i64) -> NaiveDate {
        today() - Duration::days(days)
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(compute(&[], today()), Streak { current: 0, best: 0 });
    }

    #[test]
    fn test_three_day_run_ending_today() {
        let s = compute(&[ago(0), ago(1), ago(2)], today());
        assert_eq!(s, Streak { current: 3, best: 3 });
    }

    #[test]
    fn test_gap_yesterday_breaks_current() {
        let s = compute(&[ago(2), ago(3)], today());
        assert_eq!(s, Streak { current: 0, best: 2 });
    }

    #[test]
    fn test_single_day() {
        assert_eq!(compute(&[ago(0)], today()), Streak { current: 1, best: 1 });
        assert_eq!(compute(&[ago(4)], today()), Streak { current: 0, best: 1 });
    }

    #[test]
    fn test_best_run_in_the_middle() {
        let dates = [ago(0), ago(5), ago(6), ago(7), ago(8), ago(20), ago(21)];
        assert_eq!(compute(&dates, today()), Streak { current: 1, best: 4 });
    }

    #[test]
    fn test_final_run_counts_toward_best() {
        let dates = [ago(1), ago(10), ago(11), ago(12)];
        assert_eq!(compute(&dates, today()), Streak { current: 0, best: 3 });
    }
}
