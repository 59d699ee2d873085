use chrono::{Datelike, NaiveDate};

use super::views::RecoveryTrendPoint;
use crate::workflows::cases::Case;
use crate::workflows::round_to;

/// Calendar month used as a trend bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// The month containing `date`, shifted `back` months into the past.
    pub fn containing(date: NaiveDate, back: u32) -> Option<Self> {
        let index = i64::from(date.year()) * 12 + i64::from(date.month0()) - i64::from(back);
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            start,
            end: next.pred_opt()?,
        })
    }

    /// Open during the month: created by its last day, not resolved before its first.
    pub fn is_active(&self, case: &Case) -> bool {
        case.created_at.date_naive() <= self.end
            && case
                .resolved_at
                .map_or(true, |resolved| resolved.date_naive() >= self.start)
    }

    pub fn is_recovered(&self, case: &Case) -> bool {
        case.resolved_at.is_some_and(|resolved| {
            let day = resolved.date_naive();
            day >= self.start && day <= self.end
        })
    }

    pub fn rate(&self, cases: &[Case]) -> f64 {
        let (active, recovered) = cases
            .iter()
            .filter(|case| self.is_active(case))
            .fold((0usize, 0usize), |(active, recovered), case| {
                (active + 1, recovered + usize::from(self.is_recovered(case)))
            });
        if active == 0 {
            return 0.0;
        }
        round_to(recovered as f64 / active as f64 * 100.0, 1)
    }
}

/// Monthly recovery rate for the `months` calendar months ending with the month
/// of `as_of`, oldest first.
pub fn recovery_trend(cases: &[Case], as_of: NaiveDate, months: u32) -> Vec<RecoveryTrendPoint> {
    (0..months)
        .rev()
        .filter_map(|back| MonthWindow::containing(as_of, back))
        .map(|window| RecoveryTrendPoint {
            month: window.start.format("%b").to_string(),
            period: window.start.format("%Y-%m").to_string(),
            rate: window.rate(cases),
        })
        .collect()
}
