use super::views::AgeingBucketView;
use crate::workflows::cases::Case;
use crate::workflows::triage::thresholds::AGEING_BUCKET_UPPER_BOUNDS;

/// Overdue-day band. Bands cover every non-negative day count without overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeingBucket {
    Current,
    Late,
    Delinquent,
    Severe,
}

impl AgeingBucket {
    pub const fn ordered() -> [Self; 4] {
        [Self::Current, Self::Late, Self::Delinquent, Self::Severe]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "0-30 days",
            Self::Late => "31-60 days",
            Self::Delinquent => "61-90 days",
            Self::Severe => "90+ days",
        }
    }

    pub fn for_overdue_days(overdue_days: u32) -> Self {
        let [current, late, delinquent] = AGEING_BUCKET_UPPER_BOUNDS;
        if overdue_days <= current {
            Self::Current
        } else if overdue_days <= late {
            Self::Late
        } else if overdue_days <= delinquent {
            Self::Delinquent
        } else {
            Self::Severe
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Late => 1,
            Self::Delinquent => 2,
            Self::Severe => 3,
        }
    }
}

/// Count and outstanding amount per band, always all four bands in order.
pub fn ageing_buckets(cases: &[Case]) -> Vec<AgeingBucketView> {
    let mut totals = [(0usize, 0.0f64); 4];
    for case in cases {
        let slot = &mut totals[AgeingBucket::for_overdue_days(case.overdue_days).index()];
        slot.0 += 1;
        slot.1 += case.amount;
    }

    AgeingBucket::ordered()
        .into_iter()
        .map(|bucket| {
            let (count, amount) = totals[bucket.index()];
            AgeingBucketView {
                label: bucket.label(),
                count,
                amount,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges_are_inclusive_upper_bounds() {
        assert_eq!(AgeingBucket::for_overdue_days(0), AgeingBucket::Current);
        assert_eq!(AgeingBucket::for_overdue_days(30), AgeingBucket::Current);
        assert_eq!(AgeingBucket::for_overdue_days(31), AgeingBucket::Late);
        assert_eq!(AgeingBucket::for_overdue_days(60), AgeingBucket::Late);
        assert_eq!(AgeingBucket::for_overdue_days(61), AgeingBucket::Delinquent);
        assert_eq!(AgeingBucket::for_overdue_days(90), AgeingBucket::Delinquent);
        assert_eq!(AgeingBucket::for_overdue_days(91), AgeingBucket::Severe);
        assert_eq!(AgeingBucket::for_overdue_days(u32::MAX), AgeingBucket::Severe);
    }

    #[test]
    fn empty_portfolio_still_lists_every_band() {
        let buckets = ageing_buckets(&[]);
        let labels: Vec<_> = buckets.iter().map(|bucket| bucket.label).collect();
        assert_eq!(labels, ["0-30 days", "31-60 days", "61-90 days", "90+ days"]);
        assert!(buckets.iter().all(|bucket| bucket.count == 0 && bucket.amount == 0.0));
    }
}
