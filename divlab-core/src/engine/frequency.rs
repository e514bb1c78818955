//! Payout-frequency classification from ex-date spacing.
//!
//! The classifier looks at the gaps between consecutive ex-dates over the
//! trailing [`CLASSIFICATION_WINDOW`] events, picks a band from the median
//! gap, then requires every gap to sit within [`GAP_TOLERANCE`] of that
//! band's center. Anything else is irregular.

use crate::data::canonicalize::{canonicalize_events, is_canonical};
use crate::domain::{DividendEvent, PayoutFrequency};

/// Number of most recent events considered.
pub const CLASSIFICATION_WINDOW: usize = 8;

/// Maximum relative deviation of any gap from the band center.
pub const GAP_TOLERANCE: f64 = 0.20;

/// One regular cadence and its accepted gap range in days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    pub frequency: PayoutFrequency,
    pub min_days: f64,
    pub max_days: f64,
}

impl FrequencyBand {
    pub fn center(&self) -> f64 {
        (self.min_days + self.max_days) / 2.0
    }

    pub fn contains(&self, gap: f64) -> bool {
        gap >= self.min_days && gap <= self.max_days
    }

    /// True if `gap` is within `tolerance` (relative) of the band center.
    pub fn within_tolerance(&self, gap: f64, tolerance: f64) -> bool {
        let center = self.center();
        (gap - center).abs() <= tolerance * center + 1e-9
    }
}

/// Ordered band table, shortest cadence first.
pub const FREQUENCY_BANDS: [FrequencyBand; 4] = [
    FrequencyBand {
        frequency: PayoutFrequency::Monthly,
        min_days: 28.0,
        max_days: 35.0,
    },
    FrequencyBand {
        frequency: PayoutFrequency::Quarterly,
        min_days: 80.0,
        max_days: 100.0,
    },
    FrequencyBand {
        frequency: PayoutFrequency::SemiAnnual,
        min_days: 170.0,
        max_days: 190.0,
    },
    FrequencyBand {
        frequency: PayoutFrequency::Annual,
        min_days: 350.0,
        max_days: 380.0,
    },
];

/// Band for a gap: the band containing it, otherwise the band with the
/// closest center. Exact ties go to the earlier (shorter) band.
pub fn nearest_band(gap: f64) -> &'static FrequencyBand {
    if let Some(band) = FREQUENCY_BANDS.iter().find(|b| b.contains(gap)) {
        return band;
    }
    let mut best = &FREQUENCY_BANDS[0];
    let mut best_dist = (gap - best.center()).abs();
    for band in &FREQUENCY_BANDS[1..] {
        let dist = (gap - band.center()).abs();
        if dist < best_dist {
            best = band;
            best_dist = dist;
        }
    }
    best
}

/// Day gaps between consecutive ex-dates over the trailing window.
///
/// `events` must be ascending; the result has `min(len, WINDOW) - 1` entries.
pub fn ex_date_gaps(events: &[DividendEvent]) -> Vec<i64> {
    let start = events.len().saturating_sub(CLASSIFICATION_WINDOW);
    events[start..]
        .windows(2)
        .map(|w| (w[1].ex_date - w[0].ex_date).num_days())
        .collect()
}

/// Median of a slice; mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Classify the payout cadence of an event history.
///
/// - no events → `Unknown`
/// - one event → `Irregular`
/// - otherwise the median-gap band, or `Irregular` if the median or any gap
///   deviates more than ±20 % from that band's center
///
/// Unsorted input is canonicalized first, so the result never depends on
/// the order the caller happened to supply.
pub fn classify_frequency(events: &[DividendEvent]) -> PayoutFrequency {
    if !is_canonical(events) {
        return classify_canonical(&canonicalize_events(events.to_vec()));
    }
    classify_canonical(events)
}

fn classify_canonical(events: &[DividendEvent]) -> PayoutFrequency {
    match events.len() {
        0 => return PayoutFrequency::Unknown,
        1 => return PayoutFrequency::Irregular,
        _ => {}
    }

    let gaps: Vec<f64> = ex_date_gaps(events).into_iter().map(|g| g as f64).collect();
    let Some(median_gap) = median(&gaps) else {
        return PayoutFrequency::Irregular;
    };

    let band = nearest_band(median_gap);
    let consistent = band.within_tolerance(median_gap, GAP_TOLERANCE)
        && gaps.iter().all(|&g| band.within_tolerance(g, GAP_TOLERANCE));

    if consistent {
        band.frequency
    } else {
        PayoutFrequency::Irregular
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(start: NaiveDate, gaps: &[i64]) -> Vec<DividendEvent> {
        let mut date = start;
        let mut events = vec![DividendEvent::new(date, 1.0)];
        for g in gaps {
            date += Duration::days(*g);
            events.push(DividendEvent::new(date, 1.0));
        }
        events
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()
    }

    #[test]
    fn band_centers() {
        let centers: Vec<f64> = FREQUENCY_BANDS.iter().map(|b| b.center()).collect();
        assert_eq!(centers, vec![31.5, 90.0, 180.0, 365.0]);
    }

    #[test]
    fn empty_is_unknown() {
        assert_eq!(classify_frequency(&[]), PayoutFrequency::Unknown);
    }

    #[test]
    fn single_event_is_irregular() {
        assert_eq!(classify_frequency(&series(start(), &[])), PayoutFrequency::Irregular);
    }

    #[test]
    fn monthly_series() {
        let events = series(start(), &[31, 29, 31, 30, 31, 30, 31, 31, 30]);
        assert_eq!(classify_frequency(&events), PayoutFrequency::Monthly);
    }

    #[test]
    fn quarterly_series() {
        let events = series(start(), &[90, 91, 92, 91, 89]);
        assert_eq!(classify_frequency(&events), PayoutFrequency::Quarterly);
    }

    #[test]
    fn semiannual_series() {
        let events = series(start(), &[182, 183, 181]);
        assert_eq!(classify_frequency(&events), PayoutFrequency::SemiAnnual);
    }

    #[test]
    fn annual_series() {
        let events = series(start(), &[365, 366, 364, 365]);
        assert_eq!(classify_frequency(&events), PayoutFrequency::Annual);
    }

    #[test]
    fn two_events_use_their_single_gap() {
        assert_eq!(classify_frequency(&series(start(), &[91])), PayoutFrequency::Quarterly);
        assert_eq!(classify_frequency(&series(start(), &[365])), PayoutFrequency::Annual);
        assert_eq!(classify_frequency(&series(start(), &[60])), PayoutFrequency::Irregular);
    }

    #[test]
    fn one_outlier_gap_makes_it_irregular() {
        // Median is quarterly but one gap is a half-year skip.
        let events = series(start(), &[91, 91, 182, 91, 91]);
        assert_eq!(classify_frequency(&events), PayoutFrequency::Irregular);
    }

    #[test]
    fn only_trailing_window_counts() {
        // Early annual history followed by eight quarterly payments.
        let mut gaps = vec![365, 365, 365];
        gaps.extend([91; 7]);
        let events = series(start(), &gaps);
        assert_eq!(ex_date_gaps(&events).len(), CLASSIFICATION_WINDOW - 1);
        assert_eq!(classify_frequency(&events), PayoutFrequency::Quarterly);
    }

    #[test]
    fn gap_between_bands_picks_closer_center() {
        // 130 days: quarterly center 90 (dist 40) vs semiannual 180 (dist 50).
        assert_eq!(nearest_band(130.0).frequency, PayoutFrequency::Quarterly);
        // 140 days: quarterly 50 vs semiannual 40.
        assert_eq!(nearest_band(140.0).frequency, PayoutFrequency::SemiAnnual);
        // Exactly equidistant goes to the shorter band.
        assert_eq!(nearest_band(135.0).frequency, PayoutFrequency::Quarterly);
    }

    #[test]
    fn gap_outside_band_but_within_tolerance_classifies() {
        // 105 days is outside 80-100 but within 20% of 90.
        assert_eq!(classify_frequency(&series(start(), &[105, 105])), PayoutFrequency::Quarterly);
        // 130 days is nearest quarterly but more than 20% away.
        assert_eq!(classify_frequency(&series(start(), &[130, 130])), PayoutFrequency::Irregular);
    }

    #[test]
    fn unsorted_input_is_canonicalized() {
        let mut events = series(start(), &[91, 91, 91]);
        events.reverse();
        assert_eq!(classify_frequency(&events), PayoutFrequency::Quarterly);
    }

    #[test]
    fn same_day_duplicates_do_not_create_zero_gaps() {
        let mut events = series(start(), &[91, 91, 91]);
        events.push(events[1]);
        assert_eq!(classify_frequency(&events), PayoutFrequency::Quarterly);
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn classification_is_deterministic() {
        let events = series(start(), &[88, 95, 91, 99, 84]);
        let first = classify_frequency(&events);
        for _ in 0..10 {
            assert_eq!(classify_frequency(&events), first);
        }
    }
}
