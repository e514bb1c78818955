//! Worked metric scenarios: small hand-checked histories with exact expectations.

use chrono::NaiveDate;
use divlab_core::{compute_metrics, DividendEvent, PayoutFrequency, SymbolRecord};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ev(y: i32, m: u32, day: u32, amount: f64) -> DividendEvent {
    DividendEvent::new(d(y, m, day), amount)
}

#[test]
fn four_quarterly_payments() {
    let record = SymbolRecord::new(
        "QTR",
        Some(40.0),
        vec![
            ev(2023, 1, 15, 0.50),
            ev(2023, 4, 15, 0.50),
            ev(2023, 7, 15, 0.50),
            ev(2023, 10, 15, 0.50),
        ],
    );
    let m = compute_metrics(&record, d(2024, 1, 1)).unwrap();
    assert_eq!(m.inferred_frequency, PayoutFrequency::Quarterly);
    assert!((m.ttm_dividend - 2.0).abs() < 1e-9);
    assert!((m.forward_annual_dividend - 2.0).abs() < 1e-9);
    assert!((m.forward_yield.unwrap() - 0.05).abs() < 1e-9);
}

#[test]
fn single_payment_is_irregular_with_ttm_fallback() {
    let record = SymbolRecord::new("ONCE", Some(100.0), vec![ev(2023, 6, 1, 5.0)]);
    let m = compute_metrics(&record, d(2023, 12, 1)).unwrap();
    assert_eq!(m.inferred_frequency, PayoutFrequency::Irregular);
    assert!((m.ttm_dividend - 5.0).abs() < 1e-9);
    assert!((m.forward_annual_dividend - 5.0).abs() < 1e-9);
    assert_eq!(m.next_ex_date, None);
}

#[test]
fn no_payments_is_unknown_regardless_of_price() {
    for price in [None, Some(0.0), Some(25.0)] {
        let record = SymbolRecord::new("NONE", price, Vec::new());
        let m = compute_metrics(&record, d(2024, 1, 1)).unwrap();
        assert_eq!(m.inferred_frequency, PayoutFrequency::Unknown);
        assert_eq!(m.ttm_dividend, 0.0);
        assert_eq!(m.forward_annual_dividend, 0.0);
        assert_eq!(m.forward_yield, None);
        assert_eq!(m.dividend_count, 0);
    }
}

#[test]
fn two_payments_classify_from_single_gap() {
    let record = SymbolRecord::new(
        "TWO",
        None,
        vec![ev(2023, 8, 10, 0.3), ev(2023, 11, 10, 0.3)],
    );
    let m = compute_metrics(&record, d(2024, 1, 1)).unwrap();
    assert_eq!(m.inferred_frequency, PayoutFrequency::Quarterly);
    assert!((m.forward_annual_dividend - 1.2).abs() < 1e-9);
    // 2023-11-10 + 91 days
    assert_eq!(m.next_ex_date, Some(d(2024, 2, 9)));
}

#[test]
fn same_day_rows_are_merged_before_counting() {
    // A special dividend booked on the regular ex-date.
    let record = SymbolRecord::new(
        "DUP",
        Some(50.0),
        vec![
            ev(2023, 1, 15, 0.5),
            ev(2023, 4, 15, 0.5),
            ev(2023, 7, 15, 0.5),
            ev(2023, 10, 15, 0.5),
            ev(2023, 10, 15, 1.0),
        ],
    );
    let m = compute_metrics(&record, d(2024, 1, 1)).unwrap();
    assert_eq!(m.dividend_count, 4);
    assert_eq!(m.ttm_payment_count, 4);
    assert_eq!(m.inferred_frequency, PayoutFrequency::Quarterly);
    assert!((m.ttm_dividend - 3.0).abs() < 1e-9);
    assert_eq!(m.last_amount, Some(1.5));
    assert!((m.forward_annual_dividend - 6.0).abs() < 1e-9);
}

#[test]
fn cadence_change_is_irregular() {
    // Annual payer switching to quarterly: one long gap breaks tolerance.
    let record = SymbolRecord::new(
        "SWITCH",
        Some(20.0),
        vec![
            ev(2022, 1, 10, 1.0),
            ev(2023, 1, 10, 0.25),
            ev(2023, 4, 10, 0.25),
            ev(2023, 7, 10, 0.25),
            ev(2023, 10, 10, 0.25),
        ],
    );
    let m = compute_metrics(&record, d(2024, 1, 1)).unwrap();
    assert_eq!(m.inferred_frequency, PayoutFrequency::Irregular);
    assert!((m.forward_annual_dividend - m.ttm_dividend).abs() < 1e-12);
    assert!((m.ttm_dividend - 1.0).abs() < 1e-9);
}

#[test]
fn ttm_window_is_inclusive_at_both_ends() {
    let record = SymbolRecord::new(
        "EDGE",
        None,
        vec![
            ev(2022, 12, 31, 9.0),
            ev(2023, 1, 1, 1.0),
            ev(2024, 1, 1, 2.0),
        ],
    );
    let m = compute_metrics(&record, d(2024, 1, 1)).unwrap();
    // 2024-01-01 - 365 days = 2023-01-01
    assert!((m.ttm_dividend - 3.0).abs() < 1e-9);
    assert_eq!(m.ttm_payment_count, 2);
}

#[test]
fn zero_amount_rows_are_dropped() {
    let record = SymbolRecord::new(
        "ZERO",
        None,
        vec![ev(2023, 3, 1, 0.0), ev(2023, 6, 1, 0.4)],
    );
    let m = compute_metrics(&record, d(2024, 1, 1)).unwrap();
    assert_eq!(m.dividend_count, 1);
    assert_eq!(m.inferred_frequency, PayoutFrequency::Irregular);
}
