//! Weighted averages and zero-division guard.
//!
//! GREEN when:
//! - April with spend {100, 50} over transactions {4, 1} averages 150/5 = 30,
//!   not (25 + 50) / 2 = 37.5
//! - any month, season or department with zero transactions averages 0,
//!   never NaN or infinity

use rta_seasonal::{analyze, DepartmentOrder, RawSeasonalFact, Season};

fn april(spend: f64, txns: u64, department: &str) -> RawSeasonalFact {
    RawSeasonalFact {
        month: 4,
        department: department.to_string(),
        total_spend: spend,
        basket_count: 1,
        transaction_count: txns,
        avg_spend: if txns > 0 { spend / txns as f64 } else { 0.0 },
        season: Season::Spring,
    }
}

#[test]
fn april_average_is_total_over_transactions() {
    let a = analyze(&[april(100.0, 4, "Grocery"), april(50.0, 1, "Produce")]);
    let apr = &a.monthly_trends[3];
    assert_eq!(apr.month_name, "April");
    assert!((apr.metrics.average_spend - 30.0).abs() < 1e-12);
    assert!((apr.metrics.average_spend - 37.5).abs() > 1.0);
    assert!((a.seasonal_summary.spring.average_spend - 30.0).abs() < 1e-12);
}

#[test]
fn zero_transaction_buckets_average_zero_everywhere() {
    let facts = [april(80.0, 0, "Pharma")];
    let a = analyze(&facts);

    assert_eq!(a.monthly_trends[3].metrics.total_spend, 80.0);
    assert_eq!(a.monthly_trends[3].metrics.average_spend, 0.0);
    assert_eq!(a.seasonal_summary.spring.average_spend, 0.0);
    assert_eq!(a.department_trends[0].metrics.spring.average_spend, 0.0);

    for m in &a.monthly_trends {
        assert!(m.metrics.average_spend.is_finite());
    }
    for (_, s) in a.seasonal_summary.iter() {
        assert!(s.average_spend.is_finite());
    }
}

#[test]
fn department_order_does_not_change_metrics() {
    let facts = [april(10.0, 2, "Zeta"), april(30.0, 3, "Alpha")];
    let first_seen = rta_seasonal::build_department_trends(&facts, DepartmentOrder::FirstSeen);
    let mut sorted = rta_seasonal::build_department_trends(&facts, DepartmentOrder::Sorted);
    assert_eq!(sorted[0].department, "Alpha");
    sorted.reverse();
    assert_eq!(first_seen, sorted);
}
