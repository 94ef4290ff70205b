//! Dual trust policy for the season label.
//!
//! GREEN when a January fact labelled "Summer" is reported as Winter in the
//! monthly view (season derived from the month) while the department and
//! summary views bucket it under Summer (label trusted as given).

use rta_seasonal::{analyze, RawSeasonalFact, Season, SeasonalMetrics};

fn mislabelled_january() -> RawSeasonalFact {
    RawSeasonalFact {
        month: 1,
        department: "Seafood".to_string(),
        total_spend: 64.0,
        basket_count: 4,
        transaction_count: 8,
        avg_spend: 8.0,
        season: Season::Summer,
    }
}

#[test]
fn monthly_view_derives_season_from_month() {
    let a = analyze(&[mislabelled_january()]);
    let jan = &a.monthly_trends[0];
    assert_eq!(jan.month, 1);
    assert_eq!(jan.season, Season::Winter);
    assert_eq!(jan.metrics.total_spend, 64.0);
}

#[test]
fn department_and_summary_views_trust_the_label() {
    let a = analyze(&[mislabelled_january()]);

    assert_eq!(a.seasonal_summary.summer.total_spend, 64.0);
    assert_eq!(a.seasonal_summary.winter, SeasonalMetrics::empty());

    let d = &a.department_trends[0];
    assert_eq!(d.metrics.get(Season::Summer).transaction_count, 8);
    assert_eq!(*d.metrics.get(Season::Winter), SeasonalMetrics::empty());
}

#[test]
fn serialized_views_show_the_asymmetry() {
    let v = serde_json::to_value(analyze(&[mislabelled_january()])).unwrap();
    assert_eq!(v["monthlyTrends"][0]["season"], "Winter");
    assert_eq!(v["seasonalSummary"]["Summer"]["totalSpend"], 64.0);
    assert_eq!(v["departmentTrends"][0]["metrics"]["Summer"]["averageSpend"], 8.0);
}
