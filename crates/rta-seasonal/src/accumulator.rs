use crate::types::{RawSeasonalFact, SeasonalMetrics};

/// Running totals for one bucket.
///
/// The average is derived once in [`MetricsAccumulator::finish`], from the
/// summed totals, so it is always weighted by transaction count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsAccumulator {
    total_spend: f64,
    basket_count: u64,
    transaction_count: u64,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fact's totals in. `avg_spend` is ignored.
    pub fn add(&mut self, fact: &RawSeasonalFact) {
        self.add_totals(fact.total_spend, fact.basket_count, fact.transaction_count);
    }

    pub fn add_totals(&mut self, total_spend: f64, basket_count: u64, transaction_count: u64) {
        self.total_spend += total_spend;
        self.basket_count = self.basket_count.saturating_add(basket_count);
        self.transaction_count = self.transaction_count.saturating_add(transaction_count);
    }

    pub fn merge(&mut self, other: &MetricsAccumulator) {
        self.add_totals(other.total_spend, other.basket_count, other.transaction_count);
    }

    pub fn finish(&self) -> SeasonalMetrics {
        SeasonalMetrics::from_totals(self.total_spend, self.basket_count, self.transaction_count)
    }
}

/// Sum a sequence of facts into one [`SeasonalMetrics`].
///
/// Empty input yields [`SeasonalMetrics::empty`].
pub fn accumulate<'a, I>(facts: I) -> SeasonalMetrics
where
    I: IntoIterator<Item = &'a RawSeasonalFact>,
{
    let mut acc = MetricsAccumulator::new();
    for fact in facts {
        acc.add(fact);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Season;

    fn fact(total_spend: f64, basket_count: u64, transaction_count: u64) -> RawSeasonalFact {
        RawSeasonalFact {
            month: 4,
            department: "Produce".to_string(),
            total_spend,
            basket_count,
            transaction_count,
            avg_spend: 999.0,
            season: Season::Spring,
        }
    }

    #[test]
    fn empty_input_is_identity() {
        let m = accumulate(std::iter::empty());
        assert_eq!(m, SeasonalMetrics::empty());
        assert!(m.is_empty());
    }

    #[test]
    fn average_is_weighted_not_mean_of_means() {
        let facts = [fact(100.0, 2, 4), fact(50.0, 1, 1)];
        let m = accumulate(&facts);
        assert_eq!(m.total_spend, 150.0);
        assert_eq!(m.basket_count, 3);
        assert_eq!(m.transaction_count, 5);
        assert!((m.average_spend - 30.0).abs() < 1e-12);
    }

    #[test]
    fn zero_transactions_average_is_zero() {
        let facts = [fact(75.0, 3, 0)];
        let m = accumulate(&facts);
        assert_eq!(m.total_spend, 75.0);
        assert_eq!(m.average_spend, 0.0);
        assert!(m.average_spend.is_finite());
    }

    #[test]
    fn avg_spend_field_is_not_consumed() {
        let mut a = fact(10.0, 1, 2);
        let mut b = a.clone();
        a.avg_spend = 0.0;
        b.avg_spend = 1_000_000.0;
        assert_eq!(accumulate([&a]), accumulate([&b]));
    }

    #[test]
    fn merge_matches_single_pass() {
        let facts = [fact(10.0, 1, 2), fact(20.0, 2, 3), fact(5.5, 1, 1)];
        let whole = accumulate(&facts);

        let mut left = MetricsAccumulator::new();
        left.add(&facts[0]);
        let mut right = MetricsAccumulator::new();
        right.add(&facts[1]);
        right.add(&facts[2]);
        left.merge(&right);

        assert_eq!(left.finish(), whole);
    }
}
