use crate::model::Month;
use rust_decimal::Decimal;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Aggregate values keyed by month, always iterated chronologically.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct TimeSeries(BTreeMap<Month, Decimal>);

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the bucket for `month`, saturating at the `Decimal` bounds.
    pub fn add(&mut self, month: Month, value: Decimal) {
        let total = self.0.entry(month).or_insert(Decimal::ZERO);
        *total = total.saturating_add(value);
    }

    pub fn get(&self, month: Month) -> Option<Decimal> {
        self.0.get(&month).copied()
    }

    /// The value for `month`, zero when the month has no bucket.
    pub fn get_or_zero(&self, month: Month) -> Decimal {
        self.get(month).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn months(&self) -> impl Iterator<Item = Month> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, Decimal)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }

    pub fn last(&self) -> Option<(Month, Decimal)> {
        self.0.last_key_value().map(|(m, v)| (*m, *v))
    }

    pub fn points(&self) -> Vec<SeriesPoint> {
        self.iter()
            .map(|(month, value)| SeriesPoint { month, value })
            .collect()
    }
}

impl FromIterator<(Month, Decimal)> for TimeSeries {
    fn from_iter<T: IntoIterator<Item = (Month, Decimal)>>(iter: T) -> Self {
        let mut series = TimeSeries::new();
        for (month, value) in iter {
            series.add(month, value);
        }
        series
    }
}

/// One bucket of a `TimeSeries`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub month: Month,
    pub value: Decimal,
}

impl Serialize for TimeSeries {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (month, value) in self.iter() {
            seq.serialize_element(&SeriesPoint { month, value })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chronological_and_summed() {
        let mar = Month::from_ymd(2025, 3).unwrap();
        let jan = Month::from_ymd(2025, 1).unwrap();
        let series: TimeSeries = [
            (mar, Decimal::from(5)),
            (jan, Decimal::from(1)),
            (mar, Decimal::from(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(series.months().collect::<Vec<_>>(), vec![jan, mar]);
        assert_eq!(series.get(mar), Some(Decimal::from(7)));
        assert_eq!(series.get_or_zero(jan.previous()), Decimal::ZERO);
        assert_eq!(series.last(), Some((mar, Decimal::from(7))));
    }

    #[test]
    fn test_serialize_as_points() {
        let jan = Month::from_ymd(2025, 1).unwrap();
        let series: TimeSeries = [(jan, Decimal::from(10))].into_iter().collect();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"month":"2025-01-31","value":"10"}]"#);
    }
}
