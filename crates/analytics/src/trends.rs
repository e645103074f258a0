use crate::report::YearlyMean;
use crate::stats::mean;
use chrono::Datelike;
use core_types::Measurement;
use std::collections::BTreeMap;

/// Mean of every requested metric per calendar year (UTC).
///
/// Rows come out ordered by year, then by metric in request order. A year in
/// which a metric only has null readings is reported with `MissingData`.
pub fn yearly_means<S: AsRef<str>>(measurements: &[Measurement], metrics: &[S]) -> Vec<YearlyMean> {
    let mut buckets: BTreeMap<(i32, usize), Vec<f64>> = BTreeMap::new();
    for m in measurements {
        let Some(position) = metrics.iter().position(|name| name.as_ref() == m.metric) else {
            continue;
        };
        let bucket = buckets.entry((m.timestamp.year(), position)).or_default();
        if let Some(value) = m.reading() {
            bucket.push(value);
        }
    }

    buckets
        .into_iter()
        .map(|((year, position), values)| YearlyMean {
            year,
            metric: metrics[position].as_ref().to_string(),
            count: values.len(),
            mean: mean(&values),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::Undefined;

    fn m(metric: &str, value: Option<f64>, year: i32) -> Measurement {
        let ts = Utc.with_ymd_and_hms(year, 3, 1, 9, 0, 0).unwrap();
        Measurement::new("P1", "Mens Basketball", metric, value, ts).unwrap()
    }

    #[test]
    fn means_per_year_and_metric() {
        let rows = vec![
            m("distance_total", Some(4000.0), 2023),
            m("distance_total", Some(5000.0), 2023),
            m("distance_total", Some(6000.0), 2024),
            m("accel_load_accum", None, 2024),
            m("Peak Velocity(m/s)", Some(3.0), 2024),
        ];
        let trends = yearly_means(&rows, &["distance_total", "accel_load_accum"]);
        assert_eq!(trends.len(), 3);
        assert_eq!((trends[0].year, trends[0].mean), (2023, Ok(4500.0)));
        assert_eq!(trends[1].metric, "distance_total");
        assert_eq!(trends[1].mean, Ok(6000.0));
        assert_eq!(trends[2].metric, "accel_load_accum");
        assert_eq!(trends[2].mean, Err(Undefined::MissingData));
    }
}
