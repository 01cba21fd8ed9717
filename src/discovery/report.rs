//! Discovery results, one outcome per processed series

use crate::discovery::error::SeriesFailure;

/// Result of processing one candidate series
#[derive(Debug)]
pub enum SeriesOutcome<T> {
    /// Series reassembled; `items` may be empty when nothing matched
    Found { series_id: String, items: Vec<T> },
    /// Series could not be processed
    Failed(SeriesFailure),
}

impl<T> SeriesOutcome<T> {
    pub fn series_id(&self) -> &str {
        match self {
            SeriesOutcome::Found { series_id, .. } => series_id,
            SeriesOutcome::Failed(failure) => &failure.series_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SeriesOutcome::Failed(_))
    }
}

/// Outcomes of one discovery call, in completion order
#[derive(Debug)]
pub struct DiscoveryReport<T> {
    pub series: Vec<SeriesOutcome<T>>,
}

impl<T> Default for DiscoveryReport<T> {
    fn default() -> Self {
        Self { series: Vec::new() }
    }
}

impl<T> DiscoveryReport<T> {
    /// Items from every series that succeeded
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.series.iter().flat_map(|outcome| match outcome {
            SeriesOutcome::Found { items, .. } => items.as_slice(),
            SeriesOutcome::Failed(_) => &[][..],
        })
    }

    /// Series that failed
    pub fn failures(&self) -> impl Iterator<Item = &SeriesFailure> {
        self.series.iter().filter_map(|outcome| match outcome {
            SeriesOutcome::Failed(failure) => Some(failure),
            SeriesOutcome::Found { .. } => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        !self.series.iter().any(SeriesOutcome::is_failure)
    }

    /// Split into successful items and failures
    pub fn into_parts(self) -> (Vec<T>, Vec<SeriesFailure>) {
        let mut items = Vec::new();
        let mut failures = Vec::new();
        for outcome in self.series {
            match outcome {
                SeriesOutcome::Found { items: found, .. } => items.extend(found),
                SeriesOutcome::Failed(failure) => failures.push(failure),
            }
        }
        (items, failures)
    }
}

impl<T> FromIterator<SeriesOutcome<T>> for DiscoveryReport<T> {
    fn from_iter<I: IntoIterator<Item = SeriesOutcome<T>>>(iter: I) -> Self {
        Self {
            series: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotError;

    fn sample() -> DiscoveryReport<u32> {
        vec![
            SeriesOutcome::Found {
                series_id: "a".to_string(),
                items: vec![1, 2],
            },
            SeriesOutcome::Failed(SeriesFailure::new("b", SnapshotError::Missing)),
            SeriesOutcome::Found {
                series_id: "c".to_string(),
                items: vec![],
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_report_accessors() {
        let report = sample();

        assert_eq!(report.items().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.series[1].series_id(), "b");
    }

    #[test]
    fn test_into_parts() {
        let (items, failures) = sample().into_parts();

        assert_eq!(items, vec![1, 2]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].series_id, "b");
    }

    #[test]
    fn test_empty_report_is_clean() {
        let report: DiscoveryReport<u32> = DiscoveryReport::default();
        assert!(report.is_clean());
        assert_eq!(report.items().count(), 0);
    }
}
