use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// Converts a Kubernetes `Time` keeping its sub-second part.
///
/// `None` only for instants outside the range of nanosecond `i64` timestamps.
pub fn from_k8s_time(time: &Time) -> Option<DateTime<Utc>> {
    let nanos = i64::try_from(time.0.as_nanosecond()).ok()?;
    Some(DateTime::from_timestamp_nanos(nanos))
}

pub fn from_optional_k8s_time(time: Option<&Time>) -> Option<DateTime<Utc>> {
    time.and_then(from_k8s_time)
}

/// Elapsed time in nanoseconds, rounded to whole seconds first.
///
/// `round((end - start) seconds) * 1e9`: sub-second precision is dropped.
pub fn rounded_duration_nanos(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    let seconds = (millis as f64 / 1000.0).round() as i64;
    seconds * 1_000_000_000
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_duration_discards_sub_second_precision() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let end = start + chrono::Duration::milliseconds(1400);
        assert_eq!(rounded_duration_nanos(start, end), 1_000_000_000);

        let end = start + chrono::Duration::milliseconds(1500);
        assert_eq!(rounded_duration_nanos(start, end), 2_000_000_000);

        let end = start + chrono::Duration::seconds(55);
        assert_eq!(rounded_duration_nanos(start, end), 55_000_000_000);
    }

    #[test]
    fn test_reads_k8s_time() {
        let time: Time =
            serde_json::from_value(serde_json::json!("2024-05-01T12:00:03Z")).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 3).unwrap();

        assert_eq!(from_k8s_time(&time), Some(expected));
        assert_eq!(from_optional_k8s_time(None), None);
    }

    #[test]
    fn test_k8s_time_keeps_milliseconds() {
        let time: Time =
            serde_json::from_value(serde_json::json!("2024-05-01T12:00:00.900Z")).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(900);

        assert_eq!(from_k8s_time(&time), Some(expected));
    }
}
