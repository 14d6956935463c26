//! HTTP-date handling for `Last-Modified` and `If-Modified-Since`.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Parse an HTTP-date. Returns `None` for anything unparseable, in which
/// case the conditional header is ignored.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether a resource last modified at `modified` is unchanged since the
/// client's `If-Modified-Since` value. Sub-second precision is dropped
/// since HTTP-dates only carry whole seconds.
pub fn not_modified_since(modified: SystemTime, if_modified_since: &str) -> bool {
    let Some(since) = parse_http_date(if_modified_since) else {
        return false;
    };
    let modified = DateTime::<Utc>::from(modified);
    modified.timestamp() <= since.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    const SAMPLE: &str = "Sun, 06 Nov 1994 08:49:37 GMT";

    fn sample_time() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(784_111_777)
    }

    #[test]
    fn test_format() {
        assert_eq!(format_http_date(sample_time()), SAMPLE);
    }

    #[test]
    fn test_parse() {
        let parsed = parse_http_date(SAMPLE).unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_not_modified_since() {
        let modified = sample_time() + Duration::from_millis(400);
        assert!(not_modified_since(modified, SAMPLE));
        assert!(not_modified_since(modified, "Mon, 07 Nov 1994 08:49:37 GMT"));
        assert!(!not_modified_since(modified, "Sat, 05 Nov 1994 08:49:37 GMT"));
        assert!(!not_modified_since(modified, "garbage"));
    }
}
