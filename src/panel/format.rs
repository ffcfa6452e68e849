use chrono::{DateTime, NaiveDate, Utc};

/// Render a CRM date the way the record page shows it (`MM/DD/YYYY`).
///
/// Accepts RFC 3339 timestamps, plain dates and epoch milliseconds; anything
/// else is shown as-is.
pub fn date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%m/%d/%Y").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%m/%d/%Y").to_string();
    }
    if let Some(dt) = raw
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    {
        return dt.format("%m/%d/%Y").to_string();
    }
    raw.to_string()
}

pub fn money(raw: &str) -> String {
    format!("${}", raw)
}

pub fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_date_shapes() {
        assert_eq!(date("2024-02-01T10:30:00Z"), "02/01/2024");
        assert_eq!(date("2024-02-01"), "02/01/2024");
        assert_eq!(date("1706745600000"), "02/01/2024");
        assert_eq!(date("soon"), "soon");
    }

    #[test]
    fn money_and_fallbacks() {
        assert_eq!(money("12.50"), "$12.50");
        assert_eq!(or_na(None), "N/A");
        assert_eq!(or_na(Some("x".into())), "x");
    }
}
