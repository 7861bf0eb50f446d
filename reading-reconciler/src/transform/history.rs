use billing_client::domain::{BillingRecord, ReadingHistory};
use rand::Rng;
use time::{
    macros::{date, time},
    Date, Duration, Time,
};

use super::{
    format::{format_numeric_field, format_reading, FieldValue},
    reconcile::reconcile_gaps,
};

/// Date stamped on every history row.
pub const HISTORY_DATE: Date = date!(2026-12-20);

// Reading rounds run from 08:00:00 through 17:59:59.
const ROUND_OPENS: Time = time!(8:00:00);
const ROUND_CLOSES: Time = time!(17:59:59);

/// Draws a reading time `HH:MM:SS` with the hour in 08..=17.
///
/// Picking a second uniformly inside the round is the same as drawing hour,
/// minute and second independently.
pub fn generate_history_time<R: Rng + ?Sized>(rng: &mut R) -> String {
    let span = (ROUND_CLOSES - ROUND_OPENS).whole_seconds();
    let t = ROUND_OPENS + Duration::seconds(rng.gen_range(0..=span));
    format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())
}

/// Gap-fills a record and renders it as a history row.
pub fn build_output_record<R: Rng + ?Sized>(mut input: BillingRecord, rng: &mut R) -> ReadingHistory {
    reconcile_gaps(&mut input);
    project_history(input, rng)
}

/// Renders an already reconciled record.
pub fn project_history<R: Rng + ?Sized>(input: BillingRecord, rng: &mut R) -> ReadingHistory {
    ReadingHistory {
        code: input.code,
        full_name: input.full_name.unwrap_or_default(),
        id_number: format_numeric_field(input.id_number.map(FieldValue::Text).as_ref()),
        phone: input.phone.unwrap_or_default(),
        district: input.district.unwrap_or_default(),
        historical_previous: format_reading(input.previous_reading),
        historical_current: format_reading(input.current_reading),
        history_date: HISTORY_DATE.to_string(),
        history_time: generate_history_time(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn parse_hms(s: &str) -> (u8, u8, u8) {
        assert_eq!(s.len(), 8, "bad time {s}");
        let parts: Vec<u8> = s.split(':').map(|p| p.parse().unwrap()).collect();
        assert_eq!(parts.len(), 3, "bad time {s}");
        (parts[0], parts[1], parts[2])
    }

    #[test]
    fn history_time_stays_inside_round() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut hours = std::collections::BTreeSet::new();
        for _ in 0..5_000 {
            let (h, m, s) = parse_hms(&generate_history_time(&mut rng));
            assert!((8..=17).contains(&h));
            assert!(m <= 59);
            assert!(s <= 59);
            hours.insert(h);
        }
        assert_eq!(hours.len(), 10, "every hour 08..=17 should be drawn");
    }

    #[test]
    fn history_date_renders_iso() {
        assert_eq!(HISTORY_DATE.to_string(), "2026-12-20");
    }

    #[test]
    fn builds_row_with_filled_previous() {
        let mut rng = StdRng::seed_from_u64(1);
        let input = BillingRecord {
            code: "A1".to_string(),
            full_name: Some("Jane Doe".to_string()),
            id_number: Some("123.0".to_string()),
            phone: Some("555".to_string()),
            district: Some("D1".to_string()),
            previous_reading: None,
            current_reading: Some(50.0),
            consumption: Some(10.0),
        };

        let out = build_output_record(input, &mut rng);
        assert_eq!(out.code, "A1");
        assert_eq!(out.full_name, "Jane Doe");
        assert_eq!(out.id_number, "123");
        assert_eq!(out.phone, "555");
        assert_eq!(out.district, "D1");
        assert_eq!(out.historical_previous, "40");
        assert_eq!(out.historical_current, "50");
        assert_eq!(out.history_date, "2026-12-20");
        let (h, _, _) = parse_hms(&out.history_time);
        assert!((8..=17).contains(&h));
    }

    #[test]
    fn builds_row_with_nulls_as_empty() {
        let mut rng = StdRng::seed_from_u64(2);
        let input = BillingRecord {
            code: "B7".to_string(),
            id_number: Some("CC-44".to_string()),
            previous_reading: Some(12.7),
            ..Default::default()
        };

        let out = build_output_record(input, &mut rng);
        assert_eq!(out.full_name, "");
        assert_eq!(out.id_number, "CC-44");
        assert_eq!(out.phone, "");
        assert_eq!(out.district, "");
        assert_eq!(out.historical_previous, "12");
        assert_eq!(out.historical_current, "");
    }
}
