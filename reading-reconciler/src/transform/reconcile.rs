use billing_client::domain::BillingRecord;

/// Which branch of the gap-fill rule applied to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapFill {
    /// `previous_reading` was derived as `current_reading - consumption`.
    Previous,
    /// `current_reading` was derived as `previous_reading + consumption`.
    Current,
    /// Both readings were already present.
    Complete,
    /// At least one reading is missing and could not be derived.
    Unfilled,
}

/// Fills a single missing reading from the other one and the consumption.
///
/// Rules:
/// - previous missing, current and consumption present: previous = current - consumption.
/// - current missing, previous and consumption present: current = previous + consumption.
/// - anything else is left untouched.
///
/// At most one field is written; `consumption` never is.
pub fn reconcile_gaps(record: &mut BillingRecord) -> GapFill {
    match (record.previous_reading, record.current_reading, record.consumption) {
        (None, Some(current), Some(consumption)) => {
            record.previous_reading = Some(current - consumption);
            GapFill::Previous
        }
        (Some(previous), None, Some(consumption)) => {
            record.current_reading = Some(previous + consumption);
            GapFill::Current
        }
        (Some(_), Some(_), _) => GapFill::Complete,
        _ => GapFill::Unfilled,
    }
}
