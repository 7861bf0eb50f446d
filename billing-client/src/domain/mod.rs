pub mod billing_record;
pub mod reading_history;

pub use billing_record::{BillingRecord, INPUT_COLUMNS};
pub use reading_history::{ReadingHistory, OUTPUT_COLUMNS};
