pub mod billing_export_file;

pub use billing_export_file::BillingExportFileSource;
