/// Header names a billing export must carry, in the order they are read.
pub const INPUT_COLUMNS: [&str; 8] = [
    "CODIGO_CONCATENADO",
    "NOMBRE_COMPLETO",
    "CEDULA",
    "CELULAR",
    "VEREDA",
    "LECTURA_ANTERIOR",
    "LECTURA_ACTUAL",
    "CONSUMO_M3",
];

/// One billed account as it appears in the billing export.
///
/// Text cells keep their raw spelling; `None` means the cell was blank or
/// held a null marker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillingRecord {
    pub code: String,
    pub full_name: Option<String>,
    pub id_number: Option<String>,
    pub phone: Option<String>,
    pub district: Option<String>,
    pub previous_reading: Option<f64>,
    pub current_reading: Option<f64>,
    /// Cubic metres consumed in the period; expected to equal
    /// `current_reading - previous_reading` when both are known.
    pub consumption: Option<f64>,
}
