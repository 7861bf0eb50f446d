use serde::Serialize;

/// Header row of the reading history file.
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "CODIGO_CONCATENADO",
    "NOMBRE_COMPLETO",
    "CEDULA",
    "CELULAR",
    "VEREDA",
    "HISTORICO_NOV",
    "HISTORICO_DIC",
    "FECHA_HISTORICO_DIC",
    "HORA_HISTORICO_DIC",
];

/// One row of the reading history file. Every field is already rendered;
/// empty strings stand for nulls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingHistory {
    #[serde(rename = "CODIGO_CONCATENADO")]
    pub code: String,
    #[serde(rename = "NOMBRE_COMPLETO")]
    pub full_name: String,
    #[serde(rename = "CEDULA")]
    pub id_number: String,
    #[serde(rename = "CELULAR")]
    pub phone: String,
    #[serde(rename = "VEREDA")]
    pub district: String,
    #[serde(rename = "HISTORICO_NOV")]
    pub historical_previous: String,
    #[serde(rename = "HISTORICO_DIC")]
    pub historical_current: String,
    #[serde(rename = "FECHA_HISTORICO_DIC")]
    pub history_date: String,
    #[serde(rename = "HORA_HISTORICO_DIC")]
    pub history_time: String,
}
