use std::path::PathBuf;

use billing_client::domain::{BillingRecord, INPUT_COLUMNS};
use csv::StringRecord;
use encoding_rs::Encoding;

use crate::{
    config::InputEncoding,
    pipeline::{Envelope, EnvelopeStream, PipelineError, Source},
};

/// Cell spellings that count as null in any column.
const NULL_MARKERS: [&str; 8] = ["NaN", "nan", "NA", "N/A", "NULL", "null", "#N/A", "None"];

/// Billing export source (`FACTURAS_GENERADAS`).
///
/// The whole file is decoded up front, then parsed as delimited text with a
/// header row. All of `INPUT_COLUMNS` must be present; other columns are
/// ignored.
pub struct BillingExportFileSource {
    path: PathBuf,
    encoding: InputEncoding,
    delimiter: u8,
}

impl BillingExportFileSource {
    pub fn new<P: Into<PathBuf>>(path: P, encoding: InputEncoding, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            encoding,
            delimiter,
        }
    }
}

fn encoding_for(encoding: InputEncoding) -> &'static Encoding {
    match encoding {
        InputEncoding::Utf16 => encoding_rs::UTF_16LE,
        InputEncoding::Utf8 => encoding_rs::UTF_8,
        InputEncoding::Windows1252 => encoding_rs::WINDOWS_1252,
    }
}

/// Decodes raw bytes, honouring a byte-order mark when present.
pub fn decode_export(bytes: &[u8], encoding: InputEncoding) -> String {
    let (text, used, had_errors) = encoding_for(encoding).decode(bytes);
    if had_errors {
        tracing::warn!(encoding = used.name(), "billing export contained undecodable bytes");
    }
    text.into_owned()
}

fn null_if_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(s)
    }
}

/// Column positions resolved once from the header row.
#[derive(Debug)]
struct ColumnIndex([usize; INPUT_COLUMNS.len()]);

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, PipelineError> {
        let mut idx = [0usize; INPUT_COLUMNS.len()];
        for (slot, name) in idx.iter_mut().zip(INPUT_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in billing export")))?;
        }
        Ok(Self(idx))
    }

    fn get<'r>(&self, record: &'r StringRecord, col: usize) -> &'r str {
        record.get(self.0[col]).unwrap_or("")
    }
}

fn parse_reading(record: &StringRecord, cols: &ColumnIndex, col: usize, line: u64) -> Result<Option<f64>, PipelineError> {
    match null_if_blank(cols.get(record, col)) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            PipelineError::Source(format!(
                "invalid {} '{raw}' on line {line}: {e}",
                INPUT_COLUMNS[col]
            ))
        }),
    }
}

fn record_to_billing_record(record: &StringRecord, cols: &ColumnIndex, line: u64) -> Result<BillingRecord, PipelineError> {
    let text = |col: usize| null_if_blank(cols.get(record, col)).map(str::to_string);

    Ok(BillingRecord {
        code: text(0).unwrap_or_default(),
        full_name: text(1),
        id_number: text(2),
        phone: text(3),
        district: text(4),
        previous_reading: parse_reading(record, cols, 5, line)?,
        current_reading: parse_reading(record, cols, 6, line)?,
        consumption: parse_reading(record, cols, 7, line)?,
    })
}

#[async_trait::async_trait]
impl Source<BillingRecord> for BillingExportFileSource {
    async fn stream(&self) -> EnvelopeStream<BillingRecord> {
        // Blocking reads inside a single async task; exports are small.
        let path = self.path.clone();
        let encoding = self.encoding;
        let delimiter = self.delimiter;
        let s = async_stream::try_stream! {
            let bytes = std::fs::read(&path).map_err(|e| {
                PipelineError::Source(format!("failed to read billing export {}: {e}", path.display()))
            })?;
            let text = decode_export(&bytes, encoding);

            let mut rdr = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .from_reader(text.as_bytes());
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read billing export headers: {e}")))?
                .clone();
            let cols = ColumnIndex::resolve(&headers)?;
            tracing::info!(path = %path.display(), columns = headers.len(), "billing export opened");

            for result in rdr.records() {
                let record = result.map_err(|e| PipelineError::Source(format!(
                    "failed to read billing export record: {e}"
                )))?;
                let line = record.position().map(|p| p.line()).unwrap_or_default();

                let billing = match record_to_billing_record(&record, &cols, line) {
                    Ok(b) => b,
                    Err(e) => {
                        metrics::counter!("billing_export_parse_errors_total").increment(1);
                        Err(e)?
                    }
                };

                yield Envelope::new(billing, line);
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;

    fn utf16le_with_bom(s: &str) -> Vec<u8> {
        let mut out = vec![0xFF, 0xFE];
        for unit in s.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out
    }

    fn write_tmp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    const HEADER: &str = "CODIGO_CONCATENADO\tNOMBRE_COMPLETO\tCEDULA\tCELULAR\tVEREDA\tLECTURA_ANTERIOR\tLECTURA_ACTUAL\tCONSUMO_M3\tVALOR_TOTAL";

    async fn collect(src: BillingExportFileSource) -> Vec<Result<Envelope<BillingRecord>, PipelineError>> {
        src.stream().await.collect().await
    }

    #[test]
    fn decodes_utf16_with_and_without_bom() {
        let with_bom = utf16le_with_bom("Vereda Ñ");
        assert_eq!(decode_export(&with_bom, InputEncoding::Utf16), "Vereda Ñ");
        assert_eq!(decode_export(&with_bom[2..], InputEncoding::Utf16), "Vereda Ñ");
        assert_eq!(decode_export("\u{feff}abc".as_bytes(), InputEncoding::Utf8), "abc");
        assert_eq!(decode_export(&[0x56, 0xD1], InputEncoding::Windows1252), "VÑ");
    }

    #[test]
    fn null_markers_are_recognised() {
        assert_eq!(null_if_blank(""), None);
        assert_eq!(null_if_blank("  "), None);
        assert_eq!(null_if_blank("NaN"), None);
        assert_eq!(null_if_blank("#N/A"), None);
        assert_eq!(null_if_blank("Nancy"), Some("Nancy"));
    }

    #[tokio::test]
    async fn reads_utf16_tab_export() {
        let body = format!(
            "{HEADER}\r\n\
             001-01\tJane Doe\t123.0\t555\tD1\t\t50\t10\t9000\r\n\
             001-02\tJohn Roe\tABC123\t\tD2\t30.5\t\tNaN\t1000\r\n"
        );
        let f = write_tmp(&utf16le_with_bom(&body));

        let items = collect(BillingExportFileSource::new(f.path(), InputEncoding::Utf16, b'\t')).await;
        assert_eq!(items.len(), 2);

        let first = items[0].as_ref().unwrap();
        assert_eq!(first.line, 2);
        assert_eq!(first.payload.code, "001-01");
        assert_eq!(first.payload.id_number.as_deref(), Some("123.0"));
        assert_eq!(first.payload.previous_reading, None);
        assert_eq!(first.payload.current_reading, Some(50.0));
        assert_eq!(first.payload.consumption, Some(10.0));

        let second = items[1].as_ref().unwrap();
        assert_eq!(second.line, 3);
        assert_eq!(second.payload.phone, None);
        assert_eq!(second.payload.previous_reading, Some(30.5));
        assert_eq!(second.payload.consumption, None);
    }

    #[tokio::test]
    async fn missing_column_fails_before_any_record() {
        let body = "CODIGO_CONCATENADO,NOMBRE_COMPLETO,CEDULA\nA1,Jane,1\n";
        let f = write_tmp(body.as_bytes());

        let items = collect(BillingExportFileSource::new(f.path(), InputEncoding::Utf8, b',')).await;
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(PipelineError::Source(msg)) if msg.contains("CELULAR")));
    }

    #[tokio::test]
    async fn non_numeric_reading_is_fatal() {
        let body = format!("{HEADER}\nA1\tJane\t1\t2\tD\tabc\t5\t1\t0\n");
        let f = write_tmp(body.as_bytes());

        let items = collect(BillingExportFileSource::new(f.path(), InputEncoding::Utf8, b'\t')).await;
        assert!(matches!(&items[0], Err(PipelineError::Source(msg)) if msg.contains("LECTURA_ANTERIOR") && msg.contains("line 2")));
    }

    #[tokio::test]
    async fn unreadable_file_is_a_source_error() {
        let src = BillingExportFileSource::new("/nonexistent/FACTURAS.csv", InputEncoding::Utf16, b'\t');
        let items = collect(src).await;
        assert!(matches!(&items[0], Err(PipelineError::Source(_))));
    }
}
