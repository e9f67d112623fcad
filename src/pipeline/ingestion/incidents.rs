use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument};

use crate::error::{ImporterError, Result};
use crate::types::RawRow;

/// Read every data row of a headed CSV export
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        rows.push(RawRow::from_record(&headers, &record?));
    }
    Ok(rows)
}

#[instrument]
pub fn read_incident_file(path: &Path) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|source| ImporterError::Input {
        path: path.display().to_string(),
        source,
    })?;
    let rows = read_rows(file)?;
    info!("Read {} incident rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_by_header() {
        let data = "Incident Number,Type,Location\n1-AAAAAA,Assault,Perth IDC\n1-BBBBBB,,\n";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Location"), Some("Perth IDC"));
        assert_eq!(rows[1].get("Type"), None);
    }

    #[test]
    fn quoted_fields_keep_embedded_commas() {
        let data = "Incident Number,Summary\n1-AAAAAA,\"Found knife, reported\"\n";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows[0].get("Summary"), Some("Found knife, reported"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_incident_file(&dir.path().join("absent.csv")).is_err());
    }
}
