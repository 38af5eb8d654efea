//! External tabular sources of regional data.
//!
//! A [`RegionalSource`] provides the two tables consumed by
//! [`RegionalDataStore`](crate::store::RegionalDataStore): the variable metadata and the
//! per-region, per-year records. [`CsvSource`] reads both from CSV files.

use crate::errors::{RdiceError, RdiceResult};
use crate::record::{RegionalRecord, GLOBAL_REGION};
use crate::variable::VariableMetadata;
use crate::{FloatValue, Year};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const DEFAULT_INFO_FILE: &str = "CBA_regional_info.csv";
pub const DEFAULT_DATA_FILE: &str = "CBA_regional_data.csv";

/// Provider of the metadata and record tables.
///
/// Each call performs a full read of the underlying table.
/// Any parse failure must fail the whole call; there is no row-level recovery.
pub trait RegionalSource {
    fn load_metadata(&self) -> RdiceResult<Vec<VariableMetadata>>;
    fn load_records(&self) -> RdiceResult<Vec<RegionalRecord>>;
}

/// Reads the regional tables from two CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSource {
    /// Path of the metadata table (`variable,gdx_variable,description,unit`)
    pub info_path: PathBuf,
    /// Path of the records table (`year`, optional `region_id`, numeric fields)
    pub data_path: PathBuf,
}

impl Default for CsvSource {
    fn default() -> Self {
        Self::new(DEFAULT_INFO_FILE, DEFAULT_DATA_FILE)
    }
}

impl CsvSource {
    pub fn new(info_path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            info_path: info_path.into(),
            data_path: data_path.into(),
        }
    }

    /// Use the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(DEFAULT_INFO_FILE), dir.join(DEFAULT_DATA_FILE))
    }
}

impl RegionalSource for CsvSource {
    fn load_metadata(&self) -> RdiceResult<Vec<VariableMetadata>> {
        parse_metadata(open(&self.info_path)?, &self.info_path)
    }

    fn load_records(&self) -> RdiceResult<Vec<RegionalRecord>> {
        parse_records(open(&self.data_path)?, &self.data_path)
    }
}

fn open(path: &Path) -> RdiceResult<File> {
    File::open(path).map_err(|source| RdiceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Row of the records table as it appears in the file.
#[derive(Debug, Deserialize)]
struct RecordRow {
    year: Year,
    #[serde(default)]
    region_id: Option<String>,
    gdp_baseline: FloatValue,
    mitigation: FloatValue,
    pop: FloatValue,
    emi_ind: FloatValue,
    gdp_net: FloatValue,
    gdp_gross: FloatValue,
    capital: FloatValue,
    investments: FloatValue,
    savings: FloatValue,
    consumption: FloatValue,
}

impl From<RecordRow> for RegionalRecord {
    fn from(row: RecordRow) -> Self {
        RegionalRecord {
            region: row
                .region_id
                .unwrap_or_else(|| GLOBAL_REGION.to_string()),
            year: row.year,
            gdp_baseline: row.gdp_baseline,
            mitigation: row.mitigation,
            pop: row.pop,
            emi_ind: row.emi_ind,
            gdp_net: row.gdp_net,
            gdp_gross: row.gdp_gross,
            capital: row.capital,
            investments: row.investments,
            savings: row.savings,
            consumption: row.consumption,
        }
    }
}

/// Parse a metadata table.
///
/// `origin` is only used to label errors.
pub fn parse_metadata<R: Read>(reader: R, origin: &Path) -> RdiceResult<Vec<VariableMetadata>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    rdr.deserialize()
        .map(|row| {
            row.map_err(|source| RdiceError::Csv {
                path: origin.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Parse a records table.
///
/// Rows without a region (missing column or empty cell) belong to [`GLOBAL_REGION`].
/// `origin` is only used to label errors.
pub fn parse_records<R: Read>(reader: R, origin: &Path) -> RdiceResult<Vec<RegionalRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    rdr.deserialize::<RecordRow>()
        .map(|row| {
            row.map(RegionalRecord::from)
                .map_err(|source| RdiceError::Csv {
                    path: origin.to_path_buf(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str =
        "year,gdp_baseline,mitigation,pop,emi_ind,gdp_net,gdp_gross,capital,investments,savings,consumption";

    fn origin() -> PathBuf {
        PathBuf::from("test.csv")
    }

    #[test]
    fn test_parse_metadata() {
        let table = "variable,gdx_variable,description,unit\n\
                     pop,POP,Population,million\n\
                     gdp_baseline,GDP_BASE,Baseline GDP,trillion USD\n";
        let metadata = parse_metadata(table.as_bytes(), &origin()).unwrap();

        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata[1],
            VariableMetadata::new("gdp_baseline", "GDP_BASE", "Baseline GDP", "trillion USD")
        );
    }

    #[test]
    fn test_parse_metadata_missing_column() {
        let table = "variable,gdx_variable,description\npop,POP,Population\n";
        let err = parse_metadata(table.as_bytes(), &origin()).unwrap_err();
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_rows_without_region_column_are_global() {
        let table = format!("{HEADER}\n2015,100,0.25,10,0.5,1,2,3,4,5,6\n");
        let records = parse_records(table.as_bytes(), &origin()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region, GLOBAL_REGION);
        assert_eq!(records[0].year, 2015);
        assert_eq!(records[0].mitigation, 0.25);
        assert_eq!(records[0].consumption, 6.0);
    }

    #[test]
    fn test_empty_region_cell_is_global() {
        let table = format!(
            "region_id,{HEADER}\n,2015,1,0,1,1,1,1,1,1,1,1\nusa,2015,2,0,1,1,1,1,1,1,1,1\n"
        );
        let records = parse_records(table.as_bytes(), &origin()).unwrap();

        assert_eq!(records[0].region, GLOBAL_REGION);
        assert_eq!(records[1].region, "usa");
    }

    #[test]
    fn test_malformed_number_fails_whole_table() {
        let table = format!(
            "{HEADER}\n2015,1,0,1,1,1,1,1,1,1,1\n2016,abc,0,1,1,1,1,1,1,1,1\n"
        );
        let err = parse_records(table.as_bytes(), &origin()).unwrap_err();

        assert!(matches!(err, RdiceError::Csv { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_missing_numeric_column_fails() {
        let table = "year,gdp_baseline\n2015,1\n";
        assert!(parse_records(table.as_bytes(), &origin()).is_err());
    }

    #[test]
    fn test_csv_source_missing_file() {
        let dir = tempdir().unwrap();
        let source = CsvSource::in_dir(dir.path());

        let err = source.load_metadata().unwrap_err();
        assert!(matches!(err, RdiceError::Io { .. }));
    }

    #[test]
    fn test_csv_source_reads_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(DEFAULT_INFO_FILE),
            "variable,gdx_variable,description,unit\npop,POP,Population,million\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(DEFAULT_DATA_FILE),
            format!("{HEADER}\n2015,1,0,1,1,1,1,1,1,1,1\n"),
        )
        .unwrap();

        let source = CsvSource::in_dir(dir.path());
        assert_eq!(source.load_metadata().unwrap().len(), 1);
        assert_eq!(source.load_records().unwrap().len(), 1);
    }
}
