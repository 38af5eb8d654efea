//! Lazily loaded, read-only store of regional data.
//!
//! The store has two states. It starts [`LoadState::NotLoaded`] and moves to
//! [`LoadState::Loaded`] on the first access, after both the metadata table and the
//! records table have been read in full from its [`RegionalSource`].
//! A failed load leaves the store `NotLoaded` and the next access tries again.
//!
//! Once loaded, lookups are plain reads against immutable tables and take no locks,
//! so a store can be shared between threads behind an `Arc`.
//!
//! ```rust,no_run
//! use rdice_core::source::CsvSource;
//! use rdice_core::store::RegionalDataStore;
//!
//! let store = RegionalDataStore::new(CsvSource::default());
//! match store.get_regional_data("global", 2015, "pop").unwrap() {
//!     Some(pop) => println!("Population: {}", pop),
//!     None => println!("No population data"),
//! }
//! ```

use crate::errors::RdiceResult;
use crate::record::{RegionalField, RegionalRecord};
use crate::source::{CsvSource, RegionalSource};
use crate::variable::VariableMetadata;
use crate::{FloatValue, Year};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Lifecycle of a [`RegionalDataStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
}

/// In-memory copy of both source tables.
#[derive(Debug, Default)]
struct Tables {
    metadata: HashMap<String, VariableMetadata>,
    /// Records by region, then by year
    records: HashMap<String, BTreeMap<Year, RegionalRecord>>,
}

impl Tables {
    fn load<S: RegionalSource>(source: &S) -> RdiceResult<Self> {
        let mut tables = Tables::default();

        for variable in source.load_metadata()? {
            tables.metadata.insert(variable.name.clone(), variable);
        }

        for record in source.load_records()? {
            let region = tables.records.entry(record.region.clone()).or_default();
            if let Some(previous) = region.insert(record.year, record) {
                warn!(
                    "Duplicate record for region '{}' in {}; keeping the later row",
                    previous.region, previous.year
                );
            }
        }

        Ok(tables)
    }
}

/// Memoized access to the regional metadata and records.
///
/// Each table is read from the source exactly once per successful load.
pub struct RegionalDataStore<S = CsvSource> {
    source: S,
    tables: OnceLock<Tables>,
    load_lock: Mutex<()>,
}

impl<S: RegionalSource> RegionalDataStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tables: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> LoadState {
        match self.tables.get() {
            Some(_) => LoadState::Loaded,
            None => LoadState::NotLoaded,
        }
    }

    /// Load both tables if that has not happened yet.
    pub fn load(&self) -> RdiceResult<()> {
        self.tables().map(|_| ())
    }

    /// Drop the loaded tables and return to [`LoadState::NotLoaded`].
    pub fn reset(&mut self) {
        self.tables.take();
    }

    fn tables(&self) -> RdiceResult<&Tables> {
        if let Some(tables) = self.tables.get() {
            return Ok(tables);
        }

        // Concurrent first accesses wait here for a single load
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tables) = self.tables.get() {
            return Ok(tables);
        }

        debug!("Loading regional data");
        let tables = Tables::load(&self.source)?;
        info!(
            "Loaded {} variables and {} regions",
            tables.metadata.len(),
            tables.records.len()
        );
        Ok(self.tables.get_or_init(|| tables))
    }

    /// Get the value of `field` for `region` in `year`.
    ///
    /// Returns `Ok(None)` if the region, the year within the region, or the field is unknown.
    /// An error is only returned if the tables could not be loaded.
    pub fn get_regional_data(
        &self,
        region: &str,
        year: Year,
        field: &str,
    ) -> RdiceResult<Option<FloatValue>> {
        Ok(self
            .get_record(region, year)?
            .and_then(|record| record.get_by_name(field)))
    }

    /// Typed variant of [`get_regional_data`](Self::get_regional_data).
    pub fn get_field(
        &self,
        region: &str,
        year: Year,
        field: RegionalField,
    ) -> RdiceResult<Option<FloatValue>> {
        Ok(self
            .get_record(region, year)?
            .map(|record| record.get(field)))
    }

    pub fn get_record(&self, region: &str, year: Year) -> RdiceResult<Option<&RegionalRecord>> {
        Ok(self
            .tables()?
            .records
            .get(region)
            .and_then(|years| years.get(&year)))
    }

    /// Get the metadata of a variable.
    pub fn get_regional_info(&self, field: &str) -> RdiceResult<Option<&VariableMetadata>> {
        Ok(self.tables()?.metadata.get(field))
    }

    /// Regions present in the records table, sorted by name.
    pub fn regions(&self) -> RdiceResult<Vec<&str>> {
        let mut regions: Vec<&str> = self.tables()?.records.keys().map(String::as_str).collect();
        regions.sort_unstable();
        Ok(regions)
    }

    /// Years with a record for `region`, ascending.
    pub fn years(&self, region: &str) -> RdiceResult<Vec<Year>> {
        Ok(self
            .tables()?
            .records
            .get(region)
            .map(|years| years.keys().copied().collect())
            .unwrap_or_default())
    }

    /// All variable metadata, sorted by name.
    pub fn variables(&self) -> RdiceResult<Vec<&VariableMetadata>> {
        let mut variables: Vec<&VariableMetadata> = self.tables()?.metadata.values().collect();
        variables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(variables)
    }
}

impl<S> std::fmt::Debug for RegionalDataStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionalDataStore")
            .field("loaded", &self.tables.get().is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::RdiceError;
    use crate::record::tests::zero_record;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Source backed by vectors, counting how often each table is read.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub metadata: Vec<VariableMetadata>,
        pub records: Vec<RegionalRecord>,
        /// Number of initial record loads that fail
        pub failures: AtomicUsize,
        pub metadata_loads: AtomicUsize,
        pub record_loads: AtomicUsize,
    }

    impl MemorySource {
        pub(crate) fn new(records: Vec<RegionalRecord>) -> Self {
            Self {
                metadata: vec![VariableMetadata::new(
                    "pop",
                    "POP",
                    "Population",
                    "million",
                )],
                records,
                ..Default::default()
            }
        }
    }

    impl RegionalSource for MemorySource {
        fn load_metadata(&self) -> RdiceResult<Vec<VariableMetadata>> {
            self.metadata_loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.metadata.clone())
        }

        fn load_records(&self) -> RdiceResult<Vec<RegionalRecord>> {
            self.record_loads.fetch_add(1, Ordering::SeqCst);
            let failed = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failed {
                return Err(RdiceError::Csv {
                    path: "memory".into(),
                    source: csv::Error::from(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "bad row",
                    )),
                });
            }
            Ok(self.records.clone())
        }
    }

    fn sample_store() -> RegionalDataStore<MemorySource> {
        let mut record = zero_record("r1", 2015);
        record.pop = 10.0;
        record.emi_ind = 0.5;
        RegionalDataStore::new(MemorySource::new(vec![record, zero_record("r1", 2016)]))
    }

    #[test]
    fn test_lookup_loads_once() {
        let store = sample_store();
        assert_eq!(store.state(), LoadState::NotLoaded);

        for _ in 0..10 {
            assert_eq!(store.get_regional_data("r1", 2015, "pop").unwrap(), Some(10.0));
            assert!(store.get_regional_info("pop").unwrap().is_some());
        }

        assert_eq!(store.state(), LoadState::Loaded);
        assert_eq!(store.source().metadata_loads.load(Ordering::SeqCst), 1);
        assert_eq!(store.source().record_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_absent_values() {
        let store = sample_store();

        assert_eq!(store.get_regional_data("r2", 2015, "pop").unwrap(), None);
        assert_eq!(store.get_regional_data("r1", 2014, "pop").unwrap(), None);
        assert_eq!(store.get_regional_data("r1", 2015, "temperature").unwrap(), None);
        assert_eq!(store.get_regional_info("temperature").unwrap(), None);
        // Zero is stored data, not an absence
        assert_eq!(store.get_regional_data("r1", 2016, "pop").unwrap(), Some(0.0));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let store = sample_store();
        store.source().failures.store(1, Ordering::SeqCst);

        let err = store.get_regional_data("r1", 2015, "pop").unwrap_err();
        assert!(err.is_load_failure());
        assert_eq!(store.state(), LoadState::NotLoaded);

        assert_eq!(store.get_regional_data("r1", 2015, "pop").unwrap(), Some(10.0));
        assert_eq!(store.state(), LoadState::Loaded);
        assert_eq!(store.source().record_loads.load(Ordering::SeqCst), 2);

        store.get_regional_data("r1", 2015, "pop").unwrap();
        assert_eq!(store.source().record_loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_duplicate_year_keeps_later_row() {
        let mut first = zero_record("r1", 2015);
        first.pop = 1.0;
        let mut second = zero_record("r1", 2015);
        second.pop = 2.0;
        let store = RegionalDataStore::new(MemorySource::new(vec![first, second]));

        assert_eq!(store.get_field("r1", 2015, RegionalField::Pop).unwrap(), Some(2.0));
        assert_eq!(store.years("r1").unwrap(), vec![2015]);
    }

    #[test]
    fn test_reset() {
        let mut store = sample_store();
        store.load().unwrap();
        store.reset();
        assert_eq!(store.state(), LoadState::NotLoaded);

        store.load().unwrap();
        assert_eq!(store.source().record_loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_regions_and_years() {
        let store = RegionalDataStore::new(MemorySource::new(vec![
            zero_record("b", 2016),
            zero_record("a", 2015),
            zero_record("b", 2015),
        ]));

        assert_eq!(store.regions().unwrap(), vec!["a", "b"]);
        assert_eq!(store.years("b").unwrap(), vec![2015, 2016]);
        assert!(store.years("c").unwrap().is_empty());
    }

    #[test]
    fn test_variables() {
        let store = sample_store();
        let variables = store.variables().unwrap();
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].unit, "million");
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let store = Arc::new(sample_store());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.get_regional_data("r1", 2015, "emi_ind").unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(0.5));
        }
        assert_eq!(store.source().record_loads.load(Ordering::SeqCst), 1);
    }
}
