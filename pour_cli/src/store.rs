//! TOML-backed key-value option store with atomic writes.
//!
//! Holds the counters that outlive the process: lifetime pulse total and
//! completed pour count (and whatever else a presenter wants to stash,
//! e.g. vote tallies). Writes go through a write-then-rename so a crash
//! mid-save never truncates the previous state.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use pour_core::FlowMeter;
use pour_traits::OptionStore;

pub const KEY_LIFETIME_PULSES: &str = "lifetime_pulses";
pub const KEY_POURS: &str = "pours";

pub struct TomlStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> eyre::Result<Self> {
        let values = if path.exists() {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("read state file {}", path.display()))?;
            toml::from_str::<BTreeMap<String, String>>(&text)
                .wrap_err_with(|| format!("parse state file {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Persist the current values atomically (write temp file, fsync,
    /// rename over the old one).
    pub fn save(&self) -> eyre::Result<()> {
        let text = toml::to_string(&self.values).wrap_err("serialize state")?;
        write_atomic(&self.path, text.as_bytes())
            .wrap_err_with(|| format!("write state file {}", self.path.display()))
    }

    fn get_u64(&self, key: &str) -> u64 {
        self.values
            .get(key)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }
}

impl OptionStore for TomlStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.values.insert(key.to_string(), value.to_string());
        self.save().map_err(|e| e.to_string().into())
    }
}

/// Read the persisted counters, defaulting to zero for anything missing or
/// unparseable (a fresh or hand-edited store is not an error).
pub fn load_counters(store: &TomlStore) -> (u64, u64) {
    (store.get_u64(KEY_LIFETIME_PULSES), store.get_u64(KEY_POURS))
}

/// Persist the meter's counters.
pub fn save_counters(store: &mut TomlStore, meter: &FlowMeter) -> eyre::Result<()> {
    store
        .values
        .insert(KEY_LIFETIME_PULSES.into(), meter.lifetime_pulses().to_string());
    store
        .values
        .insert(KEY_POURS.into(), meter.completed_pours().to_string());
    store.save()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("new");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::open(&dir.path().join("state.toml")).unwrap();
        assert_eq!(load_counters(&store), (0, 0));
    }

    #[test]
    fn counters_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let mut store = TomlStore::open(&path).unwrap();
        store.put(KEY_LIFETIME_PULSES, "12345").unwrap();
        store.put(KEY_POURS, "7").unwrap();

        let reopened = TomlStore::open(&path).unwrap();
        assert_eq!(load_counters(&reopened), (12_345, 7));
    }

    #[test]
    fn garbage_values_fall_back_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "lifetime_pulses = \"not a number\"\n").unwrap();

        let store = TomlStore::open(&path).unwrap();
        assert_eq!(load_counters(&store), (0, 0));
    }
}
