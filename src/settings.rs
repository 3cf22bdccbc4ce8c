//! User settings that survive restarts. Values live in a keyed [Storage]
//! backend, and every key has a typed default so reads never fail.

use crate::error::Error;
use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use log::{error, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

/// Keys for persisted settings. These are *not* the same namespace as message
/// field IDs; key 0 is reserved and never used.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum SettingKey {
    LightColorScheme,
    DegreeCelsius,
    LastTemperature,
}

impl SettingKey {
    /// Numeric key in the backing store
    pub const fn id(self) -> u32 {
        match self {
            Self::LightColorScheme => 1,
            Self::DegreeCelsius => 2,
            Self::LastTemperature => 3,
        }
    }

    /// Value to use when the key has never been written. The last
    /// temperature has no default; it's absent until the first reading.
    pub const fn default_value(self) -> Option<StoredValue> {
        match self {
            Self::LightColorScheme => Some(StoredValue::Bool(true)),
            Self::DegreeCelsius => Some(StoredValue::Bool(true)),
            Self::LastTemperature => None,
        }
    }
}

/// A single value in the store
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Bool(bool),
    Int(i32),
}

/// Durable key-value storage provided by the platform. Writes must be durable
/// before they return.
pub trait Storage {
    fn read(&self, key: u32) -> Option<StoredValue>;

    fn write(&mut self, key: u32, value: StoredValue) -> anyhow::Result<()>;
}

/// Typed view over a [Storage] backend
#[derive(Debug)]
pub struct Settings<S> {
    storage: S,
    /// Values whose write failed this session. These take precedence over
    /// the backend so the display keeps showing what the user asked for.
    unsaved: IndexMap<SettingKey, StoredValue>,
}

impl<S: Storage> Settings<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            unsaved: IndexMap::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get the current value for a key, falling back to its default
    pub fn get(&self, key: SettingKey) -> Option<StoredValue> {
        self.unsaved
            .get(&key)
            .copied()
            .or_else(|| self.storage.read(key.id()))
            .or_else(|| key.default_value())
    }

    /// Write a value through to storage. On failure the value is still
    /// visible to [Self::get] for the rest of the session.
    pub fn set(
        &mut self,
        key: SettingKey,
        value: StoredValue,
    ) -> Result<(), Error> {
        trace!("Saving setting {key:?} = {value:?}");
        match self.storage.write(key.id(), value) {
            Ok(()) => {
                self.unsaved.shift_remove(&key);
                Ok(())
            }
            Err(err) => {
                self.unsaved.insert(key, value);
                Err(Error::storage(key, err))
            }
        }
    }

    pub fn light_color_scheme(&self) -> bool {
        self.get_bool(SettingKey::LightColorScheme)
    }

    pub fn degree_celsius(&self) -> bool {
        self.get_bool(SettingKey::DegreeCelsius)
    }

    pub fn last_temperature(&self) -> Option<i32> {
        match self.get(SettingKey::LastTemperature)? {
            StoredValue::Int(celsius) => Some(celsius),
            other => {
                warn!("Ignoring non-integer last temperature {other:?}");
                None
            }
        }
    }

    pub fn set_light_color_scheme(&mut self, light: bool) -> Result<(), Error> {
        self.set(SettingKey::LightColorScheme, StoredValue::Bool(light))
    }

    pub fn set_degree_celsius(&mut self, celsius: bool) -> Result<(), Error> {
        self.set(SettingKey::DegreeCelsius, StoredValue::Bool(celsius))
    }

    pub fn set_last_temperature(&mut self, celsius: i32) -> Result<(), Error> {
        self.set(SettingKey::LastTemperature, StoredValue::Int(celsius))
    }

    fn get_bool(&self, key: SettingKey) -> bool {
        let default =
            matches!(key.default_value(), Some(StoredValue::Bool(true)));
        match self.get(key) {
            Some(StoredValue::Bool(value)) => value,
            other => {
                warn!("Ignoring non-boolean value {other:?} for {key:?}");
                default
            }
        }
    }
}

/// Settings kept in a JSON file. The whole map is loaded on open and
/// rewritten on every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: IndexMap<u32, StoredValue>,
}

impl FileStore {
    /// Load settings from the given file. A missing or unreadable file gives
    /// an empty store, so every setting reads as its default.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Self {
                path,
                values: IndexMap::new(),
            };
        }

        // Shitty try block
        let load = || {
            let contents = fs::read(&path)?;
            Ok::<IndexMap<u32, StoredValue>, anyhow::Error>(
                serde_json::from_slice(&contents)?,
            )
        };
        let values = match load() {
            Ok(values) => values,
            Err(err) => {
                error!("Error loading settings from {}: {err}", path.display());
                IndexMap::new()
            }
        };
        Self { path, values }
    }

    /// Write to a sibling file, sync it, then rename over the real one so a
    /// crash mid-write never leaves a truncated file behind
    fn persist(&self, values: &IndexMap<u32, StoredValue>) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(values)?;
        let temp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).with_context(|| {
            format!("Error creating {}", temp_path.display())
        })?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Error saving settings to {}", self.path.display())
        })?;
        Ok(())
    }
}

impl Storage for FileStore {
    fn read(&self, key: u32) -> Option<StoredValue> {
        self.values.get(&key).copied()
    }

    fn write(&mut self, key: u32, value: StoredValue) -> anyhow::Result<()> {
        let mut values = self.values.clone();
        values.insert(key, value);
        self.persist(&values)?;
        self.values = values;
        Ok(())
    }
}

/// In-memory storage, for tests and for running without a settings file
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: IndexMap<u32, StoredValue>,
    fail_writes: bool,
}

impl MemoryStore {
    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            values: IndexMap::new(),
            fail_writes: true,
        }
    }

    /// Pre-populate a value, as if written by a previous run
    pub fn with(mut self, key: SettingKey, value: StoredValue) -> Self {
        self.values.insert(key.id(), value);
        self
    }
}

impl Storage for MemoryStore {
    fn read(&self, key: u32) -> Option<StoredValue> {
        self.values.get(&key).copied()
    }

    fn write(&mut self, key: u32, value: StoredValue) -> anyhow::Result<()> {
        if self.fail_writes {
            return Err(anyhow!("Storage is full"));
        }
        self.values.insert(key, value);
        Ok(())
    }
}
