#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence of per-group building templates.
//!
//! Templates live in a flat key-value text store, one entry per town group
//! under the key `buildingTemplate_<groupId>`. Each value is a JSON object
//! mapping building identifiers to desired levels. The storage backend is
//! abstracted behind [`KeyValueStorage`] so hosts can plug in whatever
//! persistence they have available.

mod file;
mod memory;

use std::{io, path::PathBuf};

use building_hints_core::{DesiredTemplate, GroupId};
use thiserror::Error;
use tracing::debug;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

/// Prefix of every template key.
pub const TEMPLATE_KEY_PREFIX: &str = "buildingTemplate_";

/// Storage key holding the template of the group.
#[must_use]
pub fn template_key(group: GroupId) -> String {
    format!("{TEMPLATE_KEY_PREFIX}{}", group.get())
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage file {path} could not be accessed")]
    Io {
        /// Location of the backing file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backing file does not contain a flat JSON object of strings.
    #[error("storage file {path} is corrupt")]
    Corrupt {
        /// Location of the backing file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Flat text key-value store, modelled after browser local storage.
pub trait KeyValueStorage {
    /// Retrieves the value stored under the key.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores the value under the key, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Keys currently present in the store.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Errors raised while loading or saving templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The stored value is not a JSON object of non-negative integer levels.
    #[error("template of group {group} is malformed")]
    Malformed {
        /// Group whose template failed to parse.
        group: i64,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes a template value as written by [`encode_template`].
pub fn decode_template(value: &str) -> Result<DesiredTemplate, serde_json::Error> {
    serde_json::from_str(value)
}

/// Encodes a template into its stored JSON representation.
#[must_use]
pub fn encode_template(template: &DesiredTemplate) -> String {
    serde_json::to_string(template).unwrap_or_else(|_| String::from("{}"))
}

/// Typed access to the templates held by a key-value store.
#[derive(Debug, Default)]
pub struct TemplateStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> TemplateStore<S> {
    /// Wraps a storage backend.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Loads the template of the group. Returns `Ok(None)` when the group has
    /// no template yet or its stored value is blank.
    pub fn load(&self, group: GroupId) -> Result<Option<DesiredTemplate>, TemplateError> {
        let key = template_key(group);
        let Some(value) = self.storage.get(&key)? else {
            return Ok(None);
        };
        if value.trim().is_empty() {
            return Ok(None);
        }

        let template = decode_template(&value).map_err(|source| TemplateError::Malformed {
            group: group.get(),
            source,
        })?;
        Ok(Some(template))
    }

    /// Saves the template of the group, replacing any previous template.
    pub fn save(&mut self, group: GroupId, template: &DesiredTemplate) -> Result<(), TemplateError> {
        let key = template_key(group);
        let value = encode_template(template);
        debug!(%key, buildings = template.len(), "saving building template");
        self.storage.set(&key, value)?;
        Ok(())
    }

    /// Groups that currently have a stored template, ordered by identifier.
    pub fn groups(&self) -> Result<Vec<GroupId>, TemplateError> {
        let mut groups: Vec<GroupId> = self
            .storage
            .keys()?
            .iter()
            .filter_map(|key| key.strip_prefix(TEMPLATE_KEY_PREFIX))
            .filter_map(|id| id.parse::<i64>().ok())
            .map(GroupId::new)
            .collect();
        groups.sort_unstable();
        Ok(groups)
    }

    /// Borrows the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the store and returns the storage backend.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_the_storage_naming_scheme() {
        assert_eq!(template_key(GroupId::new(42)), "buildingTemplate_42");
        assert_eq!(template_key(GroupId::new(-1)), "buildingTemplate_-1");
    }

    #[test]
    fn negative_and_fractional_levels_are_rejected() {
        assert!(decode_template(r#"{"main": -1}"#).is_err());
        assert!(decode_template(r#"{"main": 2.5}"#).is_err());
        assert!(decode_template(r#"["main"]"#).is_err());
        assert!(decode_template(r#"{"main": 25, "farm": 0}"#).is_ok());
    }
}
