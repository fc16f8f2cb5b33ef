use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use building_hints_core::{
    GroupId, ProviderError, TownDirectory, TownGroup, TownId, TownState,
};
use serde::Deserialize;
use tracing::warn;

/// Game state captured from the building overview.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub(crate) struct Snapshot {
    /// Whether the overview table was on screen when the snapshot was taken.
    #[serde(default = "overview_loaded_by_default")]
    pub(crate) overview_loaded: bool,
    /// Current building levels keyed by town.
    #[serde(default)]
    pub(crate) towns: BTreeMap<TownId, TownState>,
    /// Town groups keyed by group identifier.
    #[serde(default)]
    pub(crate) groups: BTreeMap<GroupId, TownGroup>,
}

fn overview_loaded_by_default() -> bool {
    true
}

impl Snapshot {
    /// Reads a snapshot from a JSON file.
    pub(crate) fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot at {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse snapshot at {}", path.display()))
    }
}

/// Town directory backed by a snapshot file. A snapshot that failed to load
/// leaves the directory unavailable until the next successful reload.
#[derive(Debug, Default)]
pub(crate) struct SnapshotHost {
    snapshot: Option<Snapshot>,
}

impl SnapshotHost {
    /// Loads the snapshot at the path, keeping the host unavailable on failure.
    pub(crate) fn reload(&mut self, path: &Path) {
        self.snapshot = match Snapshot::read(path) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warn!(error = %format!("{error:#}"), "snapshot unavailable");
                None
            }
        };
    }

    /// Snapshot currently served, if any.
    pub(crate) fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }
}

impl From<Snapshot> for SnapshotHost {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }
}

impl TownDirectory for SnapshotHost {
    fn towns(&self) -> Result<BTreeMap<TownId, TownState>, ProviderError> {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.towns.clone())
            .ok_or_else(|| ProviderError::TownsUnavailable(String::from("no snapshot loaded")))
    }

    fn town_groups(&self) -> Result<BTreeMap<GroupId, TownGroup>, ProviderError> {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.groups.clone())
            .ok_or_else(|| ProviderError::GroupsUnavailable(String::from("no snapshot loaded")))
    }

    fn overview_loaded(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.overview_loaded)
    }
}
