#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the building hints workspace.
//!
//! This crate defines the immutable building rule table together with the
//! data exchanged between the host integration, the pure systems and the
//! adapters. Hosts implement [`TownDirectory`] to expose current building
//! levels and town groups, systems compare those levels against a
//! [`DesiredTemplate`] and report a [`CellHighlight`] per building cell, and
//! adapters implement [`HighlightSink`] to present the result.

pub mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rules::{BuildingRule, RuleTable, Slot, CAPITAL_BUILDING, REFERENCE_RULES};

/// Building level as reported by the game or requested by a template.
pub type Level = u32;

/// Unique identifier assigned to a town by the game.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TownId(u32);

impl TownId {
    /// Creates a new town identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a town group. Negative identifiers denote virtual groups
/// maintained by the game itself.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// Virtual group the game uses for "all towns".
    pub const ALL_TOWNS: GroupId = GroupId(-1);
    /// Virtual group the game uses for "towns without group".
    pub const UNGROUPED: GroupId = GroupId(-2);

    /// Creates a new group identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Reports whether the group is one of the game's virtual groups.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.0 == Self::ALL_TOWNS.0 || self.0 == Self::UNGROUPED.0
    }
}

/// Target building levels authored for a town group.
///
/// Buildings without an entry are not part of the template and are never
/// classified.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesiredTemplate {
    levels: BTreeMap<String, Level>,
}

impl DesiredTemplate {
    /// Creates an empty template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Desired level of the building, if the template mentions it.
    #[must_use]
    pub fn level(&self, building: &str) -> Option<Level> {
        self.levels.get(building).copied()
    }

    /// Sets the desired level of a building, returning the previous entry.
    pub fn set_level(&mut self, building: impl Into<String>, level: Level) -> Option<Level> {
        self.levels.insert(building.into(), level)
    }

    /// Iterates over the template entries ordered by building identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Level)> + '_ {
        self.levels
            .iter()
            .map(|(building, level)| (building.as_str(), *level))
    }

    /// Number of buildings mentioned by the template.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the template mentions no building at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Level)> for DesiredTemplate {
    fn from_iter<I: IntoIterator<Item = (K, Level)>>(iter: I) -> Self {
        Self {
            levels: iter
                .into_iter()
                .map(|(building, level)| (building.into(), level))
                .collect(),
        }
    }
}

/// Current building levels of a single town.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TownState {
    levels: BTreeMap<String, Level>,
}

impl TownState {
    /// Creates a town state without any constructed building.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level of the building. Buildings the provider did not report
    /// are treated as level zero.
    #[must_use]
    pub fn level(&self, building: &str) -> Level {
        self.levels.get(building).copied().unwrap_or(0)
    }

    /// Iterates over the reported levels ordered by building identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Level)> + '_ {
        self.levels
            .iter()
            .map(|(building, level)| (building.as_str(), *level))
    }
}

impl<K: Into<String>> FromIterator<(K, Level)> for TownState {
    fn from_iter<I: IntoIterator<Item = (K, Level)>>(iter: I) -> Self {
        Self {
            levels: iter
                .into_iter()
                .map(|(building, level)| (building.into(), level))
                .collect(),
        }
    }
}

/// Visual classification assigned to a single building cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellHighlight {
    /// Cell is left unstyled.
    #[default]
    None,
    /// Building must be raised, either for the template or as a prerequisite.
    UpgradeNeeded,
    /// Building must be lowered and interacts with a slot special.
    DowngradeBlockedBySpecial,
    /// Building must be lowered without any blocking interaction.
    DowngradeNeeded,
}

/// Highlights computed for the cells of one town row.
///
/// Cells that were never marked read as [`CellHighlight::None`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightMap {
    cells: BTreeMap<String, CellHighlight>,
}

impl HighlightMap {
    /// Creates a map where every cell reads as unstyled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight assigned to the building cell.
    #[must_use]
    pub fn get(&self, building: &str) -> CellHighlight {
        self.cells.get(building).copied().unwrap_or_default()
    }

    /// Overwrites the highlight of the building cell.
    pub fn mark(&mut self, building: &str, highlight: CellHighlight) {
        match self.cells.get_mut(building) {
            Some(cell) => *cell = highlight,
            None => {
                let _ = self.cells.insert(building.to_owned(), highlight);
            }
        }
    }

    /// Iterates over every marked cell ordered by building identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CellHighlight)> + '_ {
        self.cells
            .iter()
            .map(|(building, highlight)| (building.as_str(), *highlight))
    }

    /// Iterates over the cells that require styling.
    pub fn styled(&self) -> impl Iterator<Item = (&str, CellHighlight)> + '_ {
        self.iter()
            .filter(|(_, highlight)| *highlight != CellHighlight::None)
    }
}

/// Reference to a group member as exposed by the game: either a bare
/// identifier or a town handle carrying one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TownRef {
    /// Bare town identifier.
    Id(TownId),
    /// Town handle object.
    Handle {
        /// Identifier of the referenced town.
        id: TownId,
    },
}

impl TownRef {
    /// Identifier of the referenced town.
    #[must_use]
    pub const fn id(&self) -> TownId {
        match self {
            Self::Id(id) | Self::Handle { id } => *id,
        }
    }
}

/// Member collection of a town group. The game exposes it either as a list
/// or as a mapping keyed by town identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupMembers {
    /// Members listed in display order.
    List(Vec<TownRef>),
    /// Members keyed by an arbitrary string.
    Map(BTreeMap<String, TownRef>),
}

impl Default for GroupMembers {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl GroupMembers {
    /// Identifiers of every member town in iteration order.
    #[must_use]
    pub fn town_ids(&self) -> Vec<TownId> {
        match self {
            Self::List(members) => members.iter().map(TownRef::id).collect(),
            Self::Map(members) => members.values().map(TownRef::id).collect(),
        }
    }
}

/// Town group descriptor provided by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownGroup {
    /// Display name of the group.
    pub name: String,
    /// Towns assigned to the group.
    #[serde(default)]
    pub towns: GroupMembers,
}

impl TownGroup {
    /// Creates a group descriptor from its name and members.
    #[must_use]
    pub fn new(name: impl Into<String>, towns: GroupMembers) -> Self {
        Self {
            name: name.into(),
            towns,
        }
    }
}

/// Errors reported by a [`TownDirectory`] when its data cannot be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The host has not exposed town data yet.
    #[error("town data is unavailable: {0}")]
    TownsUnavailable(String),
    /// The host has not exposed town groups yet.
    #[error("town groups are unavailable: {0}")]
    GroupsUnavailable(String),
}

/// Source of current town levels and town groups.
pub trait TownDirectory {
    /// Current building levels keyed by town.
    fn towns(&self) -> Result<BTreeMap<TownId, TownState>, ProviderError>;

    /// Town groups keyed by group identifier.
    fn town_groups(&self) -> Result<BTreeMap<GroupId, TownGroup>, ProviderError>;

    /// Whether the building overview table is currently displayed.
    fn overview_loaded(&self) -> bool;
}

/// Output sink receiving per-cell highlights.
pub trait HighlightSink {
    /// Removes every highlight from the row of the town.
    fn clear_town(&mut self, town: TownId);

    /// Applies the highlight to the building cell of the town.
    fn highlight(&mut self, town: TownId, building: &str, highlight: CellHighlight);
}
