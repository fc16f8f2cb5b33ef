#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure authoring system that edits building templates before they are saved.
//!
//! A [`TemplateDraft`] holds one optional level per building of the rule
//! table. Blank entries are left out of the saved template. Slot
//! exclusivity is enforced here, at authoring time; readers of stored
//! templates tolerate violations.

use std::{collections::BTreeMap, fmt, str::FromStr};

use building_hints_core::{
    BuildingRule, DesiredTemplate, GroupId, Level, RuleTable, Slot, TownGroup,
};
use thiserror::Error;

/// Built-in starting templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Offensive town built around the thermal baths.
    Nuke,
    /// Resource town built around the theater and the trade office.
    Theater,
}

impl Preset {
    /// Every preset in display order.
    pub const ALL: [Preset; 2] = [Preset::Nuke, Preset::Theater];

    /// Identifier used on the command line and in menus.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Nuke => "nuke",
            Self::Theater => "theater",
        }
    }

    /// Building levels of the preset.
    #[must_use]
    pub const fn levels(&self) -> &'static [(&'static str, Level)] {
        match self {
            Self::Nuke => &[
                ("thermal", 1),
                ("main", 10),
                ("farm", 45),
                ("hide", 0),
                ("lumber", 1),
                ("ironer", 1),
                ("stoner", 1),
                ("storage", 35),
            ],
            Self::Theater => &[
                ("theater", 1),
                ("main", 10),
                ("farm", 45),
                ("hide", 10),
                ("lumber", 40),
                ("ironer", 40),
                ("stoner", 40),
                ("storage", 35),
                ("trade_office", 1),
            ],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = AuthoringError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| AuthoringError::UnknownPreset(value.to_owned()))
    }
}

/// Notice emitted when more than one special of a slot was set to level 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotConflict {
    /// Slot holding the conflicting specials.
    pub slot: Slot,
    /// Buildings whose level was reset to zero.
    pub reset: Vec<&'static str>,
}

impl fmt::Display for SlotConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "only one {} place building can be at level 1",
            self.slot.name()
        )
    }
}

/// Errors raised while editing or finalising a draft.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthoringError {
    /// The building is not part of the rule table.
    #[error("unknown building `{0}`")]
    UnknownBuilding(String),
    /// The preset name is not recognised.
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
    /// A level exceeds what the building can reach.
    #[error("{building} cannot exceed level {max_level} (requested {level})")]
    LevelAboveMaximum {
        /// Building carrying the level.
        building: &'static str,
        /// Requested level.
        level: Level,
        /// Highest level the building can reach.
        max_level: Level,
    },
    /// More than one special of the slot is set to level 1.
    #[error("only one building on the {} side can be at level 1", .0.name())]
    SlotConflict(Slot),
}

/// Editable set of level inputs, one per building of the rule table.
#[derive(Clone, Debug)]
pub struct TemplateDraft<'a> {
    inputs: Vec<(&'a BuildingRule, Option<Level>)>,
}

impl TemplateDraft<'static> {
    /// Creates a blank draft over the reference rule table.
    #[must_use]
    pub fn reference() -> Self {
        Self::new(RuleTable::reference())
    }
}

impl<'a> TemplateDraft<'a> {
    /// Creates a draft with every input blank.
    #[must_use]
    pub fn new(table: RuleTable<'a>) -> Self {
        Self {
            inputs: table.iter().map(|rule| (rule, None)).collect(),
        }
    }

    /// Creates a draft seeded with a saved template. Template entries without
    /// a matching rule are dropped.
    #[must_use]
    pub fn from_template(table: RuleTable<'a>, template: &DesiredTemplate) -> Self {
        Self {
            inputs: table
                .iter()
                .map(|rule| (rule, template.level(rule.id())))
                .collect(),
        }
    }

    /// Creates a draft seeded with a template that may only mention
    /// buildings of the rule table.
    pub fn try_from_template(
        table: RuleTable<'a>,
        template: &DesiredTemplate,
    ) -> Result<Self, AuthoringError> {
        if let Some((unknown, _)) = template
            .iter()
            .find(|(building, _)| table.lookup(building).is_none())
        {
            return Err(AuthoringError::UnknownBuilding(unknown.to_owned()));
        }
        Ok(Self::from_template(table, template))
    }

    /// Current input of the building. `None` means the input is blank.
    #[must_use]
    pub fn level(&self, building: &str) -> Option<Level> {
        self.inputs
            .iter()
            .find(|(rule, _)| rule.id() == building)
            .and_then(|(_, level)| *level)
    }

    /// Iterates over every input in rule order.
    pub fn inputs(&self) -> impl Iterator<Item = (&'a BuildingRule, Option<Level>)> + '_ {
        self.inputs.iter().copied()
    }

    /// Changes the input of a building.
    ///
    /// Editing a special building re-validates its slot; a returned
    /// [`SlotConflict`] lists the inputs that were reset to zero.
    pub fn set_level(
        &mut self,
        building: &str,
        level: Option<Level>,
    ) -> Result<Option<SlotConflict>, AuthoringError> {
        let entry = self
            .inputs
            .iter_mut()
            .find(|(rule, _)| rule.id() == building)
            .ok_or_else(|| AuthoringError::UnknownBuilding(building.to_owned()))?;
        entry.1 = level;
        let slot = entry.0.slot();

        Ok(slot.and_then(|slot| self.normalize_slot(slot)))
    }

    /// Resets every level-1 special of the slot to zero when more than one
    /// of them is set to level 1.
    pub fn normalize_slot(&mut self, slot: Slot) -> Option<SlotConflict> {
        if self.level_one_count(slot) <= 1 {
            return None;
        }

        let mut reset = Vec::new();
        for (rule, input) in &mut self.inputs {
            if rule.slot() == Some(slot) && *input == Some(1) {
                *input = Some(0);
                reset.push(rule.id());
            }
        }
        Some(SlotConflict { slot, reset })
    }

    /// Replaces every input with the preset. Buildings the preset does not
    /// mention become blank.
    pub fn apply_preset(&mut self, preset: Preset) {
        let levels = preset.levels();
        for (rule, input) in &mut self.inputs {
            *input = levels
                .iter()
                .find(|(building, _)| *building == rule.id())
                .map(|(_, level)| *level);
        }
    }

    /// Validates the draft and produces the template to save.
    pub fn finalize(&self) -> Result<DesiredTemplate, AuthoringError> {
        for slot in Slot::ALL {
            if self.level_one_count(slot) > 1 {
                return Err(AuthoringError::SlotConflict(slot));
            }
        }

        let mut template = DesiredTemplate::new();
        for (rule, input) in &self.inputs {
            let Some(level) = *input else {
                continue;
            };
            if level > rule.max_level() {
                return Err(AuthoringError::LevelAboveMaximum {
                    building: rule.id(),
                    level,
                    max_level: rule.max_level(),
                });
            }
            let _ = template.set_level(rule.id(), level);
        }
        Ok(template)
    }

    fn level_one_count(&self, slot: Slot) -> usize {
        self.inputs
            .iter()
            .filter(|(rule, input)| rule.slot() == Some(slot) && *input == Some(1))
            .count()
    }
}

/// Town groups a template can be authored for, ordered by identifier. The
/// game's virtual groups are excluded.
#[must_use]
pub fn selectable_groups(groups: &BTreeMap<GroupId, TownGroup>) -> Vec<(GroupId, &str)> {
    groups
        .iter()
        .filter(|(id, _)| !id.is_virtual())
        .map(|(id, group)| (*id, group.name.as_str()))
        .collect()
}
