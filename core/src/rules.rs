//! Static building rules of the game.

use crate::Level;

/// Identifier of the town's main building. It interacts with both special
/// slots when lowered.
pub const CAPITAL_BUILDING: &str = "main";

/// Mutually-exclusive placement of special buildings. Only one building per
/// slot may be constructed at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Left special building slot.
    Left,
    /// Right special building slot.
    Right,
}

impl Slot {
    /// Every slot in display order.
    pub const ALL: [Slot; 2] = [Slot::Left, Slot::Right];

    /// Lowercase name of the slot.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Maximum level and unlock requirements of one building.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingRule {
    id: &'static str,
    max_level: Level,
    requirements: &'static [(&'static str, Level)],
    slot: Option<Slot>,
}

impl BuildingRule {
    /// Creates a rule for a regular building.
    #[must_use]
    pub const fn new(
        id: &'static str,
        max_level: Level,
        requirements: &'static [(&'static str, Level)],
    ) -> Self {
        Self {
            id,
            max_level,
            requirements,
            slot: None,
        }
    }

    /// Places the building into a mutually-exclusive slot.
    #[must_use]
    pub const fn in_slot(self, slot: Slot) -> Self {
        Self {
            slot: Some(slot),
            ..self
        }
    }

    /// Building identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Highest level the building can reach.
    #[must_use]
    pub const fn max_level(&self) -> Level {
        self.max_level
    }

    /// Minimum levels of other buildings needed to unlock this one.
    #[must_use]
    pub const fn requirements(&self) -> &'static [(&'static str, Level)] {
        self.requirements
    }

    /// Slot occupied by the building, if it is a special building.
    #[must_use]
    pub const fn slot(&self) -> Option<Slot> {
        self.slot
    }

    /// Reports whether the building is a mutually-exclusive special.
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.slot.is_some()
    }
}

/// Building rules of the game, ordered by identifier.
pub const REFERENCE_RULES: &[BuildingRule] = &[
    BuildingRule::new("academy", 36, &[("main", 8), ("farm", 6), ("barracks", 5)]),
    BuildingRule::new("barracks", 30, &[("main", 2), ("farm", 3), ("ironer", 1)]),
    BuildingRule::new("docks", 30, &[("main", 14), ("lumber", 15), ("ironer", 10)]),
    BuildingRule::new("farm", 45, &[]),
    BuildingRule::new("hide", 10, &[("main", 10), ("storage", 7), ("market", 4)]),
    BuildingRule::new("ironer", 40, &[("lumber", 1)]),
    BuildingRule::new("library", 1, &[("main", 24), ("docks", 5), ("academy", 20)])
        .in_slot(Slot::Left),
    BuildingRule::new("lighthouse", 1, &[("main", 24), ("docks", 20), ("academy", 5)])
        .in_slot(Slot::Left),
    BuildingRule::new("lumber", 40, &[]),
    BuildingRule::new(CAPITAL_BUILDING, 25, &[]),
    BuildingRule::new("market", 30, &[("main", 3), ("storage", 5)]),
    BuildingRule::new(
        "oracle",
        1,
        &[("main", 21), ("hide", 10), ("temple", 5), ("market", 5)],
    )
    .in_slot(Slot::Right),
    BuildingRule::new("statue", 1, &[("main", 21), ("temple", 12), ("market", 5)])
        .in_slot(Slot::Right),
    BuildingRule::new("stoner", 40, &[]),
    BuildingRule::new("storage", 35, &[]),
    BuildingRule::new("temple", 30, &[("main", 1), ("stoner", 1)]),
    BuildingRule::new(
        "theater",
        1,
        &[("main", 24), ("lumber", 35), ("ironer", 32), ("docks", 5)],
    )
    .in_slot(Slot::Left),
    BuildingRule::new("thermal", 1, &[("senate", 24), ("farm", 35), ("docks", 5)])
        .in_slot(Slot::Left),
    BuildingRule::new(
        "tower",
        1,
        &[("main", 21), ("wall", 20), ("temple", 5), ("market", 5)],
    )
    .in_slot(Slot::Right),
    BuildingRule::new(
        "trade_office",
        1,
        &[("main", 21), ("market", 15), ("temple", 5)],
    )
    .in_slot(Slot::Right),
    BuildingRule::new("wall", 25, &[("main", 5), ("temple", 3)]),
];

/// Read-only, ordered view over a set of building rules.
#[derive(Clone, Copy, Debug)]
pub struct RuleTable<'a> {
    rules: &'a [BuildingRule],
}

impl Default for RuleTable<'static> {
    fn default() -> Self {
        Self::reference()
    }
}

impl RuleTable<'static> {
    /// Table backed by the game's reference rules.
    #[must_use]
    pub const fn reference() -> Self {
        Self {
            rules: REFERENCE_RULES,
        }
    }
}

impl<'a> RuleTable<'a> {
    /// Wraps an arbitrary ordered rule set.
    #[must_use]
    pub const fn new(rules: &'a [BuildingRule]) -> Self {
        Self { rules }
    }

    /// Looks up the rule of a building.
    #[must_use]
    pub fn lookup(&self, building: &str) -> Option<&'a BuildingRule> {
        self.rules.iter().find(|rule| rule.id() == building)
    }

    /// Rules in table order.
    #[must_use]
    pub const fn rules(&self) -> &'a [BuildingRule] {
        self.rules
    }

    /// Iterates over the rules in table order.
    pub fn iter(&self) -> impl Iterator<Item = &'a BuildingRule> {
        self.rules.iter()
    }

    /// Iterates over the special buildings placed in the slot.
    pub fn in_slot(&self, slot: Slot) -> impl Iterator<Item = &'a BuildingRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.slot() == Some(slot))
    }
}
