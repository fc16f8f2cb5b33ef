#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure decision system that classifies building cells against a template.
//!
//! [`evaluate`] runs in three phases:
//!
//! 1. slot occupancy is detected once for the whole town;
//! 2. every templated building is classified in rule order, and buildings
//!    that must be raised also flag their unmet prerequisites;
//! 3. prerequisites are flagged a second time so that a later downgrade
//!    classification can never hide an unmet requirement.
//!
//! The system never mutates its inputs. Running it twice on the same
//! snapshot yields the same [`HighlightMap`].

use std::cmp::Ordering;

use building_hints_core::{
    BuildingRule, CellHighlight, DesiredTemplate, HighlightMap, Slot, TownState,
    CAPITAL_BUILDING,
};

/// Special-slot occupancy of a town.
///
/// A slot counts as occupied when one of its special buildings is both
/// wanted by the template and already constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotOccupancy {
    left: bool,
    right: bool,
}

impl SlotOccupancy {
    /// Detects which slots hold a wanted, constructed special building.
    #[must_use]
    pub fn detect(current: &TownState, desired: &DesiredTemplate, rules: &[BuildingRule]) -> Self {
        let occupied = |slot: Slot| {
            rules.iter().any(|rule| {
                rule.slot() == Some(slot)
                    && desired.level(rule.id()).is_some_and(|level| level > 0)
                    && current.level(rule.id()) > 0
            })
        };

        Self {
            left: occupied(Slot::Left),
            right: occupied(Slot::Right),
        }
    }

    /// Reports whether the slot is occupied.
    #[must_use]
    pub const fn is_occupied(&self, slot: Slot) -> bool {
        match slot {
            Slot::Left => self.left,
            Slot::Right => self.right,
        }
    }

    /// Reports whether at least one slot is occupied.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.left || self.right
    }

    /// Reports whether both slots are occupied.
    #[must_use]
    pub const fn both(&self) -> bool {
        self.left && self.right
    }
}

/// Facts about a building that must be lowered.
#[derive(Clone, Copy, Debug)]
struct DowngradeContext {
    special: bool,
    capital: bool,
    occupancy: SlotOccupancy,
}

/// Single row of the downgrade decision table.
struct DowngradeCheck {
    applies: fn(&DowngradeContext) -> bool,
    outcome: CellHighlight,
}

/// Ordered downgrade checks. The first applicable row decides.
const DOWNGRADE_CHECKS: [DowngradeCheck; 4] = [
    // A special above its target is always flagged for removal.
    DowngradeCheck {
        applies: |context| context.special,
        outcome: CellHighlight::DowngradeBlockedBySpecial,
    },
    DowngradeCheck {
        applies: |context| context.capital && context.occupancy.any(),
        outcome: CellHighlight::DowngradeBlockedBySpecial,
    },
    DowngradeCheck {
        applies: |context| !context.capital && context.occupancy.both(),
        outcome: CellHighlight::DowngradeBlockedBySpecial,
    },
    DowngradeCheck {
        applies: |_| true,
        outcome: CellHighlight::DowngradeNeeded,
    },
];

fn classify_downgrade(rule: &BuildingRule, occupancy: SlotOccupancy) -> CellHighlight {
    let context = DowngradeContext {
        special: rule.is_special(),
        capital: rule.id() == CAPITAL_BUILDING,
        occupancy,
    };

    DOWNGRADE_CHECKS
        .iter()
        .find(|check| (check.applies)(&context))
        .map_or(CellHighlight::DowngradeNeeded, |check| check.outcome)
}

/// Flags every requirement of the rule the town has not reached yet.
///
/// Only direct prerequisites are considered.
fn mark_unmet_requirements(rule: &BuildingRule, current: &TownState, out: &mut HighlightMap) {
    for &(requirement, level) in rule.requirements() {
        if current.level(requirement) < level {
            out.mark(requirement, CellHighlight::UpgradeNeeded);
        }
    }
}

fn needs_upgrade(rule: &BuildingRule, current: &TownState, desired: &DesiredTemplate) -> bool {
    desired
        .level(rule.id())
        .is_some_and(|level| current.level(rule.id()) < level)
}

/// Classifies every building cell of a town.
///
/// Buildings absent from the template stay [`CellHighlight::None`] unless
/// they are an unmet prerequisite of a building that must be raised.
/// Template entries without a rule are ignored.
#[must_use]
pub fn evaluate(
    current: &TownState,
    desired: &DesiredTemplate,
    rules: &[BuildingRule],
) -> HighlightMap {
    let occupancy = SlotOccupancy::detect(current, desired, rules);
    let mut highlights = HighlightMap::new();

    for rule in rules {
        let Some(desired_level) = desired.level(rule.id()) else {
            continue;
        };

        match current.level(rule.id()).cmp(&desired_level) {
            Ordering::Less => {
                highlights.mark(rule.id(), CellHighlight::UpgradeNeeded);
                mark_unmet_requirements(rule, current, &mut highlights);
            }
            Ordering::Greater => {
                highlights.mark(rule.id(), classify_downgrade(rule, occupancy));
            }
            Ordering::Equal => {}
        }
    }

    for rule in rules {
        if needs_upgrade(rule, current, desired) {
            mark_unmet_requirements(rule, current, &mut highlights);
        }
    }

    highlights
}

#[cfg(test)]
mod tests {
    use super::*;
    use building_hints_core::REFERENCE_RULES;

    fn occupancy(left: bool, right: bool) -> SlotOccupancy {
        SlotOccupancy { left, right }
    }

    fn rule(id: &str) -> &'static BuildingRule {
        REFERENCE_RULES
            .iter()
            .find(|rule| rule.id() == id)
            .expect("reference rule exists")
    }

    #[test]
    fn decision_table_prefers_special_over_capital_rows() {
        assert_eq!(
            classify_downgrade(rule("statue"), occupancy(false, false)),
            CellHighlight::DowngradeBlockedBySpecial
        );
        assert_eq!(
            classify_downgrade(rule("main"), occupancy(true, false)),
            CellHighlight::DowngradeBlockedBySpecial
        );
        assert_eq!(
            classify_downgrade(rule("main"), occupancy(false, false)),
            CellHighlight::DowngradeNeeded
        );
    }

    #[test]
    fn regular_buildings_block_only_when_both_slots_are_occupied() {
        assert_eq!(
            classify_downgrade(rule("farm"), occupancy(true, false)),
            CellHighlight::DowngradeNeeded
        );
        assert_eq!(
            classify_downgrade(rule("farm"), occupancy(true, true)),
            CellHighlight::DowngradeBlockedBySpecial
        );
    }
}
