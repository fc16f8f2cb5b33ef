use building_hints_core::{
    BuildingRule, CellHighlight, DesiredTemplate, Slot, TownState, REFERENCE_RULES,
};
use building_hints_system_evaluation::{evaluate, SlotOccupancy};

fn town(levels: &[(&str, u32)]) -> TownState {
    levels.iter().copied().collect()
}

fn template(levels: &[(&str, u32)]) -> DesiredTemplate {
    levels.iter().copied().collect()
}

#[test]
fn raising_main_does_not_touch_unrelated_buildings() {
    let current = town(&[("main", 10), ("farm", 20)]);
    let desired = template(&[("main", 15)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(highlights.get("main"), CellHighlight::UpgradeNeeded);
    assert_eq!(
        highlights.get("farm"),
        CellHighlight::None,
        "farm has no template entry and main has no requirements",
    );
    assert_eq!(highlights.styled().count(), 1);
}

#[test]
fn upgrade_flags_every_unmet_prerequisite() {
    let current = town(&[("academy", 0), ("main", 3), ("farm", 2), ("barracks", 0)]);
    let desired = template(&[("academy", 5)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    for building in ["academy", "main", "farm", "barracks"] {
        assert_eq!(
            highlights.get(building),
            CellHighlight::UpgradeNeeded,
            "{building} should be flagged for upgrade",
        );
    }
    assert_eq!(
        highlights.get("ironer"),
        CellHighlight::None,
        "prerequisites of prerequisites are not chased",
    );
}

#[test]
fn met_prerequisites_are_not_flagged() {
    let current = town(&[("academy", 2), ("main", 8), ("farm", 10), ("barracks", 4)]);
    let desired = template(&[("academy", 5)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(highlights.get("main"), CellHighlight::None);
    assert_eq!(highlights.get("farm"), CellHighlight::None);
    assert_eq!(highlights.get("barracks"), CellHighlight::UpgradeNeeded);
}

#[test]
fn unwanted_special_is_flagged_for_removal() {
    let current = town(&[("oracle", 1), ("statue", 1)]);
    let desired = template(&[("oracle", 1), ("statue", 0)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(
        highlights.get("statue"),
        CellHighlight::DowngradeBlockedBySpecial
    );
    assert_eq!(highlights.get("oracle"), CellHighlight::None);
}

#[test]
fn plain_downgrade_without_specials() {
    let current = town(&[("main", 10)]);
    let desired = template(&[("main", 5)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(highlights.get("main"), CellHighlight::DowngradeNeeded);
}

#[test]
fn main_downgrade_is_blocked_while_one_slot_is_occupied() {
    let current = town(&[("main", 25), ("theater", 1)]);
    let desired = template(&[("main", 20), ("theater", 1)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(
        highlights.get("main"),
        CellHighlight::DowngradeBlockedBySpecial
    );
    assert_eq!(highlights.get("theater"), CellHighlight::None);
}

#[test]
fn regular_downgrade_is_blocked_only_when_both_slots_are_occupied() {
    let one_slot = town(&[("farm", 45), ("theater", 1)]);
    let both_slots = town(&[("farm", 45), ("theater", 1), ("trade_office", 1)]);
    let desired = template(&[("farm", 40), ("theater", 1), ("trade_office", 1)]);

    assert_eq!(
        evaluate(&one_slot, &desired, REFERENCE_RULES).get("farm"),
        CellHighlight::DowngradeNeeded
    );
    assert_eq!(
        evaluate(&both_slots, &desired, REFERENCE_RULES).get("farm"),
        CellHighlight::DowngradeBlockedBySpecial
    );
}

#[test]
fn unmet_prerequisite_overrides_its_own_downgrade() {
    // market sits above its target but below what hide requires.
    let current = town(&[("hide", 0), ("main", 10), ("storage", 10), ("market", 3)]);
    let desired = template(&[("hide", 10), ("market", 2)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(highlights.get("hide"), CellHighlight::UpgradeNeeded);
    assert_eq!(
        highlights.get("market"),
        CellHighlight::UpgradeNeeded,
        "the second pass must restore prerequisite highlights",
    );
}

#[test]
fn prerequisite_at_its_target_is_still_flagged() {
    let current = town(&[("wall", 0), ("main", 3), ("temple", 3)]);
    let desired = template(&[("wall", 10), ("main", 3)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(highlights.get("main"), CellHighlight::UpgradeNeeded);
    assert_eq!(highlights.get("temple"), CellHighlight::None);
}

#[test]
fn buildings_at_target_and_outside_the_template_stay_unstyled() {
    let current = town(&[
        ("main", 20),
        ("farm", 30),
        ("lumber", 12),
        ("storage", 25),
    ]);
    let desired = template(&[("main", 20), ("farm", 30)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    for rule in REFERENCE_RULES {
        assert_eq!(
            highlights.get(rule.id()),
            CellHighlight::None,
            "{} should not be styled",
            rule.id(),
        );
    }
}

#[test]
fn evaluation_is_idempotent() {
    let current = town(&[
        ("main", 25),
        ("farm", 45),
        ("academy", 3),
        ("theater", 1),
        ("oracle", 1),
        ("statue", 1),
        ("market", 30),
    ]);
    let desired = template(&[
        ("main", 20),
        ("academy", 30),
        ("theater", 1),
        ("statue", 0),
        ("oracle", 1),
        ("market", 10),
        ("docks", 10),
    ]);
    let current_before = current.clone();
    let desired_before = desired.clone();

    let first = evaluate(&current, &desired, REFERENCE_RULES);
    let second = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(first, second);
    assert_eq!(current, current_before, "town state must not be mutated");
    assert_eq!(desired, desired_before, "template must not be mutated");
}

#[test]
fn missing_levels_and_unknown_buildings_do_not_panic() {
    let current = TownState::new();
    let desired = template(&[("senate", 10), ("thermal", 1)]);

    let highlights = evaluate(&current, &desired, REFERENCE_RULES);

    assert_eq!(highlights.get("thermal"), CellHighlight::UpgradeNeeded);
    assert_eq!(
        highlights.get("senate"),
        CellHighlight::UpgradeNeeded,
        "requirements outside the rule table are still reported",
    );
    assert_eq!(highlights.get("farm"), CellHighlight::UpgradeNeeded);
    assert_eq!(highlights.get("docks"), CellHighlight::UpgradeNeeded);
}

#[test]
fn slot_occupancy_requires_wanted_and_built_special() {
    let desired = template(&[("oracle", 1), ("statue", 1), ("library", 1)]);

    let both_right = town(&[("oracle", 1), ("statue", 1)]);
    let occupancy = SlotOccupancy::detect(&both_right, &desired, REFERENCE_RULES);
    assert!(occupancy.is_occupied(Slot::Right));
    assert!(!occupancy.is_occupied(Slot::Left));

    let library_unwanted = template(&[("library", 0)]);
    let built_library = town(&[("library", 1)]);
    let occupancy = SlotOccupancy::detect(&built_library, &library_unwanted, REFERENCE_RULES);
    assert!(!occupancy.any(), "an unwanted special does not occupy its slot");

    let wanted_not_built = SlotOccupancy::detect(&TownState::new(), &desired, REFERENCE_RULES);
    assert_eq!(wanted_not_built, SlotOccupancy::default());
}

#[test]
fn custom_rule_sets_are_respected() {
    const RULES: &[BuildingRule] = &[
        BuildingRule::new("hall", 10, &[]),
        BuildingRule::new("shrine", 1, &[("hall", 4)]).in_slot(Slot::Left),
    ];
    let current = town(&[("hall", 2)]);
    let desired = template(&[("shrine", 1)]);

    let highlights = evaluate(&current, &desired, RULES);

    assert_eq!(highlights.get("shrine"), CellHighlight::UpgradeNeeded);
    assert_eq!(highlights.get("hall"), CellHighlight::UpgradeNeeded);
}
