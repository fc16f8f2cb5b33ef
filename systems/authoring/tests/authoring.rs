use std::collections::BTreeMap;

use building_hints_core::{DesiredTemplate, GroupId, GroupMembers, Slot, TownGroup};
use building_hints_system_authoring::{
    selectable_groups, AuthoringError, Preset, SlotConflict, TemplateDraft,
};

#[test]
fn blank_inputs_are_left_out_of_the_template() {
    let mut draft = TemplateDraft::reference();
    assert_eq!(draft.set_level("main", Some(20)), Ok(None));
    assert_eq!(draft.set_level("farm", Some(0)), Ok(None));

    let template = draft.finalize().expect("draft is valid");

    assert_eq!(template.len(), 2);
    assert_eq!(template.level("main"), Some(20));
    assert_eq!(template.level("farm"), Some(0));
    assert_eq!(template.level("wall"), None);
}

#[test]
fn second_level_one_special_resets_the_slot() {
    let mut draft = TemplateDraft::reference();
    assert_eq!(draft.set_level("oracle", Some(1)), Ok(None));

    let conflict = draft
        .set_level("tower", Some(1))
        .expect("tower is a known building");

    assert_eq!(
        conflict,
        Some(SlotConflict {
            slot: Slot::Right,
            reset: vec!["oracle", "tower"],
        })
    );
    assert_eq!(draft.level("oracle"), Some(0));
    assert_eq!(draft.level("tower"), Some(0));
}

#[test]
fn specials_in_different_slots_do_not_conflict() {
    let mut draft = TemplateDraft::reference();
    assert_eq!(draft.set_level("theater", Some(1)), Ok(None));
    assert_eq!(draft.set_level("trade_office", Some(1)), Ok(None));

    let template = draft.finalize().expect("one special per slot is valid");
    assert_eq!(template.level("theater"), Some(1));
    assert_eq!(template.level("trade_office"), Some(1));
}

#[test]
fn finalize_rejects_conflicting_seeded_template() {
    let saved: DesiredTemplate = [("library", 1), ("lighthouse", 1)].into_iter().collect();
    let draft = TemplateDraft::from_template(Default::default(), &saved);

    assert_eq!(
        draft.finalize(),
        Err(AuthoringError::SlotConflict(Slot::Left))
    );
}

#[test]
fn finalize_rejects_levels_above_maximum() {
    let mut draft = TemplateDraft::reference();
    assert_eq!(draft.set_level("hide", Some(11)), Ok(None));

    assert_eq!(
        draft.finalize(),
        Err(AuthoringError::LevelAboveMaximum {
            building: "hide",
            level: 11,
            max_level: 10,
        })
    );
}

#[test]
fn unknown_buildings_are_rejected() {
    let mut draft = TemplateDraft::reference();
    assert_eq!(
        draft.set_level("senate", Some(24)),
        Err(AuthoringError::UnknownBuilding(String::from("senate")))
    );
}

#[test]
fn preset_replaces_every_input() {
    let mut draft = TemplateDraft::reference();
    assert_eq!(draft.set_level("academy", Some(30)), Ok(None));

    draft.apply_preset(Preset::Nuke);
    let template = draft.finalize().expect("presets are valid");

    assert_eq!(template.level("academy"), None, "preset clears other inputs");
    assert_eq!(template.level("thermal"), Some(1));
    assert_eq!(template.level("farm"), Some(45));
    assert_eq!(template.len(), Preset::Nuke.levels().len());
}

#[test]
fn seeded_draft_round_trips_saved_template() {
    let saved: DesiredTemplate = [("main", 25), ("wall", 25), ("unknown", 3)]
        .into_iter()
        .collect();
    let draft = TemplateDraft::from_template(Default::default(), &saved);

    let template = draft.finalize().expect("saved template is valid");

    assert_eq!(template.level("main"), Some(25));
    assert_eq!(template.level("wall"), Some(25));
    assert_eq!(template.level("unknown"), None);
}

#[test]
fn virtual_groups_are_not_selectable() {
    let groups: BTreeMap<GroupId, TownGroup> = [
        (GroupId::ALL_TOWNS, TownGroup::new("All", GroupMembers::default())),
        (GroupId::UNGROUPED, TownGroup::new("Ungrouped", GroupMembers::default())),
        (GroupId::new(40), TownGroup::new("Offense", GroupMembers::default())),
        (GroupId::new(12), TownGroup::new("Defense", GroupMembers::default())),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        selectable_groups(&groups),
        vec![(GroupId::new(12), "Defense"), (GroupId::new(40), "Offense")]
    );
}

#[test]
fn strict_seeding_rejects_unknown_buildings() {
    let saved: DesiredTemplate = [("main", 25), ("senate", 24)].into_iter().collect();

    let error = TemplateDraft::try_from_template(Default::default(), &saved)
        .expect_err("senate is not part of the rule table");
    assert_eq!(error, AuthoringError::UnknownBuilding(String::from("senate")));
}
