// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pcinv::Command;
use pcinv_domain::{HardwareStatus, StatusQuantities};
use pcinv_history::{HistoryAction, HistoryEntry};

use crate::tests::{
    LATER, TEST_NOW, apply_and_persist, create_test_actor, create_test_admin,
    create_test_category, create_test_hardware, create_test_persistence,
};
use crate::{HistoryFilter, SqlitePersistence};

fn actions(persistence: &mut SqlitePersistence, filter: &HistoryFilter) -> Vec<HistoryAction> {
    persistence
        .list_history(filter)
        .unwrap()
        .entries
        .into_iter()
        .map(|entry| entry.event.action)
        .collect()
}

#[test]
fn test_every_transition_appends_one_entry() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    let actor = create_test_actor(user_id);
    let category = create_test_category(&mut persistence, "RAM");
    let hardware = create_test_hardware(
        &mut persistence,
        &actor,
        &category,
        "DDR4 16GB",
        StatusQuantities::new(4, 0, 0, 0),
    );

    apply_and_persist(
        &mut persistence,
        &actor,
        &hardware,
        Command::MoveStatus {
            from: HardwareStatus::Unused,
            to: HardwareStatus::InUse,
            quantity: None,
        },
        LATER,
    );

    assert_eq!(
        actions(&mut persistence, &HistoryFilter::default()),
        vec![HistoryAction::StatusChanged, HistoryAction::Added],
        "newest entries come first"
    );
}

#[test]
fn test_entry_records_actor_quantities_and_change() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    let actor = create_test_actor(user_id);
    let category = create_test_category(&mut persistence, "RAM");
    let hardware = create_test_hardware(
        &mut persistence,
        &actor,
        &category,
        "DDR4 16GB",
        StatusQuantities::new(4, 1, 0, 0),
    );
    apply_and_persist(&mut persistence, &actor, &hardware, Command::SoftDelete, LATER);

    let page = persistence.list_history(&HistoryFilter::default()).unwrap();
    let entry: &HistoryEntry = &page.entries[0];

    assert_eq!(entry.event.action, HistoryAction::Deleted);
    assert_eq!(entry.event.actor.user_id, Some(user_id));
    assert_eq!(entry.event.actor.user_name, "Lab Admin");
    assert_eq!(entry.event.hardware.hardware_id, hardware.id);
    assert_eq!(entry.event.hardware.category_name, "RAM");
    assert_eq!(entry.event.before, StatusQuantities::new(4, 1, 0, 0));
    assert_eq!(entry.event.after, StatusQuantities::ZERO);
    assert_eq!(entry.quantity_change, -5);
    assert_eq!(entry.quantity_change, entry.event.quantity_change());
    assert_eq!(entry.created_at, LATER);
}

#[test]
fn test_purge_detaches_history_from_removed_row() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    let actor = create_test_actor(user_id);
    let category = create_test_category(&mut persistence, "RAM");
    let hardware = create_test_hardware(
        &mut persistence,
        &actor,
        &category,
        "DDR4 16GB",
        StatusQuantities::new(1, 0, 0, 0),
    );
    apply_and_persist(&mut persistence, &actor, &hardware, Command::SoftDelete, LATER);
    let deleted = persistence.get_hardware(hardware.id.unwrap()).unwrap().unwrap();
    apply_and_persist(&mut persistence, &actor, &deleted, Command::Purge, LATER);

    let page = persistence.list_history(&HistoryFilter::default()).unwrap();

    assert_eq!(page.total, 3);
    assert!(
        page.entries
            .iter()
            .all(|entry| entry.event.hardware.hardware_id.is_none())
    );
    assert!(
        page.entries
            .iter()
            .all(|entry| entry.event.hardware.hardware_name == "DDR4 16GB"),
        "entries keep the name of the purged row"
    );
}

#[test]
fn test_deleting_user_keeps_their_entries() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    let actor = create_test_actor(user_id);
    let category = create_test_category(&mut persistence, "RAM");
    create_test_hardware(
        &mut persistence,
        &actor,
        &category,
        "DDR4 16GB",
        StatusQuantities::new(1, 0, 0, 0),
    );

    persistence.delete_user(user_id).unwrap();

    let page = persistence.list_history(&HistoryFilter::default()).unwrap();
    assert_eq!(page.entries[0].event.actor.user_id, None);
    assert_eq!(page.entries[0].event.actor.user_name, "Lab Admin");
}

#[test]
fn test_history_filters() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    let actor = create_test_actor(user_id);
    let ram = create_test_category(&mut persistence, "RAM");
    let gpu = create_test_category(&mut persistence, "GPU");
    let stick = create_test_hardware(
        &mut persistence,
        &actor,
        &ram,
        "DDR4 16GB",
        StatusQuantities::new(2, 0, 0, 0),
    );
    create_test_hardware(
        &mut persistence,
        &actor,
        &gpu,
        "RTX 3060",
        StatusQuantities::new(1, 0, 0, 0),
    );
    apply_and_persist(&mut persistence, &actor, &stick, Command::SoftDelete, LATER);

    let by_hardware = HistoryFilter {
        hardware_id: stick.id,
        ..HistoryFilter::default()
    };
    assert_eq!(
        actions(&mut persistence, &by_hardware),
        vec![HistoryAction::Deleted, HistoryAction::Added]
    );

    let by_action = HistoryFilter {
        action: Some(String::from("added")),
        ..HistoryFilter::default()
    };
    assert_eq!(persistence.list_history(&by_action).unwrap().total, 2);

    let by_user = HistoryFilter {
        user_id: Some(user_id),
        ..HistoryFilter::default()
    };
    assert_eq!(persistence.list_history(&by_user).unwrap().total, 3);

    let by_search = HistoryFilter {
        search: Some(String::from("gpu")),
        ..HistoryFilter::default()
    };
    assert_eq!(persistence.list_history(&by_search).unwrap().total, 1);

    let by_details = HistoryFilter {
        search: Some(String::from("Deleted DDR4")),
        ..HistoryFilter::default()
    };
    assert_eq!(persistence.list_history(&by_details).unwrap().total, 1);
}

#[test]
fn test_history_date_range_is_inclusive() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    let actor = create_test_actor(user_id);
    let category = create_test_category(&mut persistence, "RAM");
    let hardware = create_test_hardware(
        &mut persistence,
        &actor,
        &category,
        "DDR4 16GB",
        StatusQuantities::new(2, 0, 0, 0),
    );
    apply_and_persist(&mut persistence, &actor, &hardware, Command::SoftDelete, LATER);

    let from_later = HistoryFilter {
        from: Some(String::from(LATER)),
        ..HistoryFilter::default()
    };
    assert_eq!(
        actions(&mut persistence, &from_later),
        vec![HistoryAction::Deleted]
    );

    let up_to_now = HistoryFilter {
        to: Some(String::from(TEST_NOW)),
        ..HistoryFilter::default()
    };
    assert_eq!(actions(&mut persistence, &up_to_now), vec![HistoryAction::Added]);

    let empty_window = HistoryFilter {
        from: Some(String::from("2026-03-01 00:00:00")),
        ..HistoryFilter::default()
    };
    assert_eq!(persistence.list_history(&empty_window).unwrap().total, 0);
}

#[test]
fn test_history_paging() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    let actor = create_test_actor(user_id);
    let category = create_test_category(&mut persistence, "Cables");
    for name in ["HDMI", "DisplayPort", "USB-C", "Cat6"] {
        create_test_hardware(
            &mut persistence,
            &actor,
            &category,
            name,
            StatusQuantities::new(1, 0, 0, 0),
        );
    }

    let page = persistence
        .list_history(&HistoryFilter {
            limit: Some(2),
            offset: Some(1),
            ..HistoryFilter::default()
        })
        .unwrap();

    assert_eq!(page.total, 4);
    let names: Vec<&str> = page
        .entries
        .iter()
        .map(|entry| entry.event.hardware.hardware_name.as_str())
        .collect();
    assert_eq!(names, vec!["USB-C", "DisplayPort"]);
}
