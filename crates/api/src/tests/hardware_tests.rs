// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    create_test_admin, create_test_category, create_test_hardware, create_test_staff,
    hardware_request, setup_persistence,
};
use crate::{
    ApiError, BatchDeleteRequest, BatchMoveStatusRequest, HistoryQuery, ListHardwareQuery,
    MoveStatusRequest, batch_move_status, batch_soft_delete, create_hardware, get_hardware,
    list_hardware, list_history, move_hardware_status, purge_hardware, restore_hardware,
    soft_delete_hardware, update_hardware,
};

fn move_request(from: &str, to: &str, quantity: Option<u32>) -> MoveStatusRequest {
    MoveStatusRequest {
        from: from.to_string(),
        to: to.to_string(),
        quantity,
    }
}

#[test]
fn test_create_hardware_derives_total_and_writes_history() {
    let mut persistence = setup_persistence();
    let staff = create_test_staff(&mut persistence);
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Laptops");

    let response = create_hardware(
        &mut persistence,
        &staff,
        &hardware_request("  Latitude 5440 ", category_id, (3, 2, 1, 0)),
    )
    .unwrap();

    let hardware = response.hardware.unwrap();
    assert_eq!(hardware.name, "Latitude 5440");
    assert_eq!(hardware.category_name, "Laptops");
    assert_eq!(hardware.total_quantity, 6);

    let history = list_history(
        &mut persistence,
        &staff,
        &HistoryQuery {
            hardware_id: Some(hardware.hardware_id),
            ..HistoryQuery::default()
        },
    )
    .unwrap();
    assert_eq!(history.total, 1);
    let entry = &history.entries[0];
    assert_eq!(entry.history_id, response.history_id);
    assert_eq!(entry.action, "added");
    assert_eq!(entry.user_name, "Sam Staff");
    assert_eq!(entry.quantity_change, 6);
}

#[test]
fn test_create_hardware_requires_name() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Laptops");

    let result = create_hardware(
        &mut persistence,
        &admin,
        &hardware_request("   ", category_id, (1, 0, 0, 0)),
    );
    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "name"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_create_hardware_in_missing_category_is_not_found() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);

    let result = create_hardware(
        &mut persistence,
        &admin,
        &hardware_request("Orphan", 42, (1, 0, 0, 0)),
    );
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_update_hardware_reports_changed_fields() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let laptops = create_test_category(&mut persistence, &admin, "Laptops");
    let desktops = create_test_category(&mut persistence, &admin, "Desktops");
    let item = create_test_hardware(&mut persistence, &admin, laptops, "OptiPlex", (1, 0, 0, 0));

    let mut request = hardware_request("OptiPlex", desktops, (1, 1, 0, 0));
    request.location = String::from("Lab 2");
    let response = update_hardware(&mut persistence, &admin, item.hardware_id, &request).unwrap();

    let hardware = response.hardware.unwrap();
    assert_eq!(hardware.category_id, desktops);
    assert_eq!(hardware.total_quantity, 2);
    assert_eq!(
        response.message,
        "Updated category, location, quantities"
    );
}

#[test]
fn test_update_without_changes_is_still_recorded() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Laptops");
    let item = create_test_hardware(&mut persistence, &admin, category_id, "XPS", (1, 0, 0, 0));

    let response = update_hardware(
        &mut persistence,
        &admin,
        item.hardware_id,
        &hardware_request("XPS", category_id, (1, 0, 0, 0)),
    )
    .unwrap();

    assert_eq!(response.message, "No changes");
}

#[test]
fn test_move_status_moves_units_and_keeps_total() {
    let mut persistence = setup_persistence();
    let staff = create_test_staff(&mut persistence);
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Monitors");
    let item = create_test_hardware(&mut persistence, &staff, category_id, "P2422H", (5, 0, 0, 0));

    let response = move_hardware_status(
        &mut persistence,
        &staff,
        item.hardware_id,
        &move_request("unused", "in use", Some(3)),
    )
    .unwrap();

    let hardware = response.hardware.unwrap();
    assert_eq!(hardware.unused, 2);
    assert_eq!(hardware.in_use, 3);
    assert_eq!(hardware.total_quantity, 5);
}

#[test]
fn test_move_status_without_quantity_moves_everything() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Monitors");
    let item = create_test_hardware(&mut persistence, &admin, category_id, "P2422H", (0, 4, 0, 0));

    let response = move_hardware_status(
        &mut persistence,
        &admin,
        item.hardware_id,
        &move_request("in_use", "repair", None),
    )
    .unwrap();

    let hardware = response.hardware.unwrap();
    assert_eq!(hardware.in_use, 0);
    assert_eq!(hardware.repair, 4);
}

#[test]
fn test_move_status_rejects_insufficient_units() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Monitors");
    let item = create_test_hardware(&mut persistence, &admin, category_id, "P2422H", (1, 0, 0, 0));

    let result = move_hardware_status(
        &mut persistence,
        &admin,
        item.hardware_id,
        &move_request("unused", "damaged", Some(2)),
    );
    match result.unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => assert_eq!(rule, "sufficient_units"),
        other => panic!("Expected DomainRuleViolation, got {other:?}"),
    }

    let unchanged = get_hardware(&mut persistence, &admin, item.hardware_id).unwrap();
    assert_eq!(unchanged.unused, 1);
}

#[test]
fn test_move_status_rejects_same_status_and_unknown_status() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Monitors");
    let item = create_test_hardware(&mut persistence, &admin, category_id, "P2422H", (1, 0, 0, 0));

    let same = move_hardware_status(
        &mut persistence,
        &admin,
        item.hardware_id,
        &move_request("unused", "unused", Some(1)),
    );
    assert!(matches!(same, Err(ApiError::DomainRuleViolation { .. })));

    let unknown = move_hardware_status(
        &mut persistence,
        &admin,
        item.hardware_id,
        &move_request("unused", "lost", Some(1)),
    );
    match unknown.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "to"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_batch_move_is_all_or_nothing() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Keyboards");
    let plenty = create_test_hardware(&mut persistence, &admin, category_id, "K120", (5, 0, 0, 0));
    let few = create_test_hardware(&mut persistence, &admin, category_id, "K270", (1, 0, 0, 0));

    let result = batch_move_status(
        &mut persistence,
        &admin,
        &BatchMoveStatusRequest {
            hardware_ids: vec![plenty.hardware_id, few.hardware_id],
            from: String::from("unused"),
            to: String::from("in_use"),
            quantity: Some(2),
        },
    );
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));

    let untouched = get_hardware(&mut persistence, &admin, plenty.hardware_id).unwrap();
    assert_eq!(untouched.unused, 5);
}

#[test]
fn test_batch_move_without_quantity_skips_empty_rows() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Keyboards");
    let stocked = create_test_hardware(&mut persistence, &admin, category_id, "K120", (3, 0, 0, 0));
    let empty = create_test_hardware(&mut persistence, &admin, category_id, "K270", (0, 2, 0, 0));

    let response = batch_move_status(
        &mut persistence,
        &admin,
        &BatchMoveStatusRequest {
            hardware_ids: vec![stocked.hardware_id, empty.hardware_id, stocked.hardware_id],
            from: String::from("unused"),
            to: String::from("in_use"),
            quantity: None,
        },
    )
    .unwrap();

    assert_eq!(response.affected, 1);
    let moved = get_hardware(&mut persistence, &admin, stocked.hardware_id).unwrap();
    assert_eq!(moved.in_use, 3);
}

#[test]
fn test_batch_with_no_ids_is_invalid() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);

    let result = batch_soft_delete(
        &mut persistence,
        &admin,
        &BatchDeleteRequest {
            hardware_ids: Vec::new(),
        },
    );
    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "hardware_ids"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_soft_delete_hides_row_from_staff() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let staff = create_test_staff(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Printers");
    let item = create_test_hardware(
        &mut persistence,
        &admin,
        category_id,
        "LaserJet",
        (2, 0, 0, 0),
    );

    soft_delete_hardware(&mut persistence, &admin, item.hardware_id).unwrap();

    let staff_view = get_hardware(&mut persistence, &staff, item.hardware_id);
    assert!(matches!(staff_view, Err(ApiError::ResourceNotFound { .. })));

    let admin_view = get_hardware(&mut persistence, &admin, item.hardware_id).unwrap();
    assert!(admin_view.deleted_at.is_some());

    let active = list_hardware(&mut persistence, &staff, &ListHardwareQuery::default()).unwrap();
    assert_eq!(active.total, 0);
}

#[test]
fn test_staff_cannot_delete_or_list_deleted_rows() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let staff = create_test_staff(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Printers");
    let item = create_test_hardware(
        &mut persistence,
        &admin,
        category_id,
        "LaserJet",
        (2, 0, 0, 0),
    );

    let delete = soft_delete_hardware(&mut persistence, &staff, item.hardware_id);
    assert!(matches!(delete, Err(ApiError::Unauthorized { .. })));

    let listing = list_hardware(
        &mut persistence,
        &staff,
        &ListHardwareQuery {
            scope: Some(String::from("deleted")),
            ..ListHardwareQuery::default()
        },
    );
    assert!(matches!(listing, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_deleted_row_cannot_be_edited_until_restored() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Printers");
    let item = create_test_hardware(
        &mut persistence,
        &admin,
        category_id,
        "LaserJet",
        (2, 0, 0, 0),
    );
    soft_delete_hardware(&mut persistence, &admin, item.hardware_id).unwrap();

    let moved = move_hardware_status(
        &mut persistence,
        &admin,
        item.hardware_id,
        &move_request("unused", "in_use", Some(1)),
    );
    match moved.unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => assert_eq!(rule, "hardware_active"),
        other => panic!("Expected DomainRuleViolation, got {other:?}"),
    }

    let restored = restore_hardware(&mut persistence, &admin, item.hardware_id).unwrap();
    assert!(restored.hardware.unwrap().deleted_at.is_none());

    move_hardware_status(
        &mut persistence,
        &admin,
        item.hardware_id,
        &move_request("unused", "in_use", Some(1)),
    )
    .unwrap();
}

#[test]
fn test_restore_and_purge_require_deleted_row() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Printers");
    let item = create_test_hardware(
        &mut persistence,
        &admin,
        category_id,
        "LaserJet",
        (2, 0, 0, 0),
    );

    let restore = restore_hardware(&mut persistence, &admin, item.hardware_id);
    assert!(matches!(restore, Err(ApiError::DomainRuleViolation { .. })));

    let purge = purge_hardware(&mut persistence, &admin, item.hardware_id);
    assert!(matches!(purge, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_purge_removes_row_and_keeps_history() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "Printers");
    let item = create_test_hardware(
        &mut persistence,
        &admin,
        category_id,
        "LaserJet",
        (2, 0, 0, 0),
    );
    soft_delete_hardware(&mut persistence, &admin, item.hardware_id).unwrap();

    let response = purge_hardware(&mut persistence, &admin, item.hardware_id).unwrap();
    assert!(response.hardware.is_none());

    let gone = get_hardware(&mut persistence, &admin, item.hardware_id);
    assert!(matches!(gone, Err(ApiError::ResourceNotFound { .. })));

    let history = list_history(
        &mut persistence,
        &admin,
        &HistoryQuery {
            search: Some(String::from("LaserJet")),
            ..HistoryQuery::default()
        },
    )
    .unwrap();
    assert_eq!(history.total, 3);
    assert!(history.entries.iter().all(|entry| entry.hardware_id.is_none()));
    assert_eq!(history.entries[0].action, "purged");
}

#[test]
fn test_list_hardware_filters_and_pages() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let monitors = create_test_category(&mut persistence, &admin, "Monitors");
    let mice = create_test_category(&mut persistence, &admin, "Mice");
    for index in 0..5 {
        create_test_hardware(
            &mut persistence,
            &admin,
            monitors,
            &format!("Monitor {index}"),
            (1, 0, 0, 0),
        );
    }
    create_test_hardware(&mut persistence, &admin, mice, "Mouse", (0, 0, 1, 0));

    let page = list_hardware(
        &mut persistence,
        &admin,
        &ListHardwareQuery {
            category_id: Some(monitors),
            page: Some(2),
            per_page: Some(2),
            ..ListHardwareQuery::default()
        },
    )
    .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page, 2);

    let damaged = list_hardware(
        &mut persistence,
        &admin,
        &ListHardwareQuery {
            status: Some(String::from("damaged")),
            ..ListHardwareQuery::default()
        },
    )
    .unwrap();
    assert_eq!(damaged.total, 1);
    assert_eq!(damaged.items[0].name, "Mouse");

    let searched = list_hardware(
        &mut persistence,
        &admin,
        &ListHardwareQuery {
            search: Some(String::from("monitor 3")),
            ..ListHardwareQuery::default()
        },
    )
    .unwrap();
    assert_eq!(searched.total, 1);
}

#[test]
fn test_list_hardware_rejects_unknown_scope() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);

    let result = list_hardware(
        &mut persistence,
        &admin,
        &ListHardwareQuery {
            scope: Some(String::from("archived")),
            ..ListHardwareQuery::default()
        },
    );
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}
