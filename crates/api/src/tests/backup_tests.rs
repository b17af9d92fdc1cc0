// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Duration;

use crate::tests::helpers::{
    ADMIN_PASSWORD, create_test_admin, create_test_category, create_test_hardware,
    create_test_staff, setup_persistence,
};
use crate::{
    ApiError, AuthenticationService, BACKUP_HEADER, HistoryQuery, ListHardwareQuery,
    LoginRequest, RestoreBackupRequest, download_backup, list_categories, list_hardware,
    list_history, login, restore_backup,
};

fn restore_request(sql_content: &str) -> RestoreBackupRequest {
    RestoreBackupRequest {
        sql_content: sql_content.to_string(),
    }
}

#[test]
fn test_backup_requires_admin() {
    let mut persistence = setup_persistence();
    let staff = create_test_staff(&mut persistence);

    let download = download_backup(&mut persistence, &staff);
    assert!(matches!(download, Err(ApiError::Unauthorized { .. })));

    let restore = restore_backup(&mut persistence, &staff, &restore_request(BACKUP_HEADER));
    assert!(matches!(restore, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_download_backup_names_file_and_starts_with_header() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);

    let download = download_backup(&mut persistence, &admin).unwrap();
    assert!(download.file_name.starts_with("pcinv_backup_"));
    assert!(download.file_name.ends_with(".sql"));
    assert!(download.body.starts_with(BACKUP_HEADER));
}

#[test]
fn test_restore_brings_back_backed_up_state() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let category_id = create_test_category(&mut persistence, &admin, "O'Reilly Books");
    create_test_hardware(&mut persistence, &admin, category_id, "Kindle", (2, 1, 0, 0));
    let backup = download_backup(&mut persistence, &admin).unwrap();

    let later = create_test_category(&mut persistence, &admin, "Later");
    create_test_hardware(&mut persistence, &admin, later, "Added after", (1, 0, 0, 0));

    let response =
        restore_backup(&mut persistence, &admin, &restore_request(&backup.body)).unwrap();
    assert_eq!(response.statements_executed, 8);

    let categories = list_categories(&mut persistence, &admin).unwrap();
    assert_eq!(categories.categories.len(), 1);
    assert_eq!(categories.categories[0].name, "O'Reilly Books");

    let hardware = list_hardware(&mut persistence, &admin, &ListHardwareQuery::default()).unwrap();
    assert_eq!(hardware.total, 1);
    assert_eq!(hardware.items[0].total_quantity, 3);

    let history = list_history(&mut persistence, &admin, &HistoryQuery::default()).unwrap();
    assert_eq!(history.total, 1);
}

#[test]
fn test_restore_ends_sessions_but_keeps_passwords() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    let credentials = LoginRequest {
        username: String::from("admin"),
        password: String::from(ADMIN_PASSWORD),
    };
    let token = login(&mut persistence, &credentials, Duration::hours(1))
        .unwrap()
        .session_token;
    let backup = download_backup(&mut persistence, &admin).unwrap();

    restore_backup(&mut persistence, &admin, &restore_request(&backup.body)).unwrap();

    assert!(AuthenticationService::validate_session(&mut persistence, &token).is_err());
    let user = persistence.get_user_by_id(admin.user_id).unwrap().unwrap();
    assert!(!user.is_active);
    login(&mut persistence, &credentials, Duration::hours(1)).unwrap();
}

#[test]
fn test_restore_rejects_unsafe_backup_before_running_anything() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    create_test_category(&mut persistence, &admin, "Keep me");

    let sql = format!("{BACKUP_HEADER}\nDELETE FROM categories;\nDROP TABLE users;\n");
    let result = restore_backup(&mut persistence, &admin, &restore_request(&sql));
    assert!(matches!(result, Err(ApiError::InvalidBackup { .. })));

    let categories = list_categories(&mut persistence, &admin).unwrap();
    assert_eq!(categories.categories.len(), 1);
}

#[test]
fn test_restore_without_header_is_rejected() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);

    let result = restore_backup(
        &mut persistence,
        &admin,
        &restore_request("DELETE FROM categories;"),
    );
    assert!(matches!(result, Err(ApiError::InvalidBackup { .. })));
}

#[test]
fn test_failing_statement_rolls_back_whole_restore() {
    let mut persistence = setup_persistence();
    let admin = create_test_admin(&mut persistence);
    create_test_category(&mut persistence, &admin, "Keep me");

    let sql = format!(
        "{BACKUP_HEADER}\n\
         DELETE FROM categories;\n\
         INSERT INTO categories (category_id, name, created_at) VALUES (1, 'A', '2026-01-01 00:00:00');\n\
         INSERT INTO categories (category_id, name, created_at) VALUES (1, 'B', '2026-01-01 00:00:00');\n"
    );
    let result = restore_backup(&mut persistence, &admin, &restore_request(&sql));
    match result.unwrap_err() {
        ApiError::InvalidBackup { reason } => assert!(reason.contains("Restore statement 3")),
        other => panic!("Expected InvalidBackup, got {other:?}"),
    }

    let categories = list_categories(&mut persistence, &admin).unwrap();
    assert_eq!(categories.categories.len(), 1);
    assert_eq!(categories.categories[0].name, "Keep me");
}
