// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other persistence test also exercises connection setup, migrations,
//! and foreign key enforcement through `SqlitePersistence::new_in_memory()`.

use crate::tests::{TEST_NOW, create_test_persistence};
use crate::{SqlDialect, SqlitePersistence};
use pcinv_domain::Role;

#[test]
fn test_persistence_initialization() {
    let result: Result<SqlitePersistence, crate::error::PersistenceError> =
        SqlitePersistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = create_test_persistence();
    let mut db2 = create_test_persistence();

    db1.create_user("first", "First User", "Passw0rd!", Role::Admin, TEST_NOW)
        .unwrap();

    assert_eq!(db1.count_users().unwrap(), 1, "db1 should have 1 user");
    assert_eq!(db2.count_users().unwrap(), 0, "db2 should have 0 users (isolated)");
}

#[test]
fn test_migrations_applied_on_initialization() {
    let mut persistence = create_test_persistence();

    assert!(persistence.list_categories().unwrap().is_empty());
    assert!(persistence.list_users().unwrap().is_empty());
    assert_eq!(persistence.export_snapshot().unwrap().hardware.len(), 0);
}

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence = create_test_persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_sqlite_reports_sqlite_dialect() {
    let persistence = create_test_persistence();
    assert_eq!(persistence.sql_dialect(), SqlDialect::Sqlite);
}

#[test]
fn test_file_database_persists_between_connections() {
    let path = std::env::temp_dir().join(format!(
        "pcinv_init_test_{}_{}.db",
        std::process::id(),
        TEST_NOW.replace([' ', ':'], "-")
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = SqlitePersistence::new_with_file(&path)
            .unwrap()
            .with_password_cost(4);
        persistence.create_category("CPU", TEST_NOW).unwrap();
    }

    let mut reopened = SqlitePersistence::new_with_file(&path).unwrap();
    let categories = reopened.list_categories().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "CPU");

    drop(reopened);
    let _ = std::fs::remove_file(&path);
}
