// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod history_tests;
mod initialization_tests;

use pcinv::{Command, TransitionResult, apply};
use pcinv_domain::{CategoryRef, Hardware, HardwareFields, Role, StatusQuantities};
use pcinv_history::Actor;

use crate::{PersistedTransition, SqlitePersistence};

pub const TEST_NOW: &str = "2026-02-01 09:30:00";
pub const LATER: &str = "2026-02-01 10:15:00";

/// Lowest cost bcrypt accepts; keeps the suite fast.
pub const TEST_PASSWORD_COST: u32 = 4;

pub fn create_test_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory()
        .unwrap()
        .with_password_cost(TEST_PASSWORD_COST)
}

pub fn create_test_admin(persistence: &mut SqlitePersistence) -> i64 {
    persistence
        .create_user("admin", "Lab Admin", "Sup3rSecret!", Role::Admin, TEST_NOW)
        .unwrap()
}

pub fn create_test_actor(user_id: i64) -> Actor {
    Actor::new(Some(user_id), String::from("Lab Admin"))
}

pub fn create_test_category(persistence: &mut SqlitePersistence, name: &str) -> CategoryRef {
    let category_id: i64 = persistence.create_category(name, TEST_NOW).unwrap();
    CategoryRef::new(category_id, name)
}

pub fn create_test_fields(name: &str, serial_number: &str) -> HardwareFields {
    HardwareFields::new(name, "Memory", "Kingston", "KVR32", serial_number, "Lab 2")
}

/// Creates and persists a hardware row, returning it as stored.
pub fn create_test_hardware(
    persistence: &mut SqlitePersistence,
    actor: &Actor,
    category: &CategoryRef,
    name: &str,
    quantities: StatusQuantities,
) -> Hardware {
    let result: TransitionResult = apply(
        None,
        Command::Create {
            category: category.clone(),
            fields: create_test_fields(name, &format!("SN-{name}")),
            quantities,
        },
        actor.clone(),
        TEST_NOW,
    )
    .unwrap();
    let persisted: PersistedTransition = persistence.persist_transition(&result, TEST_NOW).unwrap();
    persistence
        .get_hardware(persisted.hardware_id.unwrap())
        .unwrap()
        .unwrap()
}

/// Applies a command to a stored row and persists the result.
pub fn apply_and_persist(
    persistence: &mut SqlitePersistence,
    actor: &Actor,
    hardware: &Hardware,
    command: Command,
    now: &str,
) -> PersistedTransition {
    let result: TransitionResult = apply(Some(hardware), command, actor.clone(), now).unwrap();
    persistence.persist_transition(&result, now).unwrap()
}
