// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use pcinv_domain::{Role, now_timestamp};
use pcinv_persistence::Persistence;

use crate::{
    AuthenticatedActor, CategoryNameRequest, HardwareInfo, HardwareRequest, create_category,
    create_hardware,
};

pub const ADMIN_PASSWORD: &str = "Admin-Pass-1";
pub const STAFF_PASSWORD: &str = "Staff-Pass-1";

/// Creates an in-memory database with a cheap bcrypt cost.
pub fn setup_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap().with_password_cost(4)
}

fn create_actor(
    persistence: &mut Persistence,
    username: &str,
    full_name: &str,
    password: &str,
    role: Role,
) -> AuthenticatedActor {
    let now: String = now_timestamp().unwrap();
    let user_id: i64 = persistence
        .create_user(username, full_name, password, role, &now)
        .unwrap();
    AuthenticatedActor::new(user_id, username.to_string(), full_name.to_string(), role)
}

/// Creates the admin account `admin` / "Alice Admin".
pub fn create_test_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(
        persistence,
        "admin",
        "Alice Admin",
        ADMIN_PASSWORD,
        Role::Admin,
    )
}

/// Creates the staff account `staff` / "Sam Staff".
pub fn create_test_staff(persistence: &mut Persistence) -> AuthenticatedActor {
    create_actor(
        persistence,
        "staff",
        "Sam Staff",
        STAFF_PASSWORD,
        Role::Staff,
    )
}

/// Creates a category through the handler and returns its ID.
pub fn create_test_category(
    persistence: &mut Persistence,
    admin: &AuthenticatedActor,
    name: &str,
) -> i64 {
    create_category(
        persistence,
        admin,
        &CategoryNameRequest {
            name: name.to_string(),
        },
    )
    .unwrap()
    .category_id
}

/// A hardware request with the given name and quantities and no other fields.
pub fn hardware_request(
    name: &str,
    category_id: i64,
    quantities: (u32, u32, u32, u32),
) -> HardwareRequest {
    let (unused, in_use, damaged, repair) = quantities;
    HardwareRequest {
        name: name.to_string(),
        category_id,
        hardware_type: String::new(),
        brand: String::from("Dell"),
        model: String::new(),
        serial_number: String::new(),
        location: String::from("Lab 1"),
        unused,
        in_use,
        damaged,
        repair,
    }
}

/// Creates a hardware row through the handler.
pub fn create_test_hardware(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    category_id: i64,
    name: &str,
    quantities: (u32, u32, u32, u32),
) -> HardwareInfo {
    create_hardware(
        persistence,
        actor,
        &hardware_request(name, category_id, quantities),
    )
    .unwrap()
    .hardware
    .unwrap()
}
