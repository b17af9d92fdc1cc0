// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pcinv_domain::{CategoryRef, Hardware, HardwareFields, StatusQuantities};
use pcinv_history::Actor;

pub const TEST_NOW: &str = "2026-02-01 09:30:00";

pub fn create_test_actor() -> Actor {
    Actor::new(Some(1), String::from("Lab Admin"))
}

pub fn create_test_category() -> CategoryRef {
    CategoryRef::new(3, "RAM")
}

pub fn create_test_fields() -> HardwareFields {
    HardwareFields::new(
        "DDR4 16GB",
        "Memory",
        "Kingston",
        "KVR32N22D8/16",
        "KG-0001",
        "Lab 2",
    )
}

/// Creates a persisted, active hardware row.
pub fn create_test_hardware(quantities: StatusQuantities) -> Hardware {
    Hardware {
        id: Some(42),
        category: create_test_category(),
        fields: create_test_fields(),
        quantities,
        created_at: String::from("2026-01-01 08:00:00"),
        updated_at: String::from("2026-01-01 08:00:00"),
        deleted_at: None,
    }
}

/// Creates a persisted, soft-deleted hardware row.
pub fn create_deleted_hardware(quantities: StatusQuantities) -> Hardware {
    let mut hardware: Hardware = create_test_hardware(quantities);
    hardware.deleted_at = Some(String::from("2026-01-15 12:00:00"));
    hardware
}
