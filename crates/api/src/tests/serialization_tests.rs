// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::json;

use crate::{
    Capability, CsvImportOutcome, CsvImportRowResult, HardwareRequest, MoveStatusRequest,
};

#[test]
fn test_capability_serializes_as_bool() {
    assert_eq!(serde_json::to_value(Capability::Allowed).unwrap(), json!(true));
    assert_eq!(serde_json::to_value(Capability::Denied).unwrap(), json!(false));
}

#[test]
fn test_import_row_result_is_flat() {
    let row = CsvImportRowResult {
        row_number: 4,
        name: Some(String::from("Mouse")),
        outcome: CsvImportOutcome::Merged { hardware_id: 9 },
    };

    assert_eq!(
        serde_json::to_value(&row).unwrap(),
        json!({
            "row_number": 4,
            "name": "Mouse",
            "outcome": "merged",
            "hardware_id": 9,
        })
    );
}

#[test]
fn test_hardware_request_defaults_optional_fields() {
    let request: HardwareRequest =
        serde_json::from_value(json!({ "name": "Dock", "category_id": 2, "in_use": 3 })).unwrap();

    assert_eq!(request.brand, "");
    assert_eq!(request.unused, 0);
    assert_eq!(request.in_use, 3);
}

#[test]
fn test_move_request_quantity_is_optional() {
    let request: MoveStatusRequest =
        serde_json::from_value(json!({ "from": "unused", "to": "repair" })).unwrap();

    assert_eq!(request.quantity, None);
}
