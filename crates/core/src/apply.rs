// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::TransitionResult;
use pcinv_domain::{
    CategoryRef, Hardware, HardwareFields, StatusQuantities, validate_hardware_fields,
};
use pcinv_history::{Actor, HardwareRef, HistoryAction, HistoryEvent};

/// Applies a command to a hardware row, producing the new row and one history event.
///
/// This function is pure and deterministic.
///
/// # Arguments
///
/// * `current` - The current row, or `None` when creating
/// * `command` - The command to apply
/// * `actor` - The user performing this action
/// * `now` - The timestamp to stamp onto the row
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the before/after rows and the history event
/// * `Err(CoreError)` if the command is invalid for the current row
///
/// # Errors
///
/// Returns an error if:
/// - A create is given an existing row, or any other command is given none
/// - The command needs an active row but the row is soft-deleted, or vice versa
/// - The command violates a domain rule (empty name, insufficient units, overflow)
#[allow(clippy::too_many_lines)]
pub fn apply(
    current: Option<&Hardware>,
    command: Command,
    actor: Actor,
    now: &str,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::Create {
            category,
            fields,
            quantities,
        } => create(current, category, fields, quantities, actor, now, HistoryAction::Added),
        Command::Import {
            category,
            fields,
            quantities,
        } => create(
            current,
            category,
            fields,
            quantities,
            actor,
            now,
            HistoryAction::Imported,
        ),
        Command::Update {
            category,
            fields,
            quantities,
        } => {
            let before: &Hardware = require_active(current)?;
            validate_hardware_fields(&fields)?;

            let details: String = describe_update(before, &category, &fields, quantities);
            let mut after: Hardware = before.clone();
            after.category = category;
            after.fields = fields;
            after.quantities = quantities;
            after.updated_at = now.to_string();

            Ok(transition(before, after, actor, HistoryAction::Updated, details))
        }
        Command::MoveStatus { from, to, quantity } => {
            let before: &Hardware = require_active(current)?;
            let quantity: u32 = quantity.unwrap_or_else(|| before.quantities.get(from));
            let quantities: StatusQuantities = before.quantities.move_units(from, to, quantity)?;

            let mut after: Hardware = before.clone();
            after.quantities = quantities;
            after.updated_at = now.to_string();

            let details: String = format!("Moved {quantity} unit(s) from {from} to {to}");
            Ok(transition(before, after, actor, HistoryAction::StatusChanged, details))
        }
        Command::MergeImport { quantities } => {
            let before: &Hardware = require_active(current)?;
            let merged: StatusQuantities = before.quantities.checked_add(&quantities)?;

            let mut after: Hardware = before.clone();
            after.quantities = merged;
            after.updated_at = now.to_string();

            let details: String = format!(
                "Merged CSV row into existing item: +{} unit(s)",
                quantities.total()
            );
            Ok(transition(before, after, actor, HistoryAction::ImportMerged, details))
        }
        Command::SoftDelete => {
            let before: &Hardware = require_active(current)?;

            let mut after: Hardware = before.clone();
            after.deleted_at = Some(now.to_string());
            after.updated_at = now.to_string();

            let event: HistoryEvent = HistoryEvent::new(
                actor,
                HistoryAction::Deleted,
                hardware_ref(before),
                before.quantities,
                StatusQuantities::ZERO,
                Some(format!(
                    "Deleted {} ({} unit(s))",
                    before.fields.name,
                    before.total_quantity()
                )),
            );
            Ok(TransitionResult {
                before: Some(before.clone()),
                after: Some(after),
                event,
            })
        }
        Command::Restore => {
            let before: &Hardware = require_deleted(current)?;

            let mut after: Hardware = before.clone();
            after.deleted_at = None;
            after.updated_at = now.to_string();

            let event: HistoryEvent = HistoryEvent::new(
                actor,
                HistoryAction::Restored,
                hardware_ref(before),
                StatusQuantities::ZERO,
                before.quantities,
                Some(format!(
                    "Restored {} ({} unit(s))",
                    before.fields.name,
                    before.total_quantity()
                )),
            );
            Ok(TransitionResult {
                before: Some(before.clone()),
                after: Some(after),
                event,
            })
        }
        Command::Purge => {
            let before: &Hardware = require_deleted(current)?;

            // The row is gone after this event, so the event cannot point at it.
            let mut hardware: HardwareRef = hardware_ref(before);
            hardware.hardware_id = None;

            let event: HistoryEvent = HistoryEvent::new(
                actor,
                HistoryAction::Purged,
                hardware,
                StatusQuantities::ZERO,
                StatusQuantities::ZERO,
                Some(format!("Permanently deleted {}", before.fields.name)),
            );
            Ok(TransitionResult {
                before: Some(before.clone()),
                after: None,
                event,
            })
        }
    }
}

fn create(
    current: Option<&Hardware>,
    category: CategoryRef,
    fields: HardwareFields,
    quantities: StatusQuantities,
    actor: Actor,
    now: &str,
    action: HistoryAction,
) -> Result<TransitionResult, CoreError> {
    if let Some(existing) = current {
        return Err(CoreError::HardwareAlreadyExists {
            hardware_id: existing.id,
        });
    }
    validate_hardware_fields(&fields)?;

    let after: Hardware = Hardware {
        id: None,
        category,
        fields,
        quantities,
        created_at: now.to_string(),
        updated_at: now.to_string(),
        deleted_at: None,
    };

    let source: &str = if action == HistoryAction::Imported {
        "Imported"
    } else {
        "Added"
    };
    let event: HistoryEvent = HistoryEvent::new(
        actor,
        action,
        hardware_ref(&after),
        StatusQuantities::ZERO,
        quantities,
        Some(format!(
            "{source} {} ({} unit(s))",
            after.fields.name,
            after.total_quantity()
        )),
    );

    Ok(TransitionResult {
        before: None,
        after: Some(after),
        event,
    })
}

fn require_active(current: Option<&Hardware>) -> Result<&Hardware, CoreError> {
    let hardware: &Hardware = current.ok_or(CoreError::HardwareNotFound)?;
    if hardware.is_deleted() {
        return Err(CoreError::HardwareDeleted {
            hardware_id: hardware.id,
        });
    }
    Ok(hardware)
}

fn require_deleted(current: Option<&Hardware>) -> Result<&Hardware, CoreError> {
    let hardware: &Hardware = current.ok_or(CoreError::HardwareNotFound)?;
    if !hardware.is_deleted() {
        return Err(CoreError::HardwareNotDeleted {
            hardware_id: hardware.id,
        });
    }
    Ok(hardware)
}

fn hardware_ref(hardware: &Hardware) -> HardwareRef {
    HardwareRef::new(
        hardware.id,
        hardware.fields.name.clone(),
        hardware.category.name.clone(),
        hardware.fields.serial_number.clone(),
    )
}

/// Builds a transition between two active rows, recording the real quantities.
fn transition(
    before: &Hardware,
    after: Hardware,
    actor: Actor,
    action: HistoryAction,
    details: String,
) -> TransitionResult {
    let event: HistoryEvent = HistoryEvent::new(
        actor,
        action,
        hardware_ref(&after),
        before.quantities,
        after.quantities,
        Some(details),
    );
    TransitionResult {
        before: Some(before.clone()),
        after: Some(after),
        event,
    }
}

fn describe_update(
    before: &Hardware,
    category: &CategoryRef,
    fields: &HardwareFields,
    quantities: StatusQuantities,
) -> String {
    let mut changed: Vec<&str> = Vec::new();
    if before.category.id != category.id {
        changed.push("category");
    }
    let pairs: [(&str, &String, &String); 6] = [
        ("name", &before.fields.name, &fields.name),
        ("type", &before.fields.hardware_type, &fields.hardware_type),
        ("brand", &before.fields.brand, &fields.brand),
        ("model", &before.fields.model, &fields.model),
        ("serial_number", &before.fields.serial_number, &fields.serial_number),
        ("location", &before.fields.location, &fields.location),
    ];
    for (label, old, new) in pairs {
        if old != new {
            changed.push(label);
        }
    }
    if before.quantities != quantities {
        changed.push("quantities");
    }

    if changed.is_empty() {
        String::from("No changes")
    } else {
        format!("Updated {}", changed.join(", "))
    }
}
