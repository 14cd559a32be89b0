//! Shared handler bodies for the per-module dictionary endpoints.

use crate::api::snapshot;
use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::stores::dictionary_store::{DictionaryChanges, DictionaryEntry, NewDictionaryEntry};
use crate::types::dto::keys::{
    CreateDictionaryItemRequest, DictionaryItemDto, UpdateDictionaryItemRequest,
};
use crate::types::internal::audit::{AuditAction, AuditRecord};
use crate::types::internal::auth::SessionUser;
use crate::types::internal::dictionary::DictionaryKind;

pub(crate) fn parse_kind(
    value: &str,
    allowed: &[DictionaryKind],
) -> Result<DictionaryKind, ApiError> {
    DictionaryKind::parse(value)
        .filter(|kind| allowed.contains(kind))
        .ok_or_else(|| ApiError::validation("Unknown dictionary type"))
}

pub(crate) fn dictionary_dto(entry: &DictionaryEntry) -> DictionaryItemDto {
    DictionaryItemDto {
        id: entry.id,
        name: entry.name.clone(),
        bios_name: entry.bios_name.clone(),
        drawer_type: entry.drawer_type.clone(),
        version: entry.version.clone(),
        reno_id: entry.reno_id.clone(),
        file_path: entry.file_path.clone(),
        is_active: entry.is_active,
    }
}

pub(crate) async fn list(
    app: &AppData,
    kind: DictionaryKind,
    search: Option<&str>,
    active_only: bool,
) -> Result<Vec<DictionaryItemDto>, ApiError> {
    let entries = app.dictionary_store.list(kind, search, active_only).await?;
    Ok(entries.iter().map(dictionary_dto).collect())
}

pub(crate) async fn create(
    app: &AppData,
    user: &SessionUser,
    kind: DictionaryKind,
    request: &CreateDictionaryItemRequest,
) -> Result<DictionaryItemDto, ApiError> {
    let created = app
        .dictionary_store
        .create(
            kind,
            NewDictionaryEntry {
                name: request.name.clone(),
                bios_name: request.bios_name.clone(),
                drawer_type: request.drawer_type.clone(),
                version: request.version.clone(),
                reno_id: request.reno_id.clone(),
            },
        )
        .await?;

    app.audit_logger
        .record(
            AuditRecord::new(
                user,
                AuditAction::Create,
                kind.table_name(),
                format!("Created {} \"{}\"", kind.display_name(), created.name),
            )
            .record_id(created.id)
            .new_value(snapshot(&created)),
        )
        .await;

    Ok(dictionary_dto(&created))
}

pub(crate) async fn update(
    app: &AppData,
    user: &SessionUser,
    kind: DictionaryKind,
    request: &UpdateDictionaryItemRequest,
) -> Result<DictionaryItemDto, ApiError> {
    let (old, updated) = app
        .dictionary_store
        .update(
            kind,
            request.id,
            DictionaryChanges {
                name: request.name.clone(),
                is_active: request.is_active,
                bios_name: request.bios_name.clone(),
                drawer_type: request.drawer_type.clone(),
                version: request.version.clone(),
                reno_id: request.reno_id.clone(),
                file_path: None,
            },
        )
        .await?;

    let (action, description) = match (old.is_active, updated.is_active) {
        (true, false) => (
            AuditAction::Block,
            format!("Blocked {} \"{}\"", kind.display_name(), updated.name),
        ),
        (false, true) => (
            AuditAction::Unblock,
            format!("Unblocked {} \"{}\"", kind.display_name(), updated.name),
        ),
        _ => (
            AuditAction::Update,
            format!("Updated {} \"{}\"", kind.display_name(), updated.name),
        ),
    };
    app.audit_logger
        .record(
            AuditRecord::new(user, action, kind.table_name(), description)
                .record_id(updated.id)
                .old_value(snapshot(&old))
                .new_value(snapshot(&updated)),
        )
        .await;

    Ok(dictionary_dto(&updated))
}

pub(crate) async fn delete(
    app: &AppData,
    user: &SessionUser,
    kind: DictionaryKind,
    id: i32,
) -> Result<(), ApiError> {
    let deleted = app.dictionary_store.delete(kind, id).await?;

    app.audit_logger
        .record(
            AuditRecord::new(
                user,
                AuditAction::Delete,
                kind.table_name(),
                format!("Deleted {} \"{}\"", kind.display_name(), deleted.name),
            )
            .record_id(deleted.id)
            .old_value(snapshot(&deleted)),
        )
        .await;

    Ok(())
}
