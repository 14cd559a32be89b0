use std::sync::Arc;

use poem_openapi::param::Query;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::dictionaries::{self, parse_kind};
use crate::api::{authenticate, require_view, require_write, snapshot, BearerAuth};
use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::stores::key_store::AssignmentDetails;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::keys::{
    AssignmentDto, CreateAssignmentRequest, CreateDictionaryItemRequest, CreateKeyRequest,
    CreateLocationRequest, CreateNamedItemRequest, DictionaryItemDto, KeyDto, LocationDto,
    ReportBrokenRequest, SetActiveRequest, UpdateDictionaryItemRequest,
    UpdateLocationStatusRequest,
};
use crate::types::internal::audit::{AuditAction, AuditRecord};
use crate::types::internal::dictionary::DictionaryKind;
use crate::types::internal::permissions::Module;

#[derive(Tags)]
enum KeysTags {
    /// Key inventory and assignments
    Keys,
}

const KEYS_DICTIONARIES: &[DictionaryKind] = &[
    DictionaryKind::LocationType,
    DictionaryKind::CabinetPosition,
    DictionaryKind::KeyType,
];

fn assignment_dto(details: &AssignmentDetails) -> AssignmentDto {
    AssignmentDto {
        id: details.assignment.id,
        key_id: details.assignment.key_id,
        key_code: details.key_code.clone(),
        location_id: details.assignment.location_id,
        location_name: details.location_name.clone(),
        location_type_name: details.location_type_name.clone(),
        cabinet_position_id: details.assignment.cabinet_position_id,
        cabinet_position_name: details.cabinet_position_name.clone(),
        key_type_id: details.assignment.key_type_id,
        key_type_name: details.key_type_name.clone(),
    }
}

/// Keys module API: inventory, assignments, locations and dictionaries
pub struct KeysApi {
    app: Arc<AppData>,
}

impl KeysApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[OpenApi]
impl KeysApi {
    // --- inventory ---

    /// List keys with their assignments
    #[oai(path = "/keys/inventory", method = "get", tag = "KeysTags::Keys")]
    async fn list_keys(
        &self,
        auth: BearerAuth,
        search: Query<Option<String>>,
        unassigned_only: Query<Option<bool>>,
    ) -> Result<Json<Vec<KeyDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Keys).await?;

        let keys = self
            .app
            .key_store
            .list_keys(search.0.as_deref(), unassigned_only.0.unwrap_or(false))
            .await?;
        Ok(Json(
            keys.iter()
                .map(|(key, details)| {
                    KeyDto::from_parts(key, details.as_ref().map(assignment_dto))
                })
                .collect(),
        ))
    }

    /// Create a key, or add stock to an existing key code
    #[oai(path = "/keys/inventory", method = "post", tag = "KeysTags::Keys")]
    async fn create_key(
        &self,
        auth: BearerAuth,
        body: Json<CreateKeyRequest>,
    ) -> Result<Json<KeyDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let (key, created) = self.app.key_store.create_or_add(&body).await?;

        let (action, description) = if created {
            (
                AuditAction::Create,
                format!("Created key \"{}\"", key.key_code),
            )
        } else {
            (
                AuditAction::Update,
                format!("Added stock to key \"{}\"", key.key_code),
            )
        };
        self.app
            .audit_logger
            .record(
                AuditRecord::new(&user, action, "keys", description)
                    .record_id(key.id)
                    .new_value(snapshot(&key)),
            )
            .await;

        Ok(Json(KeyDto::from_parts(&key, None)))
    }

    /// Move keys of one color from the good to the broken bucket
    #[oai(path = "/keys/inventory", method = "put", tag = "KeysTags::Keys")]
    async fn report_broken(
        &self,
        auth: BearerAuth,
        body: Json<ReportBrokenRequest>,
    ) -> Result<Json<KeyDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let (old, updated) = self
            .app
            .key_store
            .report_broken(body.id, body.key_color, body.count)
            .await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Update,
                    "keys",
                    format!(
                        "Reported {} broken key(s) on \"{}\"",
                        body.count, updated.key_code
                    ),
                )
                .record_id(updated.id)
                .old_value(snapshot(&old))
                .new_value(snapshot(&updated)),
            )
            .await;

        Ok(Json(KeyDto::from_parts(&updated, None)))
    }

    // --- assignments ---

    /// List key assignments with names resolved
    #[oai(path = "/assignments", method = "get", tag = "KeysTags::Keys")]
    async fn list_assignments(
        &self,
        auth: BearerAuth,
        search: Query<Option<String>>,
        key_type_id: Query<Option<i32>>,
    ) -> Result<Json<Vec<AssignmentDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Keys).await?;

        let details = self
            .app
            .key_store
            .list_assignments(search.0.as_deref(), key_type_id.0)
            .await?;
        Ok(Json(details.iter().map(assignment_dto).collect()))
    }

    /// Assign a key to a location and cabinet position
    #[oai(path = "/assignments", method = "post", tag = "KeysTags::Keys")]
    async fn create_assignment(
        &self,
        auth: BearerAuth,
        body: Json<CreateAssignmentRequest>,
    ) -> Result<Json<AssignmentDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let details = self.app.key_store.create_assignment(&body).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Create,
                    "key_assignments",
                    format!(
                        "Assigned key \"{}\" to {} / {}",
                        details.key_code, details.location_name, details.cabinet_position_name
                    ),
                )
                .record_id(details.assignment.id)
                .new_value(snapshot(&details.assignment)),
            )
            .await;

        Ok(Json(assignment_dto(&details)))
    }

    /// Remove an assignment, freeing its key and cabinet position
    #[oai(path = "/assignments", method = "delete", tag = "KeysTags::Keys")]
    async fn delete_assignment(
        &self,
        auth: BearerAuth,
        id: Query<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let details = self.app.key_store.delete_assignment(id.0).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Delete,
                    "key_assignments",
                    format!(
                        "Unassigned key \"{}\" from {} / {}",
                        details.key_code, details.location_name, details.cabinet_position_name
                    ),
                )
                .record_id(details.assignment.id)
                .old_value(snapshot(&details.assignment)),
            )
            .await;

        Ok(Json(MessageResponse::new("Assignment deleted")))
    }

    // --- locations ---

    /// List locations
    #[oai(path = "/locations", method = "get", tag = "KeysTags::Keys")]
    async fn list_locations(&self, auth: BearerAuth) -> Result<Json<Vec<LocationDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Keys).await?;

        let locations = self.app.key_store.list_locations().await?;
        Ok(Json(
            locations
                .into_iter()
                .map(|(location, location_type)| LocationDto {
                    id: location.id,
                    name: location.name,
                    status: location.status,
                    location_type_id: location.location_type_id,
                    location_type_name: location_type.map(|t| t.name),
                })
                .collect(),
        ))
    }

    /// Create a location; new locations start open
    #[oai(path = "/locations", method = "post", tag = "KeysTags::Keys")]
    async fn create_location(
        &self,
        auth: BearerAuth,
        body: Json<CreateLocationRequest>,
    ) -> Result<Json<LocationDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let (location, location_type) = self
            .app
            .key_store
            .create_location(&body.name, body.location_type_id)
            .await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Create,
                    "locations",
                    format!("Created location \"{}\"", location.name),
                )
                .record_id(location.id)
                .new_value(snapshot(&location)),
            )
            .await;

        Ok(Json(LocationDto {
            id: location.id,
            name: location.name,
            status: location.status,
            location_type_id: location.location_type_id,
            location_type_name: location_type.map(|t| t.name),
        }))
    }

    /// Open or close a location
    #[oai(path = "/locations", method = "put", tag = "KeysTags::Keys")]
    async fn set_location_status(
        &self,
        auth: BearerAuth,
        body: Json<UpdateLocationStatusRequest>,
    ) -> Result<Json<LocationDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let (old, updated) = self
            .app
            .key_store
            .set_location_status(body.id, body.status)
            .await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Update,
                    "locations",
                    format!(
                        "Changed location \"{}\" status to {}",
                        updated.name, updated.status
                    ),
                )
                .record_id(updated.id)
                .old_value(snapshot(&old))
                .new_value(snapshot(&updated)),
            )
            .await;

        let location_type_name = self
            .app
            .dictionary_store
            .get(DictionaryKind::LocationType, updated.location_type_id)
            .await?
            .map(|t| t.name);
        Ok(Json(LocationDto {
            id: updated.id,
            name: updated.name,
            status: updated.status,
            location_type_id: updated.location_type_id,
            location_type_name,
        }))
    }

    // --- location types and cabinet positions ---
    // Dedicated routes for the two dictionaries the frontend treats as
    // plain reference data. The GETs are deliberately unauthenticated.

    /// List location types
    #[oai(path = "/location-types", method = "get", tag = "KeysTags::Keys")]
    async fn list_location_types(
        &self,
        search: Query<Option<String>>,
        active_only: Query<Option<bool>>,
    ) -> Result<Json<Vec<DictionaryItemDto>>, ApiError> {
        let items = dictionaries::list(
            &self.app,
            DictionaryKind::LocationType,
            search.0.as_deref(),
            active_only.0.unwrap_or(false),
        )
        .await?;
        Ok(Json(items))
    }

    /// Add a location type
    #[oai(path = "/location-types", method = "post", tag = "KeysTags::Keys")]
    async fn create_location_type(
        &self,
        auth: BearerAuth,
        body: Json<CreateNamedItemRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let item = dictionaries::create(
            &self.app,
            &user,
            DictionaryKind::LocationType,
            &CreateDictionaryItemRequest {
                name: body.0.name,
                bios_name: None,
                drawer_type: None,
                version: None,
                reno_id: None,
            },
        )
        .await?;
        Ok(Json(item))
    }

    /// Block or unblock a location type
    #[oai(path = "/location-types", method = "put", tag = "KeysTags::Keys")]
    async fn set_location_type_active(
        &self,
        auth: BearerAuth,
        body: Json<SetActiveRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let item = dictionaries::update(
            &self.app,
            &user,
            DictionaryKind::LocationType,
            &UpdateDictionaryItemRequest {
                id: body.id,
                name: None,
                is_active: Some(body.is_active),
                bios_name: None,
                drawer_type: None,
                version: None,
                reno_id: None,
            },
        )
        .await?;
        Ok(Json(item))
    }

    /// List cabinet positions
    #[oai(path = "/cabinet-positions", method = "get", tag = "KeysTags::Keys")]
    async fn list_cabinet_positions(
        &self,
        search: Query<Option<String>>,
        active_only: Query<Option<bool>>,
    ) -> Result<Json<Vec<DictionaryItemDto>>, ApiError> {
        let items = dictionaries::list(
            &self.app,
            DictionaryKind::CabinetPosition,
            search.0.as_deref(),
            active_only.0.unwrap_or(false),
        )
        .await?;
        Ok(Json(items))
    }

    /// Add a cabinet position
    #[oai(path = "/cabinet-positions", method = "post", tag = "KeysTags::Keys")]
    async fn create_cabinet_position(
        &self,
        auth: BearerAuth,
        body: Json<CreateNamedItemRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let item = dictionaries::create(
            &self.app,
            &user,
            DictionaryKind::CabinetPosition,
            &CreateDictionaryItemRequest {
                name: body.0.name,
                bios_name: None,
                drawer_type: None,
                version: None,
                reno_id: None,
            },
        )
        .await?;
        Ok(Json(item))
    }

    /// Block or unblock a cabinet position
    #[oai(path = "/cabinet-positions", method = "put", tag = "KeysTags::Keys")]
    async fn set_cabinet_position_active(
        &self,
        auth: BearerAuth,
        body: Json<SetActiveRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;

        let item = dictionaries::update(
            &self.app,
            &user,
            DictionaryKind::CabinetPosition,
            &UpdateDictionaryItemRequest {
                id: body.id,
                name: None,
                is_active: Some(body.is_active),
                bios_name: None,
                drawer_type: None,
                version: None,
                reno_id: None,
            },
        )
        .await?;
        Ok(Json(item))
    }

    // --- dictionaries ---

    /// List entries of a keys-module dictionary
    #[oai(path = "/keys/dictionaries", method = "get", tag = "KeysTags::Keys")]
    async fn list_dictionary(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        search: Query<Option<String>>,
        active_only: Query<Option<bool>>,
    ) -> Result<Json<Vec<DictionaryItemDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Keys).await?;
        let kind = parse_kind(&kind.0, KEYS_DICTIONARIES)?;

        let items =
            dictionaries::list(&self.app, kind, search.0.as_deref(), active_only.0.unwrap_or(false))
                .await?;
        Ok(Json(items))
    }

    /// Add a dictionary entry
    #[oai(path = "/keys/dictionaries", method = "post", tag = "KeysTags::Keys")]
    async fn create_dictionary_item(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        body: Json<CreateDictionaryItemRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;
        let kind = parse_kind(&kind.0, KEYS_DICTIONARIES)?;

        let item = dictionaries::create(&self.app, &user, kind, &body).await?;
        Ok(Json(item))
    }

    /// Update or block a dictionary entry
    #[oai(path = "/keys/dictionaries", method = "put", tag = "KeysTags::Keys")]
    async fn update_dictionary_item(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        body: Json<UpdateDictionaryItemRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;
        let kind = parse_kind(&kind.0, KEYS_DICTIONARIES)?;

        let item = dictionaries::update(&self.app, &user, kind, &body).await?;
        Ok(Json(item))
    }

    /// Delete an unreferenced dictionary entry
    #[oai(path = "/keys/dictionaries", method = "delete", tag = "KeysTags::Keys")]
    async fn delete_dictionary_item(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        id: Query<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Keys).await?;
        let kind = parse_kind(&kind.0, KEYS_DICTIONARIES)?;

        dictionaries::delete(&self.app, &user, kind, id.0).await?;
        Ok(Json(MessageResponse::new("Dictionary item deleted")))
    }
}
