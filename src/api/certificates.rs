use std::sync::Arc;

use poem_openapi::param::Query;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::dictionaries::{self, parse_kind};
use crate::api::{authenticate, require_view, require_write, snapshot, BearerAuth};
use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::stores::certificate_store::{CertificateDetails, CertificateListFilter, JackpotDetails};
use crate::types::db::game_definition;
use crate::types::dto::certificates::{
    BoardRefDto, CabinetRefDto, CertificateDto, CreateCertificateRequest, CreateGameRequest,
    CreateJackpotRequest, GameDto, GameRefDto, JackpotDto, UpdateCertificateRequest,
    UpdateGameRequest, UpdateJackpotRequest,
};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::keys::{
    CreateDictionaryItemRequest, DictionaryItemDto, UpdateDictionaryItemRequest,
};
use crate::types::internal::audit::{AuditAction, AuditRecord};
use crate::types::internal::dictionary::DictionaryKind;
use crate::types::internal::permissions::Module;

#[derive(Tags)]
enum CertificatesTags {
    /// Certificates, games and jackpots
    Certificates,
}

const CERTIFICATE_DICTIONARIES: &[DictionaryKind] = &[
    DictionaryKind::Board,
    DictionaryKind::Cabinet,
    DictionaryKind::Game,
    DictionaryKind::Controller,
    DictionaryKind::Certificate,
];

fn certificate_dto(details: &CertificateDetails) -> Result<CertificateDto, ApiError> {
    let game = details
        .game
        .as_ref()
        .ok_or_else(ApiError::internal_server_error)?;
    let board = details
        .board
        .as_ref()
        .ok_or_else(ApiError::internal_server_error)?;

    Ok(CertificateDto {
        id: details.certificate.id,
        name: details.certificate.name.clone(),
        recognized_hr: details.certificate.recognized_hr,
        for_slovenia: details.certificate.for_slovenia,
        file_path: details.certificate.file_path.clone(),
        is_active: details.certificate.is_active,
        game: GameRefDto {
            id: game.id,
            name: game.name.clone(),
            version: game.version.clone(),
        },
        board: BoardRefDto {
            id: board.id,
            name: board.name.clone(),
        },
        cabinets: details
            .cabinets
            .iter()
            .map(|c| CabinetRefDto {
                id: c.id,
                name: c.name.clone(),
            })
            .collect(),
    })
}

fn jackpot_dto(details: &JackpotDetails) -> JackpotDto {
    JackpotDto {
        id: details.jackpot.id,
        game_id: details.jackpot.game_id,
        controller_id: details.jackpot.controller_id,
        controller_name: details.controller_name.clone(),
        initial_grand: details.jackpot.initial_grand,
        initial_major: details.jackpot.initial_major,
        min_bet: details.jackpot.min_bet,
        max_bet: details.jackpot.max_bet,
        is_active: details.jackpot.is_active,
    }
}

fn game_dto(game: &game_definition::Model, jackpots: &[JackpotDetails]) -> GameDto {
    GameDto {
        id: game.id,
        name: game.name.clone(),
        version: game.version.clone(),
        reno_id: game.reno_id.clone(),
        is_active: game.is_active,
        jackpots: jackpots.iter().map(jackpot_dto).collect(),
    }
}

/// Certificates module API: certificates, games, jackpots and dictionaries
pub struct CertificatesApi {
    app: Arc<AppData>,
}

impl CertificatesApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[OpenApi]
impl CertificatesApi {
    // --- certificates ---

    /// List certificates. Blocked ones are hidden unless requested.
    #[oai(
        path = "/certificates",
        method = "get",
        tag = "CertificatesTags::Certificates"
    )]
    async fn list_certificates(
        &self,
        auth: BearerAuth,
        search: Query<Option<String>>,
        show_blocked: Query<Option<bool>>,
        hr_only: Query<Option<bool>>,
        slo_only: Query<Option<bool>>,
    ) -> Result<Json<Vec<CertificateDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Certificates).await?;

        let details = self
            .app
            .certificate_store
            .list(&CertificateListFilter {
                search: search.0.clone(),
                show_blocked: show_blocked.0.unwrap_or(false),
                hr_only: hr_only.0.unwrap_or(false),
                slo_only: slo_only.0.unwrap_or(false),
            })
            .await?;

        details
            .iter()
            .map(certificate_dto)
            .collect::<Result<Vec<_>, _>>()
            .map(Json)
    }

    /// Create a certificate with its game, board and cabinet set
    #[oai(
        path = "/certificates",
        method = "post",
        tag = "CertificatesTags::Certificates"
    )]
    async fn create_certificate(
        &self,
        auth: BearerAuth,
        body: Json<CreateCertificateRequest>,
    ) -> Result<Json<CertificateDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;

        let details = self.app.certificate_store.create(&body).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Create,
                    "certificate_definitions",
                    format!("Created certificate \"{}\"", details.certificate.name),
                )
                .record_id(details.certificate.id)
                .new_value(snapshot(&details.certificate)),
            )
            .await;

        certificate_dto(&details).map(Json)
    }

    /// Update a certificate; a present cabinet set replaces the old one
    #[oai(
        path = "/certificates",
        method = "put",
        tag = "CertificatesTags::Certificates"
    )]
    async fn update_certificate(
        &self,
        auth: BearerAuth,
        body: Json<UpdateCertificateRequest>,
    ) -> Result<Json<CertificateDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;

        let (old, updated) = self.app.certificate_store.update(&body).await?;

        let (action, description) = match (old.certificate.is_active, updated.certificate.is_active)
        {
            (true, false) => (
                AuditAction::Block,
                format!("Blocked certificate \"{}\"", updated.certificate.name),
            ),
            (false, true) => (
                AuditAction::Unblock,
                format!("Unblocked certificate \"{}\"", updated.certificate.name),
            ),
            _ => (
                AuditAction::Update,
                format!("Updated certificate \"{}\"", updated.certificate.name),
            ),
        };
        self.app
            .audit_logger
            .record(
                AuditRecord::new(&user, action, "certificate_definitions", description)
                    .record_id(updated.certificate.id)
                    .old_value(snapshot(&old.certificate))
                    .new_value(snapshot(&updated.certificate)),
            )
            .await;

        certificate_dto(&updated).map(Json)
    }

    /// Delete a certificate and its cabinet links
    #[oai(
        path = "/certificates",
        method = "delete",
        tag = "CertificatesTags::Certificates"
    )]
    async fn delete_certificate(
        &self,
        auth: BearerAuth,
        id: Query<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;

        let deleted = self.app.certificate_store.delete(id.0).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Delete,
                    "certificate_definitions",
                    format!("Deleted certificate \"{}\"", deleted.certificate.name),
                )
                .record_id(deleted.certificate.id)
                .old_value(snapshot(&deleted.certificate)),
            )
            .await;

        Ok(Json(MessageResponse::new("Certificate deleted")))
    }

    // --- games and jackpots ---

    /// List games with their jackpot configurations
    #[oai(
        path = "/certificates/games",
        method = "get",
        tag = "CertificatesTags::Certificates"
    )]
    async fn list_games(
        &self,
        auth: BearerAuth,
        search: Query<Option<String>>,
    ) -> Result<Json<Vec<GameDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Certificates).await?;

        let games = self
            .app
            .certificate_store
            .list_games(search.0.as_deref())
            .await?;
        Ok(Json(
            games
                .iter()
                .map(|(game, jackpots)| game_dto(game, jackpots))
                .collect(),
        ))
    }

    /// Create a game
    #[oai(
        path = "/certificates/games",
        method = "post",
        tag = "CertificatesTags::Certificates"
    )]
    async fn create_game(
        &self,
        auth: BearerAuth,
        body: Json<CreateGameRequest>,
    ) -> Result<Json<GameDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;

        let created = self.app.certificate_store.create_game(&body).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Create,
                    "game_definitions",
                    format!("Created game \"{}\"", created.name),
                )
                .record_id(created.id)
                .new_value(snapshot(&created)),
            )
            .await;

        Ok(Json(game_dto(&created, &[])))
    }

    /// Update or block a game
    #[oai(
        path = "/certificates/games",
        method = "put",
        tag = "CertificatesTags::Certificates"
    )]
    async fn update_game(
        &self,
        auth: BearerAuth,
        body: Json<UpdateGameRequest>,
    ) -> Result<Json<GameDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;

        let (old, updated) = self.app.certificate_store.update_game(&body).await?;

        let (action, description) = match (old.is_active, updated.is_active) {
            (true, false) => (
                AuditAction::Block,
                format!("Blocked game \"{}\"", updated.name),
            ),
            (false, true) => (
                AuditAction::Unblock,
                format!("Unblocked game \"{}\"", updated.name),
            ),
            _ => (
                AuditAction::Update,
                format!("Updated game \"{}\"", updated.name),
            ),
        };
        self.app
            .audit_logger
            .record(
                AuditRecord::new(&user, action, "game_definitions", description)
                    .record_id(updated.id)
                    .old_value(snapshot(&old))
                    .new_value(snapshot(&updated)),
            )
            .await;

        Ok(Json(game_dto(&updated, &[])))
    }

    /// Add a jackpot configuration to a game
    #[oai(
        path = "/certificates/games/jackpots",
        method = "post",
        tag = "CertificatesTags::Certificates"
    )]
    async fn create_jackpot(
        &self,
        auth: BearerAuth,
        body: Json<CreateJackpotRequest>,
    ) -> Result<Json<JackpotDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;

        let details = self.app.certificate_store.create_jackpot(&body).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Create,
                    "jackpot_configs",
                    format!(
                        "Created jackpot configuration for game {}",
                        details.jackpot.game_id
                    ),
                )
                .record_id(details.jackpot.id)
                .new_value(snapshot(&details.jackpot)),
            )
            .await;

        Ok(Json(jackpot_dto(&details)))
    }

    /// Activate or deactivate a jackpot configuration
    #[oai(
        path = "/certificates/games/jackpots",
        method = "put",
        tag = "CertificatesTags::Certificates"
    )]
    async fn update_jackpot(
        &self,
        auth: BearerAuth,
        body: Json<UpdateJackpotRequest>,
    ) -> Result<Json<JackpotDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;

        let (old, details) = self
            .app
            .certificate_store
            .set_jackpot_active(body.id, body.is_active)
            .await?;

        let (action, description) = match (old.is_active, details.jackpot.is_active) {
            (true, false) => (
                AuditAction::Block,
                format!("Deactivated jackpot configuration {}", details.jackpot.id),
            ),
            (false, true) => (
                AuditAction::Unblock,
                format!("Activated jackpot configuration {}", details.jackpot.id),
            ),
            _ => (
                AuditAction::Update,
                format!("Updated jackpot configuration {}", details.jackpot.id),
            ),
        };
        self.app
            .audit_logger
            .record(
                AuditRecord::new(&user, action, "jackpot_configs", description)
                    .record_id(details.jackpot.id)
                    .old_value(snapshot(&old))
                    .new_value(snapshot(&details.jackpot)),
            )
            .await;

        Ok(Json(jackpot_dto(&details)))
    }

    // --- dictionaries ---

    /// List entries of a certificates-module dictionary
    #[oai(
        path = "/certificates/dictionaries",
        method = "get",
        tag = "CertificatesTags::Certificates"
    )]
    async fn list_dictionary(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        search: Query<Option<String>>,
        active_only: Query<Option<bool>>,
    ) -> Result<Json<Vec<DictionaryItemDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Certificates).await?;
        let kind = parse_kind(&kind.0, CERTIFICATE_DICTIONARIES)?;

        let items =
            dictionaries::list(&self.app, kind, search.0.as_deref(), active_only.0.unwrap_or(false))
                .await?;
        Ok(Json(items))
    }

    /// Add a dictionary entry. Certificates themselves are created via
    /// the certificates endpoint, not here.
    #[oai(
        path = "/certificates/dictionaries",
        method = "post",
        tag = "CertificatesTags::Certificates"
    )]
    async fn create_dictionary_item(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        body: Json<CreateDictionaryItemRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;
        let kind = parse_kind(&kind.0, CERTIFICATE_DICTIONARIES)?;

        let item = dictionaries::create(&self.app, &user, kind, &body).await?;
        Ok(Json(item))
    }

    /// Update or block a dictionary entry
    #[oai(
        path = "/certificates/dictionaries",
        method = "put",
        tag = "CertificatesTags::Certificates"
    )]
    async fn update_dictionary_item(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        body: Json<UpdateDictionaryItemRequest>,
    ) -> Result<Json<DictionaryItemDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;
        let kind = parse_kind(&kind.0, CERTIFICATE_DICTIONARIES)?;

        let item = dictionaries::update(&self.app, &user, kind, &body).await?;
        Ok(Json(item))
    }

    /// Delete an unreferenced dictionary entry
    #[oai(
        path = "/certificates/dictionaries",
        method = "delete",
        tag = "CertificatesTags::Certificates"
    )]
    async fn delete_dictionary_item(
        &self,
        auth: BearerAuth,
        #[oai(name = "type")] kind: Query<String>,
        id: Query<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Certificates).await?;
        let kind = parse_kind(&kind.0, CERTIFICATE_DICTIONARIES)?;

        dictionaries::delete(&self.app, &user, kind, id.0).await?;
        Ok(Json(MessageResponse::new("Dictionary item deleted")))
    }
}
