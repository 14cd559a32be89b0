use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::errors::{DatabaseError, DomainError};
use crate::types::db::{
    board_definition, cabinet_definition, certificate_cabinet, certificate_definition,
    controller_definition, game_definition, jackpot_config,
};
use crate::types::dto::certificates::{
    CreateCertificateRequest, CreateGameRequest, CreateJackpotRequest, UpdateCertificateRequest,
    UpdateGameRequest,
};

/// Certificate with game, board and cabinet set resolved
#[derive(Debug, Clone)]
pub struct CertificateDetails {
    pub certificate: certificate_definition::Model,
    pub game: Option<game_definition::Model>,
    pub board: Option<board_definition::Model>,
    pub cabinets: Vec<cabinet_definition::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct CertificateListFilter {
    pub search: Option<String>,
    pub show_blocked: bool,
    pub hr_only: bool,
    pub slo_only: bool,
}

/// Jackpot configuration with its controller resolved
#[derive(Debug, Clone)]
pub struct JackpotDetails {
    pub jackpot: jackpot_config::Model,
    pub controller_name: Option<String>,
}

/// Repository for the certificates module
pub struct CertificateStore {
    db: DatabaseConnection,
}

impl CertificateStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // --- certificates ---

    pub async fn list(
        &self,
        filter: &CertificateListFilter,
    ) -> Result<Vec<CertificateDetails>, DomainError> {
        let mut query = certificate_definition::Entity::find();
        if !filter.show_blocked {
            query = query.filter(certificate_definition::Column::IsActive.eq(true));
        }
        if filter.hr_only {
            query = query.filter(certificate_definition::Column::RecognizedHr.eq(true));
        }
        if filter.slo_only {
            query = query.filter(certificate_definition::Column::ForSlovenia.eq(true));
        }
        let certificates = query
            .order_by_asc(certificate_definition::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_certificates", e))?;

        let mut details = self.resolve_details(certificates).await?;

        if let Some(term) = &filter.search {
            let term = term.to_lowercase();
            details.retain(|d| {
                d.certificate.name.to_lowercase().contains(&term)
                    || d.game
                        .as_ref()
                        .is_some_and(|g| g.name.to_lowercase().contains(&term))
                    || d.board
                        .as_ref()
                        .is_some_and(|b| b.name.to_lowercase().contains(&term))
            });
        }
        Ok(details)
    }

    pub async fn get(&self, id: i32) -> Result<CertificateDetails, DomainError> {
        let certificate = certificate_definition::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_certificate", e))?
            .ok_or_else(|| DomainError::not_found("Certificate"))?;
        let mut details = self.resolve_details(vec![certificate]).await?;
        details
            .pop()
            .ok_or_else(|| DomainError::internal("Certificate could not be resolved"))
    }

    pub async fn create(
        &self,
        request: &CreateCertificateRequest,
    ) -> Result<CertificateDetails, DomainError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Certificate name is required"));
        }

        let duplicate = certificate_definition::Entity::find()
            .filter(certificate_definition::Column::Name.eq(&name))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("find_certificate_by_name", e))?;
        if duplicate.is_some() {
            return Err(DomainError::conflict(
                "Certificate with this name already exists.",
            ));
        }

        game_definition::Entity::find_by_id(request.game_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_game", e))?
            .ok_or_else(|| DomainError::not_found("Game"))?;
        board_definition::Entity::find_by_id(request.board_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_board", e))?
            .ok_or_else(|| DomainError::not_found("Board"))?;
        self.ensure_cabinets_exist(&request.cabinet_ids).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let certificate = certificate_definition::ActiveModel {
            id: NotSet,
            name: Set(name),
            recognized_hr: Set(request.recognized_hr.unwrap_or(false)),
            for_slovenia: Set(request.for_slovenia.unwrap_or(false)),
            file_path: Set(request.file_path.clone()),
            game_id: Set(request.game_id),
            board_id: Set(request.board_id),
            is_active: Set(true),
        }
        .insert(&txn)
        .await
        .map_err(|e| DomainError::database("create_certificate", e))?;

        for cabinet_id in &request.cabinet_ids {
            certificate_cabinet::ActiveModel {
                id: NotSet,
                certificate_id: Set(certificate.id),
                cabinet_id: Set(*cabinet_id),
            }
            .insert(&txn)
            .await
            .map_err(|e| DomainError::database("link_certificate_cabinet", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        self.get(certificate.id).await
    }

    /// Apply changes. A present cabinet set replaces the old one inside
    /// the same transaction as the field updates, so readers never see a
    /// half-replaced set.
    pub async fn update(
        &self,
        request: &UpdateCertificateRequest,
    ) -> Result<(CertificateDetails, CertificateDetails), DomainError> {
        let old = self.get(request.id).await?;

        if let Some(cabinet_ids) = &request.cabinet_ids {
            self.ensure_cabinets_exist(cabinet_ids).await?;
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionBegin { source: e })?;

        let mut row: certificate_definition::ActiveModel = old.certificate.clone().into();
        if let Some(recognized_hr) = request.recognized_hr {
            row.recognized_hr = Set(recognized_hr);
        }
        if let Some(for_slovenia) = request.for_slovenia {
            row.for_slovenia = Set(for_slovenia);
        }
        if let Some(file_path) = &request.file_path {
            row.file_path = Set(Some(file_path.clone()));
        }
        if let Some(is_active) = request.is_active {
            row.is_active = Set(is_active);
        }
        row.update(&txn)
            .await
            .map_err(|e| DomainError::database("update_certificate", e))?;

        if let Some(cabinet_ids) = &request.cabinet_ids {
            certificate_cabinet::Entity::delete_many()
                .filter(certificate_cabinet::Column::CertificateId.eq(request.id))
                .exec(&txn)
                .await
                .map_err(|e| DomainError::database("clear_certificate_cabinets", e))?;
            for cabinet_id in cabinet_ids {
                certificate_cabinet::ActiveModel {
                    id: NotSet,
                    certificate_id: Set(request.id),
                    cabinet_id: Set(*cabinet_id),
                }
                .insert(&txn)
                .await
                .map_err(|e| DomainError::database("link_certificate_cabinet", e))?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| DatabaseError::TransactionCommit { source: e })?;

        let updated = self.get(request.id).await?;
        Ok((old, updated))
    }

    /// Delete a certificate and its cabinet links.
    pub async fn delete(&self, id: i32) -> Result<CertificateDetails, DomainError> {
        let old = self.get(id).await?;

        certificate_definition::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::database("delete_certificate", e))?;

        Ok(old)
    }

    // --- games and jackpots ---

    pub async fn list_games(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<(game_definition::Model, Vec<JackpotDetails>)>, DomainError> {
        let mut query = game_definition::Entity::find();
        if let Some(term) = search {
            query = query.filter(game_definition::Column::Name.contains(term));
        }
        let games = query
            .order_by_asc(game_definition::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_games", e))?;

        let jackpots = jackpot_config::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_jackpots", e))?;
        let controllers: HashMap<i32, String> = controller_definition::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_controllers", e))?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut by_game: HashMap<i32, Vec<JackpotDetails>> = HashMap::new();
        for jackpot in jackpots {
            let controller_name = controllers.get(&jackpot.controller_id).cloned();
            by_game
                .entry(jackpot.game_id)
                .or_default()
                .push(JackpotDetails {
                    jackpot,
                    controller_name,
                });
        }

        Ok(games
            .into_iter()
            .map(|g| {
                let jackpots = by_game.remove(&g.id).unwrap_or_default();
                (g, jackpots)
            })
            .collect())
    }

    pub async fn create_game(
        &self,
        request: &CreateGameRequest,
    ) -> Result<game_definition::Model, DomainError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Game name is required"));
        }

        game_definition::ActiveModel {
            id: NotSet,
            name: Set(name),
            version: Set(request.version.clone()),
            reno_id: Set(request.reno_id.clone()),
            is_active: Set(true),
        }
        .insert(&self.db)
        .await
        .map_err(|e| DomainError::database("create_game", e))
    }

    pub async fn update_game(
        &self,
        request: &UpdateGameRequest,
    ) -> Result<(game_definition::Model, game_definition::Model), DomainError> {
        let old = game_definition::Entity::find_by_id(request.id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_game", e))?
            .ok_or_else(|| DomainError::not_found("Game"))?;

        let mut row: game_definition::ActiveModel = old.clone().into();
        if let Some(name) = &request.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("Game name cannot be empty"));
            }
            row.name = Set(name.to_string());
        }
        if let Some(version) = &request.version {
            row.version = Set(Some(version.clone()));
        }
        if let Some(reno_id) = &request.reno_id {
            row.reno_id = Set(Some(reno_id.clone()));
        }
        if let Some(is_active) = request.is_active {
            row.is_active = Set(is_active);
        }

        let updated = row
            .update(&self.db)
            .await
            .map_err(|e| DomainError::database("update_game", e))?;
        Ok((old, updated))
    }

    pub async fn create_jackpot(
        &self,
        request: &CreateJackpotRequest,
    ) -> Result<JackpotDetails, DomainError> {
        game_definition::Entity::find_by_id(request.game_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_game", e))?
            .ok_or_else(|| DomainError::not_found("Game"))?;
        let controller = controller_definition::Entity::find_by_id(request.controller_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_controller", e))?
            .ok_or_else(|| DomainError::not_found("Controller"))?;

        let jackpot = jackpot_config::ActiveModel {
            id: NotSet,
            game_id: Set(request.game_id),
            controller_id: Set(request.controller_id),
            initial_grand: Set(request.initial_grand),
            initial_major: Set(request.initial_major),
            min_bet: Set(request.min_bet),
            max_bet: Set(request.max_bet),
            is_active: Set(true),
        }
        .insert(&self.db)
        .await
        .map_err(|e| DomainError::database("create_jackpot", e))?;

        Ok(JackpotDetails {
            jackpot,
            controller_name: Some(controller.name),
        })
    }

    pub async fn set_jackpot_active(
        &self,
        id: i32,
        is_active: bool,
    ) -> Result<(jackpot_config::Model, JackpotDetails), DomainError> {
        let old = jackpot_config::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_jackpot", e))?
            .ok_or_else(|| DomainError::not_found("Jackpot configuration"))?;

        let mut row: jackpot_config::ActiveModel = old.clone().into();
        row.is_active = Set(is_active);
        let updated = row
            .update(&self.db)
            .await
            .map_err(|e| DomainError::database("update_jackpot", e))?;

        let controller_name = controller_definition::Entity::find_by_id(updated.controller_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_controller", e))?
            .map(|c| c.name);

        Ok((
            old,
            JackpotDetails {
                jackpot: updated,
                controller_name,
            },
        ))
    }

    async fn ensure_cabinets_exist(&self, cabinet_ids: &[i32]) -> Result<(), DomainError> {
        for cabinet_id in cabinet_ids {
            cabinet_definition::Entity::find_by_id(*cabinet_id)
                .one(&self.db)
                .await
                .map_err(|e| DomainError::database("get_cabinet", e))?
                .ok_or_else(|| DomainError::not_found("Cabinet"))?;
        }
        Ok(())
    }

    async fn resolve_details(
        &self,
        certificates: Vec<certificate_definition::Model>,
    ) -> Result<Vec<CertificateDetails>, DomainError> {
        if certificates.is_empty() {
            return Ok(Vec::new());
        }

        let games: HashMap<i32, game_definition::Model> = game_definition::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_games", e))?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();
        let boards: HashMap<i32, board_definition::Model> = board_definition::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_boards", e))?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        let cabinets: HashMap<i32, cabinet_definition::Model> = cabinet_definition::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_cabinets", e))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let links = certificate_cabinet::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_certificate_cabinets", e))?;

        let mut cabinets_by_certificate: HashMap<i32, Vec<cabinet_definition::Model>> =
            HashMap::new();
        for link in links {
            if let Some(cabinet) = cabinets.get(&link.cabinet_id) {
                cabinets_by_certificate
                    .entry(link.certificate_id)
                    .or_default()
                    .push(cabinet.clone());
            }
        }

        Ok(certificates
            .into_iter()
            .map(|c| CertificateDetails {
                game: games.get(&c.game_id).cloned(),
                board: boards.get(&c.board_id).cloned(),
                cabinets: cabinets_by_certificate.remove(&c.id).unwrap_or_default(),
                certificate: c,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    struct Fixture {
        store: CertificateStore,
        game_id: i32,
        board_id: i32,
        cabinet_a: i32,
        cabinet_b: i32,
    }

    async fn setup() -> Fixture {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let game = game_definition::ActiveModel {
            id: NotSet,
            name: Set("Lucky Sevens".to_string()),
            version: Set(Some("1.2".to_string())),
            reno_id: Set(None),
            is_active: Set(true),
        }
        .insert(&db)
        .await
        .unwrap();

        let board = board_definition::ActiveModel {
            id: NotSet,
            name: Set("B-100".to_string()),
            bios_name: Set(None),
            is_active: Set(true),
        }
        .insert(&db)
        .await
        .unwrap();

        let mut cabinet_ids = Vec::new();
        for name in ["Upright", "Slant"] {
            let cabinet = cabinet_definition::ActiveModel {
                id: NotSet,
                name: Set(name.to_string()),
                drawer_type: Set(None),
                is_active: Set(true),
            }
            .insert(&db)
            .await
            .unwrap();
            cabinet_ids.push(cabinet.id);
        }

        Fixture {
            store: CertificateStore::new(db),
            game_id: game.id,
            board_id: board.id,
            cabinet_a: cabinet_ids[0],
            cabinet_b: cabinet_ids[1],
        }
    }

    fn new_certificate(f: &Fixture, name: &str, cabinet_ids: Vec<i32>) -> CreateCertificateRequest {
        CreateCertificateRequest {
            name: name.to_string(),
            recognized_hr: Some(true),
            for_slovenia: None,
            file_path: None,
            game_id: f.game_id,
            board_id: f.board_id,
            cabinet_ids,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name() {
        let f = setup().await;
        f.store
            .create(&new_certificate(&f, "CERT-1", vec![f.cabinet_a]))
            .await
            .unwrap();

        let result = f
            .store
            .create(&new_certificate(&f, "CERT-1", vec![f.cabinet_b]))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_replaces_cabinet_set() {
        let f = setup().await;
        let created = f
            .store
            .create(&new_certificate(&f, "CERT-2", vec![f.cabinet_a]))
            .await
            .unwrap();

        let (old, updated) = f
            .store
            .update(&UpdateCertificateRequest {
                id: created.certificate.id,
                recognized_hr: None,
                for_slovenia: None,
                file_path: None,
                is_active: None,
                cabinet_ids: Some(vec![f.cabinet_b]),
            })
            .await
            .unwrap();

        assert_eq!(old.cabinets.len(), 1);
        assert_eq!(old.cabinets[0].id, f.cabinet_a);
        assert_eq!(updated.cabinets.len(), 1);
        assert_eq!(updated.cabinets[0].id, f.cabinet_b);
    }

    #[tokio::test]
    async fn list_filters_blocked_and_flags() {
        let f = setup().await;
        let kept = f
            .store
            .create(&new_certificate(&f, "CERT-3", vec![]))
            .await
            .unwrap();
        let blocked = f
            .store
            .create(&new_certificate(&f, "CERT-4", vec![]))
            .await
            .unwrap();
        f.store
            .update(&UpdateCertificateRequest {
                id: blocked.certificate.id,
                recognized_hr: None,
                for_slovenia: None,
                file_path: None,
                is_active: Some(false),
                cabinet_ids: None,
            })
            .await
            .unwrap();

        let visible = f.store.list(&CertificateListFilter::default()).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].certificate.id, kept.certificate.id);

        let all = f
            .store
            .list(&CertificateListFilter {
                show_blocked: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn search_matches_game_name() {
        let f = setup().await;
        f.store
            .create(&new_certificate(&f, "CERT-5", vec![]))
            .await
            .unwrap();

        let hits = f
            .store
            .list(&CertificateListFilter {
                search: Some("lucky".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = f
            .store
            .list(&CertificateListFilter {
                search: Some("nonexistent".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_cabinet_links() {
        let f = setup().await;
        let created = f
            .store
            .create(&new_certificate(&f, "CERT-6", vec![f.cabinet_a, f.cabinet_b]))
            .await
            .unwrap();

        f.store.delete(created.certificate.id).await.unwrap();

        let result = f.store.get(created.certificate.id).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
