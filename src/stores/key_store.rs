use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::DomainError;
use crate::types::db::{cabinet_position, key, key_assignment, key_type, location, location_type};
use crate::types::dto::keys::{CreateAssignmentRequest, CreateKeyRequest, KeyColor, LocationStatus};

/// Assignment row with its dictionary names resolved
#[derive(Debug, Clone)]
pub struct AssignmentDetails {
    pub assignment: key_assignment::Model,
    pub key_code: String,
    pub location_name: String,
    pub location_type_name: Option<String>,
    pub cabinet_position_name: String,
    pub key_type_name: String,
}

/// Repository for the keys module: inventory, assignments and locations
pub struct KeyStore {
    db: DatabaseConnection,
}

impl KeyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // --- inventory ---

    pub async fn list_keys(
        &self,
        search: Option<&str>,
        unassigned_only: bool,
    ) -> Result<Vec<(key::Model, Option<AssignmentDetails>)>, DomainError> {
        let mut query = key::Entity::find();
        if let Some(term) = search {
            query = query.filter(key::Column::KeyCode.contains(term));
        }
        let keys = query
            .order_by_asc(key::Column::KeyCode)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_keys", e))?;

        let assignments = key_assignment::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_key_assignments", e))?;
        let details = self.resolve_details(assignments).await?;
        let mut by_key: HashMap<i32, AssignmentDetails> = details
            .into_iter()
            .map(|d| (d.assignment.key_id, d))
            .collect();

        Ok(keys
            .into_iter()
            .map(|k| {
                let assignment = by_key.remove(&k.id);
                (k, assignment)
            })
            .filter(|(_, assignment)| !unassigned_only || assignment.is_none())
            .collect())
    }

    pub async fn get_key(&self, id: i32) -> Result<key::Model, DomainError> {
        key::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_key", e))?
            .ok_or_else(|| DomainError::not_found("Key"))
    }

    /// Create the key, or add the given counts to an existing key code.
    /// Returns the row and whether it was newly created.
    pub async fn create_or_add(
        &self,
        request: &CreateKeyRequest,
    ) -> Result<(key::Model, bool), DomainError> {
        let key_code = request.key_code.trim().to_string();
        if key_code.is_empty() {
            return Err(DomainError::validation("Key code is required"));
        }

        let silver = request.silver_count.unwrap_or(0);
        let gold = request.gold_count.unwrap_or(0);
        let broken_silver = request.broken_silver.unwrap_or(0);
        let broken_gold = request.broken_gold.unwrap_or(0);
        if silver < 0 || gold < 0 || broken_silver < 0 || broken_gold < 0 {
            return Err(DomainError::validation("Key counts must be non-negative"));
        }

        let existing = key::Entity::find()
            .filter(key::Column::KeyCode.eq(&key_code))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("find_key_by_code", e))?;

        if let Some(model) = existing {
            let mut row: key::ActiveModel = model.clone().into();
            row.silver_count = Set(model.silver_count + silver);
            row.gold_count = Set(model.gold_count + gold);
            row.broken_silver = Set(model.broken_silver + broken_silver);
            row.broken_gold = Set(model.broken_gold + broken_gold);
            let updated = row
                .update(&self.db)
                .await
                .map_err(|e| DomainError::database("add_key_stock", e))?;
            Ok((updated, false))
        } else {
            let row = key::ActiveModel {
                id: NotSet,
                key_code: Set(key_code),
                silver_count: Set(silver),
                gold_count: Set(gold),
                broken_silver: Set(broken_silver),
                broken_gold: Set(broken_gold),
            };
            let created = row
                .insert(&self.db)
                .await
                .map_err(|e| DomainError::database("create_key", e))?;
            Ok((created, true))
        }
    }

    /// Move `count` keys of one color from the good bucket to the broken
    /// bucket. The transfer conserves the total per color.
    pub async fn report_broken(
        &self,
        id: i32,
        color: KeyColor,
        count: i32,
    ) -> Result<(key::Model, key::Model), DomainError> {
        if count <= 0 {
            return Err(DomainError::validation("Count must be positive"));
        }

        let old = self.get_key(id).await?;
        let mut row: key::ActiveModel = old.clone().into();

        match color {
            KeyColor::Silver => {
                if old.silver_count < count {
                    return Err(DomainError::conflict(
                        "Not enough silver keys to mark as broken",
                    ));
                }
                row.silver_count = Set(old.silver_count - count);
                row.broken_silver = Set(old.broken_silver + count);
            }
            KeyColor::Gold => {
                if old.gold_count < count {
                    return Err(DomainError::conflict(
                        "Not enough gold keys to mark as broken",
                    ));
                }
                row.gold_count = Set(old.gold_count - count);
                row.broken_gold = Set(old.broken_gold + count);
            }
        }

        let updated = row
            .update(&self.db)
            .await
            .map_err(|e| DomainError::database("report_broken_key", e))?;
        Ok((old, updated))
    }

    // --- assignments ---

    pub async fn list_assignments(
        &self,
        search: Option<&str>,
        key_type_id: Option<i32>,
    ) -> Result<Vec<AssignmentDetails>, DomainError> {
        let mut query = key_assignment::Entity::find();
        if let Some(type_id) = key_type_id {
            query = query.filter(key_assignment::Column::KeyTypeId.eq(type_id));
        }
        let assignments = query
            .order_by_asc(key_assignment::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_key_assignments", e))?;

        let mut details = self.resolve_details(assignments).await?;
        if let Some(term) = search {
            let term = term.to_lowercase();
            details.retain(|d| {
                d.key_code.to_lowercase().contains(&term)
                    || d.location_name.to_lowercase().contains(&term)
                    || d.cabinet_position_name.to_lowercase().contains(&term)
            });
        }
        Ok(details)
    }

    pub async fn create_assignment(
        &self,
        request: &CreateAssignmentRequest,
    ) -> Result<AssignmentDetails, DomainError> {
        self.get_key(request.key_id).await?;

        location::Entity::find_by_id(request.location_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_location", e))?
            .ok_or_else(|| DomainError::not_found("Location"))?;
        cabinet_position::Entity::find_by_id(request.cabinet_position_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_cabinet_position", e))?
            .ok_or_else(|| DomainError::not_found("Cabinet position"))?;
        key_type::Entity::find_by_id(request.key_type_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_key_type", e))?
            .ok_or_else(|| DomainError::not_found("Key type"))?;

        let key_taken = key_assignment::Entity::find()
            .filter(key_assignment::Column::KeyId.eq(request.key_id))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::database("check_key_assigned", e))?;
        if key_taken > 0 {
            return Err(DomainError::conflict("Key is already assigned."));
        }

        // Positions model one shared physical cabinet inventory, so the
        // exclusivity check spans all locations.
        let position_taken = key_assignment::Entity::find()
            .filter(key_assignment::Column::CabinetPositionId.eq(request.cabinet_position_id))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::database("check_position_used", e))?;
        if position_taken > 0 {
            return Err(DomainError::conflict("Cabinet position is already in use."));
        }

        let row = key_assignment::ActiveModel {
            id: NotSet,
            key_id: Set(request.key_id),
            location_id: Set(request.location_id),
            cabinet_position_id: Set(request.cabinet_position_id),
            key_type_id: Set(request.key_type_id),
        };
        let created = row
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::database("create_key_assignment", e))?;

        let mut details = self.resolve_details(vec![created]).await?;
        details
            .pop()
            .ok_or_else(|| DomainError::internal("Created assignment could not be resolved"))
    }

    /// Delete an assignment, returning its resolved details for auditing.
    pub async fn delete_assignment(&self, id: i32) -> Result<AssignmentDetails, DomainError> {
        let model = key_assignment::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_key_assignment", e))?
            .ok_or_else(|| DomainError::not_found("Assignment"))?;

        let mut details = self.resolve_details(vec![model]).await?;
        let details = details
            .pop()
            .ok_or_else(|| DomainError::internal("Assignment could not be resolved"))?;

        key_assignment::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::database("delete_key_assignment", e))?;

        Ok(details)
    }

    // --- locations ---

    pub async fn list_locations(
        &self,
    ) -> Result<Vec<(location::Model, Option<location_type::Model>)>, DomainError> {
        let locations = location::Entity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_locations", e))?;
        let types: HashMap<i32, location_type::Model> = location_type::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_location_types", e))?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        Ok(locations
            .into_iter()
            .map(|l| {
                let t = types.get(&l.location_type_id).cloned();
                (l, t)
            })
            .collect())
    }

    pub async fn create_location(
        &self,
        name: &str,
        location_type_id: i32,
    ) -> Result<(location::Model, Option<location_type::Model>), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Location name is required"));
        }

        let location_type = location_type::Entity::find_by_id(location_type_id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_location_type", e))?
            .ok_or_else(|| DomainError::not_found("Location type"))?;

        let row = location::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            location_type_id: Set(location_type_id),
            status: Set(LocationStatus::Open.as_str().to_string()),
        };
        let created = row
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::database("create_location", e))?;

        Ok((created, Some(location_type)))
    }

    /// Change a location's status. Closing requires that no key is
    /// assigned there.
    pub async fn set_location_status(
        &self,
        id: i32,
        status: LocationStatus,
    ) -> Result<(location::Model, location::Model), DomainError> {
        let old = location::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_location", e))?
            .ok_or_else(|| DomainError::not_found("Location"))?;

        if status == LocationStatus::Closed && old.status != LocationStatus::Closed.as_str() {
            let active = key_assignment::Entity::find()
                .filter(key_assignment::Column::LocationId.eq(id))
                .count(&self.db)
                .await
                .map_err(|e| DomainError::database("count_location_assignments", e))?;
            if active > 0 {
                return Err(DomainError::conflict(
                    "Cannot close location with active key assignments.",
                ));
            }
        }

        let mut row: location::ActiveModel = old.clone().into();
        row.status = Set(status.as_str().to_string());
        let updated = row
            .update(&self.db)
            .await
            .map_err(|e| DomainError::database("update_location_status", e))?;

        Ok((old, updated))
    }

    /// Resolve dictionary names for a set of assignments.
    async fn resolve_details(
        &self,
        assignments: Vec<key_assignment::Model>,
    ) -> Result<Vec<AssignmentDetails>, DomainError> {
        if assignments.is_empty() {
            return Ok(Vec::new());
        }

        let keys: HashMap<i32, String> = key::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_keys", e))?
            .into_iter()
            .map(|k| (k.id, k.key_code))
            .collect();
        let locations: HashMap<i32, location::Model> = location::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_locations", e))?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();
        let location_types: HashMap<i32, String> = location_type::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_location_types", e))?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let positions: HashMap<i32, String> = cabinet_position::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_cabinet_positions", e))?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let key_types: HashMap<i32, String> = key_type::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_key_types", e))?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        Ok(assignments
            .into_iter()
            .map(|a| {
                let location = locations.get(&a.location_id);
                AssignmentDetails {
                    key_code: keys.get(&a.key_id).cloned().unwrap_or_default(),
                    location_name: location.map(|l| l.name.clone()).unwrap_or_default(),
                    location_type_name: location
                        .and_then(|l| location_types.get(&l.location_type_id).cloned()),
                    cabinet_position_name: positions
                        .get(&a.cabinet_position_id)
                        .cloned()
                        .unwrap_or_default(),
                    key_type_name: key_types.get(&a.key_type_id).cloned().unwrap_or_default(),
                    assignment: a,
                }
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
        store: KeyStore,
        location_id: i32,
        second_location_id: i32,
        position_id: i32,
        second_position_id: i32,
        key_type_id: i32,
    }

    async fn setup() -> Fixture {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let location_type = location_type::ActiveModel {
            id: NotSet,
            name: Set("Casino".to_string()),
            is_active: Set(true),
        }
        .insert(&db)
        .await
        .unwrap();

        let mut location_ids = Vec::new();
        for name in ["Main floor", "Annex"] {
            let l = location::ActiveModel {
                id: NotSet,
                name: Set(name.to_string()),
                location_type_id: Set(location_type.id),
                status: Set("OPEN".to_string()),
            }
            .insert(&db)
            .await
            .unwrap();
            location_ids.push(l.id);
        }

        let mut position_ids = Vec::new();
        for name in ["P1", "P2"] {
            let p = cabinet_position::ActiveModel {
                id: NotSet,
                name: Set(name.to_string()),
                is_active: Set(true),
            }
            .insert(&db)
            .await
            .unwrap();
            position_ids.push(p.id);
        }

        let key_type = key_type::ActiveModel {
            id: NotSet,
            name: Set("Door".to_string()),
            is_active: Set(true),
        }
        .insert(&db)
        .await
        .unwrap();

        Fixture {
            store: KeyStore::new(db),
            location_id: location_ids[0],
            second_location_id: location_ids[1],
            position_id: position_ids[0],
            second_position_id: position_ids[1],
            key_type_id: key_type.id,
        }
    }

    fn new_key(code: &str, silver: i32, gold: i32) -> CreateKeyRequest {
        CreateKeyRequest {
            key_code: code.to_string(),
            silver_count: Some(silver),
            gold_count: Some(gold),
            broken_silver: None,
            broken_gold: None,
        }
    }

    #[tokio::test]
    async fn create_or_add_accumulates_stock_on_existing_code() {
        let f = setup().await;

        let (first, created) = f.store.create_or_add(&new_key("K-01", 3, 1)).await.unwrap();
        assert!(created);
        assert_eq!(first.silver_count, 3);

        let (second, created) = f.store.create_or_add(&new_key("K-01", 2, 0)).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.silver_count, 5);
        assert_eq!(second.gold_count, 1);
    }

    #[tokio::test]
    async fn report_broken_conserves_totals() {
        let f = setup().await;
        let (key, _) = f.store.create_or_add(&new_key("K-02", 4, 2)).await.unwrap();

        let (old, updated) = f
            .store
            .report_broken(key.id, KeyColor::Silver, 3)
            .await
            .unwrap();

        assert_eq!(updated.silver_count, 1);
        assert_eq!(updated.broken_silver, 3);
        assert_eq!(
            old.silver_count + old.broken_silver,
            updated.silver_count + updated.broken_silver
        );
        // Gold untouched
        assert_eq!(updated.gold_count, old.gold_count);
        assert_eq!(updated.broken_gold, old.broken_gold);
    }

    #[tokio::test]
    async fn report_broken_rejects_insufficient_stock() {
        let f = setup().await;
        let (key, _) = f.store.create_or_add(&new_key("K-03", 1, 0)).await.unwrap();

        let result = f.store.report_broken(key.id, KeyColor::Silver, 2).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        // Counts unchanged
        let unchanged = f.store.get_key(key.id).await.unwrap();
        assert_eq!(unchanged.silver_count, 1);
        assert_eq!(unchanged.broken_silver, 0);
    }

    #[tokio::test]
    async fn assignment_rejects_already_assigned_key() {
        let f = setup().await;
        let (key, _) = f.store.create_or_add(&new_key("K-04", 1, 0)).await.unwrap();

        f.store
            .create_assignment(&CreateAssignmentRequest {
                key_id: key.id,
                location_id: f.location_id,
                cabinet_position_id: f.position_id,
                key_type_id: f.key_type_id,
            })
            .await
            .unwrap();

        let result = f
            .store
            .create_assignment(&CreateAssignmentRequest {
                key_id: key.id,
                location_id: f.location_id,
                cabinet_position_id: f.second_position_id,
                key_type_id: f.key_type_id,
            })
            .await;

        match result {
            Err(DomainError::Conflict(message)) => {
                assert_eq!(message, "Key is already assigned.")
            }
            other => panic!("expected conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn assignment_rejects_position_used_in_other_location() {
        let f = setup().await;
        let (first, _) = f.store.create_or_add(&new_key("K-05", 1, 0)).await.unwrap();
        let (second, _) = f.store.create_or_add(&new_key("K-06", 1, 0)).await.unwrap();

        f.store
            .create_assignment(&CreateAssignmentRequest {
                key_id: first.id,
                location_id: f.location_id,
                cabinet_position_id: f.position_id,
                key_type_id: f.key_type_id,
            })
            .await
            .unwrap();

        // Same position, different location: still exclusive
        let result = f
            .store
            .create_assignment(&CreateAssignmentRequest {
                key_id: second.id,
                location_id: f.second_location_id,
                cabinet_position_id: f.position_id,
                key_type_id: f.key_type_id,
            })
            .await;

        match result {
            Err(DomainError::Conflict(message)) => {
                assert_eq!(message, "Cabinet position is already in use.")
            }
            other => panic!("expected conflict, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn closing_location_with_assignments_is_rejected() {
        let f = setup().await;
        let (key, _) = f.store.create_or_add(&new_key("K-07", 1, 0)).await.unwrap();

        f.store
            .create_assignment(&CreateAssignmentRequest {
                key_id: key.id,
                location_id: f.location_id,
                cabinet_position_id: f.position_id,
                key_type_id: f.key_type_id,
            })
            .await
            .unwrap();

        let result = f
            .store
            .set_location_status(f.location_id, LocationStatus::Closed)
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        // Freeing the position allows the close
        let assignments = f.store.list_assignments(None, None).await.unwrap();
        f.store
            .delete_assignment(assignments[0].assignment.id)
            .await
            .unwrap();

        let (_, updated) = f
            .store
            .set_location_status(f.location_id, LocationStatus::Closed)
            .await
            .unwrap();
        assert_eq!(updated.status, "CLOSED");
    }

    #[tokio::test]
    async fn deleted_assignment_frees_key_and_position() {
        let f = setup().await;
        let (key, _) = f.store.create_or_add(&new_key("K-08", 1, 0)).await.unwrap();

        let details = f
            .store
            .create_assignment(&CreateAssignmentRequest {
                key_id: key.id,
                location_id: f.location_id,
                cabinet_position_id: f.position_id,
                key_type_id: f.key_type_id,
            })
            .await
            .unwrap();
        f.store
            .delete_assignment(details.assignment.id)
            .await
            .unwrap();

        // Both are assignable again
        f.store
            .create_assignment(&CreateAssignmentRequest {
                key_id: key.id,
                location_id: f.location_id,
                cabinet_position_id: f.position_id,
                key_type_id: f.key_type_id,
            })
            .await
            .unwrap();
    }
}
