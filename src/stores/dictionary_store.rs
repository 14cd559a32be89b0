use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::errors::DomainError;
use crate::services::usage_guard;
use crate::types::db::{
    board_definition, cabinet_definition, cabinet_position, certificate_definition,
    controller_definition, game_definition, key_type, location_type,
};
use crate::types::internal::dictionary::DictionaryKind;

/// One dictionary row, normalized across the kinds. Columns a kind does
/// not carry stay None.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DictionaryEntry {
    pub id: i32,
    pub name: String,
    pub bios_name: Option<String>,
    pub drawer_type: Option<String>,
    pub version: Option<String>,
    pub reno_id: Option<String>,
    pub file_path: Option<String>,
    pub is_active: bool,
}

impl DictionaryEntry {
    fn named(id: i32, name: String, is_active: bool) -> Self {
        Self {
            id,
            name,
            bios_name: None,
            drawer_type: None,
            version: None,
            reno_id: None,
            file_path: None,
            is_active,
        }
    }
}

impl From<location_type::Model> for DictionaryEntry {
    fn from(m: location_type::Model) -> Self {
        Self::named(m.id, m.name, m.is_active)
    }
}

impl From<cabinet_position::Model> for DictionaryEntry {
    fn from(m: cabinet_position::Model) -> Self {
        Self::named(m.id, m.name, m.is_active)
    }
}

impl From<key_type::Model> for DictionaryEntry {
    fn from(m: key_type::Model) -> Self {
        Self::named(m.id, m.name, m.is_active)
    }
}

impl From<board_definition::Model> for DictionaryEntry {
    fn from(m: board_definition::Model) -> Self {
        Self {
            bios_name: m.bios_name,
            ..Self::named(m.id, m.name, m.is_active)
        }
    }
}

impl From<cabinet_definition::Model> for DictionaryEntry {
    fn from(m: cabinet_definition::Model) -> Self {
        Self {
            drawer_type: m.drawer_type,
            ..Self::named(m.id, m.name, m.is_active)
        }
    }
}

impl From<game_definition::Model> for DictionaryEntry {
    fn from(m: game_definition::Model) -> Self {
        Self {
            version: m.version,
            reno_id: m.reno_id,
            ..Self::named(m.id, m.name, m.is_active)
        }
    }
}

impl From<controller_definition::Model> for DictionaryEntry {
    fn from(m: controller_definition::Model) -> Self {
        Self {
            version: m.version,
            ..Self::named(m.id, m.name, m.is_active)
        }
    }
}

impl From<certificate_definition::Model> for DictionaryEntry {
    fn from(m: certificate_definition::Model) -> Self {
        Self {
            file_path: m.file_path,
            ..Self::named(m.id, m.name, m.is_active)
        }
    }
}

/// Fields a new dictionary row can carry; irrelevant ones are ignored
/// per kind.
#[derive(Debug, Default)]
pub struct NewDictionaryEntry {
    pub name: String,
    pub bios_name: Option<String>,
    pub drawer_type: Option<String>,
    pub version: Option<String>,
    pub reno_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct DictionaryChanges {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub bios_name: Option<String>,
    pub drawer_type: Option<String>,
    pub version: Option<String>,
    pub reno_id: Option<String>,
    pub file_path: Option<String>,
}

macro_rules! dict_list {
    ($store:expr, $m:ident, $search:expr, $active_only:expr, $op:expr) => {{
        let mut query = $m::Entity::find();
        if let Some(term) = $search {
            query = query.filter($m::Column::Name.contains(term));
        }
        if $active_only {
            query = query.filter($m::Column::IsActive.eq(true));
        }
        query
            .order_by_asc($m::Column::Name)
            .all(&$store.db)
            .await
            .map_err(|e| DomainError::database($op, e))?
            .into_iter()
            .map(DictionaryEntry::from)
            .collect::<Vec<_>>()
    }};
}

macro_rules! dict_get {
    ($store:expr, $m:ident, $id:expr, $op:expr) => {{
        $m::Entity::find_by_id($id)
            .one(&$store.db)
            .await
            .map_err(|e| DomainError::database($op, e))?
            .map(DictionaryEntry::from)
    }};
}

macro_rules! dict_insert {
    ($store:expr, $m:ident, $op:expr, { $($field:ident : $value:expr),* $(,)? }) => {{
        let row = $m::ActiveModel {
            id: NotSet,
            is_active: Set(true),
            $($field: Set($value),)*
        };
        DictionaryEntry::from(
            row.insert(&$store.db)
                .await
                .map_err(|e| DomainError::database($op, e))?,
        )
    }};
}

macro_rules! dict_update {
    ($store:expr, $m:ident, $id:expr, $changes:expr, $op:expr $(, [ $($extra:ident),* ])?) => {{
        let model = $m::Entity::find_by_id($id)
            .one(&$store.db)
            .await
            .map_err(|e| DomainError::database($op, e))?
            .ok_or_else(|| DomainError::not_found("Dictionary item"))?;
        let mut row: $m::ActiveModel = model.into();
        if let Some(name) = $changes.name.clone() {
            row.name = Set(name);
        }
        if let Some(active) = $changes.is_active {
            row.is_active = Set(active);
        }
        $($(
            if let Some(value) = $changes.$extra.clone() {
                row.$extra = Set(Some(value));
            }
        )*)?
        DictionaryEntry::from(
            row.update(&$store.db)
                .await
                .map_err(|e| DomainError::database($op, e))?,
        )
    }};
}

macro_rules! dict_delete {
    ($store:expr, $m:ident, $id:expr, $op:expr) => {{
        let model = $m::Entity::find_by_id($id)
            .one(&$store.db)
            .await
            .map_err(|e| DomainError::database($op, e))?
            .ok_or_else(|| DomainError::not_found("Dictionary item"))?;
        let entry = DictionaryEntry::from(model);
        $m::Entity::delete_by_id($id)
            .exec(&$store.db)
            .await
            .map_err(|e| {
                if e.to_string().contains("FOREIGN KEY") {
                    DomainError::conflict(
                        "Cannot delete item because it is referenced by other records.",
                    )
                } else {
                    DomainError::database($op, e)
                }
            })?;
        entry
    }};
}

/// Generic CRUD over the reference-data tables
pub struct DictionaryStore {
    db: DatabaseConnection,
}

impl DictionaryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(
        &self,
        kind: DictionaryKind,
        search: Option<&str>,
        active_only: bool,
    ) -> Result<Vec<DictionaryEntry>, DomainError> {
        let entries = match kind {
            DictionaryKind::LocationType => {
                dict_list!(self, location_type, search, active_only, "list_location_types")
            }
            DictionaryKind::CabinetPosition => {
                dict_list!(self, cabinet_position, search, active_only, "list_cabinet_positions")
            }
            DictionaryKind::KeyType => {
                dict_list!(self, key_type, search, active_only, "list_key_types")
            }
            DictionaryKind::Board => {
                dict_list!(self, board_definition, search, active_only, "list_boards")
            }
            DictionaryKind::Cabinet => {
                dict_list!(self, cabinet_definition, search, active_only, "list_cabinets")
            }
            DictionaryKind::Game => {
                dict_list!(self, game_definition, search, active_only, "list_games")
            }
            DictionaryKind::Controller => {
                dict_list!(self, controller_definition, search, active_only, "list_controllers")
            }
            DictionaryKind::Certificate => {
                dict_list!(self, certificate_definition, search, active_only, "list_certificates")
            }
        };
        Ok(entries)
    }

    pub async fn get(
        &self,
        kind: DictionaryKind,
        id: i32,
    ) -> Result<Option<DictionaryEntry>, DomainError> {
        let entry = match kind {
            DictionaryKind::LocationType => dict_get!(self, location_type, id, "get_location_type"),
            DictionaryKind::CabinetPosition => {
                dict_get!(self, cabinet_position, id, "get_cabinet_position")
            }
            DictionaryKind::KeyType => dict_get!(self, key_type, id, "get_key_type"),
            DictionaryKind::Board => dict_get!(self, board_definition, id, "get_board"),
            DictionaryKind::Cabinet => dict_get!(self, cabinet_definition, id, "get_cabinet"),
            DictionaryKind::Game => dict_get!(self, game_definition, id, "get_game"),
            DictionaryKind::Controller => {
                dict_get!(self, controller_definition, id, "get_controller")
            }
            DictionaryKind::Certificate => {
                dict_get!(self, certificate_definition, id, "get_certificate")
            }
        };
        Ok(entry)
    }

    pub async fn create(
        &self,
        kind: DictionaryKind,
        entry: NewDictionaryEntry,
    ) -> Result<DictionaryEntry, DomainError> {
        let name = entry.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Name is required"));
        }

        let created = match kind {
            DictionaryKind::LocationType => {
                dict_insert!(self, location_type, "create_location_type", { name: name })
            }
            DictionaryKind::CabinetPosition => {
                dict_insert!(self, cabinet_position, "create_cabinet_position", { name: name })
            }
            DictionaryKind::KeyType => {
                dict_insert!(self, key_type, "create_key_type", { name: name })
            }
            DictionaryKind::Board => {
                dict_insert!(self, board_definition, "create_board", {
                    name: name,
                    bios_name: entry.bios_name,
                })
            }
            DictionaryKind::Cabinet => {
                dict_insert!(self, cabinet_definition, "create_cabinet", {
                    name: name,
                    drawer_type: entry.drawer_type,
                })
            }
            DictionaryKind::Game => {
                dict_insert!(self, game_definition, "create_game", {
                    name: name,
                    version: entry.version,
                    reno_id: entry.reno_id,
                })
            }
            DictionaryKind::Controller => {
                dict_insert!(self, controller_definition, "create_controller", {
                    name: name,
                    version: entry.version,
                })
            }
            DictionaryKind::Certificate => {
                return Err(DomainError::validation(
                    "Certificates are created via the certificates endpoint",
                ));
            }
        };
        Ok(created)
    }

    /// Apply changes, guarding the active-to-inactive transition: an item
    /// still referenced by dependent records cannot be blocked. Blocking
    /// an already-inactive item is a no-op success.
    pub async fn update(
        &self,
        kind: DictionaryKind,
        id: i32,
        changes: DictionaryChanges,
    ) -> Result<(DictionaryEntry, DictionaryEntry), DomainError> {
        let old = self
            .get(kind, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Dictionary item"))?;

        if changes.is_active == Some(false) && old.is_active {
            let used = usage_guard::usage_count(&self.db, kind, id).await?;
            if used > 0 {
                return Err(DomainError::conflict(format!(
                    "Cannot block {}: it is currently used by {} record(s).",
                    kind.display_name(),
                    used
                )));
            }
        }

        let updated = match kind {
            DictionaryKind::LocationType => {
                dict_update!(self, location_type, id, changes, "update_location_type")
            }
            DictionaryKind::CabinetPosition => {
                dict_update!(self, cabinet_position, id, changes, "update_cabinet_position")
            }
            DictionaryKind::KeyType => dict_update!(self, key_type, id, changes, "update_key_type"),
            DictionaryKind::Board => {
                dict_update!(self, board_definition, id, changes, "update_board", [bios_name])
            }
            DictionaryKind::Cabinet => {
                dict_update!(self, cabinet_definition, id, changes, "update_cabinet", [drawer_type])
            }
            DictionaryKind::Game => {
                dict_update!(self, game_definition, id, changes, "update_game", [version, reno_id])
            }
            DictionaryKind::Controller => {
                dict_update!(self, controller_definition, id, changes, "update_controller", [version])
            }
            DictionaryKind::Certificate => {
                dict_update!(self, certificate_definition, id, changes, "update_certificate", [file_path])
            }
        };

        Ok((old, updated))
    }

    /// Delete an unreferenced item. Usage is checked first; a foreign key
    /// rejection from the database is mapped to the same conflict.
    pub async fn delete(
        &self,
        kind: DictionaryKind,
        id: i32,
    ) -> Result<DictionaryEntry, DomainError> {
        let used = usage_guard::usage_count(&self.db, kind, id).await?;
        if used > 0 {
            return Err(DomainError::conflict(format!(
                "Cannot delete {}: it is currently used by {} record(s).",
                kind.display_name(),
                used
            )));
        }

        let deleted = match kind {
            DictionaryKind::LocationType => {
                dict_delete!(self, location_type, id, "delete_location_type")
            }
            DictionaryKind::CabinetPosition => {
                dict_delete!(self, cabinet_position, id, "delete_cabinet_position")
            }
            DictionaryKind::KeyType => dict_delete!(self, key_type, id, "delete_key_type"),
            DictionaryKind::Board => dict_delete!(self, board_definition, id, "delete_board"),
            DictionaryKind::Cabinet => dict_delete!(self, cabinet_definition, id, "delete_cabinet"),
            DictionaryKind::Game => dict_delete!(self, game_definition, id, "delete_game"),
            DictionaryKind::Controller => {
                dict_delete!(self, controller_definition, id, "delete_controller")
            }
            DictionaryKind::Certificate => {
                dict_delete!(self, certificate_definition, id, "delete_certificate")
            }
        };
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (DatabaseConnection, DictionaryStore) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        (db.clone(), DictionaryStore::new(db))
    }

    fn named(name: &str) -> NewDictionaryEntry {
        NewDictionaryEntry {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_list_filters_inactive() {
        let (_db, store) = setup().await;
        let kind = DictionaryKind::KeyType;

        let a = store.create(kind, named("Door")).await.unwrap();
        store.create(kind, named("Cash")).await.unwrap();
        store
            .update(
                kind,
                a.id,
                DictionaryChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = store.list(kind, None, false).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = store.list(kind, None, true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Cash");
    }

    #[tokio::test]
    async fn blocking_used_location_type_is_rejected() {
        let (db, store) = setup().await;
        let kind = DictionaryKind::LocationType;
        let lt = store.create(kind, named("Casino")).await.unwrap();

        // One location references the type
        use crate::types::db::location;
        use sea_orm::{ActiveModelTrait, Set};
        location::ActiveModel {
            id: NotSet,
            name: Set("Main floor".to_string()),
            location_type_id: Set(lt.id),
            status: Set("OPEN".to_string()),
        }
        .insert(&db)
        .await
        .unwrap();

        let result = store
            .update(
                kind,
                lt.id,
                DictionaryChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(DomainError::Conflict(message)) => {
                assert!(message.contains("used by 1 record(s)"));
            }
            other => panic!("expected conflict, got {:?}", other.map(|_| ())),
        }

        // Item is still active
        let entry = store.get(kind, lt.id).await.unwrap().unwrap();
        assert!(entry.is_active);
    }

    #[tokio::test]
    async fn reblocking_inactive_item_is_noop_success() {
        let (_db, store) = setup().await;
        let kind = DictionaryKind::CabinetPosition;
        let item = store.create(kind, named("Top drawer")).await.unwrap();

        store
            .update(
                kind,
                item.id,
                DictionaryChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Blocking again succeeds without a guard check
        let (old, updated) = store
            .update(
                kind,
                item.id,
                DictionaryChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!old.is_active);
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn certificate_create_is_redirected() {
        let (_db, store) = setup().await;
        let result = store
            .create(DictionaryKind::Certificate, named("CERT-1"))
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
