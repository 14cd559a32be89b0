use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::errors::DomainError;
use crate::types::db::{
    certificate_cabinet, certificate_definition, jackpot_config, key_assignment, location,
};
use crate::types::internal::dictionary::DictionaryKind;

/// How many dependent records reference the given dictionary item.
///
/// One declarative table of kind to dependent relation; every block and
/// delete guard goes through here instead of per-route checks.
pub async fn usage_count(
    db: &DatabaseConnection,
    kind: DictionaryKind,
    id: i32,
) -> Result<u64, DomainError> {
    let count = match kind {
        DictionaryKind::LocationType => {
            location::Entity::find()
                .filter(location::Column::LocationTypeId.eq(id))
                .count(db)
                .await
        }
        DictionaryKind::CabinetPosition => {
            key_assignment::Entity::find()
                .filter(key_assignment::Column::CabinetPositionId.eq(id))
                .count(db)
                .await
        }
        DictionaryKind::KeyType => {
            key_assignment::Entity::find()
                .filter(key_assignment::Column::KeyTypeId.eq(id))
                .count(db)
                .await
        }
        DictionaryKind::Board => {
            certificate_definition::Entity::find()
                .filter(certificate_definition::Column::BoardId.eq(id))
                .count(db)
                .await
        }
        DictionaryKind::Game => {
            certificate_definition::Entity::find()
                .filter(certificate_definition::Column::GameId.eq(id))
                .count(db)
                .await
        }
        DictionaryKind::Cabinet => {
            certificate_cabinet::Entity::find()
                .filter(certificate_cabinet::Column::CabinetId.eq(id))
                .count(db)
                .await
        }
        DictionaryKind::Certificate => {
            certificate_cabinet::Entity::find()
                .filter(certificate_cabinet::Column::CertificateId.eq(id))
                .count(db)
                .await
        }
        DictionaryKind::Controller => {
            jackpot_config::Entity::find()
                .filter(jackpot_config::Column::ControllerId.eq(id))
                .count(db)
                .await
        }
    };

    count.map_err(|e| DomainError::database("usage_count", e))
}
