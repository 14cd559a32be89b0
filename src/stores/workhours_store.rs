use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::errors::DomainError;
use crate::types::db::{initial_hours, technician, work_log};
use crate::types::dto::workhours::{CreateWorkLogRequest, UpdateWorkLogRequest};

const STANDARD_SHIFT_HOURS: f64 = 8.0;

/// Derived totals for one technician
#[derive(Debug, Clone)]
pub struct TechnicianSummary {
    pub technician: technician::Model,
    pub initial_hours: f64,
    pub worked_hours: f64,
    pub overtime_hours: f64,
    pub balance: f64,
    pub log_count: u64,
}

/// Repository for the work-hours module
pub struct WorkhoursStore {
    db: DatabaseConnection,
}

impl WorkhoursStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // --- technicians ---

    pub async fn list_technicians(
        &self,
        search: Option<&str>,
        active_only: bool,
    ) -> Result<Vec<(technician::Model, Option<f64>)>, DomainError> {
        let mut query = technician::Entity::find();
        if active_only {
            query = query.filter(technician::Column::IsActive.eq(true));
        }
        let mut technicians = query
            .order_by_asc(technician::Column::LastName)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_technicians", e))?;

        if let Some(term) = search {
            let term = term.to_lowercase();
            technicians.retain(|t| {
                t.first_name.to_lowercase().contains(&term)
                    || t.last_name.to_lowercase().contains(&term)
            });
        }

        let initial = self.initial_hours_by_technician().await?;
        Ok(technicians
            .into_iter()
            .map(|t| {
                let hours = initial.get(&t.id).copied();
                (t, hours)
            })
            .collect())
    }

    pub async fn get_technician(&self, id: i32) -> Result<technician::Model, DomainError> {
        technician::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_technician", e))?
            .ok_or_else(|| DomainError::not_found("Technician"))
    }

    pub async fn create_technician(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<technician::Model, DomainError> {
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(DomainError::validation(
                "First and last name are required",
            ));
        }

        technician::ActiveModel {
            id: NotSet,
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            is_active: Set(true),
        }
        .insert(&self.db)
        .await
        .map_err(|e| DomainError::database("create_technician", e))
    }

    pub async fn set_technician_active(
        &self,
        id: i32,
        is_active: bool,
    ) -> Result<(technician::Model, technician::Model), DomainError> {
        let old = self.get_technician(id).await?;
        let mut row: technician::ActiveModel = old.clone().into();
        row.is_active = Set(is_active);
        let updated = row
            .update(&self.db)
            .await
            .map_err(|e| DomainError::database("update_technician", e))?;
        Ok((old, updated))
    }

    // --- initial hours ---

    pub async fn list_initial_hours(&self) -> Result<Vec<initial_hours::Model>, DomainError> {
        initial_hours::Entity::find()
            .order_by_asc(initial_hours::Column::TechnicianId)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_initial_hours", e))
    }

    /// Set a technician's starting balance. Returns the previous row when
    /// one existed, so the caller can audit create and update differently.
    pub async fn set_initial_hours(
        &self,
        technician_id: i32,
        hours: f64,
    ) -> Result<(Option<initial_hours::Model>, initial_hours::Model), DomainError> {
        self.get_technician(technician_id).await?;

        let existing = initial_hours::Entity::find()
            .filter(initial_hours::Column::TechnicianId.eq(technician_id))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_initial_hours", e))?;

        if let Some(old) = existing {
            let mut row: initial_hours::ActiveModel = old.clone().into();
            row.hours = Set(hours);
            let updated = row
                .update(&self.db)
                .await
                .map_err(|e| DomainError::database("update_initial_hours", e))?;
            Ok((Some(old), updated))
        } else {
            let created = initial_hours::ActiveModel {
                id: NotSet,
                technician_id: Set(technician_id),
                hours: Set(hours),
            }
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::database("create_initial_hours", e))?;
            Ok((None, created))
        }
    }

    // --- work logs ---

    pub async fn list_logs(
        &self,
        technician_id: Option<i32>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<work_log::Model>, DomainError> {
        let mut query = work_log::Entity::find();
        if let Some(id) = technician_id {
            query = query.filter(work_log::Column::TechnicianId.eq(id));
        }
        // ISO dates compare correctly as strings
        if let Some(from) = start_date {
            query = query.filter(work_log::Column::Date.gte(from));
        }
        if let Some(to) = end_date {
            query = query.filter(work_log::Column::Date.lte(to));
        }
        query
            .order_by_desc(work_log::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_work_logs", e))
    }

    pub async fn create_log(
        &self,
        request: &CreateWorkLogRequest,
    ) -> Result<work_log::Model, DomainError> {
        self.get_technician(request.technician_id).await?;
        validate_date(&request.date)?;

        let (start_time, end_time, manual_overtime) = normalize_entry(
            request.start_time.as_deref(),
            request.end_time.as_deref(),
            request.manual_overtime,
        )?;

        work_log::ActiveModel {
            id: NotSet,
            technician_id: Set(request.technician_id),
            date: Set(request.date.clone()),
            start_time: Set(start_time),
            end_time: Set(end_time),
            manual_overtime: Set(manual_overtime),
            notes: Set(request.notes.clone()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| DomainError::database("create_work_log", e))
    }

    pub async fn update_log(
        &self,
        request: &UpdateWorkLogRequest,
    ) -> Result<(work_log::Model, work_log::Model), DomainError> {
        let old = work_log::Entity::find_by_id(request.id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_work_log", e))?
            .ok_or_else(|| DomainError::not_found("Work log"))?;

        let date = request.date.clone().unwrap_or_else(|| old.date.clone());
        validate_date(&date)?;

        // Fields not present in the request keep their stored values,
        // then the combined entry is re-validated as a whole.
        let start = request
            .start_time
            .clone()
            .or_else(|| old.start_time.clone());
        let end = request.end_time.clone().or_else(|| old.end_time.clone());
        let manual = request.manual_overtime.or(old.manual_overtime);
        let (start_time, end_time, manual_overtime) = if request.manual_overtime.is_some() {
            // Switching to a manual entry drops the stored times
            normalize_entry(None, None, request.manual_overtime)?
        } else if request.start_time.is_some() || request.end_time.is_some() {
            // Switching to a timed entry drops the stored manual value
            normalize_entry(start.as_deref(), end.as_deref(), None)?
        } else {
            normalize_entry(start.as_deref(), end.as_deref(), manual)?
        };

        let mut row: work_log::ActiveModel = old.clone().into();
        row.date = Set(date);
        row.start_time = Set(start_time);
        row.end_time = Set(end_time);
        row.manual_overtime = Set(manual_overtime);
        // An empty string clears the note, an absent field keeps it.
        if let Some(notes) = &request.notes {
            row.notes = Set(if notes.trim().is_empty() {
                None
            } else {
                Some(notes.clone())
            });
        }

        let updated = row
            .update(&self.db)
            .await
            .map_err(|e| DomainError::database("update_work_log", e))?;
        Ok((old, updated))
    }

    pub async fn delete_log(&self, id: i32) -> Result<work_log::Model, DomainError> {
        let old = work_log::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::database("get_work_log", e))?
            .ok_or_else(|| DomainError::not_found("Work log"))?;

        work_log::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::database("delete_work_log", e))?;

        Ok(old)
    }

    // --- summary ---

    /// Per-technician totals over all logs, sorted by balance descending.
    ///
    /// Timed entries contribute their span to worked hours and the span
    /// minus the standard shift to overtime. Manual entries contribute
    /// their value to overtime only.
    pub async fn summary(&self) -> Result<Vec<TechnicianSummary>, DomainError> {
        let technicians = technician::Entity::find()
            .filter(technician::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_technicians", e))?;
        let initial = self.initial_hours_by_technician().await?;
        let logs = work_log::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_work_logs", e))?;

        let mut logs_by_technician: HashMap<i32, Vec<work_log::Model>> = HashMap::new();
        for log in logs {
            logs_by_technician
                .entry(log.technician_id)
                .or_default()
                .push(log);
        }

        let mut summaries: Vec<TechnicianSummary> = technicians
            .into_iter()
            .map(|t| {
                let initial_hours = initial.get(&t.id).copied().unwrap_or(0.0);
                let logs = logs_by_technician.remove(&t.id).unwrap_or_default();
                let log_count = logs.len() as u64;

                let mut worked_hours = 0.0;
                let mut overtime_hours = 0.0;
                for log in &logs {
                    if let Some(manual) = log.manual_overtime {
                        overtime_hours += manual;
                    } else if let (Some(start), Some(end)) = (&log.start_time, &log.end_time) {
                        if let Some(span) = span_hours(start, end) {
                            worked_hours += span;
                            overtime_hours += span - STANDARD_SHIFT_HOURS;
                        }
                    }
                }

                let balance = initial_hours + overtime_hours;
                TechnicianSummary {
                    technician: t,
                    initial_hours: round2(initial_hours),
                    worked_hours: round2(worked_hours),
                    overtime_hours: round2(overtime_hours),
                    balance: round2(balance),
                    log_count,
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.balance
                .partial_cmp(&a.balance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(summaries)
    }

    async fn initial_hours_by_technician(&self) -> Result<HashMap<i32, f64>, DomainError> {
        Ok(initial_hours::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::database("list_initial_hours", e))?
            .into_iter()
            .map(|row| (row.technician_id, row.hours))
            .collect())
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn validate_date(date: &str) -> Result<(), DomainError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| DomainError::validation("Invalid date format, expected YYYY-MM-DD"))
}

fn parse_time(value: &str) -> Result<i32, DomainError> {
    let invalid = || DomainError::validation("Invalid time format, expected HH:MM");
    let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

fn span_hours(start: &str, end: &str) -> Option<f64> {
    let start = parse_time(start).ok()?;
    let end = parse_time(end).ok()?;
    if end <= start {
        return None;
    }
    Some(f64::from(end - start) / 60.0)
}

/// Check and canonicalize an entry: manual overtime and timed hours are
/// mutually exclusive, and a timed entry needs both ends in order.
fn normalize_entry(
    start: Option<&str>,
    end: Option<&str>,
    manual: Option<f64>,
) -> Result<(Option<String>, Option<String>, Option<f64>), DomainError> {
    if let Some(manual) = manual {
        return Ok((None, None, Some(manual)));
    }
    match (start, end) {
        (Some(start), Some(end)) => {
            let from = parse_time(start)?;
            let to = parse_time(end)?;
            if to <= from {
                return Err(DomainError::validation(
                    "End time must be after start time",
                ));
            }
            Ok((Some(start.to_string()), Some(end.to_string()), None))
        }
        _ => Err(DomainError::validation(
            "Either manual overtime or start and end times are required",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> WorkhoursStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        WorkhoursStore::new(db)
    }

    fn timed_log(technician_id: i32, date: &str, start: &str, end: &str) -> CreateWorkLogRequest {
        CreateWorkLogRequest {
            technician_id,
            date: date.to_string(),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            manual_overtime: None,
            notes: None,
        }
    }

    fn manual_log(technician_id: i32, date: &str, overtime: f64) -> CreateWorkLogRequest {
        CreateWorkLogRequest {
            technician_id,
            date: date.to_string(),
            start_time: None,
            end_time: None,
            manual_overtime: Some(overtime),
            notes: None,
        }
    }

    #[tokio::test]
    async fn summary_combines_initial_manual_and_timed_entries() {
        let store = setup().await;
        let tech = store.create_technician("Ana", "Novak").await.unwrap();

        store.set_initial_hours(tech.id, 10.0).await.unwrap();
        store
            .create_log(&manual_log(tech.id, "2025-03-01", 2.0))
            .await
            .unwrap();
        store
            .create_log(&timed_log(tech.id, "2025-03-02", "07:00", "16:00"))
            .await
            .unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.len(), 1);
        let row = &summary[0];

        // Timed entry: 9 worked, 1 overtime; manual entry: 2 overtime
        assert_eq!(row.worked_hours, 9.0);
        assert_eq!(row.overtime_hours, 3.0);
        assert_eq!(row.balance, 13.0);
        assert_eq!(row.log_count, 2);
    }

    #[tokio::test]
    async fn summary_sorts_by_balance_descending() {
        let store = setup().await;
        let low = store.create_technician("Bo", "Kranjc").await.unwrap();
        let high = store.create_technician("Cilka", "Zupan").await.unwrap();

        store.set_initial_hours(low.id, 1.0).await.unwrap();
        store.set_initial_hours(high.id, 5.0).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary[0].technician.id, high.id);
        assert_eq!(summary[1].technician.id, low.id);
    }

    #[tokio::test]
    async fn summary_excludes_inactive_technicians() {
        let store = setup().await;
        let tech = store.create_technician("Dana", "Vidmar").await.unwrap();
        store.set_technician_active(tech.id, false).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn set_initial_hours_upserts() {
        let store = setup().await;
        let tech = store.create_technician("Eva", "Hren").await.unwrap();

        let (previous, created) = store.set_initial_hours(tech.id, 4.0).await.unwrap();
        assert!(previous.is_none());
        assert_eq!(created.hours, 4.0);

        let (previous, updated) = store.set_initial_hours(tech.id, 6.5).await.unwrap();
        assert_eq!(previous.unwrap().hours, 4.0);
        assert_eq!(updated.hours, 6.5);
        assert_eq!(created.id, updated.id);
    }

    #[tokio::test]
    async fn create_log_rejects_empty_entry() {
        let store = setup().await;
        let tech = store.create_technician("Fran", "Kos").await.unwrap();

        let result = store
            .create_log(&CreateWorkLogRequest {
                technician_id: tech.id,
                date: "2025-03-01".to_string(),
                start_time: None,
                end_time: None,
                manual_overtime: None,
                notes: None,
            })
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn create_log_rejects_inverted_times() {
        let store = setup().await;
        let tech = store.create_technician("Gal", "Mlakar").await.unwrap();

        let result = store
            .create_log(&timed_log(tech.id, "2025-03-01", "16:00", "07:00"))
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn manual_entry_clears_times_on_update() {
        let store = setup().await;
        let tech = store.create_technician("Hana", "Potok").await.unwrap();
        let log = store
            .create_log(&timed_log(tech.id, "2025-03-01", "08:00", "17:00"))
            .await
            .unwrap();

        let (_, updated) = store
            .update_log(&UpdateWorkLogRequest {
                id: log.id,
                date: None,
                start_time: None,
                end_time: None,
                manual_overtime: Some(1.5),
                notes: None,
            })
            .await
            .unwrap();

        assert!(updated.start_time.is_none());
        assert!(updated.end_time.is_none());
        assert_eq!(updated.manual_overtime, Some(1.5));
    }

    #[tokio::test]
    async fn empty_notes_string_clears_the_note() {
        let store = setup().await;
        let tech = store.create_technician("Jure", "Kralj").await.unwrap();
        let log = store
            .create_log(&timed_log(tech.id, "2025-03-01", "08:00", "16:00"))
            .await
            .unwrap();

        let note_update = |notes: Option<&str>| UpdateWorkLogRequest {
            id: log.id,
            date: None,
            start_time: None,
            end_time: None,
            manual_overtime: None,
            notes: notes.map(str::to_string),
        };

        let (_, updated) = store
            .update_log(&note_update(Some("replaced a lock")))
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("replaced a lock"));

        // Absent field keeps the stored note.
        let (_, updated) = store.update_log(&note_update(None)).await.unwrap();
        assert_eq!(updated.notes.as_deref(), Some("replaced a lock"));

        let (_, updated) = store.update_log(&note_update(Some(""))).await.unwrap();
        assert!(updated.notes.is_none());
    }

    #[tokio::test]
    async fn list_logs_filters_by_date_range() {
        let store = setup().await;
        let tech = store.create_technician("Iva", "Rozman").await.unwrap();

        for date in ["2025-02-27", "2025-03-01", "2025-03-05"] {
            store
                .create_log(&manual_log(tech.id, date, 1.0))
                .await
                .unwrap();
        }

        let logs = store
            .list_logs(Some(tech.id), Some("2025-03-01"), Some("2025-03-31"))
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
    }
}
