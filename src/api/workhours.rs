use std::sync::Arc;

use poem_openapi::param::Query;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::{authenticate, require_view, require_write, snapshot, BearerAuth};
use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::workhours::{
    CreateTechnicianRequest, CreateWorkLogRequest, InitialHoursDto, SetInitialHoursRequest,
    TechnicianDto, TechnicianSummaryDto, UpdateTechnicianRequest, UpdateWorkLogRequest, WorkLogDto,
};
use crate::types::internal::audit::{AuditAction, AuditRecord};
use crate::types::internal::permissions::Module;

#[derive(Tags)]
enum WorkhoursTags {
    /// Technician work-hours tracking
    Workhours,
}

/// Work-hours module API: technicians, logs and the overtime summary
pub struct WorkhoursApi {
    app: Arc<AppData>,
}

impl WorkhoursApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[OpenApi(prefix_path = "/workhours")]
impl WorkhoursApi {
    // --- technicians ---

    /// List technicians with their starting balances
    #[oai(path = "/technicians", method = "get", tag = "WorkhoursTags::Workhours")]
    async fn list_technicians(
        &self,
        auth: BearerAuth,
        search: Query<Option<String>>,
        active_only: Query<Option<bool>>,
    ) -> Result<Json<Vec<TechnicianDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Workhours).await?;

        let technicians = self
            .app
            .workhours_store
            .list_technicians(search.0.as_deref(), active_only.0.unwrap_or(false))
            .await?;
        Ok(Json(
            technicians
                .iter()
                .map(|(technician, initial)| TechnicianDto::from_parts(technician, *initial))
                .collect(),
        ))
    }

    /// Add a technician
    #[oai(path = "/technicians", method = "post", tag = "WorkhoursTags::Workhours")]
    async fn create_technician(
        &self,
        auth: BearerAuth,
        body: Json<CreateTechnicianRequest>,
    ) -> Result<Json<TechnicianDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Workhours).await?;

        let created = self
            .app
            .workhours_store
            .create_technician(&body.first_name, &body.last_name)
            .await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Create,
                    "technicians",
                    format!(
                        "Created technician \"{} {}\"",
                        created.first_name, created.last_name
                    ),
                )
                .record_id(created.id)
                .new_value(snapshot(&created)),
            )
            .await;

        Ok(Json(TechnicianDto::from_parts(&created, None)))
    }

    /// Activate or deactivate a technician
    #[oai(path = "/technicians", method = "put", tag = "WorkhoursTags::Workhours")]
    async fn update_technician(
        &self,
        auth: BearerAuth,
        body: Json<UpdateTechnicianRequest>,
    ) -> Result<Json<TechnicianDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Workhours).await?;

        let (old, updated) = self
            .app
            .workhours_store
            .set_technician_active(body.id, body.is_active)
            .await?;

        let (action, description) = match (old.is_active, updated.is_active) {
            (true, false) => (
                AuditAction::Block,
                format!(
                    "Deactivated technician \"{} {}\"",
                    updated.first_name, updated.last_name
                ),
            ),
            (false, true) => (
                AuditAction::Unblock,
                format!(
                    "Reactivated technician \"{} {}\"",
                    updated.first_name, updated.last_name
                ),
            ),
            _ => (
                AuditAction::Update,
                format!(
                    "Updated technician \"{} {}\"",
                    updated.first_name, updated.last_name
                ),
            ),
        };
        self.app
            .audit_logger
            .record(
                AuditRecord::new(&user, action, "technicians", description)
                    .record_id(updated.id)
                    .old_value(snapshot(&old))
                    .new_value(snapshot(&updated)),
            )
            .await;

        Ok(Json(TechnicianDto::from_parts(&updated, None)))
    }

    // --- initial hours ---

    /// List starting balances
    #[oai(
        path = "/initial-hours",
        method = "get",
        tag = "WorkhoursTags::Workhours"
    )]
    async fn list_initial_hours(
        &self,
        auth: BearerAuth,
    ) -> Result<Json<Vec<InitialHoursDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Workhours).await?;

        let rows = self.app.workhours_store.list_initial_hours().await?;
        Ok(Json(
            rows.into_iter()
                .map(|row| InitialHoursDto {
                    id: row.id,
                    technician_id: row.technician_id,
                    hours: row.hours,
                })
                .collect(),
        ))
    }

    /// Set a technician's starting balance (upsert)
    #[oai(
        path = "/initial-hours",
        method = "post",
        tag = "WorkhoursTags::Workhours"
    )]
    async fn set_initial_hours(
        &self,
        auth: BearerAuth,
        body: Json<SetInitialHoursRequest>,
    ) -> Result<Json<InitialHoursDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Workhours).await?;

        let (previous, current) = self
            .app
            .workhours_store
            .set_initial_hours(body.technician_id, body.hours)
            .await?;

        let mut record = AuditRecord::new(
            &user,
            if previous.is_some() {
                AuditAction::Update
            } else {
                AuditAction::Create
            },
            "initial_hours",
            format!(
                "Set initial hours for technician {} to {}",
                current.technician_id, current.hours
            ),
        )
        .record_id(current.id)
        .new_value(snapshot(&current));
        if let Some(previous) = &previous {
            record = record.old_value(snapshot(previous));
        }
        self.app.audit_logger.record(record).await;

        Ok(Json(InitialHoursDto {
            id: current.id,
            technician_id: current.technician_id,
            hours: current.hours,
        }))
    }

    // --- work logs ---

    /// List work logs, optionally filtered by technician and date range
    #[oai(path = "/logs", method = "get", tag = "WorkhoursTags::Workhours")]
    async fn list_logs(
        &self,
        auth: BearerAuth,
        technician_id: Query<Option<i32>>,
        start_date: Query<Option<String>>,
        end_date: Query<Option<String>>,
    ) -> Result<Json<Vec<WorkLogDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Workhours).await?;

        let logs = self
            .app
            .workhours_store
            .list_logs(
                technician_id.0,
                start_date.0.as_deref(),
                end_date.0.as_deref(),
            )
            .await?;
        Ok(Json(logs.into_iter().map(Into::into).collect()))
    }

    /// Record a timed or manual-overtime work entry
    #[oai(path = "/logs", method = "post", tag = "WorkhoursTags::Workhours")]
    async fn create_log(
        &self,
        auth: BearerAuth,
        body: Json<CreateWorkLogRequest>,
    ) -> Result<Json<WorkLogDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Workhours).await?;

        let created = self.app.workhours_store.create_log(&body).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Create,
                    "work_logs",
                    format!(
                        "Logged work on {} for technician {}",
                        created.date, created.technician_id
                    ),
                )
                .record_id(created.id)
                .new_value(snapshot(&created)),
            )
            .await;

        Ok(Json(created.into()))
    }

    /// Update a work entry
    #[oai(path = "/logs", method = "put", tag = "WorkhoursTags::Workhours")]
    async fn update_log(
        &self,
        auth: BearerAuth,
        body: Json<UpdateWorkLogRequest>,
    ) -> Result<Json<WorkLogDto>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Workhours).await?;

        let (old, updated) = self.app.workhours_store.update_log(&body).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Update,
                    "work_logs",
                    format!(
                        "Updated work log {} for technician {}",
                        updated.id, updated.technician_id
                    ),
                )
                .record_id(updated.id)
                .old_value(snapshot(&old))
                .new_value(snapshot(&updated)),
            )
            .await;

        Ok(Json(updated.into()))
    }

    /// Delete a work entry
    #[oai(path = "/logs", method = "delete", tag = "WorkhoursTags::Workhours")]
    async fn delete_log(
        &self,
        auth: BearerAuth,
        id: Query<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_write(&self.app, &user, Module::Workhours).await?;

        let deleted = self.app.workhours_store.delete_log(id.0).await?;

        self.app
            .audit_logger
            .record(
                AuditRecord::new(
                    &user,
                    AuditAction::Delete,
                    "work_logs",
                    format!(
                        "Deleted work log {} for technician {}",
                        deleted.id, deleted.technician_id
                    ),
                )
                .record_id(deleted.id)
                .old_value(snapshot(&deleted)),
            )
            .await;

        Ok(Json(MessageResponse::new("Work log deleted")))
    }

    // --- summary ---

    /// Per-technician worked and overtime totals, sorted by balance
    #[oai(path = "/summary", method = "get", tag = "WorkhoursTags::Workhours")]
    async fn summary(&self, auth: BearerAuth) -> Result<Json<Vec<TechnicianSummaryDto>>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;
        require_view(&self.app, &user, Module::Workhours).await?;

        let summaries = self.app.workhours_store.summary().await?;
        Ok(Json(
            summaries
                .into_iter()
                .map(|s| TechnicianSummaryDto {
                    technician_id: s.technician.id,
                    first_name: s.technician.first_name,
                    last_name: s.technician.last_name,
                    initial_hours: s.initial_hours,
                    worked_hours: s.worked_hours,
                    overtime_hours: s.overtime_hours,
                    balance: s.balance,
                    log_count: s.log_count,
                })
                .collect(),
        ))
    }
}
