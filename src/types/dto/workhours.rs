use poem_openapi::Object;

use crate::types::db::{technician, work_log};

#[derive(Object, Debug)]
pub struct TechnicianDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    /// Carried-over starting balance, when one has been set
    pub initial_hours: Option<f64>,
}

impl TechnicianDto {
    pub fn from_parts(model: &technician::Model, initial_hours: Option<f64>) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name.clone(),
            last_name: model.last_name.clone(),
            is_active: model.is_active,
            initial_hours,
        }
    }
}

#[derive(Object, Debug)]
pub struct CreateTechnicianRequest {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Object, Debug)]
pub struct UpdateTechnicianRequest {
    pub id: i32,
    pub is_active: bool,
}

#[derive(Object, Debug)]
pub struct InitialHoursDto {
    pub id: i32,
    pub technician_id: i32,
    pub hours: f64,
}

/// Upsert: creates the row on first write, replaces the value afterwards
#[derive(Object, Debug)]
pub struct SetInitialHoursRequest {
    pub technician_id: i32,
    pub hours: f64,
}

#[derive(Object, Debug)]
pub struct WorkLogDto {
    pub id: i32,
    pub technician_id: i32,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub manual_overtime: Option<f64>,
    pub notes: Option<String>,
}

impl From<work_log::Model> for WorkLogDto {
    fn from(model: work_log::Model) -> Self {
        Self {
            id: model.id,
            technician_id: model.technician_id,
            date: model.date,
            start_time: model.start_time,
            end_time: model.end_time,
            manual_overtime: model.manual_overtime,
            notes: model.notes,
        }
    }
}

/// Either a timed entry (start and end) or a manual overtime entry
#[derive(Object, Debug)]
pub struct CreateWorkLogRequest {
    pub technician_id: i32,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub manual_overtime: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Object, Debug)]
pub struct UpdateWorkLogRequest {
    pub id: i32,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub manual_overtime: Option<f64>,
    pub notes: Option<String>,
}

/// Derived per-technician totals
#[derive(Object, Debug)]
pub struct TechnicianSummaryDto {
    pub technician_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub initial_hours: f64,
    pub worked_hours: f64,
    pub overtime_hours: f64,
    /// initial_hours + total overtime
    pub balance: f64,
    pub log_count: u64,
}
