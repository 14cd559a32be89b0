use poem_openapi::Object;

use crate::types::internal::permissions::Module;

/// One row of a user's permission matrix
#[derive(Object, Debug, Clone)]
pub struct ModulePermissionDto {
    pub module: Module,
    pub can_view: bool,
    pub can_write: bool,
}

/// Generic confirmation body for deletes
#[derive(Object, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
