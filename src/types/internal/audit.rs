use serde_json::Value;

use crate::types::internal::auth::SessionUser;

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Block,
    Unblock,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Block => "BLOCK",
            AuditAction::Unblock => "UNBLOCK",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(AuditAction::Create),
            "UPDATE" => Some(AuditAction::Update),
            "DELETE" => Some(AuditAction::Delete),
            "BLOCK" => Some(AuditAction::Block),
            "UNBLOCK" => Some(AuditAction::Unblock),
            _ => None,
        }
    }
}

/// One audit entry about to be written. Built by handlers after the
/// primary mutation has succeeded.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub user_id: Option<i32>,
    pub username: String,
    pub action: AuditAction,
    pub table_name: String,
    pub record_id: Option<i32>,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub description: String,
}

impl AuditRecord {
    pub fn new(
        actor: &SessionUser,
        action: AuditAction,
        table_name: &str,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(actor.id),
            username: actor.username.clone(),
            action,
            table_name: table_name.to_owned(),
            record_id: None,
            old_value: None,
            new_value: None,
            description: description.into(),
        }
    }

    pub fn record_id(mut self, id: i32) -> Self {
        self.record_id = Some(id);
        self
    }

    pub fn old_value(mut self, value: Value) -> Self {
        self.old_value = Some(value);
        self
    }

    pub fn new_value(mut self, value: Value) -> Self {
        self.new_value = Some(value);
        self
    }
}

/// Filter for querying the audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub table_name: Option<String>,
    pub action: Option<AuditAction>,
    pub user_id: Option<i32>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
