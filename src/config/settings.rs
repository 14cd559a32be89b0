use std::env;

/// Runtime configuration, resolved from environment variables once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub upload_dir: String,
    /// Password given to the bootstrapped admin account when the users
    /// table is empty.
    pub admin_initial_password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Required environment variable {0} is not set")]
    MissingVariable(&'static str),
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://slotops.db?mode=rwc".to_string());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| SettingsError::MissingVariable("JWT_SECRET"))?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let admin_initial_password =
            env::var("ADMIN_INITIAL_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            upload_dir,
            admin_initial_password,
        })
    }
}
