use chrono::Utc;
use poem_openapi::{payload::Json, Object, OpenApi, Tags};

#[derive(Tags)]
enum HealthTags {
    /// Health check endpoints
    Health,
}

#[derive(Object, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub struct HealthApi;

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    #[oai(path = "/health", method = "get", tag = "HealthTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}
