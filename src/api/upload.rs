use std::path::Path;
use std::sync::Arc;

use poem_openapi::types::multipart::Upload;
use poem_openapi::{payload::Json, Multipart, OpenApi, Tags};
use uuid::Uuid;

use crate::api::{authenticate, BearerAuth};
use crate::app_data::AppData;
use crate::errors::ApiError;
use crate::types::dto::upload::UploadResponse;

#[derive(Tags)]
enum UploadTags {
    /// File uploads
    Upload,
}

#[derive(Multipart, Debug)]
struct UploadPayload {
    file: Upload,
}

/// Stores uploaded files under the configured upload directory and
/// hands back the relative URL they are served from.
pub struct UploadApi {
    app: Arc<AppData>,
}

impl UploadApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[OpenApi]
impl UploadApi {
    /// Upload a file
    #[oai(path = "/upload", method = "post", tag = "UploadTags::Upload")]
    async fn upload(
        &self,
        auth: BearerAuth,
        payload: UploadPayload,
    ) -> Result<Json<UploadResponse>, ApiError> {
        let user = authenticate(&self.app, &auth).await?;

        let original_name = payload
            .file
            .file_name()
            .map(sanitize_filename)
            .unwrap_or_else(|| "upload".to_string());
        // Unique prefix keeps repeated uploads of the same file apart.
        let stored_name = format!("{}_{}", Uuid::new_v4(), original_name);

        let dir = self.app.upload_dir.clone();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            tracing::error!(error = %e, dir = %dir, "Failed to create upload directory");
            ApiError::internal_server_error()
        })?;

        let bytes = payload.file.into_vec().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read uploaded file");
            ApiError::internal_server_error()
        })?;

        let target = Path::new(&dir).join(&stored_name);
        tokio::fs::write(&target, &bytes).await.map_err(|e| {
            tracing::error!(error = %e, path = %target.display(), "Failed to store uploaded file");
            ApiError::internal_server_error()
        })?;

        tracing::info!(
            username = %user.username,
            filename = %stored_name,
            size = bytes.len(),
            "File uploaded"
        );

        Ok(Json(UploadResponse {
            url: format!("/uploads/{stored_name}"),
            filename: stored_name,
        }))
    }
}

/// Strips path components and anything outside a conservative character set.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\report.pdf"), "report.pdf");
    }

    #[test]
    fn sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("cert list (v2).bin"), "cert_list__v2_.bin");
    }

    #[test]
    fn sanitize_falls_back_on_empty_names() {
        assert_eq!(sanitize_filename("..."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }
}
