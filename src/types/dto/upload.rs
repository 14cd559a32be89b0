use poem_openapi::Object;

/// Result of a successful file upload
#[derive(Object, Debug)]
pub struct UploadResponse {
    /// Relative URL the stored file is served under
    pub url: String,
    pub filename: String,
}
