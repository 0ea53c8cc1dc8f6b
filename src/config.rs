//! Client configuration: where the record store lives and which Cloudinary
//! target receives image uploads. A browser client has no environment to
//! read, so everything arrives through constructors.

/// Deployed record-store backend.
pub const DEFAULT_API_BASE: &str = "https://local-food-lovers.onrender.com";

/// Image upload destination (Cloudinary unsigned preset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadTarget {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl UploadTarget {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        }
    }

    pub fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub upload: UploadTarget,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            upload: UploadTarget::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            upload: UploadTarget::default(),
        }
    }

    pub fn with_upload(mut self, upload: UploadTarget) -> Self {
        self.upload = upload;
        self
    }

    /// Joins the API base with a route path, tolerating a trailing slash on
    /// the configured base.
    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), route)
    }
}
