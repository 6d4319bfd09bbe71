use thiserror::Error;

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Error, Debug)]
pub enum TemplateError {
    // --- splice errors ---

    #[error("Marker '{marker}' not found in document")]
    MarkerNotFound { marker: String },

    // --- fragment errors ---

    #[error("Invalid tag '{tag}': tags must be non-empty, lowercase, and contain no spaces")]
    InvalidTag { tag: String },

    #[error("Invalid attribute name '{name}' for tag '{tag}'")]
    InvalidAttribute { tag: String, name: String },

    #[error("Invalid meta tag: {reason}")]
    InvalidMetaTag { reason: String },

    #[error("No meta tags to insert: add at least one entry first")]
    NoMetaTags,

    #[error("Meta tag index {index} out of range (have {len})")]
    MetaTagIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid color value '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("Invalid gradient: {reason}")]
    InvalidGradient { reason: String },

    #[error("Invalid CSS selector '{selector}': must be non-empty")]
    InvalidSelector { selector: String },

    #[error("Invalid device width '{value}': expected desktop, tablet, mobile or a pixel count")]
    InvalidDeviceWidth { value: String },

    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    // --- store errors ---

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- config errors ---

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    // --- font catalog errors ---

    #[error("Font catalog request failed: {0}")]
    FontFetch(#[from] reqwest::Error),

    #[error("Malformed font catalog: {0}")]
    MalformedCatalog(String),
}

impl TemplateError {
    /// True for errors caused by user input rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TemplateError::InvalidTag { .. }
                | TemplateError::InvalidAttribute { .. }
                | TemplateError::InvalidMetaTag { .. }
                | TemplateError::NoMetaTags
                | TemplateError::MetaTagIndexOutOfRange { .. }
                | TemplateError::InvalidColor { .. }
                | TemplateError::InvalidGradient { .. }
                | TemplateError::InvalidSelector { .. }
                | TemplateError::InvalidDeviceWidth { .. }
                | TemplateError::MissingField { .. }
        )
    }
}
