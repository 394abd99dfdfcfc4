use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Geocoder unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("No match found for address: {query}")]
    NotFound { query: String },

    #[error("Catalog load failed: {message}")]
    DataLoadError { message: String },

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Upstream,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FinderError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub fn data_load(message: impl Into<String>) -> Self {
        Self::DataLoadError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } => ErrorCategory::Input,
            Self::UpstreamUnavailable { .. } | Self::NotFound { .. } | Self::ApiError(_) => {
                ErrorCategory::Upstream
            }
            Self::DataLoadError { .. } | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::Data
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Low,
            Self::UpstreamUnavailable { .. } | Self::ApiError(_) => ErrorSeverity::Medium,
            Self::InvalidArgument { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::SerializationError(_) => ErrorSeverity::High,
            Self::DataLoadError { .. } | Self::CsvError(_) | Self::IoError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// True for failures of the location lookup that the finder degrades
    /// around instead of aborting the request.
    pub fn is_location_unavailable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::NotFound { .. } | Self::ApiError(_)
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => {
                "Check that latitude is within -90..90, longitude within -180..180 and limit is positive"
            }
            Self::UpstreamUnavailable { .. } | Self::ApiError(_) => {
                "Try enabling device location or pass coordinates with --lat/--lon"
            }
            Self::NotFound { .. } => "Refine the address, e.g. add a street number and city",
            Self::DataLoadError { .. } | Self::CsvError(_) => {
                "Fix the catalog file; every row needs valid coordinates, type and hours"
            }
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "Report this issue together with the input used",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration file or CLI flags",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::UpstreamUnavailable { .. } | Self::ApiError(_) => {
                "Could not resolve address, try enabling device location".to_string()
            }
            Self::NotFound { query } => {
                format!("No location found for '{}'. Try refining the address.", query)
            }
            Self::DataLoadError { .. } | Self::CsvError(_) => {
                "The cooling center list could not be loaded".to_string()
            }
            Self::InvalidArgument { message } => format!("Invalid input: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;
