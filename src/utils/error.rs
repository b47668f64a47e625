use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Invalid IRI '{value}': {reason}")]
    InvalidIri { value: String, reason: String },

    #[error("Invalid temporal range: start {start} is after end {end}")]
    InvalidTemporalRange { start: String, end: String },

    #[error("No information known for IRI '{iri}'")]
    UnresolvedIri { iri: String },

    #[error("Invalid model data in table '{table}': {message}")]
    InvalidData { table: String, message: String },

    #[error("{count} outlier(s) detected in model data")]
    OutliersDetected { count: usize },

    #[error("Lifecycle error: expected phase {expected}, model is {actual}")]
    LifecycleError { expected: String, actual: String },

    #[error("Model error: {message}")]
    ModelFailure { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Input,
    Data,
    Lifecycle,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ModelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ModelError::IoError(_) | ModelError::CsvError(_) => ErrorCategory::Io,
            ModelError::SerializationError(_)
            | ModelError::ConfigValidationError { .. }
            | ModelError::InvalidConfigValueError { .. }
            | ModelError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ModelError::InvalidIri { .. }
            | ModelError::InvalidTemporalRange { .. }
            | ModelError::UnresolvedIri { .. } => ErrorCategory::Input,
            ModelError::InvalidData { .. } | ModelError::OutliersDetected { .. } => {
                ErrorCategory::Data
            }
            ModelError::LifecycleError { .. } => ErrorCategory::Lifecycle,
            ModelError::ModelFailure { .. } => ErrorCategory::Model,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ModelError::UnresolvedIri { .. } => ErrorSeverity::Low,
            ModelError::OutliersDetected { .. } => ErrorSeverity::Medium,
            ModelError::IoError(_) | ModelError::LifecycleError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ModelError::IoError(_) => {
                "Check that the input files exist and are readable".to_string()
            }
            ModelError::CsvError(_) => {
                "Make sure every data file is valid CSV with a header row".to_string()
            }
            ModelError::SerializationError(_) => {
                "Check the JSON values embedded in the run file".to_string()
            }
            ModelError::ConfigValidationError { field, .. }
            | ModelError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' entry in the run file", field)
            }
            ModelError::MissingConfigError { field } => {
                format!("Add the '{}' entry to the run file", field)
            }
            ModelError::InvalidIri { .. } => {
                "Use an absolute IRI such as https://sws.geonames.org/6295630/".to_string()
            }
            ModelError::InvalidTemporalRange { .. } => {
                "Give the temporal range as [start, end] with start not after end".to_string()
            }
            ModelError::UnresolvedIri { .. } => {
                "Add a label for this IRI under [iris] in the run file".to_string()
            }
            ModelError::InvalidData { table, .. } => {
                format!("Inspect table '{}' for inconsistent records", table)
            }
            ModelError::OutliersDetected { .. } => {
                "Set outliers_raise_error = false to drop flagged records instead".to_string()
            }
            ModelError::LifecycleError { .. } => {
                "Call prepare() before run()".to_string()
            }
            ModelError::ModelFailure { .. } => {
                "Check the model implementation and its input data".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read model data: {}", self),
            ErrorCategory::Configuration => format!("Run configuration is invalid: {}", self),
            ErrorCategory::Input => format!("Demand input is invalid: {}", self),
            ErrorCategory::Data => format!("Model data failed validity checks: {}", self),
            ErrorCategory::Lifecycle => format!("Model used out of order: {}", self),
            ErrorCategory::Model => format!("Model run failed: {}", self),
        }
    }

    /// Exit code used by the binary, derived from severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
