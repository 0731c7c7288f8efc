use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Missing file: {path}")]
    MissingFile { path: String },

    #[error("Schema violation in {source_name}: {message}")]
    SchemaViolation { source_name: String, message: String },

    #[error("Only {available} days in {path}, need {required}")]
    InsufficientData {
        path: String,
        available: usize,
        required: usize,
    },

    #[error("Row {row} in '{location}' does not contain expected scenario '{expected}' (found '{found}')")]
    LabelMismatch {
        location: String,
        row: usize,
        expected: String,
        found: String,
    },

    #[error("Missing '{field}' at row {row} ({cultivar}, {scenario}) in '{location}'")]
    MissingValue {
        location: String,
        row: usize,
        field: String,
        cultivar: String,
        scenario: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Rendering failed for {path}: {message}")]
    RenderError { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Validation,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ChartError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChartError::MissingFile { .. }
            | ChartError::CsvError(_)
            | ChartError::SpreadsheetError(_) => ErrorCategory::Input,
            ChartError::SchemaViolation { .. }
            | ChartError::InsufficientData { .. }
            | ChartError::LabelMismatch { .. }
            | ChartError::MissingValue { .. } => ErrorCategory::Validation,
            ChartError::ConfigError { .. } | ChartError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            ChartError::IoError(_)
            | ChartError::SerializationError(_)
            | ChartError::RenderError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ChartError::MissingFile { path } => format!("Input file not found: {}", path),
            ChartError::InsufficientData {
                path,
                available,
                required,
            } => format!(
                "Daily series {} is too short ({} rows, {} required)",
                path, available, required
            ),
            ChartError::LabelMismatch {
                location, row, expected, ..
            } => format!(
                "Summary sheet '{}' row {} should be labelled {}",
                location, row, expected
            ),
            ChartError::MissingValue {
                location, row, field, ..
            } => format!("Summary sheet '{}' row {} has no {}", location, row, field),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ChartError::MissingFile { .. } => {
                "Check --data-dir and the path templates in the config file"
            }
            ChartError::SchemaViolation { .. } => {
                "Make sure the file has the expected columns (avg_mint, avg_maxt, FloweringDAS, MaturityDAS)"
            }
            ChartError::InsufficientData { .. } => {
                "Provide a longer daily series or lower window.start_index / window.max_days"
            }
            ChartError::LabelMismatch { .. } => {
                "Check the row order of the summary sheet against window.period"
            }
            ChartError::MissingValue { .. } => "Fill in the empty phenology cell in the summary sheet",
            ChartError::CsvError(_) => "Check that the file is valid CSV",
            ChartError::SpreadsheetError(_) => {
                "Check that the workbook opens and has one sheet per location"
            }
            ChartError::ConfigError { .. } | ChartError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
            ChartError::IoError(_) | ChartError::SerializationError(_) => {
                "Check file permissions and free disk space"
            }
            ChartError::RenderError { .. } => {
                "Check that the output directory is writable and a sans-serif font is installed"
            }
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
