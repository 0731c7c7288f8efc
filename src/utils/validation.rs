use crate::utils::error::{ChartError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ChartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ChartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ChartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(ChartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(ChartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ChartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ChartError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("paths.data_dir", "data").is_ok());
        assert!(validate_path("paths.data_dir", "").is_err());
        assert!(validate_path("paths.data_dir", "da\0ta").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("window.max_days", 200, 1).is_ok());
        assert!(validate_positive_number("window.max_days", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["xlsx", "xls", "ods"];
        assert!(validate_file_extension("paths.summary_workbook", "Mean.xlsx", &allowed).is_ok());
        assert!(validate_file_extension("paths.summary_workbook", "Mean.XLSX", &allowed).is_ok());
        assert!(validate_file_extension("paths.summary_workbook", "Mean.csv", &allowed).is_err());
        assert!(validate_file_extension("paths.summary_workbook", "Mean", &allowed).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("window.padding", 2.0, 0.0, 50.0).is_ok());
        assert!(validate_range("window.padding", -1.0, 0.0, 50.0).is_err());
    }
}
