use crate::utils::error::{ChartError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 路徑樣板可用的佔位符
pub const TEMPLATE_PLACEHOLDERS: [&str; 4] = ["location", "scenario", "cultivar", "period"];

/// 每日序列索引的上限 (遠大於任何模擬期間的天數)
pub const MAX_SERIES_INDEX: usize = 100_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub paths: PathsConfig,
    pub window: WindowConfig,
    pub ensemble: EnsembleConfig,
    pub annotation: AnnotationConfig,
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: String,
    pub summary_workbook: String,
    pub daily_series: String,
    pub ensemble: String,
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            summary_workbook: "Mean.xlsx".to_string(),
            daily_series: "daily_averages/{location}/({period})({scenario})/daily_averages.csv"
                .to_string(),
            ensemble:
                "future/KSC{cultivar}-Future/{location}/({period})({scenario})-{location}-{cultivar}.csv"
                    .to_string(),
            output_dir: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub period: String,
    /// 0-based row of the sowing day (May 22 = 142).
    pub start_index: usize,
    /// Longest season across all locations.
    pub max_days: usize,
    pub padding: f64,
    pub x_max: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            period: "2071-2090".to_string(),
            start_index: 142,
            max_days: 200,
            padding: 2.0,
            x_max: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Lines before the header row.
    pub preamble_rows: usize,
    /// Leading data rows that are not ensemble members.
    pub skipped_members: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            preamble_rows: 2,
            skipped_members: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub flowering_stack_offset: f64,
    pub flowering_label_rise: f64,
    pub close_flowering_days: u32,
    pub close_x_offset: f64,
    pub default_x_offset: f64,
    pub maturity_anchor_offset: f64,
    pub maturity_label_offset: f64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            flowering_stack_offset: 6.0,
            flowering_label_rise: 2.0,
            close_flowering_days: 20,
            close_x_offset: 10.0,
            default_x_offset: 5.0,
            maturity_anchor_offset: 1.0,
            maturity_label_offset: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 3600,
            height: 1800,
        }
    }
}

impl ChartConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ChartError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ChartError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_ROOT})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ChartError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn data_path(&self, relative: &str) -> PathBuf {
        Path::new(&self.paths.data_dir).join(relative)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.data_path(&self.paths.summary_workbook)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.output_dir)
    }
}

/// 檢查樣板中只使用已知佔位符
fn validate_template(field_name: &str, template: &str) -> Result<()> {
    validation::validate_path(field_name, template)?;

    let re = Regex::new(r"\{([^}]*)\}").map_err(|e| ChartError::ConfigError {
        message: e.to_string(),
    })?;
    for caps in re.captures_iter(template) {
        let name = &caps[1];
        if !TEMPLATE_PLACEHOLDERS.contains(&name) {
            return Err(ChartError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!(
                    "Unknown placeholder {{{}}}. Valid placeholders: {}",
                    name,
                    TEMPLATE_PLACEHOLDERS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

impl Validate for ChartConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("paths.data_dir", &self.paths.data_dir)?;
        validation::validate_file_extension(
            "paths.summary_workbook",
            &self.paths.summary_workbook,
            &["xlsx", "xlsm", "xls", "ods"],
        )?;
        validation::validate_path("paths.output_dir", &self.paths.output_dir)?;
        validate_template("paths.daily_series", &self.paths.daily_series)?;
        validate_template("paths.ensemble", &self.paths.ensemble)?;

        validation::validate_non_empty_string("window.period", &self.window.period)?;
        validation::validate_range("window.start_index", self.window.start_index, 0, MAX_SERIES_INDEX)?;
        validation::validate_positive_number("window.max_days", self.window.max_days, 1)?;
        validation::validate_range("window.max_days", self.window.max_days, 1, MAX_SERIES_INDEX)?;
        validation::validate_positive_number("window.x_max", self.window.x_max as usize, 1)?;
        validation::validate_range("window.padding", self.window.padding, 0.0, 50.0)?;

        validation::validate_range("image.width", self.image.width, 200, 20_000)?;
        validation::validate_range("image.height", self.image.height, 200, 20_000)?;

        Ok(())
    }
}
