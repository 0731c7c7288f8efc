use crate::config::toml_config::ChartConfig;
use crate::domain::model::{Cell, Cultivar, DailySeries, Location, Scenario, SummaryTable};
use crate::domain::ports::DataSource;
use crate::utils::error::{ChartError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const MIN_TEMP_COLUMN: &str = "avg_mint";
pub const MAX_TEMP_COLUMN: &str = "avg_maxt";
pub const FLOWERING_COLUMN: &str = "FloweringDAS";

/// 從本機資料夾讀取 CSV 與 Excel 輸入
#[derive(Debug, Clone)]
pub struct LocalFiles {
    config: ChartConfig,
}

impl LocalFiles {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    pub fn daily_series_path(&self, location: Location, scenario: Scenario) -> PathBuf {
        let relative = fill_template(
            &self.config.paths.daily_series,
            location,
            scenario,
            None,
            &self.config.window.period,
        );
        self.config.data_path(&relative)
    }

    pub fn ensemble_path(&self, cultivar: Cultivar, location: Location, scenario: Scenario) -> PathBuf {
        let relative = fill_template(
            &self.config.paths.ensemble,
            location,
            scenario,
            Some(cultivar),
            &self.config.window.period,
        );
        self.config.data_path(&relative)
    }
}

/// 以實際值替換路徑樣板中的佔位符
pub fn fill_template(
    template: &str,
    location: Location,
    scenario: Scenario,
    cultivar: Option<Cultivar>,
    period: &str,
) -> String {
    let filled = template
        .replace("{location}", location.name())
        .replace("{scenario}", scenario.as_str())
        .replace("{period}", period);
    match cultivar {
        Some(cultivar) => filled.replace("{cultivar}", cultivar.code()),
        None => filled,
    }
}

fn open_existing(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(ChartError::MissingFile {
            path: path.display().to_string(),
        });
    }
    Ok(File::open(path)?)
}

/// 讀取每日溫度 CSV；欄位名稱忽略大小寫與前後空白
pub fn read_daily_series<R: Read>(reader: R, source: &str) -> Result<DailySeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let (min_idx, max_idx) = match (position(MIN_TEMP_COLUMN), position(MAX_TEMP_COLUMN)) {
        (Some(min_idx), Some(max_idx)) => (min_idx, max_idx),
        _ => {
            return Err(ChartError::SchemaViolation {
                source_name: source.to_string(),
                message: format!(
                    "Missing '{}' or '{}' (columns: {})",
                    MIN_TEMP_COLUMN,
                    MAX_TEMP_COLUMN,
                    headers.join(", ")
                ),
            })
        }
    };

    let mut mint = Vec::new();
    let mut maxt = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        mint.push(parse_temperature(&record, min_idx));
        maxt.push(parse_temperature(&record, max_idx));
    }

    let missing = mint.iter().chain(&maxt).filter(|v| v.is_none()).count();
    if missing > 0 {
        tracing::debug!("{}: {} blank or non-numeric temperature cells", source, missing);
    }

    Ok(DailySeries {
        source: source.to_string(),
        mint,
        maxt,
    })
}

/// 空白或非數值的溫度視為缺值
fn parse_temperature(record: &csv::StringRecord, column: usize) -> Option<f64> {
    record
        .get(column)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// 讀取未來情境集合檔的 FloweringDAS 欄；非數值轉為 `None`
pub fn read_ensemble_flowering<R: Read>(
    reader: R,
    source: &str,
    preamble_rows: usize,
) -> Result<Vec<Option<f64>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = csv_reader.records().skip(preamble_rows);
    let header = match records.next() {
        Some(header) => header?,
        None => {
            return Err(ChartError::SchemaViolation {
                source_name: source.to_string(),
                message: format!("No header row after {} preamble rows", preamble_rows),
            })
        }
    };

    let column = header
        .iter()
        .position(|h| h == FLOWERING_COLUMN)
        .ok_or_else(|| ChartError::SchemaViolation {
            source_name: source.to_string(),
            message: format!("Missing '{}' column", FLOWERING_COLUMN),
        })?;

    let mut values = Vec::new();
    for record in records {
        let record = record?;
        let value = record
            .get(column)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|v| !v.is_nan());
        values.push(value);
    }
    Ok(values)
}

/// 將工作表轉為摘要表；第一列為標題
pub fn table_from_range(sheet: &str, range: &Range<Data>) -> SummaryTable {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| header.iter().map(|c| to_cell(c).label()).collect())
        .unwrap_or_default();
    let rows = rows.map(|row| row.iter().map(to_cell).collect()).collect();

    SummaryTable {
        sheet: sheet.to_string(),
        headers,
        rows,
    }
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

impl DataSource for LocalFiles {
    fn daily_series(&self, location: Location, scenario: Scenario) -> Result<DailySeries> {
        let path = self.daily_series_path(location, scenario);
        tracing::debug!("Reading daily series {}", path.display());
        let file = open_existing(&path)?;
        read_daily_series(file, &path.display().to_string())
    }

    fn summary_table(&self, location: Location) -> Result<SummaryTable> {
        let path = self.config.workbook_path();
        if !path.exists() {
            return Err(ChartError::MissingFile {
                path: path.display().to_string(),
            });
        }

        let mut workbook = open_workbook_auto(&path)?;
        if !workbook.sheet_names().iter().any(|name| name == location.name()) {
            return Err(ChartError::SchemaViolation {
                source_name: path.display().to_string(),
                message: format!(
                    "Error reading sheet '{}': worksheet not found (sheets: {})",
                    location,
                    workbook.sheet_names().join(", ")
                ),
            });
        }

        let range = workbook.worksheet_range(location.name())?;
        Ok(table_from_range(location.name(), &range))
    }

    fn ensemble_flowering(
        &self,
        cultivar: Cultivar,
        location: Location,
        scenario: Scenario,
    ) -> Result<Vec<Option<f64>>> {
        let path = self.ensemble_path(cultivar, location, scenario);
        tracing::debug!("Reading ensemble {}", path.display());
        let file = open_existing(&path)?;
        read_ensemble_flowering(
            file,
            &path.display().to_string(),
            self.config.ensemble.preamble_rows,
        )
    }
}
