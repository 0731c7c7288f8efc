use serde::{Deserialize, Serialize};
use std::fmt;

/// 研究地點 (8 個固定地點)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    Dezful,
    Shushtar,
    Lamerd,
    Kermanshah,
    Zarqan,
    Ravansar,
    Parsabad,
    Ilam,
}

/// 繪圖分組：每組兩個地點，一組一張 2x2 圖
pub const LOCATION_GROUPS: [[Location; 2]; 4] = [
    [Location::Dezful, Location::Shushtar],
    [Location::Lamerd, Location::Kermanshah],
    [Location::Zarqan, Location::Ravansar],
    [Location::Parsabad, Location::Ilam],
];

impl Location {
    pub const ALL: [Location; 8] = [
        Location::Dezful,
        Location::Shushtar,
        Location::Lamerd,
        Location::Kermanshah,
        Location::Zarqan,
        Location::Ravansar,
        Location::Parsabad,
        Location::Ilam,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Location::Dezful => "Dezful",
            Location::Shushtar => "Shushtar",
            Location::Lamerd => "Lamerd",
            Location::Kermanshah => "Kermanshah",
            Location::Zarqan => "Zarqan",
            Location::Ravansar => "Ravansar",
            Location::Parsabad => "Parsabad",
            Location::Ilam => "Ilam",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 排放情境，順序固定 (影響標註位移)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Ssp245,
    Ssp585,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Ssp245, Scenario::Ssp585];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Ssp245 => "ssp245",
            Scenario::Ssp585 => "ssp585",
        }
    }

    /// Position in the fixed draw order.
    pub fn draw_order(&self) -> usize {
        match self {
            Scenario::Ssp245 => 0,
            Scenario::Ssp585 => 1,
        }
    }

    /// Label token used in summary sheets and file names, e.g. `(2071-2090)(ssp245)`.
    pub fn period_token(&self, period: &str) -> String {
        format!("({})({})", period, self.as_str())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 玉米品種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cultivar {
    #[serde(rename = "260")]
    Ksc260,
    #[serde(rename = "704")]
    Ksc704,
}

impl Cultivar {
    pub const ALL: [Cultivar; 2] = [Cultivar::Ksc260, Cultivar::Ksc704];

    pub fn code(&self) -> &'static str {
        match self {
            Cultivar::Ksc260 => "260",
            Cultivar::Ksc704 => "704",
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Cultivar::Ksc260 => 0,
            Cultivar::Ksc704 => 1,
        }
    }
}

impl fmt::Display for Cultivar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 每日平均溫度序列 (已驗證欄位 avg_mint / avg_maxt)；空白或非數值的儲存格為 `None`
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub source: String,
    pub mint: Vec<Option<f64>>,
    pub maxt: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.mint.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mint.is_empty()
    }
}

/// 摘要表儲存格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Numeric view of the cell. Text is parsed, `NaN` counts as absent.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Bool(_) => return None,
        };
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    pub fn label(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.write_str("NaN"),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// 單一地點的摘要工作表；第一列為標題列，`rows` 不含標題
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SummaryTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&Cell::Empty)
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sheet data for {}:", self.sheet)?;
        writeln!(f, "\t{}", self.headers.join("\t"))?;
        for (idx, row) in self.rows.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            writeln!(f, "{}\t{}", idx, cells.join("\t"))?;
        }
        Ok(())
    }
}

/// 全域溫度範圍 (已含上下邊距)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Phenology {
    pub flowering_das: u32,
    pub maturity_das: u32,
}

/// 單一情境的對齊結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRecord {
    pub scenario: Scenario,
    pub phenology: Phenology,
    /// `None` when fewer than two ensemble values are numeric.
    pub flowering_std: Option<f64>,
    #[serde(skip)]
    pub mint: Vec<Option<f64>>,
    #[serde(skip)]
    pub maxt: Vec<Option<f64>>,
}

/// 地點 x 品種，兩個情境依固定順序排列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CultivarRecord {
    pub location: Location,
    pub cultivar: Cultivar,
    pub scenarios: Vec<ScenarioRecord>,
}

impl CultivarRecord {
    pub fn scenario(&self, scenario: Scenario) -> Option<&ScenarioRecord> {
        self.scenarios.iter().find(|s| s.scenario == scenario)
    }

    pub fn max_maturity_das(&self) -> u32 {
        self.scenarios
            .iter()
            .map(|s| s.phenology.maturity_das)
            .max()
            .unwrap_or(0)
    }
}

/// Extract 階段輸出
#[derive(Debug, Clone, Serialize)]
pub struct ChartInputs {
    pub range: TemperatureRange,
    pub records: Vec<CultivarRecord>,
}

impl ChartInputs {
    pub fn record(&self, location: Location, cultivar: Cultivar) -> Option<&CultivarRecord> {
        self.records
            .iter()
            .find(|r| r.location == location && r.cultivar == cultivar)
    }
}
