use crate::domain::model::{ChartInputs, Cultivar, DailySeries, Location, Scenario, SummaryTable};
use crate::domain::plan::GridPlan;
use crate::utils::error::Result;
use std::path::PathBuf;

/// 輸入資料來源 (本機檔案或測試用的記憶體資料)
pub trait DataSource {
    /// Daily series with validated `avg_mint` / `avg_maxt` columns.
    fn daily_series(&self, location: Location, scenario: Scenario) -> Result<DailySeries>;

    /// The location's summary sheet.
    fn summary_table(&self, location: Location) -> Result<SummaryTable>;

    /// Every `FloweringDAS` entry below the ensemble header, coerced to numbers.
    fn ensemble_flowering(
        &self,
        cultivar: Cultivar,
        location: Location,
        scenario: Scenario,
    ) -> Result<Vec<Option<f64>>>;
}

/// 圖檔輸出
pub trait GridWriter {
    fn write_grid(&self, plan: &GridPlan) -> Result<PathBuf>;
}

pub trait Pipeline {
    fn extract(&self) -> Result<ChartInputs>;
    fn transform(&self, inputs: &ChartInputs) -> Result<Vec<GridPlan>>;
    fn load(&self, grids: Vec<GridPlan>) -> Result<Vec<PathBuf>>;
}
