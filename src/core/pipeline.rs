use crate::config::toml_config::ChartConfig;
use crate::core::compose::ChartComposer;
use crate::core::range_scan::scan_temperature_range;
use crate::core::records::RecordLoader;
use crate::domain::model::{ChartInputs, Location, Scenario, LOCATION_GROUPS};
use crate::domain::plan::GridPlan;
use crate::domain::ports::{DataSource, GridWriter, Pipeline};
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 掃描 -> 對齊 -> 組圖 -> 輸出
pub struct ChartPipeline<S: DataSource, W: GridWriter> {
    source: S,
    writer: W,
    config: ChartConfig,
}

impl<S: DataSource, W: GridWriter> ChartPipeline<S, W> {
    pub fn new(source: S, writer: W, config: ChartConfig) -> Self {
        Self {
            source,
            writer,
            config,
        }
    }
}

impl<S: DataSource, W: GridWriter> Pipeline for ChartPipeline<S, W> {
    fn extract(&self) -> Result<ChartInputs> {
        let window = &self.config.window;

        // 全域溫度範圍必須在任何圖表之前完成
        let mut daily = BTreeMap::new();
        for location in Location::ALL {
            for scenario in Scenario::ALL {
                let series = self.source.daily_series(location, scenario)?;
                daily.insert((location, scenario), series);
            }
        }
        let range = scan_temperature_range(
            daily.values(),
            window.start_index,
            window.max_days,
            window.padding,
        )?;
        tracing::info!(
            "Global temperature range: {:.1} .. {:.1} °C ({} series)",
            range.min,
            range.max,
            daily.len()
        );

        let loader = RecordLoader::new(&self.source, window, &self.config.ensemble);
        let mut records = Vec::new();
        for location in LOCATION_GROUPS.iter().flatten() {
            records.extend(loader.load_location(*location, &daily)?);
            tracing::debug!("Loaded records for {}", location);
        }

        Ok(ChartInputs { range, records })
    }

    fn transform(&self, inputs: &ChartInputs) -> Result<Vec<GridPlan>> {
        ChartComposer::new(&self.config.window, &self.config.annotation).compose_grids(inputs)
    }

    fn load(&self, grids: Vec<GridPlan>) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(grids.len());
        for grid in &grids {
            let path = self.writer.write_grid(grid)?;
            tracing::info!("Output saved to {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
