use crate::domain::model::ChartInputs;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::PathBuf;

pub struct ChartEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ChartEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn run(&self) -> Result<Vec<PathBuf>> {
        tracing::info!("Starting chart generation...");

        // Extract
        let inputs = self.pipeline.extract()?;
        tracing::info!("Aligned {} location/cultivar records", inputs.records.len());
        self.monitor.log_stats("Extract");

        // Transform
        let grids = self.pipeline.transform(&inputs)?;
        tracing::info!("Composed {} grids", grids.len());
        self.monitor.log_stats("Transform");

        // Load
        let outputs = self.pipeline.load(grids)?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(outputs)
    }

    /// 驗證所有輸入並組圖，但不寫出任何檔案
    pub fn dry_run(&self) -> Result<ChartInputs> {
        let inputs = self.pipeline.extract()?;
        let grids = self.pipeline.transform(&inputs)?;
        tracing::info!(
            "Dry run: {} records validated, {} grids would be written",
            inputs.records.len(),
            grids.len()
        );
        self.monitor.log_final_stats();
        Ok(inputs)
    }
}
