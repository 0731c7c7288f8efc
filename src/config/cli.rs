use crate::config::toml_config::ChartConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "maize-climate-charts")]
#[command(about = "Daily temperature charts with flowering and maturity timing for maize cultivars")]
pub struct CliConfig {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override paths.data_dir
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Override paths.output_dir
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Validate every input and print the aligned records without writing images
    #[arg(long)]
    pub dry_run: bool,

    /// Log CPU and memory usage per stage
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    /// 讀取設定檔 (若有) 並套用命令列覆蓋
    pub fn resolve(&self) -> Result<ChartConfig> {
        let mut config = match &self.config {
            Some(path) => ChartConfig::from_file(path)?,
            None => ChartConfig::default(),
        };

        if let Some(data_dir) = &self.data_dir {
            config.paths.data_dir = data_dir.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.paths.output_dir = output_dir.clone();
        }

        Ok(config)
    }
}
