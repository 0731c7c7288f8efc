use crate::config::toml_config::{EnsembleConfig, WindowConfig};
use crate::core::range_scan::temperature_window;
use crate::domain::model::{
    Cultivar, CultivarRecord, DailySeries, Location, Phenology, Scenario, ScenarioRecord,
    SummaryTable,
};
use crate::domain::ports::DataSource;
use crate::utils::error::{ChartError, Result};
use std::collections::BTreeMap;

pub const FLOWERING_FIELD: &str = "FloweringDAS";
pub const MATURITY_FIELD: &str = "MaturityDAS";

/// 摘要表中各品種/情境所在列 (標題列之下、從 0 起算)，
/// 以 `[cultivar.column()][scenario.draw_order()]` 索引
pub const SUMMARY_ROWS: [[usize; 2]; 2] = [[3, 6], [13, 16]];

pub fn summary_row(cultivar: Cultivar, scenario: Scenario) -> usize {
    SUMMARY_ROWS[cultivar.column()][scenario.draw_order()]
}

/// Round a day count half to even, matching the summary tooling.
pub fn round_das(value: f64, field: &str, location: Location, row: usize) -> Result<u32> {
    let rounded = value.round_ties_even();
    if rounded < 1.0 || rounded > u32::MAX as f64 {
        return Err(ChartError::SchemaViolation {
            source_name: location.to_string(),
            message: format!(
                "'{}' at row {} must be a positive day count, got {}",
                field, row, value
            ),
        });
    }
    Ok(rounded as u32)
}

fn dump_table(table: &SummaryTable) {
    tracing::error!("{}", table);
}

/// 驗證並讀取單一品種兩個情境的開花/成熟天數 (依情境固定順序)
pub fn read_phenology(
    table: &SummaryTable,
    location: Location,
    cultivar: Cultivar,
    period: &str,
) -> Result<Vec<Phenology>> {
    let max_row = Scenario::ALL
        .iter()
        .map(|s| summary_row(cultivar, *s))
        .max()
        .unwrap_or(0);
    if table.rows.len() <= max_row {
        dump_table(table);
        return Err(ChartError::SchemaViolation {
            source_name: location.to_string(),
            message: format!(
                "Sheet '{}' has {} rows, need at least {}",
                location,
                table.rows.len(),
                max_row + 1
            ),
        });
    }

    let mut columns = Vec::with_capacity(2);
    for field in [FLOWERING_FIELD, MATURITY_FIELD] {
        match table.column_index(field) {
            Some(idx) => columns.push(idx),
            None => {
                dump_table(table);
                return Err(ChartError::SchemaViolation {
                    source_name: location.to_string(),
                    message: format!("Sheet '{}' has no '{}' column", location, field),
                });
            }
        }
    }
    let (flowering_col, maturity_col) = (columns[0], columns[1]);

    let mut phenology = Vec::with_capacity(Scenario::ALL.len());
    for scenario in Scenario::ALL {
        let row = summary_row(cultivar, scenario);
        let expected = scenario.period_token(period);
        let found = table.cell(row, 0).label();
        if found != expected {
            dump_table(table);
            return Err(ChartError::LabelMismatch {
                location: location.to_string(),
                row: row + 1,
                expected,
                found,
            });
        }

        tracing::debug!(
            "Inspecting {} row {} ({}, {}): {}={}, {}={}",
            location,
            row + 1,
            cultivar,
            scenario,
            FLOWERING_FIELD,
            table.cell(row, flowering_col),
            MATURITY_FIELD,
            table.cell(row, maturity_col)
        );

        let mut values = [0u32; 2];
        for (slot, (field, column)) in [(FLOWERING_FIELD, flowering_col), (MATURITY_FIELD, maturity_col)]
            .into_iter()
            .enumerate()
        {
            let value = match table.cell(row, column).as_number() {
                Some(value) => value,
                None => {
                    dump_table(table);
                    return Err(ChartError::MissingValue {
                        location: location.to_string(),
                        row: row + 1,
                        field: field.to_string(),
                        cultivar: cultivar.to_string(),
                        scenario: scenario.to_string(),
                    });
                }
            };
            values[slot] = round_das(value, field, location, row + 1)?;
        }

        phenology.push(Phenology {
            flowering_das: values[0],
            maturity_das: values[1],
        });
    }

    Ok(phenology)
}

/// Sample standard deviation (n - 1) of the ensemble members.
///
/// The first `skipped_members` rows are summary rows and are ignored, as are
/// entries that failed numeric coercion. Returns `None` with fewer than two
/// usable values.
pub fn flowering_std(values: &[Option<f64>], skipped_members: usize) -> Option<f64> {
    let members: Vec<f64> = values.iter().skip(skipped_members).flatten().copied().collect();
    if members.len() < 2 {
        return None;
    }

    let n = members.len() as f64;
    let mean = members.iter().sum::<f64>() / n;
    let variance = members.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// 將摘要表、集合檔與每日序列對齊成每個地點 x 品種的紀錄
pub struct RecordLoader<'a, S: DataSource> {
    source: &'a S,
    window: &'a WindowConfig,
    ensemble: &'a EnsembleConfig,
}

impl<'a, S: DataSource> RecordLoader<'a, S> {
    pub fn new(source: &'a S, window: &'a WindowConfig, ensemble: &'a EnsembleConfig) -> Self {
        Self {
            source,
            window,
            ensemble,
        }
    }

    /// Both cultivars of one location, in fixed cultivar order.
    pub fn load_location(
        &self,
        location: Location,
        daily: &BTreeMap<(Location, Scenario), DailySeries>,
    ) -> Result<Vec<CultivarRecord>> {
        let table = self.source.summary_table(location)?;

        Cultivar::ALL
            .iter()
            .map(|cultivar| self.load_cultivar(location, *cultivar, &table, daily))
            .collect()
    }

    pub fn load_cultivar(
        &self,
        location: Location,
        cultivar: Cultivar,
        table: &SummaryTable,
        daily: &BTreeMap<(Location, Scenario), DailySeries>,
    ) -> Result<CultivarRecord> {
        let phenology = read_phenology(table, location, cultivar, &self.window.period)?;
        let max_maturity_das = phenology
            .iter()
            .map(|p| p.maturity_das)
            .max()
            .unwrap_or(0) as usize;

        let mut scenarios = Vec::with_capacity(Scenario::ALL.len());
        for (scenario, phenology) in Scenario::ALL.into_iter().zip(phenology) {
            let ensemble = self
                .source
                .ensemble_flowering(cultivar, location, scenario)?;
            let std = flowering_std(&ensemble, self.ensemble.skipped_members);
            if std.is_none() {
                tracing::warn!(
                    "No numeric FloweringDAS ensemble values for {} ({}, {})",
                    location,
                    cultivar,
                    scenario
                );
            }

            let series = daily
                .get(&(location, scenario))
                .ok_or_else(|| ChartError::MissingFile {
                    path: format!("daily series for {} ({})", location, scenario),
                })?;
            let (mint, maxt) =
                temperature_window(series, self.window.start_index, max_maturity_das)?;
            let days = phenology.maturity_das as usize;

            scenarios.push(ScenarioRecord {
                scenario,
                phenology,
                flowering_std: std,
                mint: mint[..days].to_vec(),
                maxt: maxt[..days].to_vec(),
            });
        }

        Ok(CultivarRecord {
            location,
            cultivar,
            scenarios,
        })
    }
}
