use crate::config::toml_config::{AnnotationConfig, WindowConfig};
use crate::domain::model::{
    ChartInputs, Cultivar, CultivarRecord, Phenology, Scenario, ScenarioRecord,
    TemperatureRange, LOCATION_GROUPS,
};
use crate::domain::plan::{
    Annotation, Curve, EventKind, GridPlan, LineStyle, MarkerShape, Rgb, SubplotPlan,
    TemperatureKind,
};
use crate::utils::error::{ChartError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub min_color: Rgb,
    pub max_color: Rgb,
    pub min_marker: MarkerShape,
    pub max_marker: MarkerShape,
}

/// 曲線配色，以 `[cultivar.column()][scenario.draw_order()]` 索引
pub const SERIES_STYLES: [[SeriesStyle; 2]; 2] = [
    [
        SeriesStyle {
            min_color: Rgb(255, 182, 193), // lightpink
            max_color: Rgb(220, 20, 60),   // crimson
            min_marker: MarkerShape::Triangle,
            max_marker: MarkerShape::Square,
        },
        SeriesStyle {
            min_color: Rgb(147, 112, 219), // mediumpurple
            max_color: Rgb(0, 139, 139),   // darkcyan
            min_marker: MarkerShape::Circle,
            max_marker: MarkerShape::Diamond,
        },
    ],
    [
        SeriesStyle {
            min_color: Rgb(0, 0, 255),
            max_color: Rgb(255, 165, 0),
            min_marker: MarkerShape::Triangle,
            max_marker: MarkerShape::Square,
        },
        SeriesStyle {
            min_color: Rgb(0, 255, 255),
            max_color: Rgb(255, 0, 0),
            min_marker: MarkerShape::Circle,
            max_marker: MarkerShape::Diamond,
        },
    ],
];

/// 以 `scenario.draw_order()` 索引
pub const SCENARIO_LINES: [LineStyle; 2] = [LineStyle::Solid, LineStyle::Dashed];

pub fn series_style(cultivar: Cultivar, scenario: Scenario) -> SeriesStyle {
    SERIES_STYLES[cultivar.column()][scenario.draw_order()]
}

/// Which side of the min-temperature curve the maturity label sits on.
pub fn maturity_side(scenario: Scenario) -> f64 {
    match scenario {
        Scenario::Ssp245 => -1.0,
        Scenario::Ssp585 => 1.0,
    }
}

pub fn flowering_label(scenario: Scenario, das: u32, std: Option<f64>) -> String {
    let spread = match std {
        Some(std) => format!("{:.1}", std),
        None => "N/A".to_string(),
    };
    format!("Flowering ({}): {} ± {}", scenario, das, spread)
}

pub fn maturity_label(scenario: Scenario, das: u32) -> String {
    format!("Maturity ({}): {}", scenario, das)
}

pub fn grid_title(period: &str) -> String {
    format!("Daily Avg Temp Until Maturity ({})", period)
}

/// 將對齊後的紀錄排成圖表配置 (不做任何繪圖)
pub struct ChartComposer<'a> {
    window: &'a WindowConfig,
    annotation: &'a AnnotationConfig,
}

impl<'a> ChartComposer<'a> {
    pub fn new(window: &'a WindowConfig, annotation: &'a AnnotationConfig) -> Self {
        Self { window, annotation }
    }

    /// One grid per location pair, rows = locations, columns = cultivars.
    pub fn compose_grids(&self, inputs: &ChartInputs) -> Result<Vec<GridPlan>> {
        let mut grids = Vec::with_capacity(LOCATION_GROUPS.len());

        for (group_idx, locations) in LOCATION_GROUPS.iter().enumerate() {
            let mut subplots = Vec::with_capacity(locations.len() * Cultivar::ALL.len());
            for location in locations {
                for cultivar in Cultivar::ALL {
                    let record = inputs.record(*location, cultivar).ok_or_else(|| {
                        ChartError::SchemaViolation {
                            source_name: location.to_string(),
                            message: format!("No aligned record for cultivar {}", cultivar),
                        }
                    })?;
                    subplots.push(self.compose_subplot(record, inputs.range));
                }
            }

            grids.push(GridPlan {
                index: group_idx + 1,
                title: grid_title(&self.window.period),
                rows: locations.len(),
                columns: Cultivar::ALL.len(),
                subplots,
            });
        }

        Ok(grids)
    }

    pub fn compose_subplot(&self, record: &CultivarRecord, range: TemperatureRange) -> SubplotPlan {
        let max_maturity_das = record.max_maturity_das();
        let flowering_gap = match (
            record.scenario(Scenario::Ssp245),
            record.scenario(Scenario::Ssp585),
        ) {
            (Some(a), Some(b)) => a
                .phenology
                .flowering_das
                .abs_diff(b.phenology.flowering_das),
            _ => u32::MAX,
        };
        let x_offset = if flowering_gap < self.annotation.close_flowering_days {
            self.annotation.close_x_offset
        } else {
            self.annotation.default_x_offset
        };

        let mut curves = Vec::new();
        let mut annotations = Vec::new();
        for scenario_record in &record.scenarios {
            curves.extend(scenario_curves(record.cultivar, scenario_record));

            if let Some(flowering) = self.flowering_annotation(scenario_record, x_offset) {
                annotations.push(flowering);
            }
            if scenario_record.phenology.maturity_das <= max_maturity_das {
                if let Some(maturity) = self.maturity_annotation(scenario_record) {
                    annotations.push(maturity);
                }
            }
        }

        SubplotPlan {
            title: format!("{} ({})", record.location, record.cultivar),
            location: record.location,
            cultivar: record.cultivar,
            x_range: (0.0, self.window.x_max as f64),
            y_range: range,
            curves,
            annotations,
        }
    }

    /// 開花日晚於成熟日時不標註
    fn flowering_annotation(&self, record: &ScenarioRecord, x_offset: f64) -> Option<Annotation> {
        let Phenology {
            flowering_das,
            maturity_das,
        } = record.phenology;
        if flowering_das == 0 || flowering_das > maturity_das {
            return None;
        }

        let idx = flowering_das as usize - 1;
        let min = record.mint.get(idx).copied().flatten()?;
        let max = record.maxt.get(idx).copied().flatten()?;
        let y = (min + max) / 2.0;
        let y_offset = record.scenario.draw_order() as f64 * self.annotation.flowering_stack_offset;
        let x = flowering_das as f64;

        Some(Annotation {
            kind: EventKind::Flowering,
            scenario: record.scenario,
            day: flowering_das,
            text: flowering_label(record.scenario, flowering_das, record.flowering_std),
            anchor: (x, y + y_offset),
            label_at: (
                x + x_offset,
                y + y_offset + self.annotation.flowering_label_rise,
            ),
        })
    }

    fn maturity_annotation(&self, record: &ScenarioRecord) -> Option<Annotation> {
        let maturity_das = record.phenology.maturity_das;
        if maturity_das == 0 {
            return None;
        }

        let side = maturity_side(record.scenario);
        let min = record.mint.get(maturity_das as usize - 1).copied().flatten()?;
        let y = min + side * self.annotation.maturity_anchor_offset;
        let x = maturity_das as f64;

        Some(Annotation {
            kind: EventKind::Maturity,
            scenario: record.scenario,
            day: maturity_das,
            text: maturity_label(record.scenario, maturity_das),
            anchor: (x, y),
            label_at: (x + 1.0, y + side * self.annotation.maturity_label_offset),
        })
    }
}

/// Min and max curves for one scenario, stopping at that scenario's maturity day.
/// Days with a missing temperature contribute no point.
fn scenario_curves(cultivar: Cultivar, record: &ScenarioRecord) -> [Curve; 2] {
    let style = series_style(cultivar, record.scenario);
    let line = SCENARIO_LINES[record.scenario.draw_order()];
    let days = record.phenology.maturity_das as usize;
    let points = |values: &[Option<f64>]| -> Vec<(f64, f64)> {
        values
            .iter()
            .take(days)
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| ((i + 1) as f64, v)))
            .collect()
    };

    [
        Curve {
            label: format!("Min Temp ({})", record.scenario),
            scenario: record.scenario,
            kind: TemperatureKind::Min,
            color: style.min_color,
            marker: style.min_marker,
            line,
            points: points(&record.mint),
        },
        Curve {
            label: format!("Max Temp ({})", record.scenario),
            scenario: record.scenario,
            kind: TemperatureKind::Max,
            color: style.max_color,
            marker: style.max_marker,
            line,
            points: points(&record.maxt),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Location;

    fn scenario_record(scenario: Scenario, flowering: u32, maturity: u32, std: Option<f64>) -> ScenarioRecord {
        ScenarioRecord {
            scenario,
            phenology: Phenology {
                flowering_das: flowering,
                maturity_das: maturity,
            },
            flowering_std: std,
            mint: (0..maturity).map(|d| Some(10.0 + d as f64 * 0.01)).collect(),
            maxt: (0..maturity).map(|d| Some(30.0 + d as f64 * 0.01)).collect(),
        }
    }

    fn record(a: ScenarioRecord, b: ScenarioRecord) -> CultivarRecord {
        CultivarRecord {
            location: Location::Lamerd,
            cultivar: Cultivar::Ksc704,
            scenarios: vec![a, b],
        }
    }

    const RANGE: TemperatureRange = TemperatureRange { min: 8.0, max: 32.0 };

    #[test]
    fn test_curves_stop_at_own_maturity() {
        let window = WindowConfig::default();
        let annotation = AnnotationConfig::default();
        let composer = ChartComposer::new(&window, &annotation);

        let plan = composer.compose_subplot(
            &record(
                scenario_record(Scenario::Ssp245, 60, 120, Some(2.0)),
                scenario_record(Scenario::Ssp585, 55, 130, Some(1.5)),
            ),
            RANGE,
        );

        let min245 = plan.curve(Scenario::Ssp245, TemperatureKind::Min).unwrap();
        let max585 = plan.curve(Scenario::Ssp585, TemperatureKind::Max).unwrap();
        assert_eq!(min245.points.len(), 120);
        assert_eq!(max585.points.len(), 130);
        assert_eq!(min245.points[0].0, 1.0);
        assert_eq!(min245.points.last().unwrap().0, 120.0);
        assert_eq!(min245.line, LineStyle::Solid);
        assert_eq!(max585.line, LineStyle::Dashed);
        assert_eq!(max585.color, Rgb(255, 0, 0));
        assert_eq!(plan.title, "Lamerd (704)");
        assert_eq!(plan.x_range, (0.0, 200.0));
        assert_eq!(plan.y_range, RANGE);
    }

    #[test]
    fn test_missing_days_leave_gaps() {
        let window = WindowConfig::default();
        let annotation = AnnotationConfig::default();
        let composer = ChartComposer::new(&window, &annotation);

        let mut gappy = scenario_record(Scenario::Ssp245, 60, 120, Some(2.0));
        gappy.mint[9] = None;
        gappy.maxt[59] = None;
        let plan = composer.compose_subplot(
            &record(gappy, scenario_record(Scenario::Ssp585, 55, 130, Some(1.5))),
            RANGE,
        );

        let min245 = plan.curve(Scenario::Ssp245, TemperatureKind::Min).unwrap();
        assert_eq!(min245.points.len(), 119);
        assert!(min245.points.iter().all(|(day, _)| *day != 10.0));
        // 開花日當天缺最高溫，無法定位標註
        assert!(plan.annotation(EventKind::Flowering, Scenario::Ssp245).is_none());
        assert!(plan.annotation(EventKind::Maturity, Scenario::Ssp245).is_some());
    }

    #[test]
    fn test_flowering_after_maturity_is_not_annotated() {
        let window = WindowConfig::default();
        let annotation = AnnotationConfig::default();
        let composer = ChartComposer::new(&window, &annotation);

        let plan = composer.compose_subplot(
            &record(
                scenario_record(Scenario::Ssp245, 125, 120, Some(2.0)),
                scenario_record(Scenario::Ssp585, 60, 130, None),
            ),
            RANGE,
        );

        assert!(plan.annotation(EventKind::Flowering, Scenario::Ssp245).is_none());
        assert!(plan.annotation(EventKind::Flowering, Scenario::Ssp585).is_some());
        assert!(plan.annotation(EventKind::Maturity, Scenario::Ssp245).is_some());
        assert!(plan.annotation(EventKind::Maturity, Scenario::Ssp585).is_some());
    }

    #[test]
    fn test_flowering_offsets() {
        let window = WindowConfig::default();
        let annotation = AnnotationConfig::default();
        let composer = ChartComposer::new(&window, &annotation);

        // 開花日相差 < 20 天：水平位移 10
        let close = composer.compose_subplot(
            &record(
                scenario_record(Scenario::Ssp245, 60, 120, Some(2.0)),
                scenario_record(Scenario::Ssp585, 70, 130, Some(1.0)),
            ),
            RANGE,
        );
        let first = close.annotation(EventKind::Flowering, Scenario::Ssp245).unwrap();
        let second = close.annotation(EventKind::Flowering, Scenario::Ssp585).unwrap();
        let y245 = (10.0 + 59.0 * 0.01 + 30.0 + 59.0 * 0.01) / 2.0;
        let y585 = (10.0 + 69.0 * 0.01 + 30.0 + 69.0 * 0.01) / 2.0;
        assert!((first.anchor.1 - y245).abs() < 1e-9);
        assert!((second.anchor.1 - (y585 + 6.0)).abs() < 1e-9);
        assert_eq!(first.label_at.0, 70.0);
        assert!((second.label_at.1 - (y585 + 8.0)).abs() < 1e-9);
        assert_eq!(first.text, "Flowering (ssp245): 60 ± 2.0");

        // 相差 20 天以上：水平位移 5
        let apart = composer.compose_subplot(
            &record(
                scenario_record(Scenario::Ssp245, 50, 120, Some(2.0)),
                scenario_record(Scenario::Ssp585, 70, 130, Some(1.0)),
            ),
            RANGE,
        );
        let first = apart.annotation(EventKind::Flowering, Scenario::Ssp245).unwrap();
        assert_eq!(first.label_at.0, 55.0);
    }

    #[test]
    fn test_maturity_labels_on_opposite_sides() {
        let window = WindowConfig::default();
        let annotation = AnnotationConfig::default();
        let composer = ChartComposer::new(&window, &annotation);

        let plan = composer.compose_subplot(
            &record(
                scenario_record(Scenario::Ssp245, 60, 100, Some(2.0)),
                scenario_record(Scenario::Ssp585, 60, 100, Some(2.0)),
            ),
            RANGE,
        );
        let below = plan.annotation(EventKind::Maturity, Scenario::Ssp245).unwrap();
        let above = plan.annotation(EventKind::Maturity, Scenario::Ssp585).unwrap();
        let mint = 10.0 + 99.0 * 0.01;
        assert!((below.anchor.1 - (mint - 1.0)).abs() < 1e-9);
        assert!((below.label_at.1 - (mint - 3.0)).abs() < 1e-9);
        assert!((above.anchor.1 - (mint + 1.0)).abs() < 1e-9);
        assert!((above.label_at.1 - (mint + 3.0)).abs() < 1e-9);
        assert_eq!(below.label_at.0, 101.0);
        assert_eq!(below.text, "Maturity (ssp245): 100");
    }

    #[test]
    fn test_missing_std_renders_na() {
        assert_eq!(
            flowering_label(Scenario::Ssp585, 72, None),
            "Flowering (ssp585): 72 ± N/A"
        );
        assert_eq!(
            flowering_label(Scenario::Ssp245, 72, Some(3.456)),
            "Flowering (ssp245): 72 ± 3.5"
        );
    }

    #[test]
    fn test_style_table() {
        let style = series_style(Cultivar::Ksc260, Scenario::Ssp585);
        assert_eq!(style.min_marker, MarkerShape::Circle);
        assert_eq!(style.max_marker, MarkerShape::Diamond);
        assert_eq!(style.max_color, Rgb(0, 139, 139));
    }
}
