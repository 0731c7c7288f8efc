use maize_climate_charts::core::ChartInputs;
use maize_climate_charts::domain::model::{
    Cell, Cultivar, DailySeries, Location, Scenario, SummaryTable, TemperatureRange,
};
use maize_climate_charts::domain::plan::{EventKind, GridPlan, TemperatureKind};
use maize_climate_charts::domain::ports::{DataSource, GridWriter};
use maize_climate_charts::{ChartConfig, ChartEngine, ChartError, ChartPipeline, LocalFiles, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PERIOD: &str = "2071-2090";

/// 本機 CSV + 記憶體中的摘要表 (測試環境沒有 xlsx 寫入工具)
struct FixtureSource {
    files: LocalFiles,
    tables: HashMap<Location, SummaryTable>,
}

impl DataSource for FixtureSource {
    fn daily_series(&self, location: Location, scenario: Scenario) -> Result<DailySeries> {
        self.files.daily_series(location, scenario)
    }

    fn summary_table(&self, location: Location) -> Result<SummaryTable> {
        self.tables
            .get(&location)
            .cloned()
            .ok_or_else(|| ChartError::MissingFile {
                path: format!("Mean.xlsx[{}]", location),
            })
    }

    fn ensemble_flowering(
        &self,
        cultivar: Cultivar,
        location: Location,
        scenario: Scenario,
    ) -> Result<Vec<Option<f64>>> {
        self.files.ensemble_flowering(cultivar, location, scenario)
    }
}

#[derive(Default)]
struct RecordingWriter {
    grids: RefCell<Vec<GridPlan>>,
}

impl GridWriter for &RecordingWriter {
    fn write_grid(&self, plan: &GridPlan) -> Result<PathBuf> {
        self.grids.borrow_mut().push(plan.clone());
        Ok(PathBuf::from("/virtual").join(plan.file_name()))
    }
}

struct Fixture {
    _dir: TempDir,
    config: ChartConfig,
}

impl Fixture {
    /// 每個地點/情境寫入 `days` 天的平坦序列 (最低 10、最高 30)，
    /// 視窗之前放入極端值以確認不會被掃描到
    fn new(days: usize) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = ChartConfig::default();
        config.paths.data_dir = dir.path().to_str().unwrap().to_string();
        config.paths.output_dir = dir.path().join("out").to_str().unwrap().to_string();

        let files = LocalFiles::new(config.clone());
        for location in Location::ALL {
            for scenario in Scenario::ALL {
                write_daily(&files.daily_series_path(location, scenario), days, 142);
                for cultivar in Cultivar::ALL {
                    write_ensemble(
                        &files.ensemble_path(cultivar, location, scenario),
                        &["68", "70", "72", "70"],
                    );
                }
            }
        }

        Self { _dir: dir, config }
    }

    fn files(&self) -> LocalFiles {
        LocalFiles::new(self.config.clone())
    }

    fn source(&self, tables: HashMap<Location, SummaryTable>) -> FixtureSource {
        FixtureSource {
            files: self.files(),
            tables,
        }
    }
}

fn write_daily(path: &Path, days: usize, start_index: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut content = String::from(" Day , AVG_MINT, avg_maxt\n");
    // 第一天留白，視窗外的缺值不影響結果
    content.push_str("1,,\n");
    for day in 1..days {
        let (mint, maxt) = if day < start_index { (-25.0, 48.0) } else { (10.0, 30.0) };
        content.push_str(&format!("{},{},{}\n", day + 1, mint, maxt));
    }
    fs::write(path, content).unwrap();
}

fn write_ensemble(path: &Path, members: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut content = String::from("APSIM future run\nunits,,\nRun,FloweringDAS,MaturityDAS\n");
    for summary in ["mean", "sd", "min", "max"] {
        content.push_str(&format!("{},999,999\n", summary));
    }
    for (idx, member) in members.iter().enumerate() {
        content.push_str(&format!("{},{},120\n", idx + 1, member));
    }
    fs::write(path, content).unwrap();
}

fn label(scenario: Scenario) -> Cell {
    Cell::Text(scenario.period_token(PERIOD))
}

/// 260: ssp245 (60, 120), ssp585 (58, 130); 704: ssp245 (75, 150), ssp585 (71.5, 160.4)
fn summary_table(location: Location) -> SummaryTable {
    let filler = vec![Cell::Text("(2041-2060)(ssp245)".to_string()), Cell::Empty, Cell::Empty];
    let mut rows = vec![filler; 17];
    rows[3] = vec![label(Scenario::Ssp245), Cell::Number(60.0), Cell::Number(120.0)];
    rows[6] = vec![label(Scenario::Ssp585), Cell::Number(58.0), Cell::Number(130.0)];
    rows[13] = vec![label(Scenario::Ssp245), Cell::Number(75.0), Cell::Number(150.0)];
    rows[16] = vec![label(Scenario::Ssp585), Cell::Number(71.5), Cell::Number(160.4)];
    SummaryTable {
        sheet: location.to_string(),
        headers: vec![
            "Scenario".to_string(),
            "FloweringDAS".to_string(),
            "MaturityDAS".to_string(),
        ],
        rows,
    }
}

fn all_tables() -> HashMap<Location, SummaryTable> {
    Location::ALL
        .iter()
        .map(|location| (*location, summary_table(*location)))
        .collect()
}

#[test]
fn test_end_to_end_flat_series() {
    let fixture = Fixture::new(342);
    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(all_tables()), &writer, fixture.config.clone());

    let outputs = ChartEngine::new(pipeline).run().unwrap();
    assert_eq!(
        outputs,
        (1..=4)
            .map(|i| PathBuf::from(format!("/virtual/plot_grid_{}.png", i)))
            .collect::<Vec<_>>()
    );

    let grids = writer.grids.borrow();
    assert_eq!(grids.len(), 4);
    assert_eq!(grids[0].title, "Daily Avg Temp Until Maturity (2071-2090)");

    let titles: Vec<&str> = grids[0].subplots.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Dezful (260)", "Dezful (704)", "Shushtar (260)", "Shushtar (704)"]
    );
    assert_eq!(grids[3].subplots[3].title, "Ilam (704)");

    for subplot in grids.iter().flat_map(|g| &g.subplots) {
        assert_eq!(subplot.y_range, TemperatureRange { min: 8.0, max: 32.0 });
        assert_eq!(subplot.x_range, (0.0, 200.0));
    }

    let dezful_260 = &grids[0].subplots[0];
    let short = dezful_260.curve(Scenario::Ssp245, TemperatureKind::Min).unwrap();
    let long = dezful_260.curve(Scenario::Ssp585, TemperatureKind::Max).unwrap();
    assert_eq!(short.points.len(), 120);
    assert_eq!(long.points.len(), 130);
    assert_eq!(long.points.len() - short.points.len(), 10);
    assert_eq!(short.points[0], (1.0, 10.0));
    assert_eq!(*long.points.last().unwrap(), (130.0, 30.0));

    // 開花日相差 2 天 -> 水平位移 10；第二個情境上移 6
    let flowering = dezful_260
        .annotation(EventKind::Flowering, Scenario::Ssp585)
        .unwrap();
    assert_eq!(flowering.anchor, (58.0, 26.0));
    assert_eq!(flowering.label_at, (68.0, 28.0));
    assert_eq!(flowering.text, "Flowering (ssp585): 58 ± 1.6");

    // 71.5 -> 72 (half to even), 160.4 -> 160
    let dezful_704 = &grids[0].subplots[1];
    let maturity = dezful_704
        .annotation(EventKind::Maturity, Scenario::Ssp585)
        .unwrap();
    assert_eq!(maturity.day, 160);
    assert_eq!(maturity.anchor, (160.0, 11.0));
    assert_eq!(
        dezful_704
            .annotation(EventKind::Flowering, Scenario::Ssp585)
            .unwrap()
            .day,
        72
    );
}

#[test]
fn test_dry_run_returns_aligned_records() {
    let fixture = Fixture::new(400);
    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(all_tables()), &writer, fixture.config.clone());

    let inputs: ChartInputs = ChartEngine::new(pipeline).dry_run().unwrap();
    assert!(writer.grids.borrow().is_empty());
    assert_eq!(inputs.records.len(), 16);
    assert_eq!(inputs.range, TemperatureRange { min: 8.0, max: 32.0 });

    let record = inputs.record(Location::Kermanshah, Cultivar::Ksc260).unwrap();
    let ssp245 = record.scenario(Scenario::Ssp245).unwrap();
    assert_eq!(ssp245.phenology.flowering_das, 60);
    assert_eq!(ssp245.phenology.maturity_das, 120);
    assert_eq!(ssp245.mint.len(), 120);
    // 68, 70, 72, 70 -> sample std sqrt(8/3)
    let std = ssp245.flowering_std.unwrap();
    assert!((std - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);

    let json = serde_json::to_value(&inputs).unwrap();
    assert_eq!(json["records"][0]["location"], "Dezful");
    assert_eq!(json["records"][0]["cultivar"], "260");
    assert_eq!(json["records"][0]["scenarios"][1]["scenario"], "ssp585");
}

#[test]
fn test_short_series_aborts_before_any_chart() {
    let fixture = Fixture::new(341);
    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(all_tables()), &writer, fixture.config.clone());

    let err = ChartEngine::new(pipeline).run().unwrap_err();
    match err {
        ChartError::InsufficientData {
            available, required, ..
        } => {
            assert_eq!(available, 341);
            assert_eq!(required, 342);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(writer.grids.borrow().is_empty());
}

#[test]
fn test_label_mismatch_aborts_before_any_chart() {
    let fixture = Fixture::new(342);
    let mut tables = all_tables();
    let parsabad = tables.get_mut(&Location::Parsabad).unwrap();
    parsabad.rows[13][0] = Cell::Text("(2071-2090)(ssp585)".to_string());

    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(tables), &writer, fixture.config.clone());

    let err = ChartEngine::new(pipeline).run().unwrap_err();
    match err {
        ChartError::LabelMismatch { location, row, .. } => {
            assert_eq!(location, "Parsabad");
            assert_eq!(row, 14);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(writer.grids.borrow().is_empty());
}

#[test]
fn test_missing_phenology_value_aborts() {
    let fixture = Fixture::new(342);
    let mut tables = all_tables();
    tables.get_mut(&Location::Zarqan).unwrap().rows[6][1] = Cell::Text("".to_string());

    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(tables), &writer, fixture.config.clone());

    let err = ChartEngine::new(pipeline).run().unwrap_err();
    assert!(matches!(err, ChartError::MissingValue { ref field, .. } if field == "FloweringDAS"));
    assert!(writer.grids.borrow().is_empty());
}

#[test]
fn test_non_numeric_ensemble_shows_na() {
    let fixture = Fixture::new(342);
    let files = fixture.files();
    write_ensemble(
        &files.ensemble_path(Cultivar::Ksc704, Location::Ilam, Scenario::Ssp245),
        &["*", "failed", ""],
    );

    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(all_tables()), &writer, fixture.config.clone());
    ChartEngine::new(pipeline).run().unwrap();

    let grids = writer.grids.borrow();
    let ilam_704 = &grids[3].subplots[3];
    let flowering = ilam_704
        .annotation(EventKind::Flowering, Scenario::Ssp245)
        .unwrap();
    assert_eq!(flowering.text, "Flowering (ssp245): 75 ± N/A");
}

#[test]
fn test_missing_ensemble_file_is_reported() {
    let fixture = Fixture::new(342);
    let files = fixture.files();
    fs::remove_file(files.ensemble_path(Cultivar::Ksc260, Location::Lamerd, Scenario::Ssp585)).unwrap();

    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(all_tables()), &writer, fixture.config.clone());

    let err = ChartEngine::new(pipeline).run().unwrap_err();
    match err {
        ChartError::MissingFile { path } => {
            assert!(path.contains("KSC260-Future"));
            assert!(path.contains("(2071-2090)(ssp585)-Lamerd-260.csv"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_temperature_column_names_file() {
    let fixture = Fixture::new(342);
    let files = fixture.files();
    let path = files.daily_series_path(Location::Ravansar, Scenario::Ssp245);
    fs::write(&path, "day,avg_mint,tmax\n1,10,30\n").unwrap();

    let writer = RecordingWriter::default();
    let pipeline = ChartPipeline::new(fixture.source(all_tables()), &writer, fixture.config.clone());

    let err = ChartEngine::new(pipeline).run().unwrap_err();
    match err {
        ChartError::SchemaViolation { source_name, .. } => {
            assert!(source_name.contains("Ravansar"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
