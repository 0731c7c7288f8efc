use crate::domain::model::{Cultivar, Location, Scenario, TemperatureRange};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerShape {
    Triangle,
    Square,
    Circle,
    Diamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureKind {
    Min,
    Max,
}

/// 一條溫度曲線；x 為播種後天數 (從 1 開始)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub label: String,
    pub scenario: Scenario,
    pub kind: TemperatureKind,
    pub color: Rgb,
    pub marker: MarkerShape,
    pub line: LineStyle,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Flowering,
    Maturity,
}

/// 垂直標線加上帶箭頭的文字標註
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub kind: EventKind,
    pub scenario: Scenario,
    pub day: u32,
    pub text: String,
    /// Arrow tip.
    pub anchor: (f64, f64),
    /// Top-left corner of the text box.
    pub label_at: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubplotPlan {
    pub title: String,
    pub location: Location,
    pub cultivar: Cultivar,
    pub x_range: (f64, f64),
    pub y_range: TemperatureRange,
    pub curves: Vec<Curve>,
    pub annotations: Vec<Annotation>,
}

impl SubplotPlan {
    pub fn curve(&self, scenario: Scenario, kind: TemperatureKind) -> Option<&Curve> {
        self.curves
            .iter()
            .find(|c| c.scenario == scenario && c.kind == kind)
    }

    pub fn annotation(&self, kind: EventKind, scenario: Scenario) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.kind == kind && a.scenario == scenario)
    }
}

/// 一張輸出圖：列 = 地點，欄 = 品種，`subplots` 以列為主排序
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPlan {
    pub index: usize,
    pub title: String,
    pub rows: usize,
    pub columns: usize,
    pub subplots: Vec<SubplotPlan>,
}

impl GridPlan {
    pub fn file_name(&self) -> String {
        format!("plot_grid_{}.png", self.index)
    }
}
