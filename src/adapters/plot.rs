use crate::config::toml_config::ImageConfig;
use crate::domain::plan::{Annotation, EventKind, GridPlan, LineStyle, MarkerShape, SubplotPlan};
use crate::domain::ports::GridWriter;
use crate::utils::error::{ChartError, Result};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::error::Error;
use std::path::{Path, PathBuf};

const FONT: &str = "sans-serif";

/// 以 plotters 將每個 GridPlan 繪成 PNG
#[derive(Debug, Clone)]
pub struct PlottersWriter {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl PlottersWriter {
    pub fn new(output_dir: PathBuf, image: &ImageConfig) -> Self {
        Self {
            output_dir,
            width: image.width,
            height: image.height,
        }
    }
}

impl GridWriter for PlottersWriter {
    fn write_grid(&self, plan: &GridPlan) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(plan.file_name());

        draw_grid(&path, (self.width, self.height), plan).map_err(|e| ChartError::RenderError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(path)
    }
}

fn draw_grid(path: &Path, size: (u32, u32), plan: &GridPlan) -> std::result::Result<(), Box<dyn Error>> {
    let font_size = (size.1 / 60).max(10);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&plan.title, (FONT, f64::from(font_size + 8)).into_font())?;

    let panels = root.split_evenly((plan.rows, plan.columns));
    for (panel, subplot) in panels.iter().zip(&plan.subplots) {
        draw_subplot(panel, subplot, font_size)?;
    }

    root.present()?;
    Ok(())
}

fn draw_subplot(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    plan: &SubplotPlan,
    font_size: u32,
) -> std::result::Result<(), Box<dyn Error>> {
    let (x_min, x_max) = plan.x_range;
    let (y_min, y_max) = (plan.y_range.min, plan.y_range.max);

    let mut chart = ChartBuilder::on(area)
        .caption(&plan.title, (FONT, font_size + 4))
        .margin(font_size / 2)
        .x_label_area_size(font_size * 3)
        .y_label_area_size(font_size * 4)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Days After Sowing")
        .y_desc("Temperature (°C)")
        .label_style((FONT, font_size))
        .axis_desc_style((FONT, font_size + 2))
        .draw()?;

    for curve in &plan.curves {
        let color = RGBColor(curve.color.0, curve.color.1, curve.color.2);
        let line = color.stroke_width(2);
        let points = curve.points.iter().copied();

        let series = match curve.line {
            LineStyle::Solid => chart.draw_series(LineSeries::new(points, line))?,
            LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(points, 10, 6, line))?,
        };
        series
            .label(curve.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(2)));

        let marker = color.filled();
        match curve.marker {
            MarkerShape::Triangle => {
                chart.draw_series(curve.points.iter().map(|p| TriangleMarker::new(*p, 4, marker)))?;
            }
            MarkerShape::Square => {
                chart.draw_series(curve.points.iter().map(|p| {
                    EmptyElement::at(*p) + Rectangle::new([(-3, -3), (3, 3)], marker)
                }))?;
            }
            MarkerShape::Circle => {
                chart.draw_series(curve.points.iter().map(|p| Circle::new(*p, 3, marker)))?;
            }
            MarkerShape::Diamond => {
                chart.draw_series(curve.points.iter().map(|p| {
                    EmptyElement::at(*p)
                        + Polygon::new(vec![(0, -4), (4, 0), (0, 4), (-4, 0)], marker)
                }))?;
            }
        }
    }

    for annotation in &plan.annotations {
        draw_annotation(&mut chart, annotation, (y_min, y_max), font_size)?;
    }

    chart
        .configure_series_labels()
        .label_font((FONT, font_size))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

fn draw_annotation(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    annotation: &Annotation,
    (y_min, y_max): (f64, f64),
    font_size: u32,
) -> std::result::Result<(), Box<dyn Error>> {
    let x = annotation.day as f64;
    let marker_color = match annotation.kind {
        EventKind::Flowering => GREEN.mix(0.5),
        EventKind::Maturity => BLACK.mix(0.5),
    };

    // 垂直標線
    chart.draw_series(DashedLineSeries::new(
        vec![(x, y_min), (x, y_max)],
        8,
        6,
        marker_color.stroke_width(2),
    ))?;

    // 箭頭
    chart.draw_series(std::iter::once(PathElement::new(
        vec![annotation.label_at, annotation.anchor],
        BLACK.stroke_width(1),
    )))?;
    chart.draw_series(std::iter::once(Circle::new(annotation.anchor, 3, BLACK.filled())))?;

    // 文字框；寬度以字元數估算
    let text_w = (annotation.text.chars().count() as f64 * font_size as f64 * 0.55) as i32;
    let text_h = font_size as i32 + 6;
    chart.draw_series(std::iter::once(
        EmptyElement::at(annotation.label_at)
            + Rectangle::new([(0, -text_h), (text_w + 8, 0)], WHITE.filled())
            + Rectangle::new([(0, -text_h), (text_w + 8, 0)], BLACK.stroke_width(1))
            + Text::new(
                annotation.text.clone(),
                (4, -text_h + 3),
                (FONT, f64::from(font_size)).into_font(),
            ),
    ))?;

    Ok(())
}
