use crate::domain::model::{DailySeries, TemperatureRange};
use crate::utils::error::{ChartError, Result};

/// 取出 `[start_index, start_index + days)` 的最低/最高溫；長度不足時回傳 InsufficientData
pub fn temperature_window(
    series: &DailySeries,
    start_index: usize,
    days: usize,
) -> Result<(&[Option<f64>], &[Option<f64>])> {
    let end_index = start_index.checked_add(days).unwrap_or(usize::MAX);
    if end_index > series.len() {
        return Err(ChartError::InsufficientData {
            path: series.source.clone(),
            available: series.len(),
            required: end_index,
        });
    }
    Ok((
        &series.mint[start_index..end_index],
        &series.maxt[start_index..end_index],
    ))
}

/// Global y-axis range shared by every subplot.
///
/// Min and max are taken over both temperature columns of every series inside
/// the window, then widened by `padding` on each side. Missing cells are
/// skipped. Visiting order does not change the result.
pub fn scan_temperature_range<'a, I>(
    series: I,
    start_index: usize,
    max_days: usize,
    padding: f64,
) -> Result<TemperatureRange>
where
    I: IntoIterator<Item = &'a DailySeries>,
{
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut scanned = 0usize;

    for daily in series {
        let (mint, maxt) = temperature_window(daily, start_index, max_days)?;
        for value in mint.iter().chain(maxt).flatten() {
            y_min = y_min.min(*value);
            y_max = y_max.max(*value);
        }
        scanned += 1;
    }

    if scanned == 0 || !y_min.is_finite() || !y_max.is_finite() {
        return Err(ChartError::ConfigError {
            message: "No daily temperature values inside the scan window".to_string(),
        });
    }

    tracing::debug!(
        "Scanned {} series: raw range {:.2}..{:.2} °C",
        scanned,
        y_min,
        y_max
    );

    Ok(TemperatureRange {
        min: y_min - padding,
        max: y_max + padding,
    })
}
