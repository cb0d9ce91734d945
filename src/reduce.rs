//! Down-sampling of dense series into chart-ready points
//!
//! A reduced series keeps the first period, every period whose index is a
//! multiple of the step, and always the final period. Selection depends only
//! on period indices and the span, so reducing twice with the same step
//! changes nothing.

use crate::projection::ProjectionSeries;

/// Number of points a chart is usually given
pub const DEFAULT_POINT_COUNT: usize = 15;

/// Anything indexed by a 1-based period number
pub trait Periodic {
    fn period_index(&self) -> u32;
}

/// Stride for a span: max(1, floor(total_periods / desired_point_count))
pub fn reduction_step(total_periods: u32, desired_point_count: usize) -> u32 {
    let desired = desired_point_count.max(1) as u64;
    ((total_periods as u64 / desired) as u32).max(1)
}

/// Keep the first, every `step`-th, and the last item
pub fn reduce_points<T: Periodic + Clone>(points: &[T], step: u32) -> Vec<T> {
    let step = step.max(1);
    let last = points.len().saturating_sub(1);

    points
        .iter()
        .enumerate()
        .filter(|(i, p)| *i == 0 || *i == last || p.period_index() % step == 0)
        .map(|(_, p)| p.clone())
        .collect()
}

/// Reduce a series with an explicit step
pub fn reduce_with_step(series: &ProjectionSeries, step: u32) -> ProjectionSeries {
    series.with_points(reduce_points(series.points(), step))
}

/// Reduce a series to roughly `desired_point_count` points
pub fn reduce_series(series: &ProjectionSeries, desired_point_count: usize) -> ProjectionSeries {
    let step = reduction_step(series.total_periods(), desired_point_count);
    reduce_with_step(series, step)
}
