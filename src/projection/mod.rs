//! Cash-flow projection across financing phases

mod state;
mod engine;
mod cashflows;
pub mod irr;

pub use state::{MonthFlow, PeriodTotals, ProjectionState};
pub use engine::{project_series, ProjectionConfig, ProjectionEngine, Resolution};
pub use cashflows::{ProjectionPoint, ProjectionSeries, SeriesSummary};
pub use irr::internal_rate_of_return;
