//! Cashflow Planner - multi-phase amortization and projection engine
//!
//! This library provides:
//! - Closed-form amortization, remaining-balance and yield calculators
//! - A phase scheduler (accumulation, grace, interest-only, amortizing, matured)
//! - Monthly cash-flow projection of an invested sum against a loan
//! - Series reduction for charts and reports
//! - Planning tools (real-estate leverage, student-loan arbitrage, car
//!   replacement, retirement gap) built on the shared engine

pub mod calculators;
pub mod error;
pub mod params;
pub mod projection;
pub mod reduce;
pub mod report;
pub mod scenario;
pub mod schedule;
pub mod tools;

// Re-export commonly used types
pub use calculators::{amortized_payment, periodic_income, remaining_balance};
pub use error::{PlanError, Result};
pub use params::{ContributionFrequency, InvestmentTerms, LoanTerms, NamedScenario, PlanParameters};
pub use projection::{
    project_series, ProjectionConfig, ProjectionEngine, ProjectionPoint, ProjectionSeries, Resolution,
};
pub use reduce::{reduce_series, DEFAULT_POINT_COUNT};
pub use scenario::ScenarioRunner;
pub use schedule::{Phase, PhaseTimeline};
pub use tools::{PlanOutcome, Tool};
