//! Plan parameters: loan, investment and phase timeline inputs

mod terms;
pub mod loader;

pub use terms::{ContributionFrequency, InvestmentTerms, LoanTerms, PlanParameters};
pub use loader::{load_default_scenarios, load_scenarios_csv, NamedScenario};
