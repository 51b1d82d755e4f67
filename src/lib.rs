// Ticket Allocation Planner - Core Library
// Exposes all modules for use in the planner CLI, API server, and tests

pub mod error;
pub mod catalog;
pub mod params;
pub mod allocation;
pub mod breakdown;
pub mod export;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{AllocationError, AllocationResult};
pub use catalog::{
    Catalog, EventCosts, ExpenseCategory, ExpenseItem, ExpenseLine, IncomeItem,
    DEFAULT_ALTITUDE_COST,
};
pub use params::{attendance_share, Parameter, Parameters, SliderRange};
pub use allocation::{derive, display_price, Allocation, DerivedPrices, Planner};
pub use breakdown::{
    category_totals, expense_rows, income_rows, income_slices, with_percentages,
    ChartSlice, ExpenseRow, IncomeKind, IncomeRow, LabeledSlice, Report, TicketSummary,
};
pub use export::{export_to_file, write_csv, write_json, write_report, write_text, ExportFormat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
