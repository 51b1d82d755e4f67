// 🎟️ Allocation Calculator - Ticket prices from parameters and the fixed catalog
//
// Altitude is priced at break-even (cost / attendance), so it never moves the
// net position. Whatever the existing income does not cover, plus the target
// surplus, is split between Royale and Soiree in proportion to their nominal
// costs and divided by each event's attendance.

use crate::catalog::Catalog;
use crate::error::{AllocationError, AllocationResult};
use crate::params::{Parameter, Parameters};
use serde::{Deserialize, Serialize};

// ============================================================================
// DERIVED VALUES
// ============================================================================

/// The four figures the planner exists to produce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPrices {
    pub altitude_price: f64,
    pub royale_price: f64,
    pub soiree_price: f64,
    pub projected_surplus: f64,
}

/// Derived prices plus every intermediate figure shown in the summaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub prices: DerivedPrices,

    /// Sum of the already-secured income items
    pub existing_income: f64,
    pub altitude_income: f64,
    pub altitude_cost: f64,
    /// Existing income plus Altitude ticket income
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_expenditure: f64,
    pub target_surplus: f64,
    /// Net expenditure plus target surplus, to be raised by Royale and Soiree
    pub amount_needed: f64,
    pub royale_share: f64,
    pub soiree_share: f64,
    pub royale_revenue: f64,
    pub soiree_revenue: f64,
}

impl Allocation {
    pub fn ticket_revenue(&self) -> f64 {
        self.royale_revenue + self.soiree_revenue
    }

    /// All income, projected ticket sales included
    pub fn grand_total_income(&self) -> f64 {
        self.total_income + self.ticket_revenue()
    }

    pub fn final_net_position(&self) -> f64 {
        self.existing_income + self.altitude_income + self.ticket_revenue() - self.total_expenses
    }

    pub fn surplus_difference(&self) -> f64 {
        self.prices.projected_surplus - self.target_surplus
    }

    /// Altitude income minus Altitude cost; zero up to rounding
    pub fn altitude_net_impact(&self) -> f64 {
        self.altitude_income - self.altitude_cost
    }

    /// Rough per-student Royale saving if attendance rose by 10%
    pub fn price_drop_for_extra_attendance(&self) -> f64 {
        self.prices.royale_price * 0.1
    }
}

/// Whole-dollar price shown to students
pub fn display_price(price: f64) -> f64 {
    price.ceil()
}

// ============================================================================
// DERIVATION
// ============================================================================

/// Recompute every derived figure from the catalog and the current parameters.
///
/// No clamping happens here; callers that take user input go through
/// [`Planner`], which bounds values to the slider ranges first.
pub fn derive(catalog: &Catalog, params: &Parameters) -> AllocationResult<Allocation> {
    check_inputs(catalog, params)?;

    let royale_attendance = params.royale_attendance as f64;
    let soiree_attendance = params.soiree_attendance as f64;
    let altitude_attendance = params.altitude_attendance as f64;

    // 1. Break-even Altitude price
    let altitude_price = params.altitude_cost / altitude_attendance;
    let altitude_income = altitude_price * altitude_attendance;

    // 2-4. Net position before the priced events
    let existing_income = catalog.existing_income();
    let total_income = existing_income + altitude_income;
    let total_expenses = catalog.total_expenses(params.altitude_cost);
    let net_expenditure = total_expenses - total_income;

    // 5-6. Proportional split by nominal event cost
    let amount_needed = net_expenditure + params.target_surplus;
    let royale_share = amount_needed * catalog.event_costs.royale / catalog.total_event_costs();
    let soiree_share = amount_needed - royale_share;

    // 7-8. Per-ticket prices and the surplus they produce
    let royale_price = royale_share / royale_attendance;
    let soiree_price = soiree_share / soiree_attendance;
    let royale_revenue = royale_price * royale_attendance;
    let soiree_revenue = soiree_price * soiree_attendance;
    let projected_surplus = royale_revenue + soiree_revenue - net_expenditure;

    Ok(Allocation {
        prices: DerivedPrices {
            altitude_price,
            royale_price,
            soiree_price,
            projected_surplus,
        },
        existing_income,
        altitude_income,
        altitude_cost: params.altitude_cost,
        total_income,
        total_expenses,
        net_expenditure,
        target_surplus: params.target_surplus,
        amount_needed,
        royale_share,
        soiree_share,
        royale_revenue,
        soiree_revenue,
    })
}

fn check_inputs(catalog: &Catalog, params: &Parameters) -> AllocationResult<()> {
    let attendances = [
        ("Royale", params.royale_attendance),
        ("Soiree", params.soiree_attendance),
        ("Altitude", params.altitude_attendance),
    ];
    for (event, count) in attendances {
        if count == 0 {
            return Err(AllocationError::ZeroAttendance { event });
        }
    }

    let amounts = [
        ("altitude_cost", params.altitude_cost),
        ("target_surplus", params.target_surplus),
    ];
    for (field, value) in amounts {
        if !value.is_finite() {
            return Err(AllocationError::NonFinite { field, value });
        }
    }

    if catalog.total_event_costs() <= 0.0 {
        return Err(AllocationError::InvalidCatalog(
            "Royale and Soiree costs must be positive".to_string(),
        ));
    }

    Ok(())
}

// ============================================================================
// PLANNER
// ============================================================================

/// Holds the live parameters and recomputes the allocation after every change.
///
/// Mutations clamp to the slider range and derive once before returning, so
/// `allocation()` always reflects `params()`.
#[derive(Debug, Clone)]
pub struct Planner {
    catalog: Catalog,
    params: Parameters,
    allocation: Allocation,
}

impl Planner {
    pub fn new(catalog: Catalog) -> AllocationResult<Self> {
        let params = Parameters::for_catalog(&catalog);
        Self::with_params(catalog, params)
    }

    pub fn with_params(catalog: Catalog, params: Parameters) -> AllocationResult<Self> {
        catalog.validate()?;
        let params = params.clamped(&catalog);
        let allocation = derive(&catalog, &params)?;

        Ok(Planner {
            catalog,
            params,
            allocation,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn prices(&self) -> &DerivedPrices {
        &self.allocation.prices
    }

    /// Set one parameter (clamped) and recompute
    pub fn set(&mut self, parameter: Parameter, value: f64) -> AllocationResult<&Allocation> {
        let range = parameter.range(self.catalog.class_size);
        let mut next = self.params;
        next.set(parameter, range.clamp(value));
        self.apply(next)
    }

    /// Replace every parameter at once (clamped) and recompute
    pub fn set_all(&mut self, params: Parameters) -> AllocationResult<&Allocation> {
        let next = params.clamped(&self.catalog);
        self.apply(next)
    }

    pub fn increment(&mut self, parameter: Parameter) -> AllocationResult<&Allocation> {
        let range = parameter.range(self.catalog.class_size);
        let value = range.increment(self.params.get(parameter));
        self.set(parameter, value)
    }

    pub fn decrement(&mut self, parameter: Parameter) -> AllocationResult<&Allocation> {
        let range = parameter.range(self.catalog.class_size);
        let value = range.decrement(self.params.get(parameter));
        self.set(parameter, value)
    }

    /// Back to the catalog's starting values
    pub fn reset(&mut self) -> AllocationResult<&Allocation> {
        let defaults = Parameters::for_catalog(&self.catalog);
        self.set_all(defaults)
    }

    // A failed derivation keeps the previous parameters and allocation
    fn apply(&mut self, next: Parameters) -> AllocationResult<&Allocation> {
        let allocation = derive(&self.catalog, &next)?;
        self.params = next;
        self.allocation = allocation;
        Ok(&self.allocation)
    }
}

// ============================================================================
// TESTS
// ============================================================================
