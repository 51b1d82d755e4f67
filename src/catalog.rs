// 📒 Catalog - Fixed expense and income line items
// Built once at startup; the only moving part is the Altitude cost line,
// whose amount comes from the current parameters.

use crate::error::{AllocationError, AllocationResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Altitude rental and buses as quoted for Senior Week
pub const DEFAULT_ALTITUDE_COST: f64 = 11102.67;

// ============================================================================
// EXPENSE CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Website & Communication")]
    WebsiteCommunication,

    #[serde(rename = "Events & Activities")]
    EventsActivities,

    #[serde(rename = "Royale Event")]
    RoyaleEvent,

    #[serde(rename = "Senior Soiree")]
    SeniorSoiree,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::WebsiteCommunication => "Website & Communication",
            ExpenseCategory::EventsActivities => "Events & Activities",
            ExpenseCategory::RoyaleEvent => "Royale Event",
            ExpenseCategory::SeniorSoiree => "Senior Soiree",
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LINE ITEMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
}

impl ExpenseItem {
    pub fn new(description: &str, amount: f64, category: ExpenseCategory) -> Self {
        ExpenseItem {
            description: description.to_string(),
            amount,
            category,
        }
    }
}

/// Already-secured income, unrelated to the priced events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeItem {
    pub description: String,
    pub amount: f64,
}

impl IncomeItem {
    pub fn new(description: &str, amount: f64) -> Self {
        IncomeItem {
            description: description.to_string(),
            amount,
        }
    }
}

/// A catalog expense line: either a fixed amount or the Altitude cost,
/// which is resolved against the current parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpenseLine {
    Fixed(ExpenseItem),
    AltitudeCost {
        description: String,
        category: ExpenseCategory,
    },
}

impl ExpenseLine {
    pub fn resolve(&self, altitude_cost: f64) -> ExpenseItem {
        match self {
            ExpenseLine::Fixed(item) => item.clone(),
            ExpenseLine::AltitudeCost { description, category } => ExpenseItem {
                description: description.clone(),
                amount: altitude_cost,
                category: *category,
            },
        }
    }

    pub fn is_altitude(&self) -> bool {
        matches!(self, ExpenseLine::AltitudeCost { .. })
    }
}

/// Nominal costs of the two priced events, used only for the proportional split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventCosts {
    pub royale: f64,
    pub soiree: f64,
}

impl EventCosts {
    pub fn total(&self) -> f64 {
        self.royale + self.soiree
    }
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub class_size: u32,
    pub event_costs: EventCosts,
    pub default_altitude_cost: f64,
    pub expenses: Vec<ExpenseLine>,
    pub income: Vec<IncomeItem>,
}

impl Catalog {
    /// The Senior Week budget as the class committee drew it up
    pub fn senior_week() -> Self {
        use ExpenseCategory::*;

        let wine_society = 300.0 + 512.0 + 122.0;
        let tasty_burger = 450.0 + 2500.0;
        let dx = 2000.0 + 4543.07;

        Catalog {
            class_size: 1965,
            event_costs: EventCosts {
                royale: 55250.0,
                soiree: 72574.0,
            },
            default_altitude_cost: DEFAULT_ALTITUDE_COST,
            expenses: vec![
                ExpenseLine::Fixed(ExpenseItem::new("Squarespace Domain Purchase", 14.0, WebsiteCommunication)),
                ExpenseLine::Fixed(ExpenseItem::new("MailChimp Email Subscriptions", 382.5, WebsiteCommunication)),
                ExpenseLine::Fixed(ExpenseItem::new("Wix Class Website Plan", 242.25, WebsiteCommunication)),
                ExpenseLine::Fixed(ExpenseItem::new("Game On Photography", 400.0, EventsActivities)),
                ExpenseLine::Fixed(ExpenseItem::new("Real World Wine Society Event", wine_society, EventsActivities)),
                ExpenseLine::Fixed(ExpenseItem::new("Tasty Burger", tasty_burger, EventsActivities)),
                ExpenseLine::AltitudeCost {
                    description: "Altitude Rental & Buses".to_string(),
                    category: EventsActivities,
                },
                ExpenseLine::Fixed(ExpenseItem::new("Camp Harvard Activities", 3080.0, EventsActivities)),
                ExpenseLine::Fixed(ExpenseItem::new("DX deposit & remainder", dx, EventsActivities)),
                ExpenseLine::Fixed(ExpenseItem::new("Royale Rental", 31250.0, RoyaleEvent)),
                ExpenseLine::Fixed(ExpenseItem::new("Royale Buses Back to Campus", 24000.0, RoyaleEvent)),
                ExpenseLine::Fixed(ExpenseItem::new("Senior Soiree Food", 28539.0, SeniorSoiree)),
                ExpenseLine::Fixed(ExpenseItem::new("Senior Soiree Beer, Wine & Staff", 40050.0, SeniorSoiree)),
                ExpenseLine::Fixed(ExpenseItem::new("Senior Soiree DJ and photo booths", 3985.0, SeniorSoiree)),
            ],
            income: vec![
                IncomeItem::new("Income from HY Game On", 11250.0),
                IncomeItem::new("Income from January Game On", 3130.0),
                IncomeItem::new("Real World Wine Society Revenue", 1056.0),
                IncomeItem::new("DX Event Revenue", 2900.0),
                IncomeItem::new("Tasty Burger Revenue", 2415.19),
            ],
        }
    }

    /// Load a catalog from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read catalog file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    /// Parse and validate a catalog from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content)
            .context("Failed to parse catalog JSON")?;

        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize catalog")
    }

    /// A catalog needs exactly one Altitude line, positive event costs and
    /// class size, and non-negative amounts.
    pub fn validate(&self) -> AllocationResult<()> {
        let altitude_lines = self.expenses.iter().filter(|line| line.is_altitude()).count();
        if altitude_lines != 1 {
            return Err(AllocationError::InvalidCatalog(format!(
                "expected exactly one Altitude cost line, found {}",
                altitude_lines
            )));
        }

        if self.class_size == 0 {
            return Err(AllocationError::InvalidCatalog("class size must be positive".to_string()));
        }

        let costs = self.event_costs;
        if !(costs.royale > 0.0 && costs.soiree > 0.0 && costs.total().is_finite()) {
            return Err(AllocationError::InvalidCatalog(
                "Royale and Soiree costs must be positive".to_string(),
            ));
        }

        let fixed_amounts = self.expenses.iter().filter_map(|line| match line {
            ExpenseLine::Fixed(item) => Some((&item.description, item.amount)),
            ExpenseLine::AltitudeCost { .. } => None,
        });
        let income_amounts = self.income.iter().map(|item| (&item.description, item.amount));

        for (description, amount) in fixed_amounts.chain(income_amounts) {
            if !amount.is_finite() || amount < 0.0 {
                return Err(AllocationError::InvalidCatalog(format!(
                    "'{}' has invalid amount {}",
                    description, amount
                )));
            }
        }

        Ok(())
    }

    /// Expense items with the Altitude line priced at `altitude_cost`, in catalog order
    pub fn expenses(&self, altitude_cost: f64) -> Vec<ExpenseItem> {
        self.expenses
            .iter()
            .map(|line| line.resolve(altitude_cost))
            .collect()
    }

    pub fn total_expenses(&self, altitude_cost: f64) -> f64 {
        self.expenses(altitude_cost).iter().map(|item| item.amount).sum()
    }

    /// Sum of the already-secured income items
    pub fn existing_income(&self) -> f64 {
        self.income.iter().map(|item| item.amount).sum()
    }

    pub fn total_event_costs(&self) -> f64 {
        self.event_costs.total()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::senior_week()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_senior_week_totals() {
        let catalog = Catalog::senior_week();

        assert!((catalog.existing_income() - 20751.19).abs() < EPS);
        assert!((catalog.total_expenses(11102.67) - 153472.49).abs() < EPS);
        assert_eq!(catalog.total_event_costs(), 127824.0);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_altitude_line_follows_cost() {
        let catalog = Catalog::senior_week();

        let low = catalog.expenses(5000.0);
        let high = catalog.expenses(20000.0);

        assert_eq!(low.len(), 14);
        assert_eq!(low[6].description, "Altitude Rental & Buses");
        assert_eq!(low[6].amount, 5000.0);
        assert_eq!(high[6].amount, 20000.0);
        assert!((catalog.total_expenses(20000.0) - catalog.total_expenses(5000.0) - 15000.0).abs() < EPS);
    }

    #[test]
    fn test_event_expenses_match_nominal_costs() {
        let catalog = Catalog::senior_week();
        let expenses = catalog.expenses(catalog.default_altitude_cost);

        let royale: f64 = expenses
            .iter()
            .filter(|item| item.category == ExpenseCategory::RoyaleEvent)
            .map(|item| item.amount)
            .sum();
        let soiree: f64 = expenses
            .iter()
            .filter(|item| item.category == ExpenseCategory::SeniorSoiree)
            .map(|item| item.amount)
            .sum();

        assert_eq!(royale, catalog.event_costs.royale);
        assert_eq!(soiree, catalog.event_costs.soiree);
    }

    #[test]
    fn test_json_roundtrip_keeps_catalog() {
        let catalog = Catalog::senior_week();
        let json = catalog.to_json().unwrap();

        assert!(json.contains("\"Website & Communication\""));
        assert!(json.contains("\"altitude_cost\""));

        let parsed = Catalog::from_json(&json).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn test_missing_altitude_line_rejected() {
        let mut catalog = Catalog::senior_week();
        catalog.expenses.retain(|line| !line.is_altitude());

        let err = catalog.validate().unwrap_err();
        assert!(matches!(err, AllocationError::InvalidCatalog(_)));

        let json = serde_json::to_string(&catalog).unwrap();
        assert!(Catalog::from_json(&json).is_err());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut catalog = Catalog::senior_week();
        catalog.income.push(IncomeItem::new("Refund", -10.0));

        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_zero_event_cost_rejected() {
        let mut catalog = Catalog::senior_week();
        catalog.event_costs.soiree = 0.0;

        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = Catalog::from_file("/nonexistent/catalog.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog file"));
    }
}
