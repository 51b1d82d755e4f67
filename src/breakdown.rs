// 📊 Breakdown - Aggregates behind the charts and detail tables

use crate::allocation::{display_price, Allocation, Planner};
use crate::catalog::{Catalog, ExpenseItem};
use crate::params::{attendance_share, Parameters};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CHART SLICES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
}

impl ChartSlice {
    pub fn new(name: &str, value: f64) -> Self {
        ChartSlice {
            name: name.to_string(),
            value,
        }
    }

    pub fn percent_of(&self, total: f64) -> f64 {
        if total == 0.0 {
            0.0
        } else {
            self.value / total * 100.0
        }
    }
}

/// Slice with its whole-percent label, as drawn on the charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSlice {
    pub name: String,
    pub value: f64,
    pub percent: f64,
    pub label: String,
}

pub fn with_percentages(slices: &[ChartSlice]) -> Vec<LabeledSlice> {
    let total: f64 = slices.iter().map(|slice| slice.value).sum();

    slices
        .iter()
        .map(|slice| {
            let percent = slice.percent_of(total);
            LabeledSlice {
                name: slice.name.clone(),
                value: slice.value,
                percent,
                label: format!("{} {:.0}%", slice.name, percent),
            }
        })
        .collect()
}

/// Expense totals per category, in order of first appearance
pub fn category_totals(expenses: &[ExpenseItem]) -> Vec<ChartSlice> {
    let mut totals: Vec<ChartSlice> = Vec::new();

    for item in expenses {
        let name = item.category.as_str();
        match totals.iter_mut().find(|slice| slice.name == name) {
            Some(slice) => slice.value += item.amount,
            None => totals.push(ChartSlice::new(name, item.amount)),
        }
    }

    totals
}

pub fn income_slices(allocation: &Allocation) -> Vec<ChartSlice> {
    vec![
        ChartSlice::new("Game On Income", allocation.existing_income),
        ChartSlice::new("Altitude Ticket Income", allocation.altitude_income),
        ChartSlice::new("Projected Royale Ticket Sales", allocation.royale_revenue),
        ChartSlice::new("Projected Soiree Ticket Sales", allocation.soiree_revenue),
    ]
}

// ============================================================================
// DETAIL TABLES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub description: String,
    pub amount: f64,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeKind {
    #[serde(rename = "Existing Income")]
    Existing,
    #[serde(rename = "Break-even Income")]
    BreakEven,
    #[serde(rename = "Projected Income")]
    Projected,
}

impl IncomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeKind::Existing => "Existing Income",
            IncomeKind::BreakEven => "Break-even Income",
            IncomeKind::Projected => "Projected Income",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRow {
    pub source: String,
    pub amount: f64,
    pub kind: IncomeKind,
}

/// Expense detail rows sorted by category label; ties keep catalog order
pub fn expense_rows(expenses: &[ExpenseItem]) -> Vec<ExpenseRow> {
    let mut rows: Vec<ExpenseRow> = expenses
        .iter()
        .map(|item| ExpenseRow {
            description: item.description.clone(),
            amount: item.amount,
            category: item.category.as_str().to_string(),
        })
        .collect();

    rows.sort_by(|a, b| a.category.cmp(&b.category));
    rows
}

pub fn income_rows(catalog: &Catalog, params: &Parameters, allocation: &Allocation) -> Vec<IncomeRow> {
    let mut rows: Vec<IncomeRow> = catalog
        .income
        .iter()
        .map(|item| IncomeRow {
            source: item.description.clone(),
            amount: item.amount,
            kind: IncomeKind::Existing,
        })
        .collect();

    rows.push(IncomeRow {
        source: "Altitude Tickets".to_string(),
        amount: allocation.altitude_income,
        kind: IncomeKind::BreakEven,
    });
    rows.push(IncomeRow {
        source: format!("Royale Tickets ({} attendees)", params.royale_attendance),
        amount: allocation.royale_revenue,
        kind: IncomeKind::Projected,
    });
    rows.push(IncomeRow {
        source: format!("Soiree Tickets ({} attendees)", params.soiree_attendance),
        amount: allocation.soiree_revenue,
        kind: IncomeKind::Projected,
    });

    rows
}

// ============================================================================
// REPORT
// ============================================================================

/// One event's price card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub event: String,
    pub attendance: u32,
    /// Percent of the class
    pub attendance_share: f64,
    pub exact_price: f64,
    pub display_price: f64,
    pub event_cost: f64,
    pub revenue: f64,
}

/// Everything the planner shows, frozen at one moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub params: Parameters,
    pub allocation: Allocation,
    pub tickets: Vec<TicketSummary>,
    pub expense_categories: Vec<LabeledSlice>,
    pub income_sources: Vec<LabeledSlice>,
    pub expense_rows: Vec<ExpenseRow>,
    pub income_rows: Vec<IncomeRow>,
}

impl Report {
    pub fn build(catalog: &Catalog, params: &Parameters, allocation: &Allocation) -> Self {
        let expenses = catalog.expenses(params.altitude_cost);
        let prices = allocation.prices;
        let class_size = catalog.class_size;

        let tickets = vec![
            TicketSummary {
                event: "Royale".to_string(),
                attendance: params.royale_attendance,
                attendance_share: attendance_share(params.royale_attendance, class_size),
                exact_price: prices.royale_price,
                display_price: display_price(prices.royale_price),
                event_cost: catalog.event_costs.royale,
                revenue: allocation.royale_revenue,
            },
            TicketSummary {
                event: "Soiree".to_string(),
                attendance: params.soiree_attendance,
                attendance_share: attendance_share(params.soiree_attendance, class_size),
                exact_price: prices.soiree_price,
                display_price: display_price(prices.soiree_price),
                event_cost: catalog.event_costs.soiree,
                revenue: allocation.soiree_revenue,
            },
            TicketSummary {
                event: "Altitude".to_string(),
                attendance: params.altitude_attendance,
                attendance_share: attendance_share(params.altitude_attendance, class_size),
                exact_price: prices.altitude_price,
                display_price: display_price(prices.altitude_price),
                event_cost: params.altitude_cost,
                revenue: allocation.altitude_income,
            },
        ];

        Report {
            generated_at: Utc::now(),
            params: *params,
            allocation: *allocation,
            tickets,
            expense_categories: with_percentages(&category_totals(&expenses)),
            income_sources: with_percentages(&income_slices(allocation)),
            expense_rows: expense_rows(&expenses),
            income_rows: income_rows(catalog, params, allocation),
        }
    }

    pub fn from_planner(planner: &Planner) -> Self {
        Self::build(planner.catalog(), planner.params(), planner.allocation())
    }

    pub fn expense_total(&self) -> f64 {
        self.expense_rows.iter().map(|row| row.amount).sum()
    }

    pub fn income_total(&self) -> f64 {
        self.income_rows.iter().map(|row| row.amount).sum()
    }

    pub fn ticket(&self, event: &str) -> Option<&TicketSummary> {
        self.tickets.iter().find(|ticket| ticket.event == event)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ExpenseCategory;

    const EPS: f64 = 1e-6;

    fn default_report() -> Report {
        let planner = Planner::new(Catalog::senior_week()).unwrap();
        Report::from_planner(&planner)
    }

    #[test]
    fn test_category_totals_first_appearance_order() {
        let catalog = Catalog::senior_week();
        let totals = category_totals(&catalog.expenses(11102.67));

        let names: Vec<&str> = totals.iter().map(|slice| slice.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Website & Communication", "Events & Activities", "Royale Event", "Senior Soiree"]
        );
        assert!((totals[0].value - 638.75).abs() < EPS);
        assert!((totals[1].value - 25009.74).abs() < EPS);
        assert_eq!(totals[2].value, 55250.0);
        assert_eq!(totals[3].value, 72574.0);
    }

    #[test]
    fn test_percent_labels() {
        let slices = vec![ChartSlice::new("A", 1.0), ChartSlice::new("B", 3.0)];
        let labeled = with_percentages(&slices);

        assert_eq!(labeled[0].label, "A 25%");
        assert_eq!(labeled[1].label, "B 75%");
        assert_eq!(ChartSlice::new("Empty", 5.0).percent_of(0.0), 0.0);
    }

    #[test]
    fn test_expense_rows_sorted_stably() {
        let expenses = vec![
            ExpenseItem::new("Soiree Food", 1.0, ExpenseCategory::SeniorSoiree),
            ExpenseItem::new("Domain", 2.0, ExpenseCategory::WebsiteCommunication),
            ExpenseItem::new("Photos", 3.0, ExpenseCategory::EventsActivities),
            ExpenseItem::new("Buses", 4.0, ExpenseCategory::EventsActivities),
        ];

        let rows = expense_rows(&expenses);
        let order: Vec<&str> = rows.iter().map(|row| row.description.as_str()).collect();

        assert_eq!(order, vec!["Photos", "Buses", "Soiree Food", "Domain"]);
    }

    #[test]
    fn test_income_rows_layout() {
        let report = default_report();
        let rows = &report.income_rows;

        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].kind, IncomeKind::Existing);
        assert_eq!(rows[5].source, "Altitude Tickets");
        assert_eq!(rows[5].kind, IncomeKind::BreakEven);
        assert_eq!(rows[6].source, "Royale Tickets (1000 attendees)");
        assert_eq!(rows[7].source, "Soiree Tickets (1200 attendees)");
        assert_eq!(rows[7].kind, IncomeKind::Projected);
    }

    #[test]
    fn test_table_totals_match_allocation() {
        let report = default_report();

        assert!((report.expense_total() - report.allocation.total_expenses).abs() < EPS);
        assert!((report.income_total() - report.allocation.grand_total_income()).abs() < EPS);
    }

    #[test]
    fn test_ticket_cards() {
        let report = default_report();

        let royale = report.ticket("Royale").unwrap();
        assert_eq!(royale.display_price, 55.0);
        assert_eq!(format!("{:.1}", royale.attendance_share), "50.9");

        let altitude = report.ticket("Altitude").unwrap();
        assert_eq!(altitude.display_price, 23.0);
        assert!((altitude.revenue - altitude.event_cost).abs() < EPS);

        assert!(report.ticket("Gala").is_none());
    }

    #[test]
    fn test_income_slices_sum_to_grand_total() {
        let report = default_report();
        let total: f64 = report.income_sources.iter().map(|slice| slice.value).sum();

        assert!((total - report.allocation.grand_total_income()).abs() < EPS);
        assert_eq!(report.income_sources[1].name, "Altitude Ticket Income");
    }
}
