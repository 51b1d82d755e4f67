// 📤 Export - Report output as text, JSON, or CSV

use crate::breakdown::{Report, TicketSummary};
use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Text,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

pub fn write_report<W: Write>(report: &Report, format: ExportFormat, writer: W) -> Result<()> {
    match format {
        ExportFormat::Text => write_text(report, writer),
        ExportFormat::Json => write_json(report, writer),
        ExportFormat::Csv => write_csv(report, writer),
    }
}

/// Write the report to a file, creating or truncating it
pub fn export_to_file(report: &Report, format: ExportFormat, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create export file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_report(report, format, &mut writer)?;
    writer.flush().context("Failed to flush export file")?;
    Ok(())
}

// ============================================================================
// TEXT
// ============================================================================

fn required_ticket<'a>(report: &'a Report, event: &str) -> Result<&'a TicketSummary> {
    report
        .ticket(event)
        .ok_or_else(|| anyhow!("Report has no {} ticket", event))
}

pub fn write_text<W: Write>(report: &Report, mut w: W) -> Result<()> {
    let royale = required_ticket(report, "Royale")?;
    let soiree = required_ticket(report, "Soiree")?;
    let altitude = required_ticket(report, "Altitude")?;

    let a = &report.allocation;
    let p = &report.params;
    let prices = &a.prices;

    writeln!(w, "Budget & Ticket Allocation Planner")?;
    writeln!(w, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(w)?;

    writeln!(w, "Ticket Prices")?;
    for ticket in &report.tickets {
        writeln!(
            w,
            "  {:<9} ${:>4}  (actual ${:.2})  {} attendees, {:.1}% of class",
            ticket.event, ticket.display_price, ticket.exact_price, ticket.attendance, ticket.attendance_share
        )?;
        writeln!(
            w,
            "            event cost ${:.2}, revenue ${:.2}",
            ticket.event_cost, ticket.revenue
        )?;
    }
    writeln!(w)?;

    writeln!(w, "Financial Summary")?;
    writeln!(w, "  Total Expenses:                      ${:.2}", a.total_expenses)?;
    writeln!(w, "  Game On Income:                      ${:.2}", a.existing_income)?;
    writeln!(w, "  Altitude Income:                     ${:.2}", a.altitude_income)?;
    writeln!(w, "  Net Expenditure:                     ${:.2}", a.net_expenditure)?;
    writeln!(w, "  Target Surplus:                      ${:.2}", a.target_surplus)?;
    writeln!(w, "  Amount needed from Royale & Soiree:  ${:.2}", a.amount_needed)?;
    writeln!(w, "  Royale & Soiree Revenue:             ${:.2}", a.ticket_revenue())?;
    writeln!(w, "  Final Net Position:                  ${:.2}", a.final_net_position())?;
    writeln!(w)?;

    writeln!(w, "Projected Surplus: ${:.2}", prices.projected_surplus)?;
    writeln!(
        w,
        "  Target: ${:.2} | Difference: ${:.2}",
        a.target_surplus,
        a.surplus_difference()
    )?;
    writeln!(
        w,
        "  Altitude net impact: ${:.2} (break-even event)",
        a.altitude_net_impact()
    )?;
    writeln!(w)?;

    writeln!(w, "Expense Allocation")?;
    for slice in &report.expense_categories {
        writeln!(w, "  {:<28} ${:>10.2}  {:>3.0}%", slice.name, slice.value, slice.percent)?;
    }
    writeln!(w)?;

    writeln!(w, "Income Sources")?;
    for slice in &report.income_sources {
        writeln!(w, "  {:<30} ${:>10.2}  {:>3.0}%", slice.name, slice.value, slice.percent)?;
    }
    writeln!(w)?;

    writeln!(w, "Pricing Strategy")?;
    writeln!(
        w,
        "  • Set Royale tickets at ${} and Soiree tickets at ${}.",
        royale.display_price, soiree.display_price
    )?;
    writeln!(
        w,
        "  • Set Altitude tickets at ${} to cover the costs of ${:.2}.",
        altitude.display_price, p.altitude_cost
    )?;
    writeln!(
        w,
        "  • 10% more Royale/Soiree attendance lowers prices by about ${:.2} per student.",
        a.price_drop_for_extra_attendance()
    )?;
    writeln!(
        w,
        "  • Projected surplus of ${:.2} funds future class committee activities.",
        prices.projected_surplus
    )?;

    Ok(())
}

// ============================================================================
// JSON
// ============================================================================

pub fn write_json<W: Write>(report: &Report, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, report).context("Failed to write report JSON")?;
    Ok(())
}

// ============================================================================
// CSV
// ============================================================================

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    section: &'a str,
    description: &'a str,
    amount: String,
    kind: &'a str,
}

/// One flat CSV: expense rows, income rows, then the derived prices
pub fn write_csv<W: Write>(report: &Report, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for row in &report.expense_rows {
        wtr.serialize(CsvRecord {
            section: "expense",
            description: &row.description,
            amount: format!("{:.2}", row.amount),
            kind: &row.category,
        })?;
    }

    for row in &report.income_rows {
        wtr.serialize(CsvRecord {
            section: "income",
            description: &row.source,
            amount: format!("{:.2}", row.amount),
            kind: row.kind.as_str(),
        })?;
    }

    for ticket in &report.tickets {
        wtr.serialize(CsvRecord {
            section: "price",
            description: &ticket.event,
            amount: format!("{:.2}", ticket.exact_price),
            kind: "Exact",
        })?;
    }

    let surplus = format!("{:.2}", report.allocation.prices.projected_surplus);
    wtr.serialize(CsvRecord {
        section: "summary",
        description: "Projected Surplus",
        amount: surplus,
        kind: "Derived",
    })?;

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::Planner;
    use crate::catalog::Catalog;

    fn report() -> Report {
        let planner = Planner::new(Catalog::senior_week()).unwrap();
        Report::from_planner(&planner)
    }

    #[test]
    fn test_text_report_contents() {
        let mut out = Vec::new();
        write_text(&report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Royale    $  55  (actual $54.73)"));
        assert!(text.contains("Net Expenditure:                     $121618.63"));
        assert!(text.contains("Projected Surplus: $5000.00"));
        assert!(text.contains("Set Altitude tickets at $23"));
    }

    #[test]
    fn test_text_report_requires_every_ticket() {
        let json = serde_json::to_string(&report()).unwrap();
        let mut parsed: Report = serde_json::from_str(&json).unwrap();
        parsed.tickets.retain(|ticket| ticket.event != "Altitude");

        let err = write_text(&parsed, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Altitude"));
    }

    #[test]
    fn test_text_report_ignores_ticket_order() {
        let mut reordered = report();
        reordered.tickets.reverse();

        let mut out = Vec::new();
        write_text(&reordered, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Set Royale tickets at $55 and Soiree tickets at $60."));
        assert!(text.contains("Set Altitude tickets at $23 to cover"));
    }

    #[test]
    fn test_json_report_parses() {
        let mut out = Vec::new();
        write_json(&report(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["params"]["royale_attendance"], 1000);
        assert_eq!(value["tickets"][1]["event"], "Soiree");
        assert_eq!(value["income_rows"][5]["kind"], "Break-even Income");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_csv_report_rows() {
        let mut out = Vec::new();
        write_csv(&report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "section,description,amount,kind");
        // header + 14 expenses + 8 income rows + 3 prices + surplus
        assert_eq!(lines.len(), 27);
        assert!(lines.contains(&"expense,Altitude Rental & Buses,11102.67,Events & Activities"));
        assert!(lines.contains(&"income,Altitude Tickets,11102.67,Break-even Income"));
        assert!(lines.contains(&"price,Altitude,22.21,Exact"));
        assert_eq!(lines[26], "summary,Projected Surplus,5000.00,Derived");
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join(format!("ticket-allocation-{}.json", std::process::id()));
        export_to_file(&report(), ExportFormat::Json, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"projected_surplus\""));
        std::fs::remove_file(&path).unwrap();
    }
}
