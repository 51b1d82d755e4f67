// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use ticket_allocation::{export_to_file, write_report, Catalog, ExportFormat, Parameters, Planner, Report};

/// Budget & ticket allocation planner
#[derive(Parser)]
#[command(name = "ticket-planner")]
#[command(about = "Plan event ticket prices that cover the class budget plus a target surplus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Catalog JSON replacing the built-in Senior Week budget
    #[arg(long, global = true, env = "TICKET_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive planner with sliders (default)
    Ui,

    /// Print the planning report
    Report {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ExportFormat,
    },

    /// Write the planning report to a file
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file (defaults to ticket-report.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the active catalog as JSON
    Catalog,
}

/// Starting values for the five planner inputs
#[derive(Args)]
struct ParamArgs {
    #[arg(long, global = true)]
    royale: Option<u32>,

    #[arg(long, global = true)]
    soiree: Option<u32>,

    #[arg(long, global = true)]
    altitude: Option<u32>,

    #[arg(long, global = true)]
    altitude_cost: Option<f64>,

    #[arg(long, global = true)]
    surplus: Option<f64>,
}

impl ParamArgs {
    fn apply(&self, mut params: Parameters) -> Parameters {
        if let Some(v) = self.royale {
            params.royale_attendance = v;
        }
        if let Some(v) = self.soiree {
            params.soiree_attendance = v;
        }
        if let Some(v) = self.altitude {
            params.altitude_attendance = v;
        }
        if let Some(v) = self.altitude_cost {
            params.altitude_cost = v;
        }
        if let Some(v) = self.surplus {
            params.target_surplus = v;
        }
        params
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::senior_week(),
    };
    let params = cli.params.apply(Parameters::for_catalog(&catalog));
    let planner = Planner::with_params(catalog, params).context("Failed to derive ticket prices")?;

    match cli.command {
        None | Some(Command::Ui) => run_ui_mode(planner)?,
        Some(Command::Report { format }) => {
            let report = Report::from_planner(&planner);
            write_report(&report, format, io::stdout().lock())?;
            println!();
        }
        Some(Command::Export { format, output }) => {
            let path = output
                .unwrap_or_else(|| PathBuf::from(format!("ticket-report.{}", format.extension())));
            let report = Report::from_planner(&planner);
            export_to_file(&report, format, &path)?;
            println!("✓ Report written to {}", path.display());
        }
        Some(Command::Catalog) => println!("{}", planner.catalog().to_json()?),
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(planner: Planner) -> Result<()> {
    println!("🎟️  Loading ticket allocation planner...");
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(planner);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_planner: Planner) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print a report: ticket-planner report");
    std::process::exit(1);
}
