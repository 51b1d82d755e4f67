use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;
use ticket_allocation::{
    attendance_share, category_totals, display_price, expense_rows, income_rows, income_slices,
    with_percentages, LabeledSlice, Parameter, Planner,
};

// Crimson accent, as on the class committee's page
const ACCENT: Color = Color::Rgb(165, 28, 48);

const CHART_COLORS: [Color; 6] = [
    ACCENT,
    Color::Rgb(180, 167, 108),
    Color::Rgb(78, 132, 196),
    Color::Rgb(141, 141, 141),
    Color::Rgb(217, 197, 116),
    Color::Rgb(105, 130, 105),
];

pub struct App {
    pub planner: Planner,
    pub focus: usize,
    pub show_expense_details: bool,
    pub show_income_details: bool,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            focus: 0,
            show_expense_details: false,
            show_income_details: false,
            last_error: None,
        }
    }

    pub fn focused(&self) -> Parameter {
        Parameter::ALL[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % Parameter::ALL.len();
    }

    pub fn focus_previous(&mut self) {
        self.focus = if self.focus == 0 {
            Parameter::ALL.len() - 1
        } else {
            self.focus - 1
        };
    }

    pub fn increase(&mut self) {
        let result = self.planner.increment(self.focused()).map(|_| ());
        self.record(result);
    }

    pub fn decrease(&mut self) {
        let result = self.planner.decrement(self.focused()).map(|_| ());
        self.record(result);
    }

    pub fn reset(&mut self) {
        let result = self.planner.reset().map(|_| ());
        self.record(result);
    }

    pub fn toggle_expense_details(&mut self) {
        self.show_expense_details = !self.show_expense_details;
    }

    pub fn toggle_income_details(&mut self) {
        self.show_income_details = !self.show_income_details;
    }

    /// Apply one key press; returns false when the user quits
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.focus_next(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => self.focus_previous(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => self.increase(),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => self.decrease(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('e') => self.toggle_expense_details(),
            KeyCode::Char('i') => self.toggle_income_details(),
            _ => {}
        }
        true
    }

    fn record(&mut self, result: ticket_allocation::AllocationResult<()>) {
        self.last_error = result.err().map(|e| e.to_string());
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Length(22), // Parameters and price preview
            Constraint::Min(0),     // Charts or detail tables
            Constraint::Length(3),  // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_parameters(f, middle[0], app);
    render_price_preview(f, middle[1], app);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    if app.show_expense_details {
        render_expense_table(f, bottom[0], app);
    } else {
        render_expense_chart(f, bottom[0], app);
    }

    if app.show_income_details {
        render_income_table(f, bottom[1], app);
    } else {
        render_income_chart(f, bottom[1], app);
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            "Budget & Ticket Allocation Planner",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("v{}", ticket_allocation::VERSION),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(vec![title])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(ACCENT)));

    f.render_widget(header, area);
}

fn render_parameters(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Event Parameters ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(3); Parameter::ALL.len()];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let params = app.planner.params();
    let class_size = app.planner.catalog().class_size;

    for (i, parameter) in Parameter::ALL.iter().enumerate() {
        let value = params.get(*parameter);
        let range = parameter.range(class_size);

        let label = if parameter.is_attendance() {
            format!(
                "{}: {} students ({:.1}% of class)",
                parameter.label(),
                value as u32,
                attendance_share(value as u32, class_size)
            )
        } else {
            format!("{}: ${:.2}", parameter.label(), value)
        };

        let focused = i == app.focus;
        let border_color = if focused { Color::Yellow } else { Color::DarkGray };

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color)),
            )
            .gauge_style(Style::default().fg(ACCENT).bg(Color::Black))
            .ratio(range.ratio(value).clamp(0.0, 1.0))
            .label(Span::styled(label, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)));

        f.render_widget(gauge, rows[i]);
    }

    let allocation = app.planner.allocation();
    let altitude = vec![
        Line::from(vec![
            Span::styled(" Altitude Ticket: ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("${}", display_price(allocation.prices.altitude_price)),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" (${:.2})", allocation.prices.altitude_price)),
        ]),
        Line::from(vec![
            Span::styled(" Net Impact: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "${:.2} (income ${:.2} vs cost ${:.2})",
                allocation.altitude_net_impact(),
                allocation.altitude_income,
                allocation.altitude_cost
            )),
        ]),
    ];
    f.render_widget(Paragraph::new(altitude), rows[Parameter::ALL.len()]);
}

fn render_price_preview(f: &mut Frame, area: Rect, app: &App) {
    let allocation = app.planner.allocation();
    let params = app.planner.params();
    let prices = allocation.prices;

    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };
    let price = |value: f64| {
        Span::styled(
            format!("${}", display_price(value)),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )
    };
    let difference = allocation.surplus_difference();
    let difference_color = if difference.abs() < 0.005 { Color::Green } else { Color::Yellow };

    let content = vec![
        Line::from(""),
        Line::from(vec![
            label("  Royale Ticket:  "),
            price(prices.royale_price),
            Span::raw(format!("  actual ${:.2}, {} attendees", prices.royale_price, params.royale_attendance)),
        ]),
        Line::from(vec![
            label("  Soiree Ticket:  "),
            price(prices.soiree_price),
            Span::raw(format!("  actual ${:.2}, {} attendees", prices.soiree_price, params.soiree_attendance)),
        ]),
        Line::from(vec![
            label("  Altitude Ticket: "),
            price(prices.altitude_price),
            Span::raw(format!("  actual ${:.2}, {} attendees", prices.altitude_price, params.altitude_attendance)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  Projected Surplus: ${:.2}", prices.projected_surplus),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(format!("  Target: ${:.2} | Difference: ", allocation.target_surplus)),
            Span::styled(format!("${:.2}", difference), Style::default().fg(difference_color)),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![label("  Financial Summary")]),
        Line::from(format!("  Total Expenses:       ${:.2}", allocation.total_expenses)),
        Line::from(format!("  Game On Income:       ${:.2}", allocation.existing_income)),
        Line::from(format!("  Altitude Income:      ${:.2}", allocation.altitude_income)),
        Line::from(format!("  Net Expenditure:      ${:.2}", allocation.net_expenditure)),
        Line::from(format!("  Needed from tickets:  ${:.2}", allocation.amount_needed)),
        Line::from(format!("  Final Net Position:   ${:.2}", allocation.final_net_position())),
        Line::from(""),
        Line::from(vec![Span::styled(
            format!(
                "  +10% Royale/Soiree attendance saves about ${:.2} per student",
                allocation.price_drop_for_extra_attendance()
            ),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )]),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Ticket Price Preview "),
    );

    f.render_widget(paragraph, area);
}

fn slice_bars(slices: &[LabeledSlice]) -> Vec<Bar<'static>> {
    slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            Bar::default()
                .value(slice.value.max(0.0).round() as u64)
                .label(Line::from(slice.name.clone()))
                .text_value(format!("${:.0} ({:.0}%)", slice.value, slice.percent))
                .style(Style::default().fg(CHART_COLORS[i % CHART_COLORS.len()]))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect()
}

fn render_slice_chart(f: &mut Frame, area: Rect, title: String, slices: &[LabeledSlice]) {
    let bars = slice_bars(slices);

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_expense_chart(f: &mut Frame, area: Rect, app: &App) {
    let allocation = app.planner.allocation();
    let expenses = app.planner.catalog().expenses(allocation.altitude_cost);
    let slices = with_percentages(&category_totals(&expenses));

    let title = format!(" Expense Allocation - ${:.2} (e: details) ", allocation.total_expenses);
    render_slice_chart(f, area, title, &slices);
}

fn render_income_chart(f: &mut Frame, area: Rect, app: &App) {
    let allocation = app.planner.allocation();
    let slices = with_percentages(&income_slices(allocation));

    let title = format!(" Income Sources - ${:.2} (i: details) ", allocation.grand_total_income());
    render_slice_chart(f, area, title, &slices);
}

fn header_row(titles: [&'static str; 3]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn total_row(total: f64) -> Row<'static> {
    Row::new(vec![
        Cell::from("Total"),
        Cell::from(format!("{:>12.2}", total)),
        Cell::from(""),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD))
}

fn render_expense_table(f: &mut Frame, area: Rect, app: &App) {
    let allocation = app.planner.allocation();
    let expenses = app.planner.catalog().expenses(allocation.altitude_cost);

    let mut rows: Vec<Row> = expense_rows(&expenses)
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(truncate(&row.description, 34)),
                Cell::from(format!("{:>12.2}", row.amount)).style(Style::default().fg(Color::Red)),
                Cell::from(row.category),
            ])
        })
        .collect();
    rows.push(total_row(allocation.total_expenses));

    let table = Table::new(
        rows,
        [Constraint::Length(36), Constraint::Length(14), Constraint::Min(10)],
    )
    .header(header_row(["Description", "Amount", "Category"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Expense Details (e: chart) "),
    );

    f.render_widget(table, area);
}

fn render_income_table(f: &mut Frame, area: Rect, app: &App) {
    let planner = &app.planner;
    let allocation = planner.allocation();

    let mut rows: Vec<Row> = income_rows(planner.catalog(), planner.params(), allocation)
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(truncate(&row.source, 34)),
                Cell::from(format!("{:>12.2}", row.amount)).style(Style::default().fg(Color::Green)),
                Cell::from(row.kind.as_str()),
            ])
        })
        .collect();
    rows.push(total_row(allocation.grand_total_income()));

    let table = Table::new(
        rows,
        [Constraint::Length(36), Constraint::Length(14), Constraint::Min(10)],
    )
    .header(header_row(["Source", "Amount", "Type"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Income Details (i: chart) "),
    );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" {} ", app.focused().label()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(error) = &app.last_error {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(error.clone(), Style::default().fg(Color::Red)));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Select | "));
    status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Adjust | "));
    status_spans.push(Span::styled("e/i", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Details | "));
    status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Reset | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
