//! Ratatui-based terminal UI.
//!
//! The TUI is the lab form: one line per observation (water volume and the two
//! turbidity temperatures) plus the unknown sample. Every committed edit
//! re-runs the pipeline, so the mean column, the chart, and the results panel
//! always reflect the form as it stands.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};

use crate::app::pipeline::{Analysis, recompute};
use crate::data::{DemoConfig, generate_sheet};
use crate::domain::{ExperimentConfig, SheetInput};
use crate::error::AppError;

mod form;
mod plotters_chart;

use form::{COL_APP, COL_DIS, COL_WATER, FormState, cell_value, format_value};
use plotters_chart::CstPlottersChart;

const X_LABEL: &str = "% phenol";
const Y_LABEL: &str = "mean T (°C)";

/// Start the TUI with a pre-filled (or blank) sheet.
pub fn run(sheet: SheetInput, config: ExperimentConfig, export_path: PathBuf) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(sheet, config, export_path);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: ExperimentConfig,
    sheet: SheetInput,
    analysis: Analysis,
    form: FormState,
    status: String,
    export_path: PathBuf,
    demo_seed: u64,
}

impl App {
    fn new(sheet: SheetInput, config: ExperimentConfig, export_path: PathBuf) -> Self {
        let analysis = recompute(&sheet, &config);
        Self {
            config,
            sheet,
            analysis,
            form: FormState::new(),
            status: "Enter readings; results update as you type.".to_string(),
            export_path,
            demo_seed: DemoConfig::default().seed,
        }
    }

    fn recompute(&mut self) {
        self.analysis = recompute(&self.sheet, &self.config);
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.form.editing.is_some() {
            self.handle_cell_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.form.up(&self.sheet),
            KeyCode::Down => self.form.down(&self.sheet),
            KeyCode::Left => self.form.left(&self.sheet),
            KeyCode::Right => self.form.right(),
            KeyCode::Tab => self.form.next(&self.sheet),
            KeyCode::BackTab => self.form.prev(&self.sheet),
            KeyCode::Enter => {
                self.form.begin_edit(&self.sheet);
                self.status = "Editing. Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                self.form.begin_overwrite();
                self.form.push_char(c);
            }
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
                self.form.clear(&mut self.sheet, &self.config);
                self.recompute();
                self.status = "Cell cleared.".to_string();
            }
            KeyCode::Char('g') => self.fill_demo(),
            KeyCode::Char('c') => {
                self.sheet = SheetInput::blank(&self.config);
                self.form = FormState::new();
                self.recompute();
                self.status = "Form cleared.".to_string();
            }
            KeyCode::Char('e') => self.export_series(),
            _ => {}
        }
        false
    }

    fn handle_cell_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.form.cancel();
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                match self.form.commit(&mut self.sheet, &self.config) {
                    Ok(()) => {
                        self.recompute();
                        self.status = self.result_status();
                        match code {
                            KeyCode::Tab => self.form.next(&self.sheet),
                            KeyCode::Up => self.form.up(&self.sheet),
                            _ => self.form.down(&self.sheet),
                        }
                    }
                    Err(msg) => self.status = msg,
                }
            }
            KeyCode::Backspace => self.form.pop_char(),
            KeyCode::Char(c) => self.form.push_char(c),
            _ => {}
        }
    }

    fn fill_demo(&mut self) {
        let demo = DemoConfig {
            seed: self.demo_seed,
            ..DemoConfig::default()
        };
        match generate_sheet(&self.config, &demo) {
            Ok(sheet) => {
                self.sheet = sheet;
                self.recompute();
                self.status = format!("Filled with simulated readings (seed {}).", self.demo_seed);
                self.demo_seed = self.demo_seed.wrapping_add(1);
            }
            Err(err) => self.status = format!("Demo failed: {err}"),
        }
    }

    fn export_series(&mut self) {
        if self.analysis.series.points.is_empty() {
            self.status = "Nothing to export yet.".to_string();
            return;
        }
        self.status = match crate::io::series::write_series_json(&self.export_path, &self.analysis, &self.config) {
            Ok(()) => format!("Wrote {}", self.export_path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn result_status(&self) -> String {
        match &self.analysis.critical {
            Some(cp) => format!("CST {:.2} °C at {:.1} % phenol", cp.temperature, cp.composition),
            None => "Updated.".to_string(),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("cst", Style::default().fg(Color::Cyan)),
                Span::raw(" | phenol-water critical solution temperature"),
            ]),
            Line::from(Span::styled(
                format!(
                    "phenol: {} ml | rows used: {}/{} | zero = {}",
                    format_value(self.config.phenol_volume_ml),
                    self.analysis.dataset.len(),
                    self.sheet.observations.len(),
                    if self.config.zero_is_blank { "blank" } else { "reading" },
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(52), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(columns[1]);

        self.draw_chart(frame, right[0]);
        self.draw_results(frame, right[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let header = Row::new(["#", "water ml", "T dis °C", "T app °C", "mean °C", "% phenol"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

        let critical_row = self.analysis.critical.as_ref().map(|cp| cp.row);
        let mut rows = Vec::with_capacity(self.sheet.observations.len() + 1);

        for idx in 0..self.sheet.observations.len() {
            let number = idx + 1;
            let derived = self.analysis.row(number);
            let mut cells = vec![Cell::from(number.to_string())];
            for col in [COL_WATER, COL_DIS, COL_APP] {
                cells.push(self.input_cell(idx, col));
            }
            cells.push(Cell::from(derived.map(|d| format!("{:.2}", d.mean_temp)).unwrap_or_else(|| "-".into())));
            cells.push(Cell::from(
                derived.map(|d| format!("{:.1}", d.phenol_percent)).unwrap_or_else(|| "-".into()),
            ));

            let mut row = Row::new(cells);
            if critical_row == Some(number) {
                row = row.style(Style::default().fg(Color::Red));
            }
            rows.push(row);
        }

        let unknown_idx = self.sheet.observations.len();
        let unknown_mean = self
            .analysis
            .unknown_mean
            .map(|m| format!("{m:.2}"))
            .unwrap_or_else(|| "-".into());
        let unknown_pct = self
            .analysis
            .unknown_estimate
            .as_ref()
            .map(|e| format!("{:.1}", e.phenol_percent))
            .unwrap_or_else(|| "-".into());
        rows.push(
            Row::new(vec![
                Cell::from("unk"),
                Cell::from(""),
                self.input_cell(unknown_idx, COL_DIS),
                self.input_cell(unknown_idx, COL_APP),
                Cell::from(unknown_mean),
                Cell::from(unknown_pct),
            ])
            .style(Style::default().fg(Color::Magenta))
            .top_margin(1),
        );

        let widths = [
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(8),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title("Observations").borders(Borders::ALL));
        frame.render_widget(table, area);
    }

    fn input_cell(&self, row: usize, col: usize) -> Cell<'static> {
        let selected = self.form.row == row && self.form.col == col;
        if selected {
            if let Some(buf) = &self.form.editing {
                return Cell::from(format!("{buf}_"))
                    .style(Style::default().fg(Color::Black).bg(Color::Yellow));
            }
        }

        let text = cell_value(&self.sheet, row, col).map(format_value).unwrap_or_default();
        let cell = Cell::from(text);
        if selected {
            cell.style(Style::default().fg(Color::Black).bg(Color::White))
        } else {
            cell
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Mean T vs % phenol").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let points = self.analysis.series.as_pairs();
        let Some((x_bounds, y_bounds)) = chart_bounds(&points) else {
            return;
        };

        let critical = self.analysis.series.critical.as_ref();
        let (chart_rect, insets) = chart_layout(inner);
        let widget = CstPlottersChart {
            points: &points,
            peak: critical.map(|cp| (cp.composition, cp.temperature)),
            annotation: critical.map(|cp| format!("CST = {:.2}°C @ {:.1}%", cp.temperature, cp.composition)),
            x_bounds,
            y_bounds,
            x_label: X_LABEL,
            y_label: Y_LABEL,
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = crate::report::format_results(&self.analysis);
        let lines = text.lines().map(|l| Line::from(l.to_string())).collect::<Vec<_>>();
        let p = Paragraph::new(Text::from(lines))
            .style(Style::default().fg(Color::White))
            .block(Block::default().title("Results").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "arrows/Tab move  Enter edit  x clear  g demo  c reset  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Padded axis bounds for the series, or `None` when there is nothing to draw.
fn chart_bounds(points: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
    if points.is_empty() {
        return None;
    }

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    let pad_x = ((x_max - x_min) * 0.05).max(1.0);
    // Extra headroom above the peak for the annotation.
    let pad_y = ((y_max - y_min) * 0.1).max(1.0);
    Some(([x_min - pad_x, x_max + pad_x], [y_min - pad_y, y_max + 2.0 * pad_y]))
}

fn fmt_axis(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.0}");
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.0}");
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        let x_label = Paragraph::new(X_LABEL).alignment(Alignment::Center).style(style);
        frame.render_widget(x_label, x_rect);
    }

    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.min(insets.left + 6),
        height: 1,
    };
    frame.render_widget(Paragraph::new(Y_LABEL).style(style.add_modifier(Modifier::BOLD)), y_rect);
}
