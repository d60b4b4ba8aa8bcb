//! Ratatui-based terminal UI.
//!
//! Left: the printed report (summary and assumption checks), scrollable.
//! Right: the residual-vs-predicted chart.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use crate::app::pipeline::{execute as execute_pipeline, RunOutput};
use crate::domain::{Dataset, DiagOptions, ModelSpec, PlotLabels};
use crate::error::AppError;
use crate::plot::chart_bounds;

mod plotters_chart;

use plotters_chart::ResidualChart;

/// Run the diagnostics, then show them until the user quits.
///
/// The pipeline runs before the terminal switches to raw mode so failures are
/// reported on a normal screen.
pub fn run(dataset: &Dataset, spec: &ModelSpec, opts: &DiagOptions) -> Result<(), AppError> {
    let mut text = Vec::new();
    let output = execute_pipeline(dataset, spec, opts, &mut text)?;
    let mut app = App::new(String::from_utf8_lossy(&text).into_owned(), output, opts.plot.labels.clone());

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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
    report: String,
    n_lines: u16,
    scroll: u16,
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    labels: PlotLabels,
    status: String,
}

impl App {
    fn new(report: String, output: RunOutput, labels: PlotLabels) -> Self {
        let (x_bounds, y_bounds) = chart_bounds(&output.residuals);
        let points = output.residuals.iter().map(|p| (p.predicted, p.residual)).collect();
        let n_lines = u16::try_from(report.lines().count()).unwrap_or(u16::MAX);
        let status = format!(
            "{} | n={} | R²={:.3}",
            output.spec,
            output.model.stats.n_obs,
            output.model.stats.r_squared
        );
        Self {
            report,
            n_lines,
            scroll: 0,
            points,
            x_bounds,
            y_bounds,
            labels,
            status,
        }
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
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let max_scroll = self.n_lines.saturating_sub(1);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = (self.scroll + 1).min(max_scroll),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10).min(max_scroll),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(82), Constraint::Min(30)])
            .split(rows[0]);

        self.draw_report(frame, cols[0]);
        self.draw_chart(frame, cols[1]);
        self.draw_footer(frame, rows[1]);
    }

    fn draw_report(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let p = Paragraph::new(self.report.as_str())
            .scroll((self.scroll, 0))
            .block(Block::default().title("Report").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Residuals vs Predicted").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let widget = ResidualChart {
            points: &self.points,
            x_bounds: self.x_bounds,
            y_bounds: self.y_bounds,
            x_label: &self.labels.x,
            y_label: &self.labels.y,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("↑/↓ PgUp/PgDn scroll  Home top  q quit", Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.status.as_str(), Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::analyze;
    use crate::data::generate_linear_sample;
    use crate::domain::SampleConfig;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let ds = generate_linear_sample(&SampleConfig::default()).unwrap();
        let spec = ModelSpec::new("y", &["x1", "x2"]).unwrap();
        let output = analyze(&ds, &spec, &DiagOptions::default()).unwrap();
        App::new("line 1\nline 2\nline 3\n".to_string(), output, PlotLabels::default())
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Up));
        assert_eq!(app.scroll, 0);
        for _ in 0..10 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.scroll, 2);
        app.handle_key(KeyCode::Home);
        assert_eq!(app.scroll, 0);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn draws_report_and_footer() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let buf = terminal.backend().buffer();
        let text: String = (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("Report"));
        assert!(text.contains("line 1"));
        assert!(text.contains("y ~ x1 + x2"));
    }
}
