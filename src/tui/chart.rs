//! Terminal Gantt chart.
//!
//! Draws a [`DrawPlan`] one row per line: the indented task label on the left,
//! the bar on a day-scaled axis on the right, progress overlay shaded
//! differently, and a legend of responsible parties beside the chart.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Weekday};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::db::truncate;
use crate::layout::{AxisBounds, DrawPlan, Row};
use crate::tui::colors::{faded, to_color, ACCENT, BACKGROUND, GRID};

const LEGEND_WIDTH: u16 = 26;

/// What a single character cell of a bar line shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Grid,
    Bar,
    Progress,
}

impl Cell {
    fn glyph(self) -> &'static str {
        match self {
            Cell::Empty => " ",
            Cell::Grid => "┊",
            Cell::Bar => "█",
            Cell::Progress => "▓",
        }
    }
}

/// Maps day offsets from the axis minimum onto character columns.
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    min: NaiveDate,
    days: f64,
    width: u16,
}

impl Scale {
    pub fn new(bounds: AxisBounds, width: u16) -> Self {
        Scale {
            min: bounds.min,
            days: bounds.days() as f64,
            width: width.max(1),
        }
    }

    fn offset(&self, date: NaiveDate) -> f64 {
        (date - self.min).num_days() as f64
    }

    /// Day range `[lo, hi)` covered by a column.
    fn span(&self, col: u16) -> (f64, f64) {
        let per = self.days / self.width as f64;
        (col as f64 * per, (col as f64 + 1.0) * per)
    }

    /// Column a day offset falls in.
    pub fn column(&self, offset: f64) -> u16 {
        let col = (offset / self.days * self.width as f64).floor();
        col.clamp(0.0, (self.width - 1) as f64) as u16
    }

    /// At least one column per day, so daily gridlines stay readable.
    fn shows_days(&self) -> bool {
        self.days <= self.width as f64
    }
}

/// Cells for one row's bar line.
pub fn row_cells(row: &Row, scale: &Scale, gridlines: &[NaiveDate]) -> Vec<Cell> {
    let start = scale.offset(row.start);
    let end = scale.offset(row.end).max(start);
    let progress_end = start + row.overlay_days();

    let mut cells: Vec<Cell> = (0..scale.width)
        .map(|col| {
            let (lo, hi) = scale.span(col);
            if hi > start && lo <= end {
                if row.overlay_width.is_some() && lo < progress_end {
                    Cell::Progress
                } else {
                    Cell::Bar
                }
            } else {
                Cell::Empty
            }
        })
        .collect();

    if scale.shows_days() {
        for g in gridlines {
            let col = scale.column(scale.offset(*g)) as usize;
            if cells[col] == Cell::Empty {
                cells[col] = Cell::Grid;
            }
        }
    }
    cells
}

/// Axis header: `dd-Mon` at each Monday that has room for its label.
pub fn axis_labels(scale: &Scale, gridlines: &[NaiveDate]) -> String {
    let width = scale.width as usize;
    let mut line = vec![' '; width];
    let mut free_from = 0;
    for date in gridlines.iter().filter(|d| d.weekday() == Weekday::Mon) {
        let text = date.format("%d-%b").to_string();
        let col = scale.column(scale.offset(*date)) as usize;
        if col < free_from || col + text.len() > width {
            continue;
        }
        for (i, ch) in text.chars().enumerate() {
            line[col + i] = ch;
        }
        free_from = col + text.len() + 1;
    }
    line.into_iter().collect()
}

/// Interactive chart state.
pub struct ChartApp<'a> {
    plan: &'a DrawPlan,
    title: String,
    selected: usize,
    scroll: usize,
    show_legend: bool,
}

impl<'a> ChartApp<'a> {
    pub fn new(plan: &'a DrawPlan, title: &str) -> Self {
        ChartApp {
            plan,
            title: title.to_string(),
            selected: 0,
            scroll: 0,
            show_legend: true,
        }
    }

    fn row_count(&self) -> usize {
        self.plan.rows.len()
    }

    fn move_selection(&mut self, delta: isize) {
        let last = self.row_count().saturating_sub(1) as isize;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    /// Apply a key press. Returns true when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.move_selection(isize::MAX / 2),
            KeyCode::Char('l') => self.show_legend = !self.show_legend,
            _ => {}
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(false)
    }

    /// Keep the selected row inside the visible window.
    fn clamp_scroll(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + visible {
            self.scroll = self.selected + 1 - visible;
        }
    }

    /// Render the whole screen
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Chart
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);

        if self.show_legend {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(LEGEND_WIDTH)])
                .split(chunks[1]);
            self.render_chart(f, body[0]);
            self.render_legend(f, body[1]);
        } else {
            self.render_chart(f, chunks[1]);
        }

        self.render_status_bar(f, chunks[2]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let bounds = self.plan.axis_bounds;
        let header = Paragraph::new(Line::from(vec![
            Span::styled("PROJECT TIMELINE", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{}  {} to {}", self.title, bounds.min, bounds.max),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_chart(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Tasks");
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.width < 4 || inner.height < 2 {
            return;
        }

        let longest = self.plan.rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
        let label_width = (longest as u16 + 1).clamp(8, (inner.width / 3).max(8)).min(inner.width - 1);
        let scale = Scale::new(self.plan.axis_bounds, inner.width - label_width);

        let visible = inner.height as usize - 1;
        self.clamp_scroll(visible);

        let mut lines = vec![Line::from(vec![
            Span::raw(" ".repeat(label_width as usize)),
            Span::styled(axis_labels(&scale, &self.plan.gridlines), Style::default().fg(Color::Gray)),
        ])];

        for row in self.plan.rows.iter().skip(self.scroll).take(visible) {
            lines.push(self.row_line(row, &scale, label_width as usize));
        }

        f.render_widget(Paragraph::new(lines), inner);
    }

    fn row_line(&self, row: &Row, scale: &Scale, label_width: usize) -> Line<'static> {
        let label_style = if row.slot == self.selected {
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let label = format!(
            "{:<width$}",
            truncate(&row.label, label_width.saturating_sub(1)),
            width = label_width
        );

        let bar = row.color.over(BACKGROUND, row.opacity);
        let overlay = self.plan.overlay_color.over(bar, self.plan.overlay_opacity);
        let style_of = |cell: Cell| match cell {
            Cell::Empty => Style::default(),
            Cell::Grid => Style::default().fg(GRID),
            Cell::Bar => Style::default().fg(to_color(bar)),
            Cell::Progress => Style::default().fg(to_color(overlay)).bg(to_color(bar)),
        };

        let mut spans = vec![Span::styled(label, label_style)];
        let cells = row_cells(row, scale, &self.plan.gridlines);
        let mut run_start = 0;
        for i in 1..=cells.len() {
            if i == cells.len() || cells[i] != cells[run_start] {
                let cell = cells[run_start];
                spans.push(Span::styled(cell.glyph().repeat(i - run_start), style_of(cell)));
                run_start = i;
            }
        }
        Line::from(spans)
    }

    fn render_legend(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .plan
            .legend
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled("██ ", Style::default().fg(to_color(entry.color))),
                    Span::raw(truncate(&entry.label, LEGEND_WIDTH as usize - 5)),
                ])
            })
            .collect();
        let legend = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Responsible"));
        f.render_widget(legend, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = match self.plan.rows.get(self.selected) {
            Some(row) => format!(
                "{} | {} | {} to {} | {:.1}% | row {}/{} | ↑↓ move  l legend  q quit",
                row.label.trim_start(),
                row.responsible,
                row.start,
                row.end,
                row.progress,
                self.selected + 1,
                self.row_count()
            ),
            // Plans built by hand rather than by `layout` may have no rows.
            None => "No tasks | q quit".to_string(),
        };
        let selected_color = self
            .plan
            .rows
            .get(self.selected)
            .map(|r| faded(r.color, r.opacity))
            .unwrap_or(ACCENT);
        let status = Paragraph::new(text)
            .style(Style::default().bg(selected_color).fg(Color::Black))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
