/*
 * This file is part of Curvesmith.
 *
 * Copyright (C) 2025 Curvesmith contributors
 *
 * Curvesmith is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Curvesmith is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Curvesmith. If not, see <https://www.gnu.org/licenses/>.
 */

use crate::app::App;
use crate::curve::{MAX_TEMP, MIN_TEMP};
use crate::interact::{ChartSurface, Gesture};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph};

/// Virtual pixels per terminal cell. Hit testing runs in this finer
/// grid so the grab radius is not a whole row of cells.
pub const CELL_W: f64 = 4.0;
pub const CELL_H: f64 = 8.0;

/// Maps the chart plot rectangle to data coordinates and back.
#[derive(Clone, Copy)]
pub struct TermChart {
    area: Rect,
}

impl TermChart {
    pub fn new(area: Rect) -> Self {
        Self { area }
    }

    fn px_width(&self) -> f64 {
        (self.area.width.max(2) as f64) * CELL_W - 1.0
    }

    fn px_height(&self) -> f64 {
        (self.area.height.max(2) as f64) * CELL_H - 1.0
    }

    /// Center of a terminal cell in virtual pixels.
    pub fn cell_to_px(&self, column: u16, row: u16) -> (f64, f64) {
        (
            column as f64 * CELL_W + CELL_W / 2.0,
            row as f64 * CELL_H + CELL_H / 2.0,
        )
    }

    /// Cell within the plot for a data point, None when off the plot.
    pub fn data_to_cell(&self, temp: f64, speed: f64) -> Option<(u16, u16)> {
        let (px, py) = self.data_to_px(temp, speed);
        let (col, row) = ((px / CELL_W) as u16, (py / CELL_H) as u16);
        if col >= self.area.x + self.area.width || row >= self.area.y + self.area.height {
            return None;
        }
        Some((col, row))
    }
}

impl ChartSurface for TermChart {
    fn data_to_px(&self, temp: f64, speed: f64) -> (f64, f64) {
        let fx = (temp - MIN_TEMP) / (MAX_TEMP - MIN_TEMP);
        let fy = 1.0 - speed / 100.0;
        (
            self.area.x as f64 * CELL_W + fx.clamp(0.0, 1.0) * self.px_width(),
            self.area.y as f64 * CELL_H + fy.clamp(0.0, 1.0) * self.px_height(),
        )
    }

    fn px_to_data(&self, px: f64, py: f64) -> (f64, f64) {
        let fx = (px - self.area.x as f64 * CELL_W) / self.px_width();
        let fy = (py - self.area.y as f64 * CELL_H) / self.px_height();
        (
            MIN_TEMP + fx.clamp(0.0, 1.0) * (MAX_TEMP - MIN_TEMP),
            (1.0 - fy.clamp(0.0, 1.0)) * 100.0,
        )
    }
}

const CURVE_PALETTE: [Color; 6] =
    [Color::Cyan, Color::Magenta, Color::Green, Color::Yellow, Color::Blue, Color::Red];

fn curve_color(idx: usize) -> Color {
    CURVE_PALETTE[idx % CURVE_PALETTE.len()]
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(size);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(main_layout[0]);

    render_chart_panel(f, app, layout[0]);
    render_side_panel(f, app, layout[1]);
    render_status_bar(f, app, main_layout[1]);

    if app.show_rename_popup {
        render_input_popup(
            f,
            size,
            if app.rename_profile_mode { " Rename Profile " } else { " Rename Curve " },
            &app.rename_input,
        );
    }
    if app.show_sensor_popup {
        render_input_popup(f, size, " Bind Sensor ", &app.sensor_input);
    }
    if app.show_discard_popup {
        render_discard_popup(f, size);
    }
}

fn render_chart_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let dirty_mark = if app.editor.is_dirty() { " *" } else { "" };
    let title = match app.editor.active_curve() {
        Some(c) => format!(" {} ← {}{} ", c.name, c.sensor, dirty_mark),
        None => " Fan Curves ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 12 || inner.height < 6 {
        app.chart_area = None;
        return;
    }

    // Gutter for speed labels on the left, one row of temp labels below.
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(5), Constraint::Min(6)])
        .split(inner);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(cols[1]);
    let gutter = cols[0];
    let plot = rows[0];
    app.chart_area = Some(plot);
    let chart = TermChart::new(plot);

    let w = plot.width as usize;
    let h = plot.height as usize;
    let mut grid: Vec<Vec<(char, Color)>> = vec![vec![(' ', Color::Reset); w]; h];

    // Light dotted grid at quarter positions.
    for gx in 1..4 {
        let x = gx * (w - 1) / 4;
        for row in grid.iter_mut() {
            row[x] = ('·', Color::DarkGray);
        }
    }

    // Curve lines; the active curve is drawn last so it stays on top.
    let active = app.editor.active_name().to_string();
    let mut order: Vec<usize> = (0..app.editor.curves().len()).collect();
    order.sort_by_key(|&i| app.editor.curves()[i].name == active);
    for idx in order {
        let curve = &app.editor.curves()[idx];
        if !app.editor.is_visible(&curve.name) {
            continue;
        }
        let is_active = curve.name == active;
        let color = if is_active { curve_color(curve.color_slot) } else { Color::DarkGray };
        for x in 0..w {
            let temp = MIN_TEMP + (x as f64 / (w - 1) as f64) * (MAX_TEMP - MIN_TEMP);
            let speed = curve.evaluate(temp);
            let y = ((1.0 - speed / 100.0) * (h - 1) as f64).round() as usize;
            grid[y.min(h - 1)][x] = ('─', color);
        }
        for p in &curve.points {
            if let Some((col, row)) = chart.data_to_cell(p.temp, p.speed) {
                let (cx, cy) =
                    ((col.saturating_sub(plot.x)) as usize, (row.saturating_sub(plot.y)) as usize);
                grid[cy.min(h - 1)][cx.min(w - 1)] = (if is_active { '●' } else { '○' }, color);
            }
        }
    }

    // Highlight the grabbed or hovered point, or the spot on the active
    // curve's line where a click would insert one.
    match app.controller.gesture() {
        Gesture::Hovering { curve, index } | Gesture::Dragging { curve, index } => {
            if let Some(p) = app.editor.curve(curve).and_then(|c| c.points.get(*index)) {
                if let Some((col, row)) = chart.data_to_cell(p.temp, p.speed) {
                    let (cx, cy) = (
                        (col.saturating_sub(plot.x)) as usize,
                        (row.saturating_sub(plot.y)) as usize,
                    );
                    grid[cy.min(h - 1)][cx.min(w - 1)] = ('◉', Color::White);
                }
            }
        }
        Gesture::HoveringLine { temp, speed } => {
            if let Some((col, row)) = chart.data_to_cell(*temp, *speed) {
                let (cx, cy) = (
                    (col.saturating_sub(plot.x)) as usize,
                    (row.saturating_sub(plot.y)) as usize,
                );
                grid[cy.min(h - 1)][cx.min(w - 1)] = ('+', Color::White);
            }
        }
        Gesture::Idle => {}
    }

    // Coalesce cells into styled spans, one line per grid row.
    let mut lines: Vec<Line> = Vec::with_capacity(h);
    for row in &grid {
        let mut spans = Vec::new();
        let mut cur_color = Color::Reset;
        let mut text = String::new();
        for &(ch, color) in row {
            if color != cur_color {
                if !text.is_empty() {
                    spans.push(Span::styled(text.clone(), Style::default().fg(cur_color)));
                    text.clear();
                }
                cur_color = color;
            }
            text.push(ch);
        }
        if !text.is_empty() {
            spans.push(Span::styled(text, Style::default().fg(cur_color)));
        }
        lines.push(Line::from(spans));
    }
    f.render_widget(Paragraph::new(lines), plot);

    // Speed labels down the gutter.
    let mut gutter_lines: Vec<Line> = Vec::with_capacity(h);
    for y in 0..h {
        let pct = 100 - y * 100 / (h - 1).max(1);
        let label = if y % ((h / 5).max(1)) == 0 || y == h - 1 {
            format!("{:3}%│", pct)
        } else {
            "    │".to_string()
        };
        gutter_lines.push(Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))));
    }
    f.render_widget(Paragraph::new(gutter_lines), gutter);

    // Temperature scale along the bottom.
    let mut scale = String::new();
    for x in 0..w {
        let at_quarter = (1..4).any(|q| x == q * (w - 1) / 4);
        if x == 0 {
            scale.push_str(&format!("{:.0}°C", MIN_TEMP));
        } else if x + 4 >= w {
            if scale.chars().count() + 4 <= w {
                scale.push_str(&format!("{:.0}°C", MAX_TEMP));
            }
            break;
        } else if at_quarter && scale.chars().count() + 2 < w {
            let temp = MIN_TEMP + (x as f64 / (w - 1) as f64) * (MAX_TEMP - MIN_TEMP);
            scale.push_str(&format!("{:.0}", temp));
        } else if scale.chars().count() <= x {
            scale.push(' ');
        }
    }
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(scale, Style::default().fg(Color::DarkGray)))),
        rows[1],
    );
}

fn render_side_panel(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(4)])
        .split(area);

    let legend_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" Curves ({}) ", app.editor.curves().len()));
    let legend_inner = legend_block.inner(chunks[0]);
    f.render_widget(legend_block, chunks[0]);

    let items: Vec<ListItem> = app
        .editor
        .curves()
        .iter()
        .enumerate()
        .map(|(idx, curve)| {
            let sel = if idx == app.legend_idx { "> " } else { "  " };
            let active = if curve.name == app.editor.active_name() { "*" } else { " " };
            let vis = if app.editor.is_visible(&curve.name) { "■" } else { "□" };
            let text = format!("{}{}{} {}  [{}]", sel, active, vis, curve.name, curve.sensor);
            let style = if idx == app.legend_idx {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if !app.editor.is_visible(&curve.name) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(curve_color(curve.color_slot))
            };
            ListItem::new(text).style(style)
        })
        .collect();
    f.render_widget(List::new(items), legend_inner);

    let profile_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Profile ");
    let profile_inner = profile_block.inner(chunks[1]);
    f.render_widget(profile_block, chunks[1]);
    let pos = app
        .book
        .profiles
        .get_index_of(&app.book.current)
        .map(|i| i + 1)
        .unwrap_or(0);
    let profile_line = Line::from(vec![
        Span::styled(app.book.current.clone(), Style::default().fg(Color::White)),
        Span::styled(
            format!("  ({}/{})", pos, app.book.profiles.len()),
            Style::default().fg(Color::Gray),
        ),
        if app.editor.is_dirty() {
            Span::styled("  unsaved", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("  saved", Style::default().fg(Color::Green))
        },
    ]);
    f.render_widget(Paragraph::new(vec![profile_line]), profile_inner);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded);
    // A line hover takes over the status line with the insertion preview.
    let text = if let Gesture::HoveringLine { temp, speed } = app.controller.gesture() {
        format!("Click to add point at {:.0}°C / {:.0}%", temp, speed)
    } else {
        app.status.clone()
    };
    let style = if text.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    f.render_widget(Paragraph::new(text).style(style).block(block), area);
}

fn render_input_popup(f: &mut Frame, size: Rect, title: &str, input: &str) {
    let area = centered_rect(50, 20, size);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    let lines = vec![
        Line::from(format!("{}_", input)),
        Line::from(Span::styled(
            "Enter apply  |  Esc cancel",
            Style::default().fg(Color::Gray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_discard_popup(f: &mut Frame, size: Rect) {
    let area = centered_rect(50, 20, size);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Unsaved Changes ")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    let lines = vec![
        Line::from("The current profile has unsaved changes."),
        Line::from(""),
        Line::from(Span::styled(
            "s save & continue  |  d discard  |  Esc cancel",
            Style::default().fg(Color::Gray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}
