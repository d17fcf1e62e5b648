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

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, PendingAction};
use crate::handlers::*;
use crate::ui::TermChart;

/// Main event handler that processes keyboard input.
/// Returns Ok(true) when the app should quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> anyhow::Result<bool> {
    let KeyEvent { code, .. } = key_event;

    // Popups take priority over everything else.
    if let Some(quit) = handle_popup_events(app, code) {
        return Ok(quit);
    }

    handle_global_events(app, code)
}

/// Some(quit) when a popup consumed the key.
fn handle_popup_events(app: &mut App, code: KeyCode) -> Option<bool> {
    if app.show_rename_popup {
        match code {
            KeyCode::Esc => cancel_rename(app),
            KeyCode::Enter => apply_rename(app),
            KeyCode::Backspace => {
                app.rename_input.pop();
            }
            KeyCode::Char(c) => {
                if app.rename_input.len() < 64 {
                    app.rename_input.push(c);
                }
            }
            _ => {}
        }
        return Some(false);
    }

    if app.show_sensor_popup {
        match code {
            KeyCode::Esc => cancel_sensor(app),
            KeyCode::Enter => apply_sensor(app),
            KeyCode::Backspace => {
                app.sensor_input.pop();
            }
            KeyCode::Char(c) => {
                if app.sensor_input.len() < 64 {
                    app.sensor_input.push(c);
                }
            }
            _ => {}
        }
        return Some(false);
    }

    if app.show_discard_popup {
        let quit = match code {
            KeyCode::Esc => {
                cancel_pending(app);
                false
            }
            KeyCode::Char('s') => confirm_save_then_pending(app),
            KeyCode::Char('d') => confirm_discard_pending(app),
            _ => false,
        };
        return Some(quit);
    }

    None
}

fn handle_global_events(app: &mut App, code: KeyCode) -> anyhow::Result<bool> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => {
            return Ok(request(app, PendingAction::Quit));
        }
        KeyCode::Tab => cycle_active_curve(app),
        KeyCode::Up => {
            if app.legend_idx > 0 {
                app.legend_idx -= 1;
            }
        }
        KeyCode::Down => {
            if app.legend_idx + 1 < app.editor.curves().len() {
                app.legend_idx += 1;
            }
        }
        KeyCode::Enter => activate_selected(app),
        KeyCode::Char('v') => toggle_selected_visibility(app),
        KeyCode::Char('a') => append_point_active(app),
        KeyCode::Char('x') => remove_last_point_active(app),
        KeyCode::Char('n') => add_curve(app),
        KeyCode::Char('D') => remove_selected_curve(app),
        KeyCode::Char('r') => open_rename_popup(app, false),
        KeyCode::Char('F') => open_rename_popup(app, true),
        KeyCode::Char('b') => open_sensor_popup(app),
        KeyCode::Char('t') => reset_active_curve(app),
        KeyCode::Char('T') => reset_all_curves(app),
        KeyCode::Char('p') => {
            return Ok(step_profile(app, true));
        }
        KeyCode::Char('P') => {
            return Ok(step_profile(app, false));
        }
        KeyCode::Char('N') => {
            return Ok(request(app, PendingAction::NewProfile));
        }
        KeyCode::Char('X') => delete_current_profile(app),
        KeyCode::Char('R') => {
            return Ok(request(app, PendingAction::ReloadProfiles));
        }
        KeyCode::Char('s') => save_profiles(app),
        _ => {}
    }
    Ok(false)
}

/// Mouse events drive the gesture controller through the chart surface
/// captured at the last draw. Events outside the chart are ignored,
/// except a release, which must always end a drag.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> anyhow::Result<bool> {
    if app.show_rename_popup || app.show_sensor_popup || app.show_discard_popup {
        return Ok(false);
    }
    let Some(area) = app.chart_area else { return Ok(false) };
    let chart = TermChart::new(area);

    if let MouseEventKind::Up(MouseButton::Left) = mouse.kind {
        if let Err(e) = app.controller.button_up(&mut app.editor) {
            app.report(e);
        }
        return Ok(false);
    }

    let inside = mouse.column >= area.x
        && mouse.column < area.x + area.width
        && mouse.row >= area.y
        && mouse.row < area.y + area.height;
    if !inside && !app.controller.is_dragging() {
        return Ok(false);
    }
    let (px, py) = chart.cell_to_px(mouse.column, mouse.row);

    let result = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.controller.button_down(&mut app.editor, &chart, px, py)
        }
        MouseEventKind::Down(MouseButton::Right) => {
            app.controller.secondary_down(&mut app.editor, &chart, px, py)
        }
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            app.controller.pointer_move(&mut app.editor, &chart, px, py)
        }
        _ => return Ok(false),
    };
    if let Err(e) = result {
        app.report(e);
    }
    Ok(false)
}
