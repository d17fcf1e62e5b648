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

//! Action handlers invoked from the event layer. Everything here
//! operates on the App and reports outcomes on the status line.

use serde_json::json;

use crate::app::{App, PendingAction, HELP_LINE};
use crate::bridge::{export_state, import_profile};
use crate::config::{load_saved_state, save_state, SavedState};
use crate::logger;
use crate::store::DEFAULT_SENSOR;

/// Persist the whole profile book, current editor state included.
pub fn save_profiles(app: &mut App) {
    app.book.store_current(export_state(&app.editor));
    let state = SavedState::from_book(&app.book, Some(app.editor.active_name()));
    match save_state(&state) {
        Ok(()) => {
            app.editor.mark_saved();
            app.status = format!("Saved profile '{}'", app.book.current);
            logger::log_event("save", json!({ "profile": app.book.current }));
        }
        Err(e) => {
            app.status = format!("Save failed: {}", e);
        }
    }
}

/// Gate an action behind the unsaved-changes popup when needed.
/// Returns true when the app should quit.
pub fn request(app: &mut App, action: PendingAction) -> bool {
    if app.editor.is_dirty() {
        app.pending = Some(action);
        app.show_discard_popup = true;
        return false;
    }
    perform(app, action)
}

pub fn confirm_save_then_pending(app: &mut App) -> bool {
    app.show_discard_popup = false;
    save_profiles(app);
    if app.editor.is_dirty() {
        // Save failed; do not lose the edits.
        app.pending = None;
        return false;
    }
    match app.pending.take() {
        Some(action) => perform(app, action),
        None => false,
    }
}

pub fn confirm_discard_pending(app: &mut App) -> bool {
    app.show_discard_popup = false;
    match app.pending.take() {
        Some(action) => perform(app, action),
        None => false,
    }
}

pub fn cancel_pending(app: &mut App) {
    app.show_discard_popup = false;
    app.pending = None;
    app.status = HELP_LINE.to_string();
}

fn perform(app: &mut App, action: PendingAction) -> bool {
    match action {
        PendingAction::Quit => return true,
        PendingAction::ReloadProfiles => reload_profiles(app),
        PendingAction::SwitchProfile(name) => switch_profile(app, &name),
        PendingAction::NewProfile => new_profile(app),
    }
    false
}

/// Discard in-memory state and reread the config file.
fn reload_profiles(app: &mut App) {
    match load_saved_state() {
        Some(saved) => {
            let active = saved.active_curve.clone();
            app.book = saved.into_book();
            if let Some(profile) = app.book.current_profile() {
                let profile = profile.clone();
                if let Err(e) = import_profile(&mut app.editor, profile, active.as_deref()) {
                    app.report(e);
                    return;
                }
            }
            app.clamp_legend_idx();
            app.status = format!("Reloaded profile '{}'", app.book.current);
            logger::log_event("reload", json!({ "profile": app.book.current }));
        }
        None => {
            app.status = "No saved profiles to reload".to_string();
        }
    }
}

fn switch_profile(app: &mut App, name: &str) {
    let profile = match app.book.select(name) {
        Ok(p) => p.clone(),
        Err(e) => {
            app.report(e);
            return;
        }
    };
    if let Err(e) = import_profile(&mut app.editor, profile, None) {
        app.report(e);
        return;
    }
    app.legend_idx = 0;
    app.status = format!("Profile '{}'", name);
    logger::log_event("profile_switch", json!({ "profile": name }));
}

fn new_profile(app: &mut App) {
    let name = app.book.add_profile();
    if let Some(profile) = app.book.current_profile() {
        let profile = profile.clone();
        if let Err(e) = import_profile(&mut app.editor, profile, None) {
            app.report(e);
            return;
        }
    }
    // The new profile exists only in memory until saved.
    app.editor.set_dirty(true);
    app.legend_idx = 0;
    app.status = format!("Created '{}'", name);
}

/// Switch to the neighboring profile in book order.
pub fn step_profile(app: &mut App, forward: bool) -> bool {
    let names: Vec<String> = app.book.profiles.keys().cloned().collect();
    if names.len() < 2 {
        app.status = "Only one profile".to_string();
        return false;
    }
    let cur = names.iter().position(|n| *n == app.book.current).unwrap_or(0);
    let next = if forward {
        (cur + 1) % names.len()
    } else {
        (cur + names.len() - 1) % names.len()
    };
    request(app, PendingAction::SwitchProfile(names[next].clone()))
}

pub fn delete_current_profile(app: &mut App) {
    let doomed = app.book.current.clone();
    if let Err(e) = app.book.remove_profile(&doomed) {
        app.report(e);
        return;
    }
    let profile = match app.book.current_profile() {
        Some(p) => p.clone(),
        None => return,
    };
    if let Err(e) = import_profile(&mut app.editor, profile, None) {
        app.report(e);
        return;
    }
    app.editor.set_dirty(true);
    app.legend_idx = 0;
    app.status = format!("Deleted '{}', now on '{}'", doomed, app.book.current);
}

/// Tab: activate the next curve in display order.
pub fn cycle_active_curve(app: &mut App) {
    let names: Vec<String> = app.editor.curves().iter().map(|c| c.name.clone()).collect();
    if names.len() < 2 {
        return;
    }
    let cur = names.iter().position(|n| n == app.editor.active_name()).unwrap_or(0);
    let next = names[(cur + 1) % names.len()].clone();
    if let Err(e) = app.editor.set_active(&next) {
        app.report(e);
        return;
    }
    app.status = format!("Editing '{}'", next);
}

pub fn activate_selected(app: &mut App) {
    let Some(name) = app.selected_curve_name() else { return };
    match app.editor.set_active(&name) {
        Ok(()) => app.status = format!("Editing '{}'", name),
        Err(e) => app.report(e),
    }
}

pub fn toggle_selected_visibility(app: &mut App) {
    let Some(name) = app.selected_curve_name() else { return };
    if name == app.editor.active_name() && app.editor.is_visible(&name) {
        app.status = "The active curve stays visible".to_string();
        return;
    }
    let visible = app.editor.is_visible(&name);
    app.editor.set_visible(&name, !visible);
}

pub fn add_curve(app: &mut App) {
    let name = app.editor.add_curve(DEFAULT_SENSOR);
    app.legend_idx = app.editor.curves().len() - 1;
    app.status = format!("Added '{}'", name);
}

pub fn remove_selected_curve(app: &mut App) {
    let Some(name) = app.selected_curve_name() else { return };
    match app.editor.remove_curve(&name) {
        Ok(()) => {
            app.clamp_legend_idx();
            app.status = format!("Removed '{}'", name);
        }
        Err(e) => app.report(e),
    }
}

pub fn reset_active_curve(app: &mut App) {
    let name = app.editor.active_name().to_string();
    match app.editor.reset_curve(&name) {
        Ok(()) => app.status = format!("Reset '{}' to defaults", name),
        Err(e) => app.report(e),
    }
}

pub fn reset_all_curves(app: &mut App) {
    app.editor.reset_all();
    app.status = "Reset every curve to defaults".to_string();
}

pub fn remove_last_point_active(app: &mut App) {
    let name = app.editor.active_name().to_string();
    match app.editor.remove_last_point(&name) {
        Ok(()) => app.status = "Removed last point".to_string(),
        Err(e) => app.report(e),
    }
}

pub fn append_point_active(app: &mut App) {
    let name = app.editor.active_name().to_string();
    match app.editor.append_point(&name) {
        Ok(idx) => {
            let p = app.editor.curve(&name).map(|c| c.points[idx]);
            if let Some(p) = p {
                app.status = format!("Added point at {:.0}°C / {:.0}%", p.temp, p.speed);
            }
        }
        Err(e) => app.report(e),
    }
}

// Rename popup, used for both the active curve and the current profile.

pub fn open_rename_popup(app: &mut App, profile_mode: bool) {
    app.show_rename_popup = true;
    app.rename_profile_mode = profile_mode;
    app.rename_input = if profile_mode {
        app.book.current.clone()
    } else {
        app.editor.active_name().to_string()
    };
}

pub fn apply_rename(app: &mut App) {
    let input = app.rename_input.trim().to_string();
    app.show_rename_popup = false;
    let result = if app.rename_profile_mode {
        let old = app.book.current.clone();
        app.book.rename_profile(&old, &input)
    } else {
        let old = app.editor.active_name().to_string();
        app.editor.rename_curve(&old, &input)
    };
    match result {
        Ok(()) => {
            if app.rename_profile_mode {
                app.editor.set_dirty(true);
            }
            app.status = format!("Renamed to '{}'", input);
        }
        Err(e) => app.report(e),
    }
    app.rename_input.clear();
}

pub fn cancel_rename(app: &mut App) {
    app.show_rename_popup = false;
    app.rename_input.clear();
}

// Sensor rebind popup.

pub fn open_sensor_popup(app: &mut App) {
    app.show_sensor_popup = true;
    app.sensor_input = app
        .editor
        .active_curve()
        .map(|c| c.sensor.clone())
        .unwrap_or_default();
}

pub fn apply_sensor(app: &mut App) {
    let input = app.sensor_input.trim().to_string();
    app.show_sensor_popup = false;
    app.sensor_input.clear();
    if input.is_empty() {
        app.status = "Sensor name cannot be blank".to_string();
        return;
    }
    let name = app.editor.active_name().to_string();
    match app.editor.rebind_sensor(&name, &input) {
        Ok(()) => app.status = format!("'{}' now follows {}", name, input),
        Err(e) => app.report(e),
    }
}

pub fn cancel_sensor(app: &mut App) {
    app.show_sensor_popup = false;
    app.sensor_input.clear();
}
