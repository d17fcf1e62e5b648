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

use ratatui::layout::Rect;

use crate::bridge::import_profile;
use crate::config::load_saved_state;
use crate::interact::Controller;
use crate::profiles::ProfileBook;
use crate::store::{Editor, EditorError};

pub const HELP_LINE: &str =
    "Tab: next curve | ↑/↓+Enter: legend | v: show/hide | a/x: add/del pt | n/D: new/del curve | r: rename | b: sensor | t/T: reset | p/P: profile | N/X: new/del profile | F: rename profile | s: save | R: reload | q: quit";

/// What a confirmation popup is standing in front of.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingAction {
    ReloadProfiles,
    SwitchProfile(String),
    NewProfile,
    Quit,
}

pub struct App {
    pub editor: Editor,
    pub book: ProfileBook,
    pub controller: Controller,
    pub status: String,
    // legend selection (index into editor.curves())
    pub legend_idx: usize,
    // chart plot area from the last draw, for mouse hit testing
    pub chart_area: Option<Rect>,
    // rename popup, shared between curves and profiles
    pub show_rename_popup: bool,
    pub rename_input: String,
    pub rename_profile_mode: bool,
    // sensor rebind popup
    pub show_sensor_popup: bool,
    pub sensor_input: String,
    // unsaved-changes confirmation popup
    pub show_discard_popup: bool,
    pub pending: Option<PendingAction>,
}

impl App {
    pub fn new() -> Self {
        let mut app = Self {
            editor: Editor::new(),
            book: ProfileBook::new(),
            controller: Controller::new(),
            status: HELP_LINE.to_string(),
            legend_idx: 0,
            chart_area: None,
            show_rename_popup: false,
            rename_input: String::new(),
            rename_profile_mode: false,
            show_sensor_popup: false,
            sensor_input: String::new(),
            show_discard_popup: false,
            pending: None,
        };
        if let Some(saved) = load_saved_state() {
            let active = saved.active_curve.clone();
            app.book = saved.into_book();
            if let Some(profile) = app.book.current_profile() {
                let _ = import_profile(&mut app.editor, profile.clone(), active.as_deref());
            }
        }
        app
    }

    /// Keep the legend selection inside the curve list.
    pub fn clamp_legend_idx(&mut self) {
        let len = self.editor.curves().len();
        if self.legend_idx >= len {
            self.legend_idx = len.saturating_sub(1);
        }
    }

    pub fn selected_curve_name(&self) -> Option<String> {
        self.editor.curves().get(self.legend_idx).map(|c| c.name.clone())
    }

    /// Route a recoverable editor error to the status line.
    pub fn report(&mut self, err: EditorError) {
        self.status = format!("Error: {}", err);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
