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

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::bridge::Profile;
use crate::curve::{validate_points, Point};
use crate::profiles::ProfileBook;

fn default_version() -> u8 { 1 }

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedState {
    #[serde(default = "default_version")]
    pub version: u8,
    pub profiles: IndexMap<String, Profile>,
    pub current_profile: String,
    /// Curve the editor had selected when the state was saved.
    #[serde(default)]
    pub active_curve: Option<String>,
}

impl SavedState {
    pub fn from_book(book: &ProfileBook, active_curve: Option<&str>) -> Self {
        Self {
            version: default_version(),
            profiles: book.profiles.clone(),
            current_profile: book.current.clone(),
            active_curve: active_curve.map(|s| s.to_string()),
        }
    }

    pub fn into_book(self) -> ProfileBook {
        ProfileBook { profiles: self.profiles, current: self.current_profile }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("curvesmith").join("profiles.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("curvesmith")
            .join("profiles.json");
    }
    PathBuf::from("/etc/curvesmith/profiles.json")
}

pub fn load_saved_state() -> Option<SavedState> {
    load_state_from(&config_path()).ok()
}

pub fn load_state_from(path: &Path) -> Result<SavedState, String> {
    let data = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let state: SavedState =
        serde_json::from_str(&data).map_err(|e| format!("parse error: {}", e))?;
    validate_saved_state(&state)?;
    Ok(state)
}

pub fn save_state(state: &SavedState) -> io::Result<()> {
    save_state_to(&config_path(), state)
}

/// Serialize to disk, keeping the previous file as a `.bak` sibling.
pub fn save_state_to(path: &Path, state: &SavedState) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if path.exists() {
        let _ = fs::copy(path, path.with_extension("json.bak"));
    }
    let json = serde_json::to_string_pretty(state).unwrap_or_else(|_| "{}".to_string());
    fs::write(path, json)
}

fn is_reasonable_name(s: &str) -> bool {
    !s.trim().is_empty() && s.len() <= 64
}

pub fn validate_saved_state(state: &SavedState) -> Result<(), String> {
    if state.version == 0 {
        return Err("version must be >= 1".into());
    }
    if state.profiles.is_empty() {
        return Err("at least one profile required".into());
    }
    if state.profiles.len() > 64 {
        return Err("too many profiles (max 64)".into());
    }
    for (pname, profile) in &state.profiles {
        if !is_reasonable_name(pname) {
            return Err("invalid profile name".into());
        }
        if profile.is_empty() {
            return Err(format!("profile '{}' has no curves", pname));
        }
        if profile.len() > 32 {
            return Err(format!("profile '{}' has too many curves (max 32)", pname));
        }
        for (cname, wc) in profile {
            if !is_reasonable_name(cname) {
                return Err(format!("invalid curve name in profile '{}'", pname));
            }
            let points: Vec<Point> =
                wc.data.iter().map(|p| Point::new(p.x, p.y)).collect();
            validate_points(&points).map_err(|e| format!("{}/{}: {}", pname, cname, e))?;
        }
    }
    if !state.profiles.contains_key(&state.current_profile) {
        return Err(format!("unknown current profile '{}'", state.current_profile));
    }
    if let Some(active) = &state.active_curve {
        if !state.profiles[&state.current_profile].contains_key(active) {
            return Err(format!("active curve '{}' not in current profile", active));
        }
    }
    Ok(())
}
