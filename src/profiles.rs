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

//! Named collection of saved profiles. The editor works on one profile
//! at a time; this is the shelf the others sit on.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::bridge::{Profile, WireCurve, WirePoint};
use crate::curve::{default_points, interp_speed_percent, Point};
use crate::store::{EditorError, DEFAULT_SENSOR};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileBook {
    pub profiles: IndexMap<String, Profile>,
    pub current: String,
}

fn default_profile() -> Profile {
    let mut p = Profile::new();
    p.insert(
        "Fan Curve 1".to_string(),
        WireCurve {
            sensor: DEFAULT_SENSOR.to_string(),
            data: default_points().iter().map(|p| WirePoint { x: p.temp, y: p.speed }).collect(),
        },
    );
    p
}

impl ProfileBook {
    pub fn new() -> Self {
        let mut profiles = IndexMap::new();
        profiles.insert("Fan Profile 1".to_string(), default_profile());
        Self { profiles, current: "Fan Profile 1".to_string() }
    }

    pub fn current_profile(&self) -> Option<&Profile> {
        self.profiles.get(&self.current)
    }

    fn next_auto_name(&self) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("Fan Profile {}", n);
            if !self.profiles.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Add an empty-handed profile (one default curve) and switch to it.
    pub fn add_profile(&mut self) -> String {
        let name = self.next_auto_name();
        self.profiles.insert(name.clone(), default_profile());
        self.current = name.clone();
        name
    }

    pub fn remove_profile(&mut self, name: &str) -> Result<(), EditorError> {
        if self.profiles.len() <= 1 {
            return Err(EditorError::LastProfile);
        }
        if self.profiles.shift_remove(name).is_none() {
            return Err(EditorError::UnknownProfile(name.to_string()));
        }
        if self.current == name {
            if let Some(first) = self.profiles.keys().next() {
                self.current = first.clone();
            }
        }
        Ok(())
    }

    pub fn rename_profile(&mut self, old: &str, new: &str) -> Result<(), EditorError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(EditorError::BlankName);
        }
        if new == old {
            return Ok(());
        }
        if self.profiles.contains_key(new) {
            return Err(EditorError::DuplicateName(new.to_string()));
        }
        let idx = self
            .profiles
            .get_index_of(old)
            .ok_or_else(|| EditorError::UnknownProfile(old.to_string()))?;
        let (_, profile) = self.profiles.shift_remove_index(idx).ok_or_else(|| {
            EditorError::UnknownProfile(old.to_string())
        })?;
        self.profiles.shift_insert(idx, new.to_string(), profile);
        if self.current == old {
            self.current = new.to_string();
        }
        Ok(())
    }

    pub fn select(&mut self, name: &str) -> Result<&Profile, EditorError> {
        if !self.profiles.contains_key(name) {
            return Err(EditorError::UnknownProfile(name.to_string()));
        }
        self.current = name.to_string();
        Ok(&self.profiles[name])
    }

    /// Write the editor's exported state back over the current profile.
    pub fn store_current(&mut self, profile: Profile) {
        self.profiles.insert(self.current.clone(), profile);
    }

    /// The speed a controller would actually drive at `temp`: the
    /// maximum across every curve of the current profile.
    pub fn max_speed_for(&self, temp: f64) -> f64 {
        let Some(profile) = self.current_profile() else { return 0.0 };
        profile
            .values()
            .map(|wc| {
                let pts: Vec<Point> =
                    wc.data.iter().map(|p| Point::new(p.x, p.y)).collect();
                interp_speed_percent(&pts, temp)
            })
            .fold(0.0, f64::max)
    }
}

impl Default for ProfileBook {
    fn default() -> Self {
        Self::new()
    }
}
