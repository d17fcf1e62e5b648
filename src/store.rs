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

use std::collections::HashSet;

use thiserror::Error;

use crate::bridge::HostSink;
use crate::curve::{default_points, validate_points, Curve};

pub const DEFAULT_SENSOR: &str = "CPU";

#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    #[error("no curve named '{0}'")]
    UnknownCurve(String),
    #[error("a curve named '{0}' already exists")]
    DuplicateName(String),
    #[error("curve name cannot be blank")]
    BlankName,
    #[error("cannot remove the last curve")]
    LastCurve,
    #[error("cannot remove the last profile")]
    LastProfile,
    #[error("no profile named '{0}'")]
    UnknownProfile(String),
    #[error("point index {0} out of range")]
    PointIndexOutOfRange(usize),
    #[error("curve needs at least {0} points")]
    MinimumPointsViolation(usize),
    #[error("curve is full ({0} points max)")]
    MaximumPointsReached(usize),
    #[error("too close to an existing point (within {0}°C)")]
    NearDuplicatePoint(f64),
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

/// The whole editable state: an ordered set of named curves, the active
/// curve, per-curve visibility, and whether anything diverged from the
/// last loaded or saved profile. All mutation goes through methods here
/// or in the point-edit impl, so the dirty flag and the host sink stay
/// in sync with the data.
pub struct Editor {
    curves: Vec<Curve>,
    active: String,
    hidden: HashSet<String>,
    dirty: bool,
    ready_sent: bool,
    sink: Option<Box<dyn HostSink>>,
}

impl Editor {
    pub fn new() -> Self {
        let first = Curve::with_defaults("Fan Curve 1", DEFAULT_SENSOR);
        Self {
            active: first.name.clone(),
            curves: vec![first],
            hidden: HashSet::new(),
            dirty: false,
            ready_sent: false,
            sink: None,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn HostSink>) {
        self.sink = Some(sink);
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn curve(&self, name: &str) -> Option<&Curve> {
        self.curves.iter().find(|c| c.name == name)
    }

    pub fn active_curve(&self) -> Option<&Curve> {
        self.curve(&self.active)
    }

    pub(crate) fn curve_mut(&mut self, name: &str) -> Option<&mut Curve> {
        self.curves.iter_mut().find(|c| c.name == name)
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        if self.dirty != dirty {
            self.dirty = dirty;
            if let Some(sink) = &self.sink {
                sink.notify_dirty(dirty);
            }
        }
    }

    pub fn mark_saved(&mut self) {
        self.set_dirty(false);
    }

    /// Lowest unused index for an auto-generated name like "Fan Curve 3".
    fn next_auto_name(&self, prefix: &str) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("{} {}", prefix, n);
            if self.curve(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Lowest palette slot not held by any current curve, so a deleted
    /// curve's color is reused before the palette wraps.
    fn next_color_slot(&self) -> usize {
        let used: HashSet<usize> = self.curves.iter().map(|c| c.color_slot).collect();
        (0..).find(|s| !used.contains(s)).unwrap_or(0)
    }

    /// Add a curve seeded from the default template. The new curve
    /// becomes active. Returns its generated name.
    pub fn add_curve(&mut self, sensor: &str) -> String {
        let name = self.next_auto_name("Fan Curve");
        let mut curve = Curve::with_defaults(&name, sensor);
        curve.color_slot = self.next_color_slot();
        self.curves.push(curve);
        self.active = name.clone();
        self.set_dirty(true);
        name
    }

    pub fn remove_curve(&mut self, name: &str) -> Result<(), EditorError> {
        if self.curves.len() <= 1 {
            return Err(EditorError::LastCurve);
        }
        let idx = self
            .curves
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| EditorError::UnknownCurve(name.to_string()))?;
        self.curves.remove(idx);
        self.hidden.remove(name);
        if self.active == name {
            // Fall back to the first remaining curve, which must be visible.
            self.active = self.curves[0].name.clone();
            self.hidden.remove(&self.active);
        }
        self.set_dirty(true);
        Ok(())
    }

    pub fn rename_curve(&mut self, old: &str, new: &str) -> Result<(), EditorError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(EditorError::BlankName);
        }
        if new == old {
            return Ok(());
        }
        if self.curve(new).is_some() {
            return Err(EditorError::DuplicateName(new.to_string()));
        }
        let curve = self
            .curve_mut(old)
            .ok_or_else(|| EditorError::UnknownCurve(old.to_string()))?;
        curve.name = new.to_string();
        if self.hidden.remove(old) {
            self.hidden.insert(new.to_string());
        }
        if self.active == old {
            self.active = new.to_string();
        }
        self.set_dirty(true);
        Ok(())
    }

    pub fn rebind_sensor(&mut self, name: &str, sensor: &str) -> Result<(), EditorError> {
        let curve = self
            .curve_mut(name)
            .ok_or_else(|| EditorError::UnknownCurve(name.to_string()))?;
        curve.sensor = sensor.to_string();
        self.set_dirty(true);
        Ok(())
    }

    /// Restore a curve to the default template.
    pub fn reset_curve(&mut self, name: &str) -> Result<(), EditorError> {
        let curve = self
            .curve_mut(name)
            .ok_or_else(|| EditorError::UnknownCurve(name.to_string()))?;
        curve.points = default_points();
        self.set_dirty(true);
        Ok(())
    }

    /// Restore every curve to the default template. Names, sensors and
    /// colors are kept.
    pub fn reset_all(&mut self) {
        for curve in &mut self.curves {
            curve.points = default_points();
        }
        self.set_dirty(true);
    }

    /// Switch the active curve. The active curve is always visible, so
    /// activating a hidden curve clears its hidden flag.
    pub fn set_active(&mut self, name: &str) -> Result<(), EditorError> {
        if self.curve(name).is_none() {
            return Err(EditorError::UnknownCurve(name.to_string()));
        }
        self.active = name.to_string();
        self.hidden.remove(name);
        Ok(())
    }

    /// Toggle legend visibility. Hiding the active curve is a no-op.
    pub fn set_visible(&mut self, name: &str, visible: bool) {
        if visible {
            self.hidden.remove(name);
        } else if name != self.active {
            self.hidden.insert(name.to_string());
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        !self.hidden.contains(name)
    }

    /// Replace the whole curve set atomically. Everything is validated
    /// up front; on any error the current state is untouched. A
    /// successful load is the new clean baseline.
    pub fn load_profile(
        &mut self,
        curves: Vec<Curve>,
        active: Option<&str>,
    ) -> Result<(), EditorError> {
        if curves.is_empty() {
            return Err(EditorError::InvalidProfile("no curves".into()));
        }
        let mut seen: HashSet<String> = HashSet::new();
        let mut sorted = curves;
        for c in &mut sorted {
            if c.name.trim().is_empty() {
                return Err(EditorError::InvalidProfile("blank curve name".into()));
            }
            if !seen.insert(c.name.clone()) {
                return Err(EditorError::InvalidProfile(format!(
                    "duplicate curve name '{}'",
                    c.name
                )));
            }
            c.sort_points();
            validate_points(&c.points)
                .map_err(|e| EditorError::InvalidProfile(format!("{}: {}", c.name, e)))?;
        }
        // The wire shape carries no colors; slots follow display order.
        for (i, c) in sorted.iter_mut().enumerate() {
            c.color_slot = i;
        }
        let active_name = match active {
            Some(a) => {
                if !sorted.iter().any(|c| c.name == a) {
                    return Err(EditorError::InvalidProfile(format!(
                        "active curve '{}' not in profile",
                        a
                    )));
                }
                a.to_string()
            }
            None => sorted[0].name.clone(),
        };
        self.curves = sorted;
        self.active = active_name;
        self.hidden.clear();
        self.set_dirty(false);
        // The host is told we are ready once, after the first successful
        // load; later reloads only move the dirty flag.
        if !self.ready_sent {
            self.ready_sent = true;
            if let Some(sink) = &self.sink {
                sink.notify_ready();
            }
        }
        Ok(())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MockHostSink;
    use crate::curve::Point;

    fn create_test_editor() -> Editor {
        let mut ed = Editor::new();
        ed.add_curve("GPU");
        ed.mark_saved();
        ed
    }

    #[test]
    fn test_new_editor_has_one_default_curve() {
        let ed = Editor::new();
        assert_eq!(ed.curves().len(), 1);
        assert_eq!(ed.active_name(), "Fan Curve 1");
        assert!(!ed.is_dirty());
        assert_eq!(ed.active_curve().unwrap().points.len(), 6);
    }

    #[test]
    fn test_add_curve_auto_names_lowest_unused() {
        let mut ed = Editor::new();
        assert_eq!(ed.add_curve("GPU"), "Fan Curve 2");
        assert_eq!(ed.add_curve("NVMe"), "Fan Curve 3");
        ed.remove_curve("Fan Curve 2").unwrap();
        // The freed index is reused.
        assert_eq!(ed.add_curve("GPU"), "Fan Curve 2");
    }

    #[test]
    fn test_add_curve_reuses_freed_color_slot() {
        let mut ed = Editor::new();
        ed.add_curve("GPU");
        ed.add_curve("NVMe");
        assert_eq!(ed.curve("Fan Curve 2").unwrap().color_slot, 1);
        ed.remove_curve("Fan Curve 2").unwrap();
        // The next curve picks up slot 1, the remaining ones keep theirs.
        ed.add_curve("Pump");
        assert_eq!(ed.curve("Fan Curve 2").unwrap().color_slot, 1);
        assert_eq!(ed.curve("Fan Curve 3").unwrap().color_slot, 2);
    }

    #[test]
    fn test_reset_all_touches_every_curve() {
        let mut ed = create_test_editor();
        ed.add_point_at("Fan Curve 1", 35.0, 55.0).unwrap();
        ed.add_point_at("Fan Curve 2", 35.0, 55.0).unwrap();
        ed.reset_all();
        assert_eq!(ed.curve("Fan Curve 1").unwrap().points, default_points());
        assert_eq!(ed.curve("Fan Curve 2").unwrap().points, default_points());
        assert!(ed.is_dirty());
    }

    #[test]
    fn test_add_curve_becomes_active_and_dirty() {
        let mut ed = Editor::new();
        let name = ed.add_curve("GPU");
        assert_eq!(ed.active_name(), name);
        assert!(ed.is_dirty());
    }

    #[test]
    fn test_remove_last_curve_refused() {
        let mut ed = Editor::new();
        assert_eq!(ed.remove_curve("Fan Curve 1"), Err(EditorError::LastCurve));
        assert_eq!(ed.curves().len(), 1);
    }

    #[test]
    fn test_remove_unknown_curve() {
        let mut ed = create_test_editor();
        assert!(matches!(
            ed.remove_curve("nope"),
            Err(EditorError::UnknownCurve(_))
        ));
    }

    #[test]
    fn test_remove_active_curve_activates_first() {
        let mut ed = create_test_editor();
        assert_eq!(ed.active_name(), "Fan Curve 2");
        ed.remove_curve("Fan Curve 2").unwrap();
        assert_eq!(ed.active_name(), "Fan Curve 1");
        assert!(ed.is_dirty());
    }

    #[test]
    fn test_rename_curve() {
        let mut ed = create_test_editor();
        ed.rename_curve("Fan Curve 2", "Exhaust").unwrap();
        assert!(ed.curve("Exhaust").is_some());
        assert_eq!(ed.active_name(), "Exhaust");
    }

    #[test]
    fn test_rename_rejects_blank_and_duplicate() {
        let mut ed = create_test_editor();
        assert_eq!(ed.rename_curve("Fan Curve 2", "  "), Err(EditorError::BlankName));
        assert_eq!(
            ed.rename_curve("Fan Curve 2", "Fan Curve 1"),
            Err(EditorError::DuplicateName("Fan Curve 1".to_string()))
        );
    }

    #[test]
    fn test_rename_to_same_name_is_noop() {
        let mut ed = create_test_editor();
        ed.rename_curve("Fan Curve 2", "Fan Curve 2").unwrap();
        assert!(!ed.is_dirty());
    }

    #[test]
    fn test_rename_keeps_hidden_flag() {
        let mut ed = create_test_editor();
        ed.set_visible("Fan Curve 1", false);
        ed.rename_curve("Fan Curve 1", "Intake").unwrap();
        assert!(!ed.is_visible("Intake"));
    }

    #[test]
    fn test_rebind_sensor() {
        let mut ed = create_test_editor();
        ed.rebind_sensor("Fan Curve 1", "SSD").unwrap();
        assert_eq!(ed.curve("Fan Curve 1").unwrap().sensor, "SSD");
        assert!(ed.is_dirty());
    }

    #[test]
    fn test_reset_curve_restores_template() {
        let mut ed = create_test_editor();
        ed.add_point_at("Fan Curve 2", 35.0, 55.0).unwrap();
        ed.reset_curve("Fan Curve 2").unwrap();
        assert_eq!(ed.curve("Fan Curve 2").unwrap().points, default_points());
    }

    #[test]
    fn test_set_active_unhides() {
        let mut ed = create_test_editor();
        ed.set_visible("Fan Curve 1", false);
        ed.set_active("Fan Curve 1").unwrap();
        assert!(ed.is_visible("Fan Curve 1"));
    }

    #[test]
    fn test_hiding_active_curve_ignored() {
        let mut ed = create_test_editor();
        ed.set_visible("Fan Curve 2", false);
        assert!(ed.is_visible("Fan Curve 2"));
        ed.set_visible("Fan Curve 1", false);
        assert!(!ed.is_visible("Fan Curve 1"));
    }

    #[test]
    fn test_load_profile_replaces_state() {
        let mut ed = create_test_editor();
        let curves = vec![
            Curve::with_defaults("Quiet", "CPU"),
            Curve::with_defaults("Performance", "GPU"),
        ];
        ed.load_profile(curves, Some("Performance")).unwrap();
        assert_eq!(ed.curves().len(), 2);
        assert_eq!(ed.active_name(), "Performance");
        assert!(!ed.is_dirty());
    }

    #[test]
    fn test_load_profile_defaults_active_to_first() {
        let mut ed = create_test_editor();
        ed.load_profile(vec![Curve::with_defaults("Only", "CPU")], None)
            .unwrap();
        assert_eq!(ed.active_name(), "Only");
    }

    #[test]
    fn test_load_profile_atomic_on_failure() {
        let mut ed = create_test_editor();
        let bad = vec![Curve {
            name: "Broken".to_string(),
            sensor: "CPU".to_string(),
            color_slot: 0,
            points: vec![Point::new(30.0, 50.0)],
        }];
        assert!(ed.load_profile(bad, None).is_err());
        // Prior state untouched.
        assert_eq!(ed.curves().len(), 2);
        assert_eq!(ed.active_name(), "Fan Curve 2");
    }

    #[test]
    fn test_load_profile_rejects_duplicates_and_unknown_active() {
        let mut ed = create_test_editor();
        let dup = vec![
            Curve::with_defaults("Same", "CPU"),
            Curve::with_defaults("Same", "GPU"),
        ];
        assert!(matches!(
            ed.load_profile(dup, None),
            Err(EditorError::InvalidProfile(_))
        ));
        let ok = vec![Curve::with_defaults("A", "CPU")];
        assert!(matches!(
            ed.load_profile(ok, Some("B")),
            Err(EditorError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_load_profile_sorts_points() {
        let mut ed = create_test_editor();
        let curves = vec![Curve {
            name: "Unsorted".to_string(),
            sensor: "CPU".to_string(),
            color_slot: 0,
            points: vec![Point::new(70.0, 90.0), Point::new(30.0, 40.0)],
        }];
        ed.load_profile(curves, None).unwrap();
        let pts = &ed.curve("Unsorted").unwrap().points;
        assert_eq!(pts[0].temp, 30.0);
        assert_eq!(pts[1].temp, 70.0);
    }

    #[test]
    fn test_sink_notified_on_dirty_transitions() {
        let mut sink = MockHostSink::new();
        sink.expect_notify_dirty().with(mockall::predicate::eq(true)).times(1).return_const(());
        sink.expect_notify_dirty().with(mockall::predicate::eq(false)).times(1).return_const(());
        let mut ed = Editor::new();
        ed.set_sink(Box::new(sink));
        ed.add_curve("GPU");
        ed.add_curve("NVMe"); // already dirty, no second notification
        ed.mark_saved();
    }

    #[test]
    fn test_sink_notified_ready_on_load() {
        let mut sink = MockHostSink::new();
        sink.expect_notify_dirty().return_const(());
        sink.expect_notify_ready().times(1).return_const(());
        let mut ed = Editor::new();
        ed.set_sink(Box::new(sink));
        ed.load_profile(vec![Curve::with_defaults("A", "CPU")], None).unwrap();
    }

    #[test]
    fn test_sink_ready_fires_only_on_first_load() {
        let mut sink = MockHostSink::new();
        sink.expect_notify_dirty().return_const(());
        sink.expect_notify_ready().times(1).return_const(());
        let mut ed = Editor::new();
        ed.set_sink(Box::new(sink));
        ed.load_profile(vec![Curve::with_defaults("A", "CPU")], None).unwrap();
        ed.load_profile(vec![Curve::with_defaults("B", "GPU")], None).unwrap();
    }
}
