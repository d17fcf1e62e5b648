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

//! Host-facing wire format and notification hooks.
//!
//! A profile travels as an ordered JSON object of curve name to
//! `{ sensor, data: [{x, y}] }`, where x is temperature in Celsius and
//! y is fan speed in percent. Object order is display order, so the map
//! type must preserve insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::curve::{Curve, Point};
use crate::store::{Editor, EditorError};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireCurve {
    pub sensor: String,
    pub data: Vec<WirePoint>,
}

pub type Profile = IndexMap<String, WireCurve>;

/// Callbacks into whatever hosts the editor.
#[cfg_attr(test, mockall::automock)]
pub trait HostSink {
    /// Fired on every transition of the unsaved-changes flag.
    fn notify_dirty(&self, dirty: bool);
    /// Fired once a full profile has been loaded and the editor is usable.
    fn notify_ready(&self);
}

/// Snapshot the editor as a wire profile. Points are re-sorted on the
/// way out so a mid-gesture state can never export out of order.
pub fn export_state(editor: &Editor) -> Profile {
    let mut profile = Profile::new();
    for curve in editor.curves() {
        let mut points = curve.points.clone();
        points.sort_by(|a, b| a.temp.partial_cmp(&b.temp).unwrap_or(std::cmp::Ordering::Equal));
        profile.insert(
            curve.name.clone(),
            WireCurve {
                sensor: curve.sensor.clone(),
                data: points.iter().map(|p| WirePoint { x: p.temp, y: p.speed }).collect(),
            },
        );
    }
    profile
}

/// Replace the editor state from a wire profile. Delegates to the
/// store's atomic load, so a rejected profile leaves the editor as it was.
pub fn import_profile(
    editor: &mut Editor,
    profile: Profile,
    active: Option<&str>,
) -> Result<(), EditorError> {
    let curves: Vec<Curve> = profile
        .into_iter()
        .map(|(name, wc)| Curve {
            name,
            sensor: wc.sensor,
            color_slot: 0,
            points: wc.data.iter().map(|p| Point::new(p.x, p.y)).collect(),
        })
        .collect();
    editor.load_profile(curves, active)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_profile() -> Profile {
        let mut profile = Profile::new();
        profile.insert(
            "Zeta".to_string(),
            WireCurve {
                sensor: "GPU".to_string(),
                data: vec![WirePoint { x: 30.0, y: 40.0 }, WirePoint { x: 60.0, y: 80.0 }],
            },
        );
        profile.insert(
            "Alpha".to_string(),
            WireCurve {
                sensor: "CPU".to_string(),
                data: vec![WirePoint { x: 35.0, y: 45.0 }, WirePoint { x: 70.0, y: 95.0 }],
            },
        );
        profile
    }

    #[test]
    fn test_import_then_export_keeps_insertion_order() {
        let mut ed = Editor::new();
        import_profile(&mut ed, create_test_profile(), None).unwrap();
        let out = export_state(&ed);
        let names: Vec<&str> = out.keys().map(|s| s.as_str()).collect();
        // Not alphabetical: the object order is the display order.
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_import_sets_active_and_clean() {
        let mut ed = Editor::new();
        import_profile(&mut ed, create_test_profile(), Some("Alpha")).unwrap();
        assert_eq!(ed.active_name(), "Alpha");
        assert!(!ed.is_dirty());
    }

    #[test]
    fn test_import_bad_profile_is_rejected_atomically() {
        let mut ed = Editor::new();
        let mut bad = Profile::new();
        bad.insert(
            "Broken".to_string(),
            WireCurve {
                sensor: "CPU".to_string(),
                data: vec![WirePoint { x: 50.0, y: 50.0 }],
            },
        );
        assert!(matches!(
            import_profile(&mut ed, bad, None),
            Err(EditorError::InvalidProfile(_))
        ));
        assert_eq!(ed.active_name(), "Fan Curve 1");
        assert_eq!(ed.curves().len(), 1);
    }

    #[test]
    fn test_import_duplicate_temperature_rejected() {
        let mut ed = Editor::new();
        let mut bad = Profile::new();
        bad.insert(
            "Dup".to_string(),
            WireCurve {
                sensor: "CPU".to_string(),
                data: vec![
                    WirePoint { x: 30.0, y: 20.0 },
                    WirePoint { x: 50.0, y: 40.0 },
                    WirePoint { x: 50.0, y: 60.0 },
                ],
            },
        );
        assert!(matches!(
            import_profile(&mut ed, bad, None),
            Err(EditorError::InvalidProfile(_))
        ));
        assert_eq!(ed.curves().len(), 1);
        assert_eq!(ed.active_name(), "Fan Curve 1");
    }

    #[test]
    fn test_export_resorts_points() {
        let mut ed = Editor::new();
        import_profile(&mut ed, create_test_profile(), None).unwrap();
        let out = export_state(&ed);
        let data = &out["Zeta"].data;
        assert!(data.windows(2).all(|w| w[0].x <= w[1].x));
    }

    #[test]
    fn test_profile_json_shape() {
        let mut ed = Editor::new();
        import_profile(&mut ed, create_test_profile(), None).unwrap();
        let json = serde_json::to_string(&export_state(&ed)).unwrap();
        // Ordered object of name -> { sensor, data: [{x, y}] }.
        assert!(json.starts_with("{\"Zeta\":{\"sensor\":\"GPU\",\"data\":[{\"x\":30.0,\"y\":40.0}"));
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().next().map(|s| s.as_str()), Some("Zeta"));
    }
}
