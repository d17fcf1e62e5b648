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

//! Point-level edit operations on a single curve.

use crate::bounds::clamp_point;
use crate::curve::{
    Point, DUP_TEMP_TOLERANCE, MAX_POINTS, MAX_SPEED, MAX_TEMP, MIN_POINTS, MIN_SPEED, MIN_TEMP,
};
use crate::store::{Editor, EditorError};

/// Temperature step used by the append-point button.
const APPEND_TEMP_STEP: f64 = 10.0;

impl Editor {
    /// Move one point to a requested position. The position is clamped
    /// against the neighbors before committing, so the returned point is
    /// what actually landed in the curve.
    pub fn move_point(
        &mut self,
        curve: &str,
        index: usize,
        temp: f64,
        speed: f64,
    ) -> Result<Point, EditorError> {
        let c = self
            .curve_mut(curve)
            .ok_or_else(|| EditorError::UnknownCurve(curve.to_string()))?;
        if index >= c.points.len() {
            return Err(EditorError::PointIndexOutOfRange(index));
        }
        let committed = clamp_point(&c.points, index, temp, speed);
        c.points[index] = committed;
        self.set_dirty(true);
        Ok(committed)
    }

    /// Insert a point at the given coordinates, keeping the list sorted.
    /// Rejected when the curve is full or the temperature lands within
    /// the duplicate tolerance of an existing point.
    pub fn add_point_at(
        &mut self,
        curve: &str,
        temp: f64,
        speed: f64,
    ) -> Result<usize, EditorError> {
        let c = self
            .curve_mut(curve)
            .ok_or_else(|| EditorError::UnknownCurve(curve.to_string()))?;
        if c.points.len() >= MAX_POINTS {
            return Err(EditorError::MaximumPointsReached(MAX_POINTS));
        }
        let temp = temp.clamp(MIN_TEMP, MAX_TEMP);
        let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        if c.points.iter().any(|p| (p.temp - temp).abs() < DUP_TEMP_TOLERANCE) {
            return Err(EditorError::NearDuplicatePoint(DUP_TEMP_TOLERANCE));
        }
        let idx = c.points.iter().take_while(|p| p.temp < temp).count();
        c.points.insert(idx, Point::new(temp, speed));
        self.set_dirty(true);
        Ok(idx)
    }

    /// Button path: append a point ten degrees past the current maximum,
    /// capped at the temperature ceiling. The speed continues the slope
    /// of the last segment, clamped into range.
    pub fn append_point(&mut self, curve: &str) -> Result<usize, EditorError> {
        let c = self
            .curve(curve)
            .ok_or_else(|| EditorError::UnknownCurve(curve.to_string()))?;
        let pts = &c.points;
        let last_temp = pts.last().map(|p| p.temp).unwrap_or(MIN_TEMP);
        let temp = (last_temp + APPEND_TEMP_STEP).min(MAX_TEMP);
        let speed = match pts.len() {
            0 => MIN_SPEED,
            1 => pts[0].speed,
            n => {
                let a = pts[n - 2];
                let b = pts[n - 1];
                if (b.temp - a.temp).abs() < f64::EPSILON {
                    b.speed
                } else {
                    let slope = (b.speed - a.speed) / (b.temp - a.temp);
                    (b.speed + slope * (temp - b.temp)).clamp(MIN_SPEED, MAX_SPEED)
                }
            }
        };
        self.add_point_at(curve, temp, speed)
    }

    /// Remove the highest-temperature point.
    pub fn remove_last_point(&mut self, curve: &str) -> Result<(), EditorError> {
        let c = self
            .curve(curve)
            .ok_or_else(|| EditorError::UnknownCurve(curve.to_string()))?;
        let last = c.points.len().saturating_sub(1);
        self.remove_point(curve, last)
    }

    pub fn remove_point(&mut self, curve: &str, index: usize) -> Result<(), EditorError> {
        let c = self
            .curve_mut(curve)
            .ok_or_else(|| EditorError::UnknownCurve(curve.to_string()))?;
        if index >= c.points.len() {
            return Err(EditorError::PointIndexOutOfRange(index));
        }
        if c.points.len() <= MIN_POINTS {
            return Err(EditorError::MinimumPointsViolation(MIN_POINTS));
        }
        c.points.remove(index);
        self.set_dirty(true);
        Ok(())
    }

    /// Drag-end commit: snap both coordinates to whole numbers, then
    /// re-clamp so the rounding cannot break the neighbor constraints.
    pub fn round_point(&mut self, curve: &str, index: usize) -> Result<Point, EditorError> {
        let c = self
            .curve(curve)
            .ok_or_else(|| EditorError::UnknownCurve(curve.to_string()))?;
        let p = *c
            .points
            .get(index)
            .ok_or(EditorError::PointIndexOutOfRange(index))?;
        self.move_point(curve, index, p.temp.round(), p.speed.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_editor() -> Editor {
        // Single curve named "Fan Curve 1" with the six default points.
        Editor::new()
    }

    #[test]
    fn test_move_point_in_bounds() {
        let mut ed = create_test_editor();
        let p = ed.move_point("Fan Curve 1", 1, 42.5, 63.0).unwrap();
        assert_eq!(p, Point::new(42.5, 63.0));
        assert_eq!(ed.curve("Fan Curve 1").unwrap().points[1], p);
        assert!(ed.is_dirty());
    }

    #[test]
    fn test_move_point_clamped_to_neighbors() {
        let mut ed = create_test_editor();
        // Default neighbors of index 1 sit at 30 and 50 degrees.
        let p = ed.move_point("Fan Curve 1", 1, 55.0, 60.0).unwrap();
        assert_eq!(p.temp, 49.0);
        let p = ed.move_point("Fan Curve 1", 1, 20.0, 60.0).unwrap();
        assert_eq!(p.temp, 31.0);
    }

    #[test]
    fn test_move_point_speed_clamped() {
        let mut ed = create_test_editor();
        // Neighbor speeds of index 2 are 60 and 80.
        let p = ed.move_point("Fan Curve 1", 2, 50.0, 95.0).unwrap();
        assert_eq!(p.speed, 80.0);
        let p = ed.move_point("Fan Curve 1", 2, 50.0, 10.0).unwrap();
        assert_eq!(p.speed, 60.0);
    }

    #[test]
    fn test_move_point_bad_targets() {
        let mut ed = create_test_editor();
        assert!(matches!(
            ed.move_point("nope", 0, 30.0, 50.0),
            Err(EditorError::UnknownCurve(_))
        ));
        assert_eq!(
            ed.move_point("Fan Curve 1", 99, 30.0, 50.0),
            Err(EditorError::PointIndexOutOfRange(99))
        );
    }

    #[test]
    fn test_add_point_at_inserts_sorted() {
        let mut ed = create_test_editor();
        let idx = ed.add_point_at("Fan Curve 1", 45.0, 65.0).unwrap();
        assert_eq!(idx, 2);
        let pts = &ed.curve("Fan Curve 1").unwrap().points;
        assert_eq!(pts.len(), 7);
        assert_eq!(pts[2], Point::new(45.0, 65.0));
    }

    #[test]
    fn test_add_point_near_duplicate_rejected() {
        let mut ed = create_test_editor();
        // 42 is within 3 degrees of the knot at 40.
        assert_eq!(
            ed.add_point_at("Fan Curve 1", 42.0, 60.0),
            Err(EditorError::NearDuplicatePoint(DUP_TEMP_TOLERANCE))
        );
        assert!(!ed.is_dirty());
        // 45 clears both neighbors.
        assert!(ed.add_point_at("Fan Curve 1", 45.0, 65.0).is_ok());
    }

    #[test]
    fn test_add_point_cap() {
        let mut ed = create_test_editor();
        let curves = vec![crate::curve::Curve {
            name: "Full".to_string(),
            sensor: "CPU".to_string(),
            color_slot: 0,
            points: (0..MAX_POINTS)
                .map(|i| Point::new(20.0 + i as f64 * 3.5, (i * 5) as f64))
                .collect(),
        }];
        ed.load_profile(curves, None).unwrap();
        assert_eq!(
            ed.add_point_at("Full", 89.0, 100.0),
            Err(EditorError::MaximumPointsReached(MAX_POINTS))
        );
    }

    #[test]
    fn test_add_point_clamps_coordinates() {
        let mut ed = create_test_editor();
        ed.load_profile(
            vec![crate::curve::Curve {
                name: "Sparse".to_string(),
                sensor: "CPU".to_string(),
                color_slot: 0,
                points: vec![Point::new(40.0, 40.0), Point::new(60.0, 80.0)],
            }],
            None,
        )
        .unwrap();
        let idx = ed.add_point_at("Sparse", 5.0, 150.0).unwrap();
        let p = ed.curve("Sparse").unwrap().points[idx];
        assert_eq!(p, Point::new(MIN_TEMP, MAX_SPEED));
    }

    #[test]
    fn test_append_point_steps_past_max() {
        let mut ed = create_test_editor();
        ed.load_profile(
            vec![crate::curve::Curve {
                name: "Short".to_string(),
                sensor: "CPU".to_string(),
                color_slot: 0,
                points: vec![Point::new(30.0, 40.0), Point::new(50.0, 60.0)],
            }],
            None,
        )
        .unwrap();
        let idx = ed.append_point("Short").unwrap();
        let p = ed.curve("Short").unwrap().points[idx];
        // Ten past the last knot, continuing the 1%/degree slope.
        assert_eq!(p, Point::new(60.0, 70.0));
    }

    #[test]
    fn test_append_point_capped_at_ceiling() {
        let mut ed = create_test_editor();
        ed.load_profile(
            vec![crate::curve::Curve {
                name: "High".to_string(),
                sensor: "CPU".to_string(),
                color_slot: 0,
                points: vec![Point::new(60.0, 60.0), Point::new(85.0, 90.0)],
            }],
            None,
        )
        .unwrap();
        let idx = ed.append_point("High").unwrap();
        assert_eq!(ed.curve("High").unwrap().points[idx].temp, MAX_TEMP);
    }

    #[test]
    fn test_append_point_rejected_when_ceiling_occupied() {
        let mut ed = create_test_editor();
        // Default template already ends at 80; appending lands at 90,
        // then a second append would collide with it.
        ed.append_point("Fan Curve 1").unwrap();
        assert_eq!(
            ed.append_point("Fan Curve 1"),
            Err(EditorError::NearDuplicatePoint(DUP_TEMP_TOLERANCE))
        );
    }

    #[test]
    fn test_remove_point() {
        let mut ed = create_test_editor();
        ed.remove_point("Fan Curve 1", 2).unwrap();
        let pts = &ed.curve("Fan Curve 1").unwrap().points;
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[2].temp, 60.0);
    }

    #[test]
    fn test_remove_last_point() {
        let mut ed = create_test_editor();
        ed.remove_last_point("Fan Curve 1").unwrap();
        let pts = &ed.curve("Fan Curve 1").unwrap().points;
        assert_eq!(pts.len(), 5);
        assert_eq!(pts.last().unwrap().temp, 70.0);
    }

    #[test]
    fn test_remove_point_minimum_guard() {
        let mut ed = create_test_editor();
        ed.load_profile(
            vec![crate::curve::Curve {
                name: "Pair".to_string(),
                sensor: "CPU".to_string(),
                color_slot: 0,
                points: vec![Point::new(30.0, 40.0), Point::new(60.0, 80.0)],
            }],
            None,
        )
        .unwrap();
        assert_eq!(
            ed.remove_point("Pair", 0),
            Err(EditorError::MinimumPointsViolation(MIN_POINTS))
        );
        assert_eq!(ed.curve("Pair").unwrap().points.len(), 2);
    }

    #[test]
    fn test_round_point_snaps_to_integers() {
        let mut ed = create_test_editor();
        ed.move_point("Fan Curve 1", 1, 43.6, 61.4).unwrap();
        let p = ed.round_point("Fan Curve 1", 1).unwrap();
        assert_eq!(p, Point::new(44.0, 61.0));
    }

    #[test]
    fn test_round_point_reclamps_against_neighbors() {
        let mut ed = create_test_editor();
        ed.load_profile(
            vec![crate::curve::Curve {
                name: "Tight".to_string(),
                sensor: "CPU".to_string(),
                color_slot: 0,
                points: vec![
                    Point::new(30.4, 40.0),
                    Point::new(33.0, 45.0),
                    Point::new(40.0, 60.0),
                ],
            }],
            None,
        )
        .unwrap();
        // At 31.4 the snap would land on 31.0, inside the neighbor gap;
        // the commit pulls it back out.
        ed.move_point("Tight", 1, 31.4, 45.0).unwrap();
        let p = ed.round_point("Tight", 1).unwrap();
        assert_eq!(p.temp, 31.4);
    }
}
