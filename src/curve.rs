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

use serde::{Deserialize, Serialize};

/// Editable temperature range in Celsius.
pub const MIN_TEMP: f64 = 20.0;
pub const MAX_TEMP: f64 = 90.0;

/// Fan speed range in percent.
pub const MIN_SPEED: f64 = 0.0;
pub const MAX_SPEED: f64 = 100.0;

/// Point-count window per curve.
pub const MIN_POINTS: usize = 2;
pub const MAX_POINTS: usize = 20;

/// A new point closer than this (in Celsius) to an existing one is rejected.
pub const DUP_TEMP_TOLERANCE: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub temp: f64,
    pub speed: f64,
}

impl Point {
    pub fn new(temp: f64, speed: f64) -> Self {
        Self { temp, speed }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Curve {
    pub name: String,
    pub sensor: String,
    /// Stable palette index, assigned by the store.
    #[serde(default)]
    pub color_slot: usize,
    pub points: Vec<Point>,
}

/// The shape every new or reset curve starts from.
pub fn default_points() -> Vec<Point> {
    vec![
        Point::new(30.0, 50.0),
        Point::new(40.0, 60.0),
        Point::new(50.0, 70.0),
        Point::new(60.0, 80.0),
        Point::new(70.0, 90.0),
        Point::new(80.0, 100.0),
    ]
}

impl Curve {
    pub fn with_defaults(name: &str, sensor: &str) -> Self {
        Self {
            name: name.to_string(),
            sensor: sensor.to_string(),
            color_slot: 0,
            points: default_points(),
        }
    }

    pub fn sort_points(&mut self) {
        self.points
            .sort_by(|a, b| a.temp.partial_cmp(&b.temp).unwrap_or(std::cmp::Ordering::Equal));
    }

    pub fn evaluate(&self, temp: f64) -> f64 {
        interp_speed_percent(&self.points, temp)
    }
}

/// Piecewise-linear evaluation with flat extrapolation outside the knot
/// range. Result is rounded to one decimal place.
pub fn interp_speed_percent(points: &[Point], temp: f64) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    if temp <= points[0].temp {
        return round1(points[0].speed);
    }
    if temp >= points[points.len() - 1].temp {
        return round1(points[points.len() - 1].speed);
    }
    for w in points.windows(2) {
        let a = &w[0];
        let b = &w[1];
        if temp >= a.temp && temp <= b.temp {
            if (b.temp - a.temp).abs() < f64::EPSILON {
                return round1(a.speed);
            }
            let t = (temp - a.temp) / (b.temp - a.temp);
            let v = a.speed + t * (b.speed - a.speed);
            return round1(v.clamp(MIN_SPEED, MAX_SPEED));
        }
    }
    round1(points[points.len() - 1].speed)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn validate_points(points: &[Point]) -> Result<(), String> {
    if points.len() < MIN_POINTS {
        return Err(format!("curve must have at least {} points", MIN_POINTS));
    }
    if points.len() > MAX_POINTS {
        return Err(format!("too many curve points (max {})", MAX_POINTS));
    }
    let mut last_t = f64::NEG_INFINITY;
    for p in points {
        if p.temp.is_nan() || p.speed.is_nan() {
            return Err("coordinates cannot be NaN".into());
        }
        if !(MIN_TEMP..=MAX_TEMP).contains(&p.temp) {
            return Err(format!("temperature out of range ({}-{})", MIN_TEMP, MAX_TEMP));
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&p.speed) {
            return Err("speed out of range (0-100)".into());
        }
        if p.temp <= last_t {
            return Err("curve temperatures must be strictly ascending".into());
        }
        last_t = p.temp;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_points() -> Vec<Point> {
        vec![
            Point::new(30.0, 20.0),
            Point::new(40.0, 30.0),
            Point::new(50.0, 45.0),
            Point::new(60.0, 65.0),
            Point::new(70.0, 80.0),
            Point::new(80.0, 100.0),
        ]
    }

    #[test]
    fn test_interp_empty_points() {
        assert_eq!(interp_speed_percent(&[], 50.0), 0.0);
    }

    #[test]
    fn test_interp_single_point() {
        let points = vec![Point::new(50.0, 75.0)];
        assert_eq!(interp_speed_percent(&points, 30.0), 75.0);
        assert_eq!(interp_speed_percent(&points, 50.0), 75.0);
        assert_eq!(interp_speed_percent(&points, 70.0), 75.0);
    }

    #[test]
    fn test_interp_flat_below_range() {
        let points = create_test_points();
        assert_eq!(interp_speed_percent(&points, 10.0), 20.0);
        assert_eq!(interp_speed_percent(&points, 29.9), 20.0);
    }

    #[test]
    fn test_interp_flat_above_range() {
        let points = create_test_points();
        assert_eq!(interp_speed_percent(&points, 90.0), 100.0);
    }

    #[test]
    fn test_interp_linear_midpoint() {
        let points = create_test_points();
        // Halfway between (40,30) and (50,45)
        assert_eq!(interp_speed_percent(&points, 45.0), 37.5);
    }

    #[test]
    fn test_interp_at_knot() {
        let points = create_test_points();
        assert_eq!(interp_speed_percent(&points, 60.0), 65.0);
    }

    #[test]
    fn test_interp_rounds_to_one_decimal() {
        let points = vec![Point::new(30.0, 20.0), Point::new(60.0, 30.0)];
        // At 40: 20 + (10/30)*10 = 23.333...
        assert_eq!(interp_speed_percent(&points, 40.0), 23.3);
    }

    #[test]
    fn test_validate_points_duplicate_temperature() {
        let pts = vec![
            Point::new(30.0, 20.0),
            Point::new(50.0, 40.0),
            Point::new(50.0, 60.0),
        ];
        assert!(validate_points(&pts).is_err());
    }

    #[test]
    fn test_default_points_sorted_and_valid() {
        let pts = default_points();
        assert_eq!(pts.len(), 6);
        assert!(validate_points(&pts).is_ok());
        assert_eq!(pts[0], Point::new(30.0, 50.0));
        assert_eq!(pts[5], Point::new(80.0, 100.0));
    }

    #[test]
    fn test_curve_evaluate() {
        let curve = Curve {
            name: "Fan Curve 1".to_string(),
            sensor: "cpu".to_string(),
            color_slot: 0,
            points: create_test_points(),
        };
        assert_eq!(curve.evaluate(45.0), 37.5);
    }

    #[test]
    fn test_sort_points() {
        let mut curve = Curve {
            name: "c".to_string(),
            sensor: "s".to_string(),
            color_slot: 0,
            points: vec![Point::new(70.0, 80.0), Point::new(30.0, 20.0)],
        };
        curve.sort_points();
        assert_eq!(curve.points[0].temp, 30.0);
        assert_eq!(curve.points[1].temp, 70.0);
    }

    #[test]
    fn test_validate_points_too_few() {
        assert!(validate_points(&[Point::new(50.0, 50.0)]).is_err());
    }

    #[test]
    fn test_validate_points_too_many() {
        let pts: Vec<Point> = (0..21).map(|i| Point::new(20.0 + i as f64 * 3.0, 50.0)).collect();
        assert!(validate_points(&pts).is_err());
    }

    #[test]
    fn test_validate_points_out_of_range_temp() {
        let pts = vec![Point::new(10.0, 50.0), Point::new(50.0, 60.0)];
        assert!(validate_points(&pts).is_err());
        let pts = vec![Point::new(50.0, 50.0), Point::new(95.0, 60.0)];
        assert!(validate_points(&pts).is_err());
    }

    #[test]
    fn test_validate_points_out_of_range_speed() {
        let pts = vec![Point::new(30.0, -5.0), Point::new(50.0, 60.0)];
        assert!(validate_points(&pts).is_err());
        let pts = vec![Point::new(30.0, 50.0), Point::new(50.0, 101.0)];
        assert!(validate_points(&pts).is_err());
    }

    #[test]
    fn test_validate_points_unsorted() {
        let pts = vec![Point::new(70.0, 80.0), Point::new(30.0, 20.0)];
        assert!(validate_points(&pts).is_err());
    }

    #[test]
    fn test_validate_points_nan() {
        let pts = vec![Point::new(f64::NAN, 50.0), Point::new(50.0, 60.0)];
        assert!(validate_points(&pts).is_err());
    }
}
