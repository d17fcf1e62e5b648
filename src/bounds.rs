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

use crate::curve::{Point, MAX_SPEED, MAX_TEMP, MIN_SPEED, MIN_TEMP};

/// Minimum temperature gap kept between a moved point and its neighbors.
pub const NEIGHBOR_TEMP_GAP: f64 = 1.0;

/// Allowed position window for the point at `index`, given its neighbors.
///
/// Temperature is bounded exclusively: the point may come no closer than
/// one degree to either neighbor. Speed is bounded inclusively by the
/// neighbor speeds, so dragging can flatten a segment but never invert it.
pub fn bounds_for(points: &[Point], index: usize) -> (f64, f64, f64, f64) {
    let lo_t = if index == 0 {
        MIN_TEMP
    } else {
        (points[index - 1].temp + NEIGHBOR_TEMP_GAP).max(MIN_TEMP)
    };
    let hi_t = if index + 1 >= points.len() {
        MAX_TEMP
    } else {
        (points[index + 1].temp - NEIGHBOR_TEMP_GAP).min(MAX_TEMP)
    };
    let lo_s = if index == 0 { MIN_SPEED } else { points[index - 1].speed.max(MIN_SPEED) };
    let hi_s = if index + 1 >= points.len() {
        MAX_SPEED
    } else {
        points[index + 1].speed.min(MAX_SPEED)
    };
    (lo_t, hi_t.max(lo_t), lo_s, hi_s.max(lo_s))
}

/// Clamp a requested position for the point at `index` into its bounds.
pub fn clamp_point(points: &[Point], index: usize, raw_temp: f64, raw_speed: f64) -> Point {
    let (lo_t, hi_t, lo_s, hi_s) = bounds_for(points, index);
    Point {
        temp: raw_temp.clamp(lo_t, hi_t),
        speed: raw_speed.clamp(lo_s, hi_s),
    }
}
