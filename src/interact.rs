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

//! Pointer gesture handling for the chart.
//!
//! All hit testing is done in surface (pixel) coordinates so the feel of
//! grabbing a point does not depend on the axis scales. The controller
//! never stages edits: every drag movement commits through the store, so
//! a redraw mid-gesture always shows committed state.

use crate::curve::Point;
use crate::store::{Editor, EditorError};

/// How close the pointer must be to grab a point, in surface units.
pub const POINT_GRAB_RADIUS: f64 = 8.0;

/// How close a click must be to the active curve's line to add a point.
pub const LINE_ADD_TOLERANCE: f64 = 6.0;

/// Maps between data coordinates (temp, speed) and surface coordinates.
pub trait ChartSurface {
    fn data_to_px(&self, temp: f64, speed: f64) -> (f64, f64);
    fn px_to_data(&self, px: f64, py: f64) -> (f64, f64);
}

#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    Idle,
    Hovering { curve: String, index: usize },
    /// Over the active curve's line but not over a point; `temp` and
    /// `speed` are where a click would insert.
    HoveringLine { temp: f64, speed: f64 },
    Dragging { curve: String, index: usize },
}

/// What a pointer event did, for the status line and redraw decisions.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEffect {
    None,
    HoverChanged,
    DragStarted,
    DragMoved(Point),
    DragEnded(Point),
    PointAdded { curve: String, index: usize },
    PointRemoved { curve: String },
}

pub struct Controller {
    gesture: Gesture,
}

impl Controller {
    pub fn new() -> Self {
        Self { gesture: Gesture::Idle }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Nearest visible point within the grab radius. Ties and overlaps
    /// resolve to the active curve, so stacked points never capture a
    /// gesture away from the curve being edited.
    fn hit_point(
        &self,
        editor: &Editor,
        surface: &dyn ChartSurface,
        px: f64,
        py: f64,
    ) -> Option<(String, usize)> {
        let mut best: Option<(String, usize, f64)> = None;
        for curve in editor.curves() {
            if !editor.is_visible(&curve.name) {
                continue;
            }
            let is_active = curve.name == editor.active_name();
            for (i, p) in curve.points.iter().enumerate() {
                let (x, y) = surface.data_to_px(p.temp, p.speed);
                let d = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
                if d > POINT_GRAB_RADIUS {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some((name, _, bd)) => {
                        let best_active = name == editor.active_name();
                        match (is_active, best_active) {
                            (true, false) => true,
                            (false, true) => false,
                            _ => d < *bd,
                        }
                    }
                };
                if better {
                    best = Some((curve.name.clone(), i, d));
                }
            }
        }
        best.map(|(name, i, _)| (name, i))
    }

    /// Distance from the pointer to the active curve's polyline, in
    /// surface units.
    fn active_line_distance(
        &self,
        editor: &Editor,
        surface: &dyn ChartSurface,
        px: f64,
        py: f64,
    ) -> Option<f64> {
        let curve = editor.active_curve()?;
        let pts: Vec<(f64, f64)> =
            curve.points.iter().map(|p| surface.data_to_px(p.temp, p.speed)).collect();
        pts.windows(2)
            .map(|w| segment_distance(px, py, w[0], w[1]))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Pointer moved. While dragging this commits the move immediately;
    /// otherwise it just tracks hover state.
    pub fn pointer_move(
        &mut self,
        editor: &mut Editor,
        surface: &dyn ChartSurface,
        px: f64,
        py: f64,
    ) -> Result<GestureEffect, EditorError> {
        if let Gesture::Dragging { curve, index } = &self.gesture {
            let curve = curve.clone();
            let index = *index;
            let (temp, speed) = surface.px_to_data(px, py);
            match editor.move_point(&curve, index, temp, speed) {
                Ok(p) => return Ok(GestureEffect::DragMoved(p)),
                Err(e) => {
                    // The drag target vanished under us; abandon the gesture.
                    self.gesture = Gesture::Idle;
                    return Err(e);
                }
            }
        }
        let next = match self.hit_point(editor, surface, px, py) {
            Some((curve, index)) => Gesture::Hovering { curve, index },
            None => {
                let near_line = self
                    .active_line_distance(editor, surface, px, py)
                    .map(|d| d <= LINE_ADD_TOLERANCE)
                    .unwrap_or(false);
                if near_line {
                    let (temp, speed) = surface.px_to_data(px, py);
                    Gesture::HoveringLine { temp, speed }
                } else {
                    Gesture::Idle
                }
            }
        };
        if next != self.gesture {
            self.gesture = next;
            Ok(GestureEffect::HoverChanged)
        } else {
            Ok(GestureEffect::None)
        }
    }

    /// Primary button pressed. Grabbing a point of the active curve
    /// starts a drag; a press near the active curve's line adds a point
    /// there and starts dragging it. Points of other curves only select
    /// their curve.
    pub fn button_down(
        &mut self,
        editor: &mut Editor,
        surface: &dyn ChartSurface,
        px: f64,
        py: f64,
    ) -> Result<GestureEffect, EditorError> {
        if let Some((curve, index)) = self.hit_point(editor, surface, px, py) {
            if curve == editor.active_name() {
                self.gesture = Gesture::Dragging { curve, index };
                return Ok(GestureEffect::DragStarted);
            }
            // A stray click on another curve's point switches to it.
            editor.set_active(&curve)?;
            self.gesture = Gesture::Hovering { curve, index };
            return Ok(GestureEffect::HoverChanged);
        }
        let near_line = self
            .active_line_distance(editor, surface, px, py)
            .map(|d| d <= LINE_ADD_TOLERANCE)
            .unwrap_or(false);
        if near_line {
            let (temp, speed) = surface.px_to_data(px, py);
            let curve = editor.active_name().to_string();
            let index = editor.add_point_at(&curve, temp, speed)?;
            self.gesture = Gesture::Dragging { curve: curve.clone(), index };
            return Ok(GestureEffect::PointAdded { curve, index });
        }
        Ok(GestureEffect::None)
    }

    /// Primary button released. Ends a drag by snapping the point to
    /// whole-number coordinates.
    pub fn button_up(&mut self, editor: &mut Editor) -> Result<GestureEffect, EditorError> {
        if let Gesture::Dragging { curve, index } = &self.gesture {
            let curve = curve.clone();
            let index = *index;
            self.gesture = Gesture::Hovering { curve: curve.clone(), index };
            let p = editor.round_point(&curve, index)?;
            return Ok(GestureEffect::DragEnded(p));
        }
        Ok(GestureEffect::None)
    }

    /// Secondary button pressed: remove the point under the cursor.
    /// When points of several curves overlap, the active curve wins.
    /// Points that belong only to another curve are left alone.
    pub fn secondary_down(
        &mut self,
        editor: &mut Editor,
        surface: &dyn ChartSurface,
        px: f64,
        py: f64,
    ) -> Result<GestureEffect, EditorError> {
        let Some((curve, index)) = self.hit_point(editor, surface, px, py) else {
            return Ok(GestureEffect::None);
        };
        if curve != editor.active_name() {
            return Ok(GestureEffect::None);
        }
        editor.remove_point(&curve, index)?;
        self.gesture = Gesture::Idle;
        Ok(GestureEffect::PointRemoved { curve })
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance from (px, py) to the segment a-b.
fn segment_distance(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (ax, ay) = a;
    let (bx, by) = b;
    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;
    if len2 < f64::EPSILON {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
