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

//! Curvesmith - Multi-curve fan curve editor TUI
//!
//! This library provides the core functionality for editing piecewise-linear
//! fan curves: the curve store, interpolation, point constraints, mouse
//! gesture handling, and profile import/export.

pub mod app;
pub mod bounds;
pub mod bridge;
pub mod config;
pub mod curve;
pub mod events;
pub mod handlers;
pub mod interact;
pub mod logger;
pub mod ops;
pub mod profiles;
pub mod store;
pub mod ui;
