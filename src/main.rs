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

mod app;
mod bounds;
mod bridge;
mod config;
mod curve;
mod events;
mod handlers;
mod interact;
mod logger;
mod ops;
mod profiles;
mod store;
mod ui;

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::Terminal;

use app::App;
use events::{handle_key_event, handle_mouse_event};
use ui::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Optional JSONL event log under the state directory
    let logging_enabled = args.iter().any(|a| a == "--logging");
    if logging_enabled {
        logger::init_logging();
        logger::log_event(
            "startup",
            serde_json::json!({
                "mode": "cli",
                "args": args,
            }),
        );
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if logging_enabled {
        logger::log_event("tui_start", serde_json::json!({}));
    }
    let res = run_app(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
        if logging_enabled {
            logger::log_event("fatal_error", serde_json::json!({ "error": err.to_string() }));
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
) -> anyhow::Result<()> {
    let mut app = App::new();

    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if event::poll(POLL_INTERVAL).unwrap_or(false) {
            match event::read()? {
                Event::Key(key_event) => {
                    if handle_key_event(&mut app, key_event)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse_event) => {
                    if handle_mouse_event(&mut app, mouse_event)? {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }
}
