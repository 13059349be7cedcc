use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io;

use super::actions::{ApplyResult, handle_form_key};
use super::app::App;
use super::ui;

/// Route a key press to the open modal or the form.
pub fn handle_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    // Plot modal takes over input
    if app.plot_modal.is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('p') => {
                app.close_plot_modal();
            }
            KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.close_plot_modal();
            }
            _ => {}
        }
        return ApplyResult::Continue;
    }

    // Help modal takes over input
    if app.help_modal {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::F(1) => {
                app.close_help_modal();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.scroll_help_by(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.scroll_help_by(-1);
            }
            KeyCode::PageDown => {
                app.scroll_help_by(12);
            }
            KeyCode::PageUp => {
                app.scroll_help_by(-12);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                app.help_scroll = 0;
            }
            _ => {}
        }
        return ApplyResult::Continue;
    }

    handle_form_key(app, key)
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only process key press events (Windows reports Press + Release)
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, key) == ApplyResult::Quit {
                return Ok(());
            }
        }
    }
}
