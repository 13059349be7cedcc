//! Terminal form frontend.

mod actions;
mod app;
mod help;
mod input;
mod ui;

use std::io;

pub use app::App;

/// Take over the terminal, run the form until the user quits, then restore it.
pub fn run(app: &mut App) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let result = input::run_app(&mut terminal, app);
    ratatui::restore();
    result
}
