use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

/// Handle text editing operations on a buffer with UTF-8 aware cursor movement.
fn handle_text_input(buffer: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Left => {
            if *cursor > 0 {
                let mut new_pos = *cursor - 1;
                while new_pos > 0 && !buffer.is_char_boundary(new_pos) {
                    new_pos -= 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Right => {
            if *cursor < buffer.len() {
                let mut new_pos = *cursor + 1;
                while new_pos < buffer.len() && !buffer.is_char_boundary(new_pos) {
                    new_pos += 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = buffer.len();
        }
        KeyCode::Backspace => {
            if *cursor > 0 {
                let mut del_start = *cursor - 1;
                while del_start > 0 && !buffer.is_char_boundary(del_start) {
                    del_start -= 1;
                }
                buffer.drain(del_start..*cursor);
                *cursor = del_start;
            }
        }
        KeyCode::Delete => {
            if *cursor < buffer.len() {
                let mut del_end = *cursor + 1;
                while del_end < buffer.len() && !buffer.is_char_boundary(del_end) {
                    del_end += 1;
                }
                buffer.drain(*cursor..del_end);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.clear();
            *cursor = 0;
        }
        KeyCode::Char(c) => {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                buffer.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
        }
        _ => {}
    }
}

/// Result of applying a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
}

/// Handle a key press on the form (no modal open).
pub fn handle_form_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    match app.mode {
        Mode::Edit => {
            match key.code {
                KeyCode::Enter | KeyCode::Tab => app.commit_edit(),
                KeyCode::Esc => app.cancel_edit(),
                _ => handle_text_input(&mut app.edit_buffer, &mut app.edit_cursor, key),
            }
            ApplyResult::Continue
        }
        Mode::Normal => {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return ApplyResult::Quit,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return ApplyResult::Quit;
                }
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.move_selection(1),
                KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => app.move_selection(-1),
                KeyCode::Enter | KeyCode::Char('i') | KeyCode::Char('e') => app.start_edit(),
                KeyCode::Char(' ') => app.toggle_round_two(),
                KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => app.step_selected(1),
                KeyCode::Char('-') | KeyCode::Left => app.step_selected(-1),
                KeyCode::Char('c') | KeyCode::F(5) => app.calculate(),
                KeyCode::Char('y') => app.copy_results(),
                KeyCode::Char('p') => app.open_plot_modal(),
                KeyCode::Char('?') | KeyCode::F(1) => app.open_help_modal(),
                _ => {}
            }
            ApplyResult::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dilution_core::Session;

    fn press(app: &mut App, code: KeyCode) -> ApplyResult {
        handle_form_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing_replaces_value() {
        let mut app = App::new(Session::default(), Vec::new());
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Edit);
        handle_form_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        for c in "75,000".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.session.form.your_investment, 75_000.0);
    }

    #[test]
    fn test_backspace_and_cursor() {
        let mut buffer = "1234".to_string();
        let mut cursor = 4;
        handle_text_input(
            &mut buffer,
            &mut cursor,
            KeyEvent::new(KeyCode::Left, KeyModifiers::NONE),
        );
        handle_text_input(
            &mut buffer,
            &mut cursor,
            KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
        );
        assert_eq!(buffer, "124");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_escape_cancels_edit_then_quits() {
        let mut app = App::new(Session::default(), Vec::new());
        press(&mut app, KeyCode::Enter);
        assert_eq!(press(&mut app, KeyCode::Esc), ApplyResult::Continue);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.session.form.fund_size, 2_000_000.0);
        assert_eq!(press(&mut app, KeyCode::Esc), ApplyResult::Quit);
    }

    #[test]
    fn test_calculate_and_toggle_keys() {
        let mut app = App::new(Session::default(), Vec::new());
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.session.form.include_round_two);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.metrics().len(), 2);
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.session.form.fund_size, 2_100_000.0);
    }
}
