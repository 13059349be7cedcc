//! Application state and logic.
//!
//! The [`App`] wraps a [`Session`] with the state the terminal form needs:
//! which row has focus, the edit buffer, the status line and open modals.

use dilution_core::{Field, Metric, Session};
use dilution_engine::engine::{CurvePoint, EngineError, dilution_curve};

/// Number of samples in the dilution curve.
const CURVE_STEPS: usize = 80;

/// Modal editing state for the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Move between rows and run commands.
    Normal,
    /// Type a new value for the focused amount.
    Edit,
}

/// A focusable row of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormRow {
    Amount(Field),
    RoundTwoToggle,
}

impl FormRow {
    pub fn label(self) -> &'static str {
        match self {
            FormRow::Amount(field) => field.label(),
            FormRow::RoundTwoToggle => "Include Round 2 (Future Fundraising)?",
        }
    }
}

/// Rows in display order. Round two amounts are hidden while round two is off.
const ROWS: [FormRow; 7] = [
    FormRow::Amount(Field::FundSize),
    FormRow::Amount(Field::YourInvestment),
    FormRow::Amount(Field::TotalRaisedRound1),
    FormRow::Amount(Field::PreMoneyRound1),
    FormRow::RoundTwoToggle,
    FormRow::Amount(Field::NewRaise),
    FormRow::Amount(Field::PreMoneyRound2),
];

pub struct App {
    pub session: Session,
    /// Index into [`App::rows`].
    pub selected: usize,
    pub mode: Mode,
    /// Edit buffer for the focused amount
    pub edit_buffer: String,
    /// Cursor position within edit buffer (byte offset)
    pub edit_cursor: usize,
    pub status_message: String,
    /// Sink problems found at startup, shown until the first submission.
    pub setup_errors: Vec<String>,
    pub help_modal: bool,
    pub help_scroll: u16,
    /// Points of the open dilution curve modal.
    pub plot_modal: Option<Vec<CurvePoint>>,
}

impl App {
    pub fn new(session: Session, setup_errors: Vec<String>) -> Self {
        let status_message = match setup_errors.first() {
            Some(first) => format!("Error: {}", first),
            None => String::new(),
        };
        App {
            session,
            selected: 0,
            mode: Mode::Normal,
            edit_buffer: String::new(),
            edit_cursor: 0,
            status_message,
            setup_errors,
            help_modal: false,
            help_scroll: 0,
            plot_modal: None,
        }
    }

    /// Rows currently shown on the form.
    pub fn rows(&self) -> Vec<FormRow> {
        let include = self.session.form.include_round_two;
        ROWS.iter()
            .copied()
            .filter(|row| match row {
                FormRow::Amount(field) => include || !field.is_round_two(),
                FormRow::RoundTwoToggle => true,
            })
            .collect()
    }

    pub fn selected_row(&self) -> FormRow {
        let rows = self.rows();
        rows[self.selected.min(rows.len() - 1)]
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len() as isize;
        let next = (self.selected as isize + delta).rem_euclid(len);
        self.selected = next as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn toggle_round_two(&mut self) {
        self.session.form.toggle_round_two();
        self.clamp_selection();
        self.status_message.clear();
    }

    /// Adjust the focused amount by `count` steps.
    pub fn step_selected(&mut self, count: i32) {
        match self.selected_row() {
            FormRow::Amount(field) => {
                self.session.form.step(field, count);
                self.status_message.clear();
            }
            FormRow::RoundTwoToggle => self.toggle_round_two(),
        }
    }

    /// Enter edit mode on the focused row, or toggle round two.
    pub fn start_edit(&mut self) {
        match self.selected_row() {
            FormRow::Amount(field) => {
                self.edit_buffer = self.session.form.text(field);
                self.edit_cursor = self.edit_buffer.len();
                self.mode = Mode::Edit;
                self.status_message.clear();
            }
            FormRow::RoundTwoToggle => self.toggle_round_two(),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Normal;
        self.edit_buffer.clear();
        self.edit_cursor = 0;
    }

    pub fn commit_edit(&mut self) {
        let FormRow::Amount(field) = self.selected_row() else {
            self.cancel_edit();
            return;
        };
        match self.session.form.set_text(field, &self.edit_buffer) {
            Ok(()) => {
                self.cancel_edit();
                self.status_message.clear();
            }
            Err(e) => {
                // Stay in edit mode so the value can be fixed.
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    /// Run the calculation and record it in every sink.
    pub fn calculate(&mut self) {
        let submission = self.session.submit();
        let mut parts = Vec::new();
        match &submission.result {
            Ok(_) => parts.push("Calculated".to_string()),
            Err(e) => parts.push(format!("Error: {}", e)),
        }
        for outcome in &submission.persisted {
            match &outcome.outcome {
                Ok(()) => parts.push(format!("logged to {}", outcome.sink)),
                Err(e) => parts.insert(0, format!("Error: {}", e)),
            }
        }
        self.setup_errors.clear();
        self.status_message = parts.join("  |  ");
    }

    /// Metrics of the last successful calculation.
    pub fn metrics(&self) -> Vec<Metric> {
        self.session
            .last()
            .map(|submission| submission.metrics())
            .unwrap_or_default()
    }

    /// The last calculation error, if the last submission failed.
    pub fn last_error(&self) -> Option<&EngineError> {
        self.session
            .last()
            .and_then(|submission| submission.result.as_ref().err())
    }

    /// True when the form differs from what the results were computed from.
    pub fn results_stale(&self) -> bool {
        self.session
            .last()
            .is_some_and(|submission| submission.form != self.session.form)
    }

    pub fn results_text(&self) -> Option<String> {
        let metrics = self.metrics();
        if metrics.is_empty() {
            return None;
        }
        Some(
            metrics
                .iter()
                .map(|m| format!("{}: {}", m.label, m.value))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    pub fn copy_results(&mut self) {
        let Some(text) = self.results_text() else {
            self.status_message = "Error: Nothing to copy; calculate first".to_string();
            return;
        };
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        self.status_message = match copied {
            Ok(()) => "Results copied to clipboard".to_string(),
            Err(e) => format!("Error: Clipboard unavailable: {}", e),
        };
    }

    pub fn open_plot_modal(&mut self) {
        let form = self.session.form;
        match dilution_curve(&form.round_one(), &form.round_two(), CURVE_STEPS) {
            Ok(points) => {
                self.plot_modal = Some(points);
                self.status_message.clear();
            }
            Err(e) => self.status_message = format!("Error: {}", e),
        }
    }

    pub fn close_plot_modal(&mut self) {
        self.plot_modal = None;
    }

    pub fn open_help_modal(&mut self) {
        self.help_modal = true;
        self.help_scroll = 0;
    }

    pub fn close_help_modal(&mut self) {
        self.help_modal = false;
    }

    pub fn scroll_help_by(&mut self, delta: i16) {
        self.help_scroll = self.help_scroll.saturating_add_signed(delta);
    }
}
