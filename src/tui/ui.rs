//! UI rendering

use super::app::{App, FormRow, Mode};
use super::help::{get_about_help, get_help_text};
use dilution_engine::engine::CurvePoint;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use textplots::{AxisBuilder, Chart, LabelBuilder, LabelFormat, LineStyle, Plot, Shape};

pub(crate) const TITLE_HEIGHT: u16 = 4;
pub(crate) const BODY_MIN_HEIGHT: u16 = 10;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Min(BODY_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [title_area, body_area, status_area] = split_main_chunks(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body_area);

    draw_title(f, title_area);
    draw_form(f, app, body[0]);
    draw_results(f, app, body[1]);
    draw_status_bar(f, app, status_area);

    if let Some(points) = &app.plot_modal {
        draw_plot_modal(f, points);
    }

    if app.help_modal {
        draw_help_modal(f, app);
    }
}

fn draw_title(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "VC Investment Calculator",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Estimate Ownership, Dilution & Exit Value",
            Style::default().fg(Color::Gray),
        )),
    ];
    let block = Block::default().borders(Borders::BOTTOM);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn row_value(app: &App, row: FormRow, selected: bool) -> String {
    match row {
        FormRow::Amount(field) => {
            if selected && app.mode == Mode::Edit {
                // Insert cursor marker at cursor position
                let (before, after) = app.edit_buffer.split_at(app.edit_cursor);
                format!("{}│{}", before, after)
            } else {
                format!("$ {}", app.session.form.text(field))
            }
        }
        FormRow::RoundTwoToggle => {
            if app.session.form.include_round_two {
                "[x] Yes".to_string()
            } else {
                "[ ] No".to_string()
            }
        }
    }
}

fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.selected_row();
    let mut lines: Vec<Line> = Vec::new();

    for row in app.rows() {
        if row == FormRow::RoundTwoToggle {
            lines.push(Line::from(""));
        }
        let selected = row == focused;
        let label_style = if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let value_style = if selected && app.mode == Mode::Edit {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Green)
        };
        lines.push(Line::from(Span::styled(row.label(), label_style)));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(row_value(app, row, selected), value_style),
        ]));
    }

    let (title, border) = match app.mode {
        Mode::Edit => (" Edit ", Color::Yellow),
        Mode::Normal => (" Inputs ", Color::White),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(error) = app.last_error() {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    } else {
        let metrics = app.metrics();
        if metrics.is_empty() {
            lines.push(Line::from(Span::styled(
                "Press c to calculate",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for metric in metrics {
            lines.push(Line::from(Span::styled(
                metric.label,
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::from(Span::styled(
                format!("  {}", metric.value),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )));
        }
    }

    if app.results_stale() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Inputs changed; press c to recalculate",
            Style::default().fg(Color::Yellow),
        )));
    }

    let sinks = app.session.sink_names();
    let ledger = if sinks.is_empty() {
        "Ledger: none".to_string()
    } else {
        format!("Ledger: {}", sinks.join(", "))
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        ledger,
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Results ")
        .border_style(Style::default().fg(Color::White));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn draw_plot_modal(f: &mut Frame, points: &[CurvePoint]) {
    let area = centered_rect(80, 70, f.area());
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    let modal_style = Style::default().fg(Color::White).bg(Color::Black);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Dilution curve ")
        .border_style(Style::default().fg(Color::Cyan))
        .style(modal_style);

    // textplots uses a Braille canvas where one terminal character is 2x4 points.
    let plot_width_points = (inner_width as u32).saturating_mul(2);
    let plot_height_chars = inner_height.saturating_sub(1);
    let plot_height_points = (plot_height_chars as u32).saturating_mul(4);

    let content = if plot_width_points < 32 || plot_height_points < 3 {
        "Terminal too small for plot".to_string()
    } else {
        match render_curve(points, plot_width_points, plot_height_points) {
            Some(chart) => format!("X: Round 2 raise ($M)    Y: ownership (%)\n{}", chart),
            None => "Nothing to plot: Round 2 raise and pre-money are both zero".to_string(),
        }
    };

    let paragraph = Paragraph::new(content).block(block).style(modal_style);

    // Clear area behind modal so plot whitespace is visible.
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Render the curve with textplots, in $M against percent.
fn render_curve(points: &[CurvePoint], width: u32, height: u32) -> Option<String> {
    let scaled: Vec<(f32, f32)> = points
        .iter()
        .map(|p| ((p.new_raise / 1e6) as f32, (p.ownership * 100.0) as f32))
        .collect();

    let xmin = scaled.iter().map(|(x, _)| *x).fold(f32::INFINITY, f32::min);
    let xmax = scaled.iter().map(|(x, _)| *x).fold(f32::NEG_INFINITY, f32::max);
    let ymin = scaled.iter().map(|(_, y)| *y).fold(f32::INFINITY, f32::min);
    let ymax = scaled.iter().map(|(_, y)| *y).fold(f32::NEG_INFINITY, f32::max);
    let span_x = xmax - xmin;
    if span_x.is_nan() || span_x <= 0.0 {
        return None;
    }
    // A flat curve still needs a non-empty y range.
    let span_y = if ymax > ymin { ymax - ymin } else { 1.0 };

    // Shift points so minimums map to 0 (textplots draws axes at x=0, y=0)
    let shifted: Vec<(f32, f32)> = scaled
        .iter()
        .map(|(x, y)| (x - xmin, y - ymin))
        .collect();

    let mut chart = Chart::new_with_y_range(width, height, 0.0, span_x, 0.0, span_y);
    let shape = Shape::Lines(&shifted);

    let chart = chart
        .x_label_format(LabelFormat::Custom(Box::new(move |v| {
            format!("{:.1}", v + xmin)
        })))
        .y_label_format(LabelFormat::Custom(Box::new(move |v| {
            format!("{:.4}", v + ymin)
        })))
        .x_axis_style(LineStyle::Solid)
        .y_axis_style(LineStyle::Solid)
        .lineplot(&shape);
    chart.borders();
    chart.axis();
    chart.figures();
    Some(chart.frame())
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let hint = match app.mode {
        Mode::Edit => "Enter accept  Esc cancel",
        Mode::Normal => "j/k move  Enter edit  Space round 2  c calculate  p plot  ? help  q quit",
    };

    let status = if !app.status_message.is_empty() {
        app.status_message.clone()
    } else {
        hint.to_string()
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let spans = vec![Span::styled(status, style)];
    let paragraph = Paragraph::new(Line::from(spans));
    f.render_widget(paragraph, area);
}

fn draw_help_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(80, 80, f.area());

    let modal_style = Style::default().fg(Color::White).bg(Color::Black);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Green))
        .style(modal_style);

    let mut lines: Vec<Line> = Vec::new();
    let help = get_about_help()
        .into_iter()
        .chain(std::iter::once(String::new()))
        .chain(get_help_text());
    for text in help {
        let style = if text == "About" {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if text.starts_with("  ") {
            Style::default().fg(Color::White)
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let viewport_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(viewport_height);
    let effective_scroll = (app.help_scroll as usize).min(max_scroll);
    let scroll_y = u16::try_from(effective_scroll).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(modal_style)
        .scroll((scroll_y, 0))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dilution_core::Session;
    use dilution_engine::engine::{RoundOneInput, RoundTwoInput, dilution_curve};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_shows_form_and_results() {
        let mut app = App::new(Session::default(), Vec::new());
        let screen = render(&mut app);
        assert!(screen.contains("VC Investment Calculator"));
        assert!(screen.contains("Total fund size ($)"));
        assert!(screen.contains("Press c to calculate"));

        app.calculate();
        let screen = render(&mut app);
        assert!(screen.contains("Initial Ownership"));
        assert!(screen.contains("0.2439%"));
    }

    #[test]
    fn test_draw_shows_edit_cursor() {
        let mut app = App::new(Session::default(), Vec::new());
        app.start_edit();
        let screen = render(&mut app);
        assert!(screen.contains("2,000,000│"));
    }

    #[test]
    fn test_render_curve_needs_x_range() {
        let round1 = RoundOneInput {
            fund_size: 2_000_000.0,
            your_investment: 50_000.0,
            total_raised_round1: 500_000.0,
            pre_money_round1: 20_000_000.0,
        };
        let flat = RoundTwoInput {
            include_round_two: true,
            new_raise: 0.0,
            pre_money_round2: 0.0,
        };
        let points = dilution_curve(&round1, &flat, 10).unwrap();
        assert!(render_curve(&points, 120, 40).is_none());

        let round2 = RoundTwoInput {
            include_round_two: true,
            new_raise: 1_000_000.0,
            pre_money_round2: 25_000_000.0,
        };
        let points = dilution_curve(&round1, &round2, 10).unwrap();
        assert!(render_curve(&points, 120, 40).is_some());
    }
}
