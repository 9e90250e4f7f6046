//! Per-screen content rendering.

pub mod dashboard;
pub mod directory;
pub mod events;
pub mod profile;

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use kwoon_core::models::BranchProgress;
use kwoon_core::notice::Listing;
use kwoon_core::utils::format_hours;

use crate::app::{App, Focus};
use crate::ui::styles;

/// Width of the text progress bar, in cells.
const BAR_WIDTH: usize = 30;

/// A table for one list screen: header, rows and the selection highlight.
/// Empty and loading lists show a placeholder line instead.
pub fn render_table<T>(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: String,
    listing: &Listing<T>,
    columns: &[(&'static str, Constraint)],
    rows: Vec<Row<'static>>,
) {
    let focused = app.focus == Focus::List;
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if rows.is_empty() {
        let text = if listing.is_loading() {
            "Loading…"
        } else if !app.search_query.is_empty() {
            "No matches"
        } else {
            "Nothing here yet"
        };
        let paragraph =
            Paragraph::new(Line::from(Span::styled(format!(" {}", text), styles::muted_style())))
                .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(columns.iter().map(|(h, _)| Cell::from(*h)))
        .style(styles::title_style())
        .height(1);

    let widths: Vec<Constraint> = columns.iter().map(|(_, w)| *w).collect();
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection()));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Table title with the row count and the active filter, if any.
pub fn list_title(app: &App, name: &str, count: usize) -> String {
    if app.search_query.is_empty() {
        format!(" {} ({}) ", name, count)
    } else {
        format!(" {} ({}) - filter: {} ", name, count, app.search_query)
    }
}

/// `[██████░░░|░░░░]` with `|` at the minimum-hours mark.
pub fn progress_bar(percent: u8, min_percent: u32, width: usize) -> String {
    let filled = usize::from(percent) * width / 100;
    let marker = (min_percent as usize * width / 100).min(width.saturating_sub(1));
    let cells: String = (0..width)
        .map(|i| {
            if i < filled {
                '█'
            } else if i == marker && min_percent > 0 && min_percent < 100 {
                '|'
            } else {
                '░'
            }
        })
        .collect();
    format!("[{}]", cells)
}

/// Hours and grade lines for one branch, shared by dashboard and profile.
pub fn branch_progress_lines(branch: &BranchProgress) -> Vec<Line<'static>> {
    let progress = branch.progress();
    let style = styles::progress_style(progress.status);

    vec![
        Line::from(vec![
            Span::styled(branch.branch.label().to_string(), styles::highlight_style()),
            Span::styled(
                format!("  Grade {}", branch.current_grade),
                styles::list_item_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                progress_bar(progress.percent, progress.min_percent, BAR_WIDTH),
                style,
            ),
            Span::styled(format!(" {:>3}% ", progress.percent), style),
            Span::styled(progress.status.label().to_string(), style),
        ]),
        Line::from(vec![
            Span::styled("Hours:     ", styles::muted_style()),
            Span::raw(format!(
                "{} of {} ({} to go, minimum {})",
                format_hours(branch.completed_hours),
                format_hours(branch.required_hours),
                format_hours(branch.remaining_hours()),
                format_hours(branch.minimum_hours),
            )),
        ]),
        Line::from(vec![
            Span::styled("Next exam: ", styles::muted_style()),
            Span::styled(
                branch.eligibility().label().to_string(),
                styles::verdict_style(branch.eligibility()),
            ),
        ]),
    ]
}

/// Label/value line used by detail panels.
pub fn field(label: &'static str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<11}", label), styles::muted_style()),
        Span::raw(value.into()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_fill_and_marker() {
        assert_eq!(progress_bar(0, 50, 10), "[░░░░░|░░░░]");
        assert_eq!(progress_bar(60, 50, 10), "[██████░░░░]");
        assert_eq!(progress_bar(100, 80, 10), "[██████████]");
    }

    #[test]
    fn test_progress_bar_without_minimum() {
        assert_eq!(progress_bar(20, 0, 5), "[█░░░░]");
    }
}
