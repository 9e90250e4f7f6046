use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use kwoon_core::models::DashboardStats;
use kwoon_core::utils::format_datetime;

use super::{branch_progress_lines, field};
use crate::app::App;
use crate::ui::styles;

/// Upcoming events listed next to the counters.
const UPCOMING_LIMIT: usize = 8;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_stats(frame, app, chunks[0]);
    render_upcoming(frame, app, chunks[1]);
}

fn count_line(label: &'static str, value: u32, attention: bool) -> Line<'static> {
    let style = if attention && value > 0 {
        styles::highlight_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::styled(format!("{:<20}", label), styles::muted_style()),
        Span::styled(value.to_string(), style),
    ])
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    if let Some(ref auth) = app.auth {
        lines.push(Line::from(Span::styled(
            format!("Welcome, {}", auth.user.titled_name()),
            styles::title_style(),
        )));
        lines.push(Line::from(""));
    }

    match app.dashboard {
        Some(DashboardStats::Admin(ref stats)) => {
            lines.push(count_line("Schools", stats.total_schools, false));
            lines.push(count_line("Students", stats.total_students, false));
            lines.push(count_line("Instructors", stats.total_managers, false));
            lines.push(count_line("Active events", stats.active_events, false));
            lines.push(Line::from(""));
            lines.push(count_line("Pending requests", stats.pending_requests, true));
            lines.push(count_line("Pending approvals", stats.pending_approvals, true));
        }
        Some(DashboardStats::Manager(ref stats)) => {
            lines.push(field("School", stats.school_name.clone()));
            lines.push(Line::from(""));
            lines.push(count_line("Students", stats.total_students, false));
            lines.push(count_line("Upcoming events", stats.upcoming_events, false));
            lines.push(Line::from(""));
            lines.push(count_line("Pending requests", stats.pending_requests, true));
            lines.push(count_line("Pending approvals", stats.pending_approvals, true));
        }
        Some(DashboardStats::Student(ref stats)) => {
            lines.push(field(
                "School",
                stats.school_name.clone().unwrap_or_else(|| "Not enrolled".to_string()),
            ));
            lines.push(count_line("Upcoming events", stats.upcoming_events, false));

            let progress = stats.branch_progress();
            if progress.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "No grades recorded yet",
                    styles::muted_style(),
                )));
            }
            for branch in &progress {
                lines.push(Line::from(""));
                lines.extend(branch_progress_lines(branch));
            }
        }
        None if app.offline_mode => {
            lines.push(Line::from(Span::styled(
                "Nothing cached yet",
                styles::muted_style(),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled("Loading…", styles::muted_style())));
        }
    }

    let block = Block::default()
        .title(" Dashboard ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_upcoming(frame: &mut Frame, app: &App, area: Rect) {
    let mut upcoming: Vec<_> = app
        .events
        .items()
        .iter()
        .filter(|e| !e.is_completed)
        .collect();
    upcoming.sort_by_key(|e| e.start());

    let mut lines = vec![];
    for event in upcoming.iter().take(UPCOMING_LIMIT) {
        let kind_style = if event.is_seminar() {
            styles::highlight_style()
        } else {
            styles::muted_style()
        };
        lines.push(Line::from(vec![
            Span::styled(event.name.clone(), styles::list_item_style()),
            Span::styled(format!("  {}", event.event_type), kind_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", format_datetime(&event.start_datetime)),
            styles::muted_style(),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No upcoming events",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Upcoming ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
