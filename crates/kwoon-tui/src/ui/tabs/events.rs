use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Wrap},
    Frame,
};

use kwoon_core::capability::Capability;
use kwoon_core::models::{Branch, Event};
use kwoon_core::registration::RegistrationState;
use kwoon_core::utils::{format_date, format_datetime, format_fee, truncate};

use super::{field, list_title, render_table};
use crate::app::{App, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_event_list(frame, app, chunks[0]);
    render_event_detail(frame, app, chunks[1]);
}

fn render_event_list(frame: &mut Frame, app: &App, area: Rect) {
    let events = app.visible_events();

    let rows: Vec<Row> = events
        .iter()
        .map(|event| {
            let style = if event.is_completed {
                styles::muted_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(event.name.clone()),
                Cell::from(format_date(&event.start_datetime)),
                Cell::from(event.event_type.to_string()),
                Cell::from(event.capacity_display()),
            ])
            .style(style)
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        list_title(app, "Events", events.len()),
        &app.events,
        &[
            ("Name", Constraint::Fill(1)),
            ("Date", Constraint::Length(14)),
            ("Type", Constraint::Length(9)),
            ("Seats", Constraint::Length(7)),
        ],
        rows,
    );
}

fn state_style(state: RegistrationState) -> Style {
    match state {
        RegistrationState::Passed | RegistrationState::ApprovedForExam => styles::success_style(),
        RegistrationState::Failed => styles::error_style(),
        RegistrationState::AwaitingInstructorApproval | RegistrationState::ExamPending(_) => {
            styles::highlight_style()
        }
        RegistrationState::Registered => styles::list_item_style(),
        RegistrationState::Unregistered | RegistrationState::Closed => styles::muted_style(),
    }
}

fn render_event_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Detail;

    let lines = match app.selected_event() {
        Some(event) => detail_lines(app, event, area.width),
        None => vec![Line::from(Span::styled(
            "No event selected",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn detail_lines(app: &App, event: &Event, width: u16) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(event.name.clone(), styles::title_style())),
        Line::from(Span::styled(
            if event.is_completed {
                format!("{} · completed", event.event_type)
            } else {
                event.event_type.to_string()
            },
            styles::highlight_style(),
        )),
        Line::from(""),
        field("Start", format_datetime(&event.start_datetime)),
    ];
    if let Some(ref end) = event.end_datetime {
        lines.push(field("End", format_datetime(end)));
    }
    if let Some(ref location) = event.location {
        if !location.is_empty() {
            lines.push(field("Location", location.clone()));
        }
    }
    lines.push(field("Seats", event.capacity_display()));
    for branch in Branch::ALL {
        if let Some(fee) = event.fee_for(branch) {
            lines.push(field(
                if branch == Branch::WingTsun { "WT fee" } else { "Escrima fee" },
                format_fee(Some(fee)),
            ));
        }
    }

    if let Some(ref description) = event.description {
        if !description.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(description.clone()));
        }
    }

    if app.can(Capability::RegisterForEvents) {
        student_section(app, event, &mut lines);
    } else {
        registrant_section(app, event, width, &mut lines);
    }

    lines
}

/// The signed-in student's own standing and exam eligibility.
fn student_section(app: &App, event: &Event, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(""));

    match app.registration_state(event) {
        Some(state) => lines.push(Line::from(vec![
            Span::styled(format!("{:<11}", "Status"), styles::muted_style()),
            Span::styled(state.label().to_string(), state_style(state)),
        ])),
        None => lines.push(field("Status", "Exam taken - ask your instructor for results")),
    }

    if let Some(record) = app.my_registration(&event.id) {
        let branches: Vec<&str> = Branch::ALL
            .iter()
            .filter(|b| match b {
                Branch::WingTsun => record.register_wt,
                Branch::Escrima => record.register_escrima,
            })
            .map(|b| b.label())
            .collect();
        lines.push(field("Attending", branches.join(", ")));
        let exams: Vec<&str> = record.exam_branches().iter().map(|b| b.label()).collect();
        if !exams.is_empty() {
            lines.push(field("Exam", exams.join(", ")));
        }
    }

    if event.accepts_exams() {
        lines.push(Line::from(""));
        match app.exam_verdicts(&event.id) {
            Some(verdicts) => {
                lines.push(Line::from(Span::styled(
                    "Exam eligibility",
                    styles::highlight_style(),
                )));
                let reported = app.eligibility.get(&event.id);
                for branch in Branch::ALL {
                    let verdict = verdicts.verdict_for(branch);
                    let mut spans = vec![
                        Span::styled(format!("  {:<9}", branch.label()), styles::muted_style()),
                        Span::styled(verdict.label().to_string(), styles::verdict_style(verdict)),
                    ];
                    if let Some(hint) = reported.and_then(|e| e.hours_hint(branch)) {
                        spans.push(Span::styled(format!(" ({}h)", hint), styles::muted_style()));
                    }
                    lines.push(Line::from(spans));
                }
            }
            None if app.offline_mode => {}
            None => lines.push(Line::from(Span::styled(
                "Checking exam eligibility…",
                styles::muted_style(),
            ))),
        }
    }

    if !event.is_completed && app.my_registration(&event.id).is_none() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("r", styles::help_key_style()),
            Span::styled(" to register", styles::muted_style()),
        ]));
    }
}

/// Who registered, as seen by staff.
fn registrant_section(app: &App, event: &Event, width: u16, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(""));

    let Some(registrations) = app.registrations.get(&event.id) else {
        if !app.offline_mode {
            lines.push(Line::from(Span::styled(
                "Loading registrations…",
                styles::muted_style(),
            )));
        }
        return;
    };

    lines.push(Line::from(Span::styled(
        format!("Registrations ({})", registrations.len()),
        styles::highlight_style(),
    )));

    let name_width = (width as usize).saturating_sub(34).max(12);
    for registration in registrations {
        let exams: Vec<&str> = registration
            .exam_branches()
            .iter()
            .map(|b| b.short())
            .collect();
        let mut spans = vec![Span::styled(
            format!("  {:<w$}", truncate(registration.name(), name_width), w = name_width),
            styles::list_item_style(),
        )];
        if !exams.is_empty() {
            spans.push(Span::styled(
                format!(" exam {}", exams.join("+")),
                styles::muted_style(),
            ));
        }
        if let Some(state) = app.registrant_state(event, registration) {
            if registration.will_take_exam {
                spans.push(Span::styled(format!("  {}", state.label()), state_style(state)));
            }
        }
        lines.push(Line::from(spans));
    }

    if app.can(Capability::EvaluateSeminars)
        && event.accepts_exams()
        && registrations.iter().any(|r| r.is_evaluable())
    {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("v", styles::help_key_style()),
            Span::styled(" to evaluate", styles::muted_style()),
        ]));
    }
}
