//! Table screens: the school directory and the staff back-office lists.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Wrap},
    Frame,
};

use kwoon_core::models::{EnrollmentStatus, RequestStatus};
use kwoon_core::utils::{
    format_date, format_file_size, format_hours, format_optional_date, truncate,
};

use super::{field, list_title, render_table};
use crate::app::App;
use crate::ui::styles;

/// Rows shown per section on the My School page.
const MY_SCHOOL_SECTION_LIMIT: usize = 10;

fn dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

pub fn render_schools(frame: &mut Frame, app: &App, area: Rect) {
    let schools = app.visible_schools();
    let rows = schools
        .iter()
        .map(|s| {
            let style = if s.is_active {
                styles::list_item_style()
            } else {
                styles::muted_style()
            };
            Row::new(vec![
                Cell::from(s.name.clone()),
                Cell::from(dash(&s.address)),
                Cell::from(dash(&s.phone)),
                Cell::from(dash(&s.email)),
            ])
            .style(style)
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        list_title(app, "Schools", schools.len()),
        &app.schools,
        &[
            ("Name", Constraint::Percentage(30)),
            ("Address", Constraint::Fill(1)),
            ("Phone", Constraint::Length(16)),
            ("Email", Constraint::Length(28)),
        ],
        rows,
    );
}

pub fn render_students(frame: &mut Frame, app: &App, area: Rect) {
    let students = app.visible_students();
    let rows = students
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.name().to_string()),
                Cell::from(dash(&s.school_name)),
                Cell::from(s.grade_summary()),
                Cell::from(dash(&s.user_email)),
            ])
        })
        .collect();

    let title = format!(
        "{}- sorted by {} ",
        list_title(app, "Students", students.len()),
        app.student_sort.label()
    );

    render_table(
        frame,
        app,
        area,
        title,
        &app.students,
        &[
            ("Name", Constraint::Percentage(30)),
            ("School", Constraint::Percentage(25)),
            ("Grades", Constraint::Length(18)),
            ("Email", Constraint::Fill(1)),
        ],
        rows,
    );
}

pub fn render_enrollments(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .enrollments
        .items()
        .iter()
        .map(|e| {
            let key = format!("enrollment:{}", e.id);
            let status = if app.is_in_flight(&key) {
                ("Saving…".to_string(), styles::highlight_style())
            } else {
                let style = match e.status {
                    EnrollmentStatus::Approved => styles::success_style(),
                    EnrollmentStatus::Rejected => styles::error_style(),
                    EnrollmentStatus::Pending => styles::highlight_style(),
                };
                (e.status.label().to_string(), style)
            };
            Row::new(vec![
                Cell::from(e.user_name.clone().unwrap_or_else(|| e.user_id.clone())),
                Cell::from(dash(&e.user_email)),
                Cell::from(e.school_name.clone().unwrap_or_else(|| e.school_id.clone())),
                Cell::from(format_optional_date(&e.created_at)),
                Cell::from(Span::styled(status.0, status.1)),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!(" Pending enrollments ({}) ", app.enrollments.len()),
        &app.enrollments,
        &[
            ("Member", Constraint::Percentage(25)),
            ("Email", Constraint::Fill(1)),
            ("School", Constraint::Percentage(25)),
            ("Requested", Constraint::Length(14)),
            ("Status", Constraint::Length(10)),
        ],
        rows,
    );
}

pub fn render_lessons(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .lessons
        .items()
        .iter()
        .map(|l| {
            Row::new(vec![
                Cell::from(format_date(&l.lesson_date)),
                Cell::from(l.branch.label()),
                Cell::from(l.lesson_type.label()),
                Cell::from(dash(&l.school_name)),
                Cell::from(format!("{}h", format_hours(l.duration_hours))),
                Cell::from(l.attendance_count.to_string()),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!(" Lessons ({}) ", app.lessons.len()),
        &app.lessons,
        &[
            ("Date", Constraint::Length(14)),
            ("Branch", Constraint::Length(10)),
            ("Type", Constraint::Length(9)),
            ("School", Constraint::Fill(1)),
            ("Length", Constraint::Length(7)),
            ("Present", Constraint::Length(8)),
        ],
        rows,
    );
}

pub fn render_grades(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .grade_requirements
        .items()
        .iter()
        .map(|g| {
            Row::new(vec![
                Cell::from(g.branch.label()),
                Cell::from(g.grade.to_string()),
                Cell::from(g.grade_name.clone()),
                Cell::from(format!("{}h", format_hours(g.required_hours))),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!(" Grade requirements ({}) ", app.grade_requirements.len()),
        &app.grade_requirements,
        &[
            ("Branch", Constraint::Length(10)),
            ("Grade", Constraint::Length(6)),
            ("Name", Constraint::Fill(1)),
            ("Hours", Constraint::Length(8)),
        ],
        rows,
    );
}

pub fn render_products(frame: &mut Frame, app: &App, area: Rect) {
    let products = app.visible_products();
    let rows = products
        .iter()
        .map(|p| {
            let style = if p.is_active {
                styles::list_item_style()
            } else {
                styles::muted_style()
            };
            Row::new(vec![
                Cell::from(p.name.clone()),
                Cell::from(dash(&p.category_name)),
                Cell::from(p.size_list().join(", ")),
                Cell::from(truncate(p.description.as_deref().unwrap_or(""), 60)),
            ])
            .style(style)
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        list_title(app, "Products", products.len()),
        &app.products,
        &[
            ("Name", Constraint::Percentage(25)),
            ("Category", Constraint::Length(16)),
            ("Sizes", Constraint::Length(20)),
            ("Description", Constraint::Fill(1)),
        ],
        rows,
    );
}

pub fn render_requests(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .requests
        .items()
        .iter()
        .map(|r| {
            let key = format!("request:{}", r.id);
            let (status, style) = if app.is_in_flight(&key) {
                ("Saving…", styles::highlight_style())
            } else {
                let style = match r.status {
                    RequestStatus::Approved => styles::success_style(),
                    RequestStatus::Rejected => styles::error_style(),
                    RequestStatus::Pending => styles::highlight_style(),
                };
                (r.status.label(), style)
            };
            Row::new(vec![
                Cell::from(r.request_type.label()),
                Cell::from(r.subject()),
                Cell::from(dash(&r.student_name)),
                Cell::from(format_optional_date(&r.created_at)),
                Cell::from(Span::styled(status, style)),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!(" Requests ({}) ", app.requests.len()),
        &app.requests,
        &[
            ("Type", Constraint::Length(14)),
            ("Subject", Constraint::Fill(1)),
            ("Student", Constraint::Percentage(20)),
            ("Created", Constraint::Length(14)),
            ("Status", Constraint::Length(10)),
        ],
        rows,
    );
}

pub fn render_mail(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .mail_logs
        .items()
        .iter()
        .map(|m| {
            Row::new(vec![
                Cell::from(m.subject.clone()),
                Cell::from(dash(&m.sender_name)),
                Cell::from(m.recipient_count.to_string()),
                Cell::from(format_optional_date(&m.created_at)),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!(" Sent mail ({}) ", app.mail_logs.len()),
        &app.mail_logs,
        &[
            ("Subject", Constraint::Fill(1)),
            ("From", Constraint::Percentage(20)),
            ("To", Constraint::Length(6)),
            ("Sent", Constraint::Length(14)),
        ],
        rows,
    );
}

pub fn render_media(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app
        .media
        .items()
        .iter()
        .map(|m| {
            let size = if m.file_size > 0 {
                format_file_size(m.file_size)
            } else {
                "-".to_string()
            };
            Row::new(vec![
                Cell::from(m.display_name().to_string()),
                Cell::from(m.media_type.label()),
                Cell::from(size),
                Cell::from(m.link().to_string()),
            ])
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        format!(" Media ({}) ", app.media.len()),
        &app.media,
        &[
            ("Title", Constraint::Percentage(30)),
            ("Type", Constraint::Length(8)),
            ("Size", Constraint::Length(9)),
            ("Link", Constraint::Fill(1)),
        ],
        rows,
    );
}

pub fn render_users(frame: &mut Frame, app: &App, area: Rect) {
    let users = app.visible_users();
    let rows = users
        .iter()
        .map(|u| {
            let style = if u.is_active() {
                styles::list_item_style()
            } else {
                styles::muted_style()
            };
            Row::new(vec![
                Cell::from(u.titled_name()),
                Cell::from(u.email.clone()),
                Cell::from(u.role.label()),
                Cell::from(u.status.label()),
            ])
            .style(style)
        })
        .collect();

    render_table(
        frame,
        app,
        area,
        list_title(app, "Users", users.len()),
        &app.users,
        &[
            ("Name", Constraint::Percentage(30)),
            ("Email", Constraint::Fill(1)),
            ("Role", Constraint::Length(12)),
            ("Status", Constraint::Length(9)),
        ],
        rows,
    );
}

pub fn render_my_school(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref mine) = app.my_school else {
        let text = if app.offline_mode {
            "Nothing cached yet"
        } else {
            "Loading…"
        };
        let block = Block::default()
            .title(" My School ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, styles::muted_style()))).block(block),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let school = &mine.school;
    let mut info = vec![
        Line::from(Span::styled(school.name.clone(), styles::title_style())),
        Line::from(""),
        field("Address", dash(&school.address)),
        field("Phone", dash(&school.phone)),
        field("Email", dash(&school.email)),
    ];
    if let Some(ref description) = school.description {
        info.push(Line::from(""));
        info.push(Line::from(description.clone()));
    }
    info.push(Line::from(""));
    info.push(Line::from(Span::styled(
        "Instructors",
        styles::highlight_style(),
    )));
    if mine.instructors.is_empty() {
        info.push(Line::from(Span::styled("  None listed", styles::muted_style())));
    }
    for instructor in &mine.instructors {
        info.push(Line::from(vec![
            Span::styled(format!("  {}", instructor.titled_name()), styles::list_item_style()),
            Span::styled(
                instructor
                    .email
                    .as_ref()
                    .map(|e| format!("  {}", e))
                    .unwrap_or_default(),
                styles::muted_style(),
            ),
        ]));
    }

    let block = Block::default()
        .title(" My School ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(
        Paragraph::new(info).block(block).wrap(Wrap { trim: false }),
        chunks[0],
    );

    let mut recent = vec![Line::from(Span::styled(
        "Recent lessons",
        styles::highlight_style(),
    ))];
    if mine.lessons.is_empty() {
        recent.push(Line::from(Span::styled("  None yet", styles::muted_style())));
    }
    for lesson in mine.lessons.iter().take(MY_SCHOOL_SECTION_LIMIT) {
        recent.push(Line::from(vec![
            Span::styled(format!("  {:<14}", format_date(&lesson.lesson_date)), styles::muted_style()),
            Span::raw(format!("{} · {}", lesson.branch.label(), lesson.lesson_type.label())),
        ]));
    }

    recent.push(Line::from(""));
    recent.push(Line::from(Span::styled("Gallery", styles::highlight_style())));
    if mine.media.is_empty() {
        recent.push(Line::from(Span::styled("  Nothing uploaded", styles::muted_style())));
    }
    for media in mine.media.iter().take(MY_SCHOOL_SECTION_LIMIT) {
        recent.push(Line::from(vec![
            Span::styled(format!("  {:<8}", media.media_type.label()), styles::muted_style()),
            Span::raw(media.display_name().to_string()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(recent).block(block), chunks[1]);
}
