use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use kwoon_core::capability::{Capability, Screen};
use kwoon_core::models::{Branch, EventEligibility};
use kwoon_core::registration::ExamVerdicts;

use crate::app::{App, AppState, FormRow, LoginFocus};

use super::styles;
use super::tabs::{dashboard, directory, events, profile};

const LOGO: [&str; 3] = [
    "   ╦╔═╦ ╦╔═╗╔═╗╔╗╔",
    "   ╠╩╗║║║║ ║║ ║║║║",
    "   ╩ ╩╚╩╝╚═╝╚═╝╝╚╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Navigation
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_navigation(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Registering => render_registration_overlay(frame, app),
        AppState::Evaluating => render_evaluation_overlay(frame, app),
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  kwoon";
    let user = match app.auth {
        Some(ref auth) => format!("{} · {}  [?] Help", auth.display_name(), auth.role_label()),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + user.chars().count() + 2),
        )),
        Span::styled(user, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

/// Digit shortcut for a navigation slot: 1-9, then 0 for the tenth.
pub fn screen_key(index: usize) -> Option<char> {
    match index {
        0..=8 => char::from_digit(index as u32 + 1, 10),
        9 => Some('0'),
        _ => None,
    }
}

fn render_navigation(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, screen) in app.navigation().into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = match screen_key(i) {
            Some(key) => format!("[{}] {}", key, screen.title()),
            None => screen.title().to_string(),
        };
        spans.push(Span::styled(label, styles::tab_style(screen == app.screen)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.screen {
        Screen::Dashboard => dashboard::render(frame, app, area),
        Screen::Profile => profile::render(frame, app, area),
        Screen::MySchool => directory::render_my_school(frame, app, area),
        Screen::Schools => directory::render_schools(frame, app, area),
        Screen::Students => directory::render_students(frame, app, area),
        Screen::PendingEnrollments => directory::render_enrollments(frame, app, area),
        Screen::Lessons => directory::render_lessons(frame, app, area),
        Screen::Events => events::render(frame, app, area),
        Screen::Grades => directory::render_grades(frame, app, area),
        Screen::Products => directory::render_products(frame, app, area),
        Screen::Requests => directory::render_requests(frame, app, area),
        Screen::Mail => directory::render_mail(frame, app, area),
        Screen::Media => directory::render_media(frame, app, area),
        Screen::Users => directory::render_users(frame, app, area),
    }
}

/// Keys that act on the current screen, shown on the right of the status bar.
fn screen_shortcuts(app: &App) -> &'static str {
    match app.screen {
        Screen::Events if app.can(Capability::RegisterForEvents) => "[r]egister | ",
        Screen::Events if app.can(Capability::EvaluateSeminars) => "e[v]aluate | ",
        Screen::PendingEnrollments => "[a]pprove [x] reject | ",
        Screen::Requests if app.can(Capability::HandleRequests) => "[a]pprove [x] reject | ",
        Screen::Schools if app.can(Capability::RequestEnrollment) => "[e]nroll | ",
        Screen::Students => "[s]ort | ",
        _ => "",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (left_text, left_style) = if app.state == AppState::Searching {
        (format!(" Search: {}▌", app.search_query), styles::search_style())
    } else if let Some(notice) = app.current_notice() {
        (format!(" {} ", notice.message), styles::notice_style(notice.level))
    } else if app.refreshing {
        (" Refreshing… ".to_string(), styles::highlight_style())
    } else if !app.search_query.is_empty() {
        (
            format!(" Filter: {} (Esc to clear) ", app.search_query),
            styles::search_style(),
        )
    } else {
        (
            format!(" Updated {} ", app.cache_ages.last_updated()),
            styles::muted_style(),
        )
    };

    let mode = if app.offline_mode { "OFFLINE | " } else { "" };
    let right_text = format!(
        " {}{}[u]pdate | [o]ffline | [q]uit ",
        mode,
        screen_shortcuts(app)
    );

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect()
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines();
    help_text.push(Line::from(Span::styled(
        format!("   version {}", version),
        styles::muted_style(),
    )));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Navigation", styles::highlight_style())));
    help_text.push(help_line("1-9, 0", "Jump to screen"));
    help_text.push(help_line("←/→", "Previous/next screen"));
    help_text.push(help_line("Tab", "Switch focus (list ↔ detail)"));
    help_text.push(help_line("↑/↓ j/k", "Navigate list"));
    help_text.push(help_line("PgUp/PgDn", "Scroll a page"));
    help_text.push(help_line("Esc", "Clear filter / go back"));
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(" Actions", styles::highlight_style())));
    help_text.push(help_line("/", "Filter the list"));
    help_text.push(help_line("u", "Update data from the server"));
    help_text.push(help_line("o", "Toggle offline mode"));
    help_text.push(help_line("L", "Log out"));
    help_text.push(help_line("q", "Quit"));

    let mut screen_keys = Vec::new();
    if app.can(Capability::RegisterForEvents) {
        screen_keys.push(help_line("r", "Register for the selected event"));
    }
    if app.can(Capability::EvaluateSeminars) {
        screen_keys.push(help_line("v", "Evaluate the selected seminar"));
    }
    if app.can(Capability::ReviewEnrollments) || app.can(Capability::HandleRequests) {
        screen_keys.push(help_line("a / x", "Approve / reject selected"));
    }
    if app.can(Capability::RequestEnrollment) {
        screen_keys.push(help_line("e", "Request enrollment at a school"));
    }
    if app.can(Capability::ViewStudents) {
        screen_keys.push(help_line("s", "Cycle student sort"));
    }
    if !screen_keys.is_empty() {
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(" Screens", styles::highlight_style())));
        help_text.extend(screen_keys);
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(vec![
        Span::styled("       Press ", styles::muted_style()),
        Span::styled("?", styles::help_key_style()),
        Span::styled(" or ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" to close", styles::muted_style()),
    ]));

    let area = centered_rect_fixed(52, help_text.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn input_style(focused: bool) -> Style {
    if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    }
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    // Fixed size dialog - compact
    let height = if app.login_error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(52, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    // Long addresses scroll: show the tail so the cursor stays visible
    let email_focused = app.login_focus == LoginFocus::Email;
    let email_tail: String = {
        let chars: Vec<char> = app.login_email.chars().collect();
        chars[chars.len().saturating_sub(28)..].iter().collect()
    };
    let cursor = if email_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Email:    [", styles::muted_style()),
        Span::styled(
            format!("{:<28}{}", email_tail, cursor),
            input_style(email_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(28));
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(
            format!("{:<28}{}", password_masked, cursor),
            input_style(password_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let label = if button_focused {
        " ▶ Login ◀ "
    } else {
        "   Login   "
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("               ["),
        Span::styled(label, input_style(button_focused)),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(format!(" {} ", app.config.base_url()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn checkbox(on: bool) -> &'static str {
    if on {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_registration_overlay(frame: &mut Frame, app: &App) {
    let Some(ref draft) = app.registration_draft else {
        return;
    };
    let eligibility = app.eligibility.get(&draft.event_id);
    let verdicts = app.exam_verdicts(&draft.event_id);
    let event = app.events.items().iter().find(|e| e.id == draft.event_id);

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {} ({})", draft.event_name, draft.event_type),
            styles::title_style(),
        )),
        Line::from(""),
    ];

    for (i, row) in draft.rows().into_iter().enumerate() {
        let style = input_style(i == draft.cursor);
        let line = match row {
            FormRow::Register(branch) => {
                let fee = event
                    .and_then(|e| e.fee_for(branch))
                    .map(|f| format!("  {}", kwoon_core::utils::format_fee(Some(f))))
                    .unwrap_or_default();
                Line::from(vec![
                    Span::styled(
                        format!(" {} Attend {}", checkbox(draft.form.registers_for(branch)), branch.label()),
                        style,
                    ),
                    Span::styled(fee, styles::muted_style()),
                ])
            }
            FormRow::TakeExam => Line::from(Span::styled(
                format!(" {} Take a grading exam", checkbox(draft.form.will_take_exam)),
                style,
            )),
            FormRow::Exam(branch) => {
                exam_row(branch, draft.form.exam_in(branch), style, verdicts, eligibility)
            }
            FormRow::Submit => {
                lines.push(Line::from(""));
                Line::from(vec![
                    Span::raw("          ["),
                    Span::styled("  Submit  ", style),
                    Span::raw("]"),
                ])
            }
        };
        lines.push(line);
    }

    if draft.form.will_take_exam && verdicts.is_none() {
        lines.push(Line::from(Span::styled(
            " Checking exam eligibility…",
            styles::muted_style(),
        )));
    }

    if let Some(ref error) = draft.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Space", styles::help_key_style()),
        Span::styled(" toggle  ", styles::muted_style()),
        Span::styled("Enter", styles::help_key_style()),
        Span::styled(" submit  ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let area = centered_rect_fixed(56, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Register ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn exam_row(
    branch: Branch,
    on: bool,
    style: Style,
    verdicts: Option<ExamVerdicts>,
    eligibility: Option<&EventEligibility>,
) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("     {} {} exam", checkbox(on), branch.label()),
        style,
    )];
    if let Some(verdicts) = verdicts {
        let verdict = verdicts.verdict_for(branch);
        spans.push(Span::styled(
            format!("  {}", verdict.label()),
            styles::verdict_style(verdict),
        ));
    }
    if let Some(hint) = eligibility.and_then(|e| e.hours_hint(branch)) {
        spans.push(Span::styled(format!(" ({}h)", hint), styles::muted_style()));
    }
    Line::from(spans)
}

fn render_evaluation_overlay(frame: &mut Frame, app: &App) {
    let Some(ref draft) = app.evaluation_draft else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", draft.event_name),
            styles::title_style(),
        )),
        Line::from(Span::styled(
            " Mark who passed. Unmarked candidates fail.",
            styles::muted_style(),
        )),
        Line::from(""),
    ];

    for (i, candidate) in draft.candidates.iter().enumerate() {
        let branches: Vec<&str> = candidate
            .exam_branches()
            .iter()
            .map(|b| b.short())
            .collect();
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} {}", checkbox(draft.is_passed(candidate)), candidate.name()),
                input_style(i == draft.cursor),
            ),
            Span::styled(format!("  {}", branches.join(", ")), styles::muted_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Space", styles::help_key_style()),
        Span::styled(" pass/fail  ", styles::muted_style()),
        Span::styled("Enter", styles::help_key_style()),
        Span::styled(" submit  ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let area = centered_rect_fixed(56, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" Evaluate · {} passed ", draft.passed.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_key() {
        assert_eq!(screen_key(0), Some('1'));
        assert_eq!(screen_key(8), Some('9'));
        assert_eq!(screen_key(9), Some('0'));
        assert_eq!(screen_key(10), None);
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 40, 10);
        let r = centered_rect_fixed(20, 4, outer);
        assert_eq!(r, Rect::new(10, 3, 20, 4));

        let clipped = centered_rect_fixed(80, 30, outer);
        assert_eq!(clipped.width, 40);
        assert_eq!(clipped.height, 10);
    }
}
