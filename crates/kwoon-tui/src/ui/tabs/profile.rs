use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use kwoon_core::utils::format_optional_date;

use super::{branch_progress_lines, field};
use crate::app::App;
use crate::ui::styles;

/// Students see their training record; other roles see their account.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    match (&app.profile, &app.auth) {
        (Some(profile), _) => {
            lines.push(Line::from(Span::styled(
                profile.full_name(),
                styles::title_style(),
            )));
            lines.push(Line::from(""));
            lines.push(field("Email", profile.email.clone()));
            lines.push(field(
                "Phone",
                profile.phone.clone().unwrap_or_else(|| "-".to_string()),
            ));
            lines.push(field(
                "School",
                profile
                    .school_name
                    .clone()
                    .unwrap_or_else(|| "Not enrolled".to_string()),
            ));
            if let Some(ref avatar) = profile.avatar_url {
                lines.push(field("Avatar", avatar.clone()));
            }

            if profile.progress.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "No grades recorded yet",
                    styles::muted_style(),
                )));
            }
            for branch in &profile.progress {
                lines.push(Line::from(""));
                lines.extend(branch_progress_lines(branch));
            }
        }
        (None, Some(auth)) => {
            let user = &auth.user;
            lines.push(Line::from(Span::styled(
                user.titled_name(),
                styles::title_style(),
            )));
            lines.push(Line::from(""));
            lines.push(field("Email", user.email.clone()));
            lines.push(field(
                "Phone",
                user.phone.clone().unwrap_or_else(|| "-".to_string()),
            ));
            lines.push(field("Role", auth.role_label()));
            lines.push(field("Status", user.status.label()));
            lines.push(field("Joined", format_optional_date(&user.created_at)));
            if user.can_upload_media {
                lines.push(field("Media", "May upload to the gallery"));
            }
        }
        (None, None) => {
            lines.push(Line::from(Span::styled("Loading…", styles::muted_style())));
        }
    }

    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
