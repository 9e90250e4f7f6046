use ratatui::style::{Color, Modifier, Style};

use kwoon_core::notice::NoticeLevel;
use kwoon_core::progress::{EligibilityVerdict, ProgressStatus};

// Color palette
pub const PRIMARY: Color = Color::Rgb(192, 48, 48);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(208, 168, 64);
pub const ERROR: Color = Color::Rgb(200, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(56, 40, 40);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn notice_style(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Info => highlight_style(),
        NoticeLevel::Success => success_style(),
        NoticeLevel::Error => error_style(),
    }
}

/// Gauge color: green when ready, amber when the minimum is met.
pub fn progress_style(status: ProgressStatus) -> Style {
    match status {
        ProgressStatus::Ready => success_style(),
        ProgressStatus::Approve => highlight_style(),
        ProgressStatus::InProgress => Style::default().fg(PRIMARY),
    }
}

pub fn verdict_style(verdict: EligibilityVerdict) -> Style {
    match verdict {
        EligibilityVerdict::Eligible => success_style(),
        EligibilityVerdict::NeedsApproval => highlight_style(),
        EligibilityVerdict::NotEligible => error_style(),
    }
}
