//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use kwoon_core::capability::Screen;

use crate::app::{
    can_add_email_char, can_add_password_char, App, AppState, Focus, LoginFocus,
    PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Registering => {
            handle_registration_input(app, key);
            return Ok(false);
        }
        AppState::Evaluating => {
            handle_evaluation_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '0'..='9') => {
            // 1-9 pick the first nine screens, 0 the tenth
            let index = match c.to_digit(10) {
                Some(0) => 9,
                Some(d) => d as usize - 1,
                None => return Ok(false),
            };
            if let Some(screen) = app.navigation().get(index).copied() {
                app.go_to(screen);
            }
        }
        KeyCode::Left => app.prev_screen(),
        KeyCode::Right => app.next_screen(),
        KeyCode::Tab => {
            // Only the events screen has a detail panel
            if app.screen == Screen::Events {
                app.focus = match app.focus {
                    Focus::List => Focus::Detail,
                    Focus::Detail => Focus::List,
                };
            }
        }
        KeyCode::Char('u') => {
            app.refresh_all_background();
        }
        KeyCode::Char('o') => {
            app.toggle_offline();
        }
        KeyCode::Char('L') => {
            app.logout();
        }
        KeyCode::Char('/') => {
            if app.is_searchable() {
                app.state = AppState::Searching;
                app.search_query.clear();
                app.reset_selection();
            }
        }
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.search_query.clear();
                app.reset_selection();
            }
            app.focus = Focus::List;
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.reset_selection(),
        KeyCode::End => app.select_last(),
        _ => handle_screen_input(app, key),
    }

    Ok(false)
}

/// Keys that only mean something on one screen.
fn handle_screen_input(app: &mut App, key: KeyEvent) {
    match (app.screen, key.code) {
        (Screen::Events, KeyCode::Char('r')) => app.open_registration(),
        (Screen::Events, KeyCode::Char('v')) => app.open_evaluation(),
        (Screen::PendingEnrollments, KeyCode::Char('a')) => app.review_selected_enrollment(true),
        (Screen::PendingEnrollments, KeyCode::Char('x')) => app.review_selected_enrollment(false),
        (Screen::Requests, KeyCode::Char('a')) => app.handle_selected_request(true),
        (Screen::Requests, KeyCode::Char('x')) => app.handle_selected_request(false),
        (Screen::Schools, KeyCode::Char('e')) => app.request_enrollment_for_selected(),
        (Screen::Students, KeyCode::Char('s')) => app.cycle_student_sort(),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            // Keep the filter applied
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            app.search_query.push(c);
        }
        _ => return,
    }
    app.reset_selection();
}

fn handle_registration_input(app: &mut App, key: KeyEvent) {
    let Some(ref mut draft) = app.registration_draft else {
        app.state = AppState::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => app.cancel_registration(),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => draft.move_cursor(false),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => draft.move_cursor(true),
        KeyCode::Char(' ') => {
            draft.toggle();
        }
        KeyCode::Enter => {
            // Enter on a checkbox toggles it; on the button it submits
            if !draft.toggle() {
                app.submit_registration();
            }
        }
        _ => {}
    }
}

fn handle_evaluation_input(app: &mut App, key: KeyEvent) {
    let Some(ref mut draft) = app.evaluation_draft else {
        app.state = AppState::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => app.cancel_evaluation(),
        KeyCode::Up | KeyCode::Char('k') => draft.move_cursor(false),
        KeyCode::Down | KeyCode::Char('j') => draft.move_cursor(true),
        KeyCode::Char(' ') => draft.toggle(),
        KeyCode::Enter => app.submit_evaluation(),
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                // On failure login_error is set and the overlay stays up
                if app.attempt_login().await.is_ok() {
                    app.refresh_all_background();
                }
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.len(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
