mod app;
mod config;
mod ui;

use anyhow::{Context, Result};
use app::{AppEvent, AppScreen, AppState};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io, time::Duration};
use taskdeck_client::TaskApiClientBuilder;
use taskdeck_session::{RouteGuard, SessionStore};
use tokio::sync::mpsc;

/// Terminal client for the taskdeck task manager
#[derive(Debug, Parser)]
#[command(name = "taskdeck")]
struct Args {
    /// Backend server URL (overrides the config file)
    #[arg(long, env = "TASKDECK_SERVER_URL")]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = Config::load()?;
    if let Some(server_url) = args.server_url {
        config.server_url = server_url;
    }

    let session = SessionStore::open(Config::token_path()?)
        .context("Failed to open the persisted session")?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let hook_tx = event_tx.clone();
    let client = TaskApiClientBuilder::new(config.server_url.clone())
        .with_timeout(Duration::from_secs(30))
        .with_session(session)
        .on_auth_failure(move || {
            let _ = hook_tx.send(AppEvent::SessionExpired);
        })
        .build()
        .context("Failed to create API client")?;

    let mut app = AppState::new(client, RouteGuard::default());

    // The guard decides the entry screen: straight to the dashboard when a
    // token was restored, otherwise the login redirect.
    app.navigate(AppScreen::Dashboard);
    if app.screen == AppScreen::Dashboard {
        app.reload().await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &mut event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(());
        }

        match app.screen {
            AppScreen::Login | AppScreen::Register => {
                if handle_auth_key(app, key.code).await {
                    return Ok(());
                }
            }
            AppScreen::Dashboard => {
                if handle_dashboard_key(app, key.code).await {
                    return Ok(());
                }
            }
        }
    }
}

/// Key handling for the login and register screens. Returns true to quit.
async fn handle_auth_key(app: &mut AppState, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc => return true,
        KeyCode::Tab => app.next_auth_field(),
        KeyCode::F(2) => {
            let target = if app.screen == AppScreen::Login {
                AppScreen::Register
            } else {
                AppScreen::Login
            };
            app.status = None;
            app.auth_focus = app::AuthField::Email;
            app.navigate(target);
        }
        KeyCode::Enter => {
            if app.screen == AppScreen::Login {
                app.submit_login().await;
            } else {
                app.submit_register().await;
            }
        }
        KeyCode::Backspace => {
            app.focused_auth_field_mut().pop();
        }
        KeyCode::Char(c) => app.focused_auth_field_mut().push(c),
        _ => {}
    }
    false
}

/// Key handling for the dashboard. Returns true to quit.
async fn handle_dashboard_key(app: &mut AppState, code: KeyCode) -> bool {
    // Popups take the keys first.
    if (app.tasks.last_error().is_some() || app.status.is_some()) && code == KeyCode::Esc {
        app.dismiss_messages();
        return false;
    }
    if app.confirm_delete.is_some() {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => app.resolve_delete(true).await,
            KeyCode::Char('n') | KeyCode::Esc => app.resolve_delete(false).await,
            _ => {}
        }
        return false;
    }
    if app.form.is_some() {
        match code {
            KeyCode::Esc => app.close_form(),
            KeyCode::Tab => {
                if let Some(form) = &mut app.form {
                    form.focus = form.focus.next();
                }
            }
            KeyCode::Up | KeyCode::Down => {
                if let Some(form) = &mut app.form {
                    form.cycle_priority();
                }
            }
            KeyCode::Enter => app.submit_form().await,
            KeyCode::Backspace => {
                if let Some(form) = &mut app.form {
                    form.focused_field_mut().pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = &mut app.form {
                    form.focused_field_mut().push(c);
                }
            }
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('r') => app.reload().await,
        KeyCode::Char('n') => app.open_form(),
        KeyCode::Char(' ') => app.toggle_selected().await,
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('l') => app.logout(),
        KeyCode::Tab => app.cycle_filter(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        _ => {}
    }
    false
}
