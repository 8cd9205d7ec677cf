//! HomeWatch - a headless monitoring client for IoT home devices
//!
//! Wires the engine crates together for the `hwatch` binary: load
//! settings, restore the session, connect the account's real-time
//! channel, and stream classified notifications until interrupted.

use hwatch_app::{ApiClient, Diagnostics, FileStore, NotificationCenter, SessionManager, Settings};
use hwatch_core::prelude::*;
use hwatch_transport::{ConnectionManager, WsDialer};
use url::Url;

/// Watch the account's real-time channels and print classified
/// notifications until Ctrl-C.
///
/// Misconfiguration and a missing session are user-visible conditions,
/// not errors: they print an explanation and return cleanly.
pub async fn run_monitor(settings: Settings, headless: bool) -> Result<()> {
    let diagnostics = Diagnostics::check(&settings);
    let Some(socket_url) = settings.socket_url() else {
        eprintln!("{}", diagnostics.report());
        return Ok(());
    };

    let mut sessions = SessionManager::new(FileStore::default_location());
    let Some(session) = sessions.restore().cloned() else {
        eprintln!("no saved session; run `hwatch login <email> <password>` first");
        return Ok(());
    };

    let mut conn = ConnectionManager::new(WsDialer::new(), socket_url);
    let mut events = conn.subscribe();
    if !conn.connect(&session.account_id).await {
        eprintln!("could not reach the real-time backend; check the socket URL and try again");
        return Ok(());
    }

    let status = conn.status();
    info!(socket_id = ?status.socket_id, "monitoring account {}", session.account_id);
    if !headless {
        println!("connected; watching account {}", session.account_id);
    }

    let mut center = NotificationCenter::new(settings.retention_cap);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
            event = events.recv() => match event {
                Some(event) => {
                    let Some(notification) = center.ingest(&event) else {
                        continue;
                    };
                    if headless {
                        println!("{}", serde_json::to_string(&notification)?);
                    } else if notification.is_emergency() {
                        println!(
                            "!! EMERGENCY [{}] {}: {}",
                            notification.serial_number, notification.title, notification.body
                        );
                    } else {
                        println!(
                            "[{}] {}: {}",
                            notification.serial_number, notification.title, notification.body
                        );
                    }
                }
                None => break,
            },
        }
    }

    conn.disconnect_all();
    Ok(())
}

/// Authenticate against the backend and persist the session
pub async fn run_login(settings: &Settings, email: &str, password: &str) -> Result<()> {
    let Some(api_url) = settings.api_url() else {
        eprintln!("{}", Diagnostics::check(settings).report());
        return Ok(());
    };

    let api = ApiClient::new(api_url);
    let mut sessions = SessionManager::new(FileStore::default_location());
    let session = sessions.login(&api, email, password).await?;
    println!(
        "logged in as {} (account {})",
        session.user_id, session.account_id
    );
    Ok(())
}

/// Clear the persisted session and tear down any channels
pub fn run_logout(settings: &Settings) -> Result<()> {
    let mut sessions = SessionManager::new(FileStore::default_location());
    sessions.restore();

    let socket_url = settings
        .socket_url()
        .unwrap_or_else(|| Url::parse("ws://127.0.0.1/").expect("literal URL"));
    let mut conn = ConnectionManager::new(WsDialer::new(), socket_url);
    sessions.logout(&mut conn)?;
    println!("logged out");
    Ok(())
}

/// Print configuration diagnostics and session state
pub fn run_status(settings: &Settings) -> Result<()> {
    println!("{}", Diagnostics::check(settings).report());

    let mut sessions = SessionManager::new(FileStore::default_location());
    match sessions.restore() {
        Some(session) => println!(
            "session: {} (account {})",
            session.user_id, session.account_id
        ),
        None => println!("session: none"),
    }
    Ok(())
}
