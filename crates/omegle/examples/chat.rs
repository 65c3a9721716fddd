//! Chat with a stranger from the terminal
//!
//! Starts a session from environment settings, greets whoever is matched and
//! prints everything that arrives until the conversation ends.
//!
//! ## Usage
//!
//! ```bash
//! # Random stranger
//! cargo run --example chat --features trace
//!
//! # Matched on shared interests
//! OMEGLE_TOPICS=rust,music cargo run --example chat --features trace
//!
//! # Spy mode: watch two strangers discuss a question
//! OMEGLE_QUESTION="Is a hot dog a sandwich?" cargo run --example chat --features trace
//! ```

use omegle::{Event, EventKind, Session, SessionConfig};
use tracing_subscriber::EnvFilter;

const GREETING: &str = "Hi! I'm a bot written in Rust, say hello back.";

fn describe(event: &Event) -> Option<String> {
    match event.kind() {
        EventKind::Waiting => Some("⏳ Waiting for a stranger...".to_string()),
        EventKind::Connected => Some("🔗 Connected".to_string()),
        EventKind::Question => Some(format!("❓ {}", event.arg_str(0).unwrap_or_default())),
        EventKind::GotMessage => Some(format!(
            "Stranger: {}",
            event.arg_str(0).unwrap_or_default()
        )),
        EventKind::SpyMessage => Some(format!(
            "{}: {}",
            event.arg_str(0).unwrap_or("Stranger"),
            event.arg_str(1).unwrap_or_default()
        )),
        EventKind::StrangerDisconnected => Some("👋 Stranger disconnected".to_string()),
        EventKind::SpyDisconnected => Some(format!(
            "👋 {} disconnected",
            event.arg_str(0).unwrap_or("Stranger")
        )),
        EventKind::RecaptchaRequired | EventKind::RecaptchaRejected => {
            Some("🤖 The service wants a CAPTCHA solved, giving up".to_string())
        }
        EventKind::Typing
        | EventKind::StoppedTyping
        | EventKind::SpyTyping
        | EventKind::SpyStoppedTyping => None,
        _ => Some(format!("· {event}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = SessionConfig::from_env()?;
    println!("🚀 Connecting to {} ({:?})\n", config.host, config.mode);

    let delivered = Session::run(config, |session| async move {
        let spy = session.is_spy_mode();
        let handle = session.clone();

        session
            .listen(move |event| {
                let handle = handle.clone();
                async move {
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }

                    match event.kind() {
                        EventKind::Connected if !spy => {
                            if let Err(err) = handle.send_message(GREETING).await {
                                eprintln!("❌ Failed to greet: {err}");
                            }
                            println!("You: {GREETING}");
                        }
                        EventKind::RecaptchaRequired | EventKind::RecaptchaRejected => {
                            let _ = handle.disconnect().await;
                        }
                        kind if kind.ends_conversation() && handle.is_connected() => {
                            let _ = handle.disconnect().await;
                        }
                        _ => {}
                    }
                }
            })
            .await
    })
    .await??;

    println!("\n✅ Conversation over, {delivered} events received");
    Ok(())
}
