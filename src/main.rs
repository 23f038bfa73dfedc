//! WaBlast terminal client
//!
//! Drives the "upload contacts → send messages" wizard against the WaBlast
//! backend API: spreadsheet ingestion, the one-time upload gate, and the
//! contact list commands.

mod cli;
mod config;
mod gate;
mod ingest;
mod services;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use gate::flags::FlagStore;
use gate::GateState;
use services::contacts_api::ContactsApi;
use services::wizard::Wizard;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = config::Config::from_env()?;

    // File appender for persistent logs (daily rotation) in the state dir
    let logs_dir = config.state_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "wablast.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stderr and file. Stderr keeps command
    // output on stdout clean; RUST_LOG raises verbosity for both layers.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "wablast=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)) // stderr
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        ) // file
        .init();

    info!("wablast starting against {}", config.api_url);

    let backend = ContactsApi::new(&config.api_url, config.api_token.clone());
    let flags = FlagStore::new(&config.state_dir);
    let wizard = Wizard::new(backend, flags);

    match args.command {
        Command::Status => {
            let status = wizard.status().await?;
            println!("Gate state:      {}", state_label(status.state));
            println!("Server contacts: {}", status.server.contacts_count);
            if let Some(name) = &status.flags.last_uploaded_file_name {
                println!("Last upload:     {}", name);
            }
            println!("Bulk upload:     {}", permission(status.state.can_upload()));
            println!("Clear-all:       {}", permission(status.state.can_clear_all()));
            println!("Manual add:      {}", permission(status.state.can_add_manual()));
        }
        Command::Upload { file } => {
            let summary = wizard.upload_file(&file).await?;
            println!(
                "✓ File \"{}\" uploaded successfully! Imported {} contacts.",
                summary.file_name, summary.imported_count
            );
            if summary.rejected_count > 0 {
                println!("{} rows rejected:", summary.rejected_count);
                for error in summary.row_errors.as_deref().unwrap_or_default() {
                    println!("  {}", error);
                }
            }
        }
        Command::List => {
            let contacts = wizard.list_contacts().await?;
            if contacts.is_empty() {
                println!("No contacts on the server.");
            }
            for contact in contacts {
                match &contact.email {
                    Some(email) => println!("{}  {}  {}", contact.phone, contact.name, email),
                    None => println!("{}  {}", contact.phone, contact.name),
                }
            }
        }
        Command::Add { name, phone, email } => {
            let contact = wizard
                .add_contact(&name, &phone, email.as_deref())
                .await?;
            println!("Added {} ({})", contact.name, contact.phone);
        }
        Command::Clear => {
            wizard.clear_all().await?;
            println!("All contacts deleted. A new upload is now possible.");
        }
        Command::Advance => {
            wizard.advance_to_send().await?;
            println!("Advanced to the send step. The contact list is now locked on this device.");
        }
    }

    Ok(())
}

fn permission(allowed: bool) -> &'static str {
    if allowed {
        "allowed"
    } else {
        "blocked"
    }
}

fn state_label(state: GateState) -> &'static str {
    match state {
        GateState::Empty => "empty (upload available)",
        GateState::UploadedUnlocked => "uploaded (clear-all available, upload blocked)",
        GateState::UploadedLocked => "locked (upload and clear-all disabled)",
    }
}
