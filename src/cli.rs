//! CLI argument parsing for the wablast binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wablast", about = "WaBlast bulk-messaging terminal client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the upload-gate state and server contact count
    Status,
    /// Parse a contact spreadsheet (.csv, .xlsx, .xls) and replace the
    /// server contact list. One-time per contact set.
    Upload {
        /// Path to the spreadsheet
        file: PathBuf,
    },
    /// List the contacts currently on the server
    List,
    /// Add a single contact (exempt from the one-time upload rule)
    Add {
        /// Contact name
        #[arg(long)]
        name: String,
        /// Phone number; normalized to +<digits> before sending
        #[arg(long)]
        phone: String,
        /// Email address
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete all server contacts and reset the upload gate
    Clear,
    /// Advance to the send-message step, permanently locking the contact
    /// list on this device
    Advance,
}
