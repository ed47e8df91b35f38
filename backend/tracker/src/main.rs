use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use records::{Status, payloads::SubmitRequest, relative_time};
use tracker::{
    api::{ApiClient, DEFAULT_SERVER},
    history::{HISTORY_KEY, History},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    #[arg(long, default_value_t = format!("{HISTORY_KEY}.json"))]
    history: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report a damaged road
    Submit {
        #[arg(long)]
        phone: String,

        #[arg(long)]
        area: String,

        #[arg(long)]
        location: String,

        /// 1 = Mild, 2 = Moderate, 3 = Severe
        #[arg(long)]
        severity: String,

        #[arg(long)]
        description: Option<String>,
    },

    Track {
        ref_id: String,
    },

    /// Complaints submitted from this machine
    History,

    /// Re-track every complaint in the local history
    Refresh,

    Stats,

    Login {
        username: String,

        password: String,
    },

    List {
        #[arg(long)]
        status: Option<Status>,
    },

    SetStatus {
        ref_id: String,

        status: Status,
    },

    Delete {
        ref_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let client = ApiClient::new(&args.server);
    let history_path = PathBuf::from(args.history);

    match args.command {
        Command::Submit {
            phone,
            area,
            location,
            severity,
            description,
        } => {
            let request = SubmitRequest {
                phone: Some(phone),
                area: Some(area),
                location: Some(location),
                severity: Some(severity),
                description,
            };

            let ref_id = tracker::submit(&client, &history_path, request).await?;
            println!("Complaint submitted. Reference ID: {ref_id}");
        }
        Command::Track { ref_id } => {
            match tracker::track(&client, &history_path, &ref_id).await? {
                Some(tracking) => {
                    println!("{}: {}", tracking.ref_id, tracking.status);
                    for entry in tracking.timeline {
                        println!("  {} • {}", entry.text, entry.time);
                    }
                }
                None => {
                    println!("Reference ID not found. It may have been removed by a moderator.");
                }
            }
        }
        Command::History => {
            let history = History::load(&history_path)?;

            if history.entries().is_empty() {
                println!("No complaints submitted yet.");
            }

            let now = Utc::now();
            for entry in history.entries() {
                println!(
                    "{}  {}  {}  {}  {}",
                    entry.ref_id,
                    entry.location,
                    entry.severity_label(),
                    entry.status,
                    relative_time(entry.updated_at, now)
                );
            }
        }
        Command::Refresh => {
            let summary = tracker::refresh(&client, &history_path).await?;

            println!("Updated: {}", summary.updated);
            println!("Removed: {}", summary.removed);
            if summary.failed > 0 {
                println!("Could not reach the server for {}", summary.failed);
            }
        }
        Command::Stats => {
            let stats = client.stats().await?;

            println!("Roads fixed: {}", stats.roads_fixed);
            println!("Success rate: {}%", stats.success_rate);
        }
        Command::Login { username, password } => {
            println!("{}", client.login(&username, &password).await?);
        }
        Command::List { status } => {
            for complaint in client.list(status).await? {
                println!(
                    "{}  {}  {} ({})  {}  {}  {}",
                    complaint.ref_id,
                    complaint.created_at.format("%-d/%-m/%Y"),
                    complaint.location,
                    complaint.area,
                    complaint.severity.label(),
                    complaint.phone,
                    complaint.status
                );
            }
        }
        Command::SetStatus { ref_id, status } => {
            if tracker::set_status(&client, &history_path, &ref_id, status).await? {
                println!("{ref_id} set to {status}");
            } else {
                println!("{ref_id} not found");
            }
        }
        Command::Delete { ref_id } => {
            if tracker::delete(&client, &history_path, &ref_id).await? {
                println!("{ref_id} deleted");
            } else {
                println!("{ref_id} not found");
            }
        }
    }

    Ok(())
}
