use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facedesk_client::ApiClient;
use facedesk_core::{
    ApiError, ApiResponse, Notifier, Outcome, ResultView, SelectedFile, Severity, Workflow, CONNECT_FAILED,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use output::TerminalNotifier;

#[derive(Parser)]
#[command(name = "facedesk", version, about = "Admin client for the face-recognition backend")]
struct Cli {
    /// TOML config file (default: $XDG_CONFIG_HOME/facedesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend origin, e.g. http://127.0.0.1:8000
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Print response bodies as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test recognition of a single image
    Recognize {
        /// Image file (JPG, PNG, WebP, ...)
        image: PathBuf,
    },
    /// Enroll a new person
    Enroll {
        #[arg(short, long)]
        name: String,
        /// Free-text description of the person
        #[arg(short, long, default_value = "")]
        info: String,
        /// Image of the person; repeat for several
        #[arg(long = "image", required = true)]
        images: Vec<PathBuf>,
        /// Do not rebuild the identity index afterwards
        #[arg(long)]
        no_rebuild: bool,
    },
    /// Add an image to an enrolled person
    AddImage {
        person: String,
        image: PathBuf,
        #[arg(long)]
        no_rebuild: bool,
    },
    /// Delete a person and all their images
    DeletePerson {
        person: String,
        #[arg(long)]
        no_rebuild: bool,
    },
    /// Delete one stored image of a person
    DeleteImage {
        person: String,
        filename: String,
        #[arg(long)]
        no_rebuild: bool,
    },
    /// Trigger an identity index rebuild
    Rebuild {
        /// Poll until the rebuild finishes
        #[arg(long)]
        wait: bool,
    },
    /// Show the rebuild status
    RebuildStatus,
    /// Show database statistics
    Stats,
    /// List enrolled identities
    Identities,
    /// Show one person's details
    Person { name: String },
    /// Show the latest recognition log
    Log,
    /// Download a stored image
    Image {
        person: String,
        filename: String,
        /// Output path (default: the image's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the image URL instead of downloading it
        #[arg(long)]
        url: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url.clone() {
        config.base_url = base_url;
    }
    let client = ApiClient::new(&config)?;
    tracing::debug!(base_url = %config.base_url, "facedesk starting");

    let mut stdout = std::io::stdout().lock();
    let ok = run(cli.command, cli.json, &client, &TerminalNotifier, &mut stdout).await?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Execute one command, writing results to `out`. `Ok(false)` means the
/// backend reported a failure, which has already been shown to the user.
async fn run(
    command: Commands,
    json: bool,
    client: &ApiClient,
    notifier: &dyn Notifier,
    out: &mut dyn Write,
) -> Result<bool> {
    match command {
        Commands::Recognize { image } => recognize(&image, json, client, notifier, out).await,

        Commands::Enroll {
            name,
            info,
            images,
            no_rebuild,
        } => {
            let files = images
                .iter()
                .map(SelectedFile::open)
                .collect::<Result<Vec<_>, _>>()?;
            let Some(ack) = reported(notifier, client.enroll(&name, &info, &files, !no_rebuild).await) else {
                return Ok(false);
            };
            show_ack(notifier, out, &ack, json, &format!("Enrolled {name}"), "Enrollment failed")
        }

        Commands::AddImage {
            person,
            image,
            no_rebuild,
        } => {
            let file = SelectedFile::open(&image)?;
            let Some(ack) = reported(notifier, client.add_image(&person, &file, !no_rebuild).await) else {
                return Ok(false);
            };
            show_ack(notifier, out, &ack, json, "Image added", "Failed to add image")
        }

        Commands::DeletePerson { person, no_rebuild } => {
            let Some(ack) = reported(notifier, client.delete_person(&person, !no_rebuild).await) else {
                return Ok(false);
            };
            show_ack(notifier, out, &ack, json, &format!("Deleted {person}"), "Delete failed")
        }

        Commands::DeleteImage {
            person,
            filename,
            no_rebuild,
        } => {
            let Some(ack) =
                reported(notifier, client.delete_image(&person, &filename, !no_rebuild).await)
            else {
                return Ok(false);
            };
            show_ack(notifier, out, &ack, json, "Image deleted", "Delete failed")
        }

        Commands::Rebuild { wait } => {
            let Some(ack) = reported(notifier, client.rebuild_database().await) else {
                return Ok(false);
            };
            if !show_ack(notifier, out, &ack, json, "Rebuild started", "Rebuild failed")? {
                return Ok(false);
            }
            if !wait {
                return Ok(true);
            }

            let Some(status) = reported(notifier, client.wait_for_rebuild().await) else {
                return Ok(false);
            };
            if json {
                output::print_json(out, &status)?;
            } else {
                writeln!(out, "{}", output::rebuild_line(&status))?;
            }
            if status.is_running() {
                notifier.notify("Rebuild still running; stopped waiting", Severity::Warning);
            }
            Ok(status.error.is_none())
        }

        Commands::RebuildStatus => {
            let Some(status) = reported(notifier, client.rebuild_status().await) else {
                return Ok(false);
            };
            if json {
                output::print_json(out, &status)?;
            } else {
                writeln!(out, "{}", output::rebuild_line(&status))?;
            }
            Ok(true)
        }

        Commands::Stats => {
            let Some(stats) = reported(notifier, client.stats().await) else {
                return Ok(false);
            };
            if json {
                output::print_json(out, &stats)?;
            } else {
                write_lines(out, &output::stats_lines(&stats))?;
            }
            Ok(true)
        }

        Commands::Identities => {
            let Some(ids) = reported(notifier, client.identities().await) else {
                return Ok(false);
            };
            if json {
                output::print_json(out, &ids)?;
            } else {
                write_lines(out, &output::identity_lines(&ids))?;
            }
            Ok(true)
        }

        Commands::Person { name } => {
            let Some(person) = reported(notifier, client.person(&name).await) else {
                return Ok(false);
            };
            if json {
                output::print_json(out, &person)?;
            } else {
                write_lines(out, &output::person_lines(&name, &person))?;
            }
            Ok(true)
        }

        Commands::Log => {
            let Some(log) = reported(notifier, client.latest_log().await) else {
                return Ok(false);
            };
            if json {
                output::print_json(out, &log)?;
            } else {
                writeln!(out, "{}", output::log_text(&log))?;
            }
            Ok(true)
        }

        Commands::Image {
            person,
            filename,
            output: path,
            url,
        } => {
            if url {
                match client.image_url(&person, &filename) {
                    Ok(url) => writeln!(out, "{url}")?,
                    Err(err) => return Ok(reported::<()>(notifier, Err(err)).is_some()),
                }
                return Ok(true);
            }
            let Some(bytes) = reported(notifier, client.image(&person, &filename).await) else {
                return Ok(false);
            };
            let path = path.unwrap_or_else(|| PathBuf::from(&filename));
            std::fs::write(&path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            notifier.notify(
                &format!("Saved {} ({} bytes)", path.display(), bytes.len()),
                Severity::Success,
            );
            Ok(true)
        }
    }
}

/// Run the upload/test workflow for one image.
async fn recognize(
    image: &Path,
    json: bool,
    client: &ApiClient,
    notifier: &dyn Notifier,
    out: &mut dyn Write,
) -> Result<bool> {
    let file = SelectedFile::open(image)?;

    let mut workflow = Workflow::new(notifier);
    workflow.select_file(file);
    if let Some(preview) = workflow.preview() {
        notifier.notify(&format!("Selected {preview}"), Severity::Info);
    }

    let Some(outcome) = workflow.submit(client).await else {
        return Ok(false);
    };

    match (json, outcome) {
        (true, Outcome::Response(result)) => output::print_json(out, result)?,
        _ => write!(out, "{}", ResultView::from_outcome(outcome))?,
    }
    Ok(!outcome.is_error())
}

/// Print an acknowledgement and notify its outcome. Returns whether the backend accepted it.
fn show_ack(
    notifier: &dyn Notifier,
    out: &mut dyn Write,
    ack: &ApiResponse,
    json: bool,
    ok: &str,
    err: &str,
) -> Result<bool> {
    if json {
        output::print_json(out, ack)?;
    } else if let Some(status) = &ack.status {
        writeln!(out, "{}", output::rebuild_line(status))?;
    }
    Ok(output::report_ack(notifier, ack, ok, err))
}

fn write_lines(out: &mut dyn Write, lines: &[String]) -> std::io::Result<()> {
    lines.iter().try_for_each(|line| writeln!(out, "{line}"))
}

/// Show a failed request as an error notification.
fn reported<T>(notifier: &dyn Notifier, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "request failed");
            notifier.notify(err.user_message(CONNECT_FAILED), Severity::Error);
            None
        }
    }
}

#[cfg(test)]
#[allow(dead_code)]
#[path = "../../facedesk-client/tests/helpers/mock_backend.rs"]
mod mock_backend;
