//! Command dispatch and handlers.

pub mod feedback;
pub mod linked_prs;
pub mod release_notes;

use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// When `TRIAGE_RECORD` is set to a directory path, all port interactions are
/// recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if settings are invalid or the command fails.
pub async fn dispatch(cli: &Cli) -> Result<(), String> {
    let settings = Settings::from_env(cli.repo.as_deref()).map_err(|e| e.to_string())?;

    let (ctx, session) = match &settings.record_dir {
        Some(dir) => {
            let (ctx, session) =
                ServiceContext::recording_at(&settings, dir).map_err(|e| e.to_string())?;
            (ctx, Some(session))
        }
        None => (ServiceContext::live(&settings), None),
    };

    let result = dispatch_with_context(&cli.command, &ctx, &settings).await;

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the command fails.
pub async fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Feedback { dry_run } => feedback::run(ctx, *dry_run).await,
        Command::ReleaseNotes { issue, dry_run } => {
            release_notes::run(ctx, settings, *issue, *dry_run).await
        }
        Command::LinkedPrs { issue } => linked_prs::run(ctx, settings, *issue).await,
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
