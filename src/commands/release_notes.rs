//! `triage release-notes` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::release_notes::check_issue;

/// Execute the `release-notes` command for one issue.
///
/// # Errors
///
/// Returns an error string if the issue cannot be read, linked pull requests
/// cannot be resolved, or an edit fails.
pub async fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    issue: u64,
    dry_run: bool,
) -> Result<(), String> {
    let action = check_issue(ctx, &settings.web_url, &settings.repo, issue, !dry_run)
        .await
        .map_err(|e| e.to_string())?;

    if dry_run {
        println!("Dry run, issue #{issue}: {action}");
    } else {
        println!("Issue #{issue}: {action}");
    }
    Ok(())
}
