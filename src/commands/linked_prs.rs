//! `triage linked-prs` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::linked_prs::resolve_linked_pull_requests;

/// Print the pull requests linked to `issue`, one number per line.
///
/// # Errors
///
/// Returns an error string if the issue page cannot be fetched or parsed.
pub async fn run(ctx: &ServiceContext, settings: &Settings, issue: u64) -> Result<(), String> {
    let numbers =
        resolve_linked_pull_requests(ctx.pages.as_ref(), &settings.web_url, &settings.repo, issue)
            .await
            .map_err(|e| e.to_string())?;

    if numbers.is_empty() {
        println!("No linked pull requests for #{issue}.");
        return Ok(());
    }
    for number in numbers {
        println!("#{number}");
    }
    Ok(())
}
