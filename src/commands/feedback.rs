//! `triage feedback` command.

use crate::context::ServiceContext;
use crate::feedback::{self, FeedbackRules};

/// Execute the `feedback` command over issues, then pull requests.
///
/// # Errors
///
/// Returns an error string if labels or items cannot be fetched, a close
/// label is missing, or any mutation fails.
pub async fn run(ctx: &ServiceContext, dry_run: bool) -> Result<(), String> {
    let tables = [FeedbackRules::issues(), FeedbackRules::pulls()];
    let planned = feedback::run(ctx, &tables, dry_run).await.map_err(|e| e.to_string())?;

    if dry_run {
        println!("Dry run, would perform:");
    } else {
        println!("Feedback expiry complete:");
    }
    println!("{}", feedback::format_actions(&planned));
    Ok(())
}
