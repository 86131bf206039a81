//! Finds the pull requests GitHub links to an issue in its "Development" panel.
//!
//! GraphQL has no field for this relation, so the public issue page is
//! fetched and the links inside the metadata sidebar are read. This depends
//! on GitHub's rendered markup; a missing container is an error rather than
//! an empty result so that a markup change is noticed.

use std::collections::BTreeSet;

use scraper::{Html, Selector};

use crate::config::RepoRef;
use crate::error::TriageError;
use crate::ports::PageFetcher;

/// Sidebar element holding the development cross-references.
const CONTAINER_SELECTOR: &str = r#"div[data-testid="issue-metadata-fixed"]"#;

/// Public page URL of an issue.
#[must_use]
pub fn issue_page_url(web_url: &str, repo: &RepoRef, number: u64) -> String {
    format!("{}/{}/{}/issues/{number}", web_url.trim_end_matches('/'), repo.owner, repo.name)
}

/// Extracts linked pull request numbers from an issue page.
///
/// Returns `None` when the sidebar container is absent. Links whose last
/// path segment is not a number (e.g. `/pull/123/files`) are skipped;
/// repeated links collapse.
#[must_use]
pub fn extract_linked_pull_requests(html: &str) -> Option<BTreeSet<u64>> {
    let document = Html::parse_document(html);
    let container_selector = Selector::parse(CONTAINER_SELECTOR).expect("valid container selector");
    let link_selector = Selector::parse("a[href]").expect("valid link selector");

    let mut containers = document.select(&container_selector).peekable();
    containers.peek()?;

    let numbers = containers
        .flat_map(|container| container.select(&link_selector))
        .filter_map(|link| link.value().attr("href"))
        .inspect(|href| tracing::debug!(href, "development link"))
        .filter_map(trailing_number)
        .collect();
    Some(numbers)
}

/// Parses the last path segment of a link, ignoring any query or fragment.
fn trailing_number(href: &str) -> Option<u64> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next()?.parse().ok()
}

/// Resolves the pull requests linked to `number`.
///
/// # Errors
///
/// Returns [`TriageError::Fetch`] for a non-200 response,
/// [`TriageError::Parse`] when the page lacks the development container, and
/// [`TriageError::Remote`] when the request itself fails.
pub async fn resolve_linked_pull_requests(
    pages: &dyn PageFetcher,
    web_url: &str,
    repo: &RepoRef,
    number: u64,
) -> Result<BTreeSet<u64>, TriageError> {
    let url = issue_page_url(web_url, repo, number);
    tracing::info!(%url, "resolving linked pull requests");

    let page = pages
        .fetch(&url)
        .await
        .map_err(|source| TriageError::remote(format!("Failed to fetch {url}"), source))?;
    if page.status != 200 {
        return Err(TriageError::Fetch { url, status: page.status });
    }

    let numbers = extract_linked_pull_requests(&page.body).ok_or(TriageError::Parse { url })?;
    tracing::info!(issue = number, pulls = ?numbers, "linked pull requests");
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Page, PortFuture};

    fn sidebar(links: &[&str]) -> String {
        let anchors: String =
            links.iter().map(|href| format!(r#"<span><a href="{href}">link</a></span>"#)).collect();
        format!(
            r#"<html><body>
                 <div data-testid="issue-body"><a href="/gradle/gradle/pull/1">mention</a></div>
                 <div data-testid="issue-metadata-fixed"><section>{anchors}</section></div>
               </body></html>"#
        )
    }

    struct FixedPage(Page);

    impl PageFetcher for FixedPage {
        fn fetch(&self, _url: &str) -> PortFuture<'_, Page> {
            let page = self.0.clone();
            Box::pin(async move { Ok(page) })
        }
    }

    #[test]
    fn page_url_points_at_public_issue() {
        let repo = RepoRef::new("gradle", "gradle");
        assert_eq!(
            issue_page_url("https://github.com/", &repo, 29651),
            "https://github.com/gradle/gradle/issues/29651"
        );
    }

    #[test]
    fn extracts_numbers_from_sidebar_only() {
        let html = sidebar(&["https://github.com/gradle/gradle/pull/30821"]);
        assert_eq!(extract_linked_pull_requests(&html), Some(BTreeSet::from([30821])));
    }

    #[test]
    fn duplicate_links_collapse() {
        let html = sidebar(&["/gradle/gradle/pull/27268", "/gradle/gradle/pull/27268"]);
        assert_eq!(extract_linked_pull_requests(&html).unwrap().len(), 1);
    }

    #[test]
    fn non_numeric_segments_are_skipped() {
        let html = sidebar(&[
            "/gradle/gradle/pull/30901/files",
            "/gradle/gradle/pull/30901",
            "/gradle/gradle/pull/30902?notification_referrer_id=x",
            "/gradle/gradle/pulls",
            "",
        ]);
        assert_eq!(extract_linked_pull_requests(&html), Some(BTreeSet::from([30901, 30902])));
    }

    #[test]
    fn empty_sidebar_yields_empty_set() {
        assert_eq!(extract_linked_pull_requests(&sidebar(&[])), Some(BTreeSet::new()));
    }

    #[test]
    fn missing_container_is_none() {
        let html = r#"<html><body><development-menu><a href="/o/r/pull/2">x</a></development-menu></body></html>"#;
        assert_eq!(extract_linked_pull_requests(html), None);
    }

    #[tokio::test]
    async fn non_200_is_a_fetch_error() {
        let pages = FixedPage(Page { status: 404, body: String::new() });
        let repo = RepoRef::new("gradle", "gradle");
        let err = resolve_linked_pull_requests(&pages, "https://github.com", &repo, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::Fetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn missing_container_is_a_parse_error() {
        let pages = FixedPage(Page { status: 200, body: "<html></html>".into() });
        let repo = RepoRef::new("gradle", "gradle");
        let err = resolve_linked_pull_requests(&pages, "https://github.com", &repo, 28694)
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::Parse { ref url } if url.ends_with("/issues/28694")));
    }

    #[tokio::test]
    async fn resolves_linked_numbers() {
        let pages = FixedPage(Page { status: 200, body: sidebar(&["/gradle/gradle/pull/30821"]) });
        let repo = RepoRef::new("gradle", "gradle");
        let numbers =
            resolve_linked_pull_requests(&pages, "https://github.com", &repo, 29651).await.unwrap();
        assert_eq!(numbers, BTreeSet::from([30821]));
    }
}
