//! Live adapter for the `IssueTracker` port using the GitHub GraphQL and REST APIs.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use reqwest::{header, Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{RepoRef, Settings};
use crate::model::{
    ClosedLabelIndex, FeedbackableItem, IssueDetails, IssueState, ItemKind, Label,
    PullRequestFiles, PullState, StateReason, TimelineEvent,
};
use crate::ports::{IssueEdit, IssueTracker, Mutation, PortError, PortFuture};

/// Issue tracker backed by github.com (or a GitHub Enterprise API root).
pub struct LiveGitHub {
    client: Client,
    api_url: String,
    repo: RepoRef,
    token: Option<String>,
}

impl LiveGitHub {
    /// Creates a client for the repository named in `settings`.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            repo: settings.repo.clone(),
            token: settings.token.clone(),
        }
    }

    fn token(&self) -> Result<&str, PortError> {
        self.token.as_deref().ok_or_else(|| "GITHUB_TOKEN environment variable not set".into())
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, PortError> {
        let response = self
            .client
            .post(format!("{}/graphql", self.api_url))
            .bearer_auth(self.token()?)
            .header(header::USER_AGENT, super::USER_AGENT)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| -> PortError { format!("GitHub GraphQL request failed: {e}").into() })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| -> PortError {
            format!("Failed to read GitHub GraphQL response: {e}").into()
        })?;
        if !status.is_success() {
            return Err(format!("GitHub GraphQL error ({}): {text}", status.as_u16()).into());
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&text).map_err(|e| -> PortError {
            format!("Failed to parse GitHub GraphQL response: {e}").into()
        })?;
        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(format!("GitHub GraphQL error: {}", messages.join("; ")).into());
        }
        envelope.data.ok_or_else(|| "GitHub GraphQL response has no data".into())
    }

    fn issue_url(&self, number: u64, tail: &[&str]) -> Result<Url, PortError> {
        let number = number.to_string();
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|()| -> PortError { format!("{} cannot be a base URL", self.api_url).into() })?
            .pop_if_empty()
            .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str(), "issues", number.as_str()])
            .extend(tail);
        Ok(url)
    }

    async fn rest(&self, method: Method, url: Url, body: Option<Value>) -> Result<StatusCode, PortError> {
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(self.token()?)
            .header(header::USER_AGENT, super::USER_AGENT)
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| -> PortError { format!("GitHub REST {method} {url} failed: {e}").into() })?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(status);
        }
        let text = response.text().await.unwrap_or_default();
        Err(format!("GitHub REST {method} {url} error ({}): {text}", status.as_u16()).into())
    }

    async fn apply_edit(&self, number: u64, edit: IssueEdit) -> Result<(), PortError> {
        let (method, url, body) = match edit {
            IssueEdit::AddLabels { names } => {
                (Method::POST, self.issue_url(number, &["labels"])?, Some(json!({ "labels": names })))
            }
            IssueEdit::RemoveLabel { name } => {
                (Method::DELETE, self.issue_url(number, &["labels", name.as_str()])?, None)
            }
            IssueEdit::Reopen => (
                Method::PATCH,
                self.issue_url(number, &[])?,
                Some(json!({ "state": "open", "state_reason": "reopened" })),
            ),
            IssueEdit::Comment { body } => {
                (Method::POST, self.issue_url(number, &["comments"])?, Some(json!({ "body": body })))
            }
        };

        let removing = method == Method::DELETE;
        let status = self.rest(method, url, body).await?;
        // A missing label is fine to "remove"; a missing issue is not.
        if status == StatusCode::NOT_FOUND && !removing {
            return Err(format!("Issue #{number} not found in {}", self.repo).into());
        }
        Ok(())
    }
}

impl IssueTracker for LiveGitHub {
    fn feedback_items(
        &self,
        kind: ItemKind,
        labels: &[&str],
    ) -> PortFuture<'_, Vec<FeedbackableItem>> {
        let labels: Vec<String> = labels.iter().map(ToString::to_string).collect();
        Box::pin(async move {
            let variables = json!({ "owner": self.repo.owner, "name": self.repo.name, "labels": labels });
            let data: RepositoryData<ItemsData> = self.graphql(&items_query(kind), variables).await?;
            Ok(data.repository.items.nodes.into_iter().map(|item| item.into_item(kind)).collect())
        })
    }

    fn closed_labels(&self, query: &str) -> PortFuture<'_, ClosedLabelIndex> {
        let query = query.to_string();
        Box::pin(async move {
            let variables = json!({ "owner": self.repo.owner, "name": self.repo.name, "query": query });
            let data: RepositoryData<LabelsData> = self.graphql(LABELS_QUERY, variables).await?;
            Ok(data.repository.labels.nodes.into_iter().collect())
        })
    }

    fn mutate(&self, item_id: &str, mutations: &[Mutation]) -> PortFuture<'_, ()> {
        let (document, mut variables) = mutation_document(mutations);
        variables["itemId"] = json!(item_id);
        let empty = mutations.is_empty();
        Box::pin(async move {
            if empty {
                return Ok(());
            }
            let _: Value = self.graphql(&document, variables).await?;
            Ok(())
        })
    }

    fn issue(&self, number: u64) -> PortFuture<'_, IssueDetails> {
        Box::pin(async move {
            let variables = json!({ "owner": self.repo.owner, "name": self.repo.name, "issue": number });
            let data: RepositoryData<IssueData> = self.graphql(ISSUE_QUERY, variables).await?;
            let issue = data
                .repository
                .issue
                .ok_or_else(|| -> PortError { format!("Issue #{number} not found in {}", self.repo).into() })?;
            Ok(issue.into())
        })
    }

    fn pull_request_files(&self, numbers: &[u64]) -> PortFuture<'_, Vec<PullRequestFiles>> {
        let numbers = numbers.to_vec();
        Box::pin(async move {
            if numbers.is_empty() {
                return Ok(Vec::new());
            }
            let variables = json!({ "owner": self.repo.owner, "name": self.repo.name });
            let data: RepositoryData<HashMap<String, Option<RawPullFiles>>> =
                self.graphql(&pull_files_query(&numbers), variables).await?;
            let mut pulls = data.repository;
            Ok(numbers
                .iter()
                .filter_map(|number| pulls.remove(&format!("pr{number}")).flatten())
                .map(Into::into)
                .collect())
        })
    }

    fn edit_issue(&self, number: u64, edits: &[IssueEdit]) -> PortFuture<'_, ()> {
        let edits = edits.to_vec();
        Box::pin(async move {
            for edit in edits {
                self.apply_edit(number, edit).await?;
            }
            Ok(())
        })
    }
}

// --- Queries ---

const LABELS_QUERY: &str = "query($owner: String!, $name: String!, $query: String!) {
  repository(owner: $owner, name: $name) {
    labels(first: 100, query: $query) { nodes { id name } }
  }
}";

const ISSUE_QUERY: &str = "query($owner: String!, $name: String!, $issue: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $issue) {
      number state stateReason
      assignees(first: 100) { nodes { login } }
      labels(first: 100) { nodes { name } }
      reactions { totalCount }
    }
  }
}";

/// Builds the labeled-items query. Both kinds share the shape; they differ
/// in the connection and in which timeline events exist.
fn items_query(kind: ItemKind) -> String {
    let (connection, item_types, extra_fragments) = match kind {
        ItemKind::Issue => ("issues", "LABELED_EVENT, CLOSED_EVENT, ISSUE_COMMENT, RENAMED_TITLE_EVENT", ""),
        ItemKind::PullRequest => (
            "pullRequests",
            "LABELED_EVENT, CLOSED_EVENT, ISSUE_COMMENT, RENAMED_TITLE_EVENT, \
             PULL_REQUEST_COMMIT, PULL_REQUEST_REVIEW, READY_FOR_REVIEW_EVENT, REVIEW_REQUESTED_EVENT",
            "
          ... on PullRequestCommit { pullRequest { author { login } } }
          ... on PullRequestReview { author { login } }
          ... on ReadyForReviewEvent { actor { login } }
          ... on ReviewRequestedEvent { actor { login } }",
        ),
    };
    format!(
        "query($owner: String!, $name: String!, $labels: [String!]) {{
  repository(owner: $owner, name: $name) {{
    items: {connection}(last: 100, labels: $labels) {{
      nodes {{
        id number updatedAt closed
        labels(first: 100) {{ nodes {{ id name }} }}
        timelineItems(last: 100, itemTypes: [{item_types}]) {{
          nodes {{
            __typename
            ... on LabeledEvent {{ createdAt label {{ name }} actor {{ login }} }}
            ... on ClosedEvent {{ actor {{ login }} }}
            ... on IssueComment {{ author {{ login }} }}
            ... on RenamedTitleEvent {{ actor {{ login }} }}{extra_fragments}
          }}
        }}
      }}
    }}
  }}
}}"
    )
}

/// One aliased `pullRequest` field per number, so a single request covers all.
fn pull_files_query(numbers: &[u64]) -> String {
    let mut query = String::from("query($owner: String!, $name: String!) {\n  repository(owner: $owner, name: $name) {\n");
    for number in numbers {
        let _ = writeln!(
            query,
            "    pr{number}: pullRequest(number: {number}) {{ number state files(first: 100) {{ nodes {{ path }} }} }}"
        );
    }
    query.push_str("  }\n}");
    query
}

/// Builds one GraphQL mutation document applying `mutations` in order to
/// `$itemId`, with one variable per payload.
fn mutation_document(mutations: &[Mutation]) -> (String, Value) {
    let mut declarations = vec!["$itemId: ID!".to_string()];
    let mut fields = String::new();
    let mut variables = json!({});

    for (i, mutation) in mutations.iter().enumerate() {
        let field = match mutation {
            Mutation::AddComment { body } => {
                declarations.push(format!("$body{i}: String!"));
                variables[format!("body{i}")] = json!(body);
                format!("addComment(input: {{subjectId: $itemId, body: $body{i}}})")
            }
            Mutation::Close { kind: ItemKind::Issue } => {
                "closeIssue(input: {issueId: $itemId, stateReason: NOT_PLANNED})".to_string()
            }
            Mutation::Close { kind: ItemKind::PullRequest } => {
                "closePullRequest(input: {pullRequestId: $itemId})".to_string()
            }
            Mutation::AddLabels { label_ids } => {
                declarations.push(format!("$labels{i}: [ID!]!"));
                variables[format!("labels{i}")] = json!(label_ids);
                format!("addLabelsToLabelable(input: {{labelableId: $itemId, labelIds: $labels{i}}})")
            }
            Mutation::RemoveLabels { label_ids } => {
                declarations.push(format!("$labels{i}: [ID!]!"));
                variables[format!("labels{i}")] = json!(label_ids);
                format!("removeLabelsFromLabelable(input: {{labelableId: $itemId, labelIds: $labels{i}}})")
            }
        };
        let _ = writeln!(fields, "  m{i}: {field} {{ clientMutationId }}");
    }

    (format!("mutation({}) {{\n{fields}}}", declarations.join(", ")), variables)
}

// --- Response shapes ---

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct RepositoryData<T> {
    repository: T,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct ItemsData {
    items: Nodes<RawItem>,
}

#[derive(Deserialize)]
struct LabelsData {
    labels: Nodes<Label>,
}

#[derive(Deserialize)]
struct IssueData {
    issue: Option<RawIssue>,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
struct LabelName {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: String,
    number: u64,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    closed: bool,
    labels: Nodes<Label>,
    timeline_items: Nodes<RawEvent>,
}

impl RawItem {
    fn into_item(self, kind: ItemKind) -> FeedbackableItem {
        FeedbackableItem {
            kind,
            id: self.id,
            number: self.number,
            updated_at: self.updated_at,
            closed: self.closed,
            labels: self.labels.nodes,
            timeline: self.timeline_items.nodes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
struct CommitPullRequest {
    author: Option<Login>,
}

#[derive(Deserialize)]
#[serde(tag = "__typename")]
enum RawEvent {
    #[serde(rename_all = "camelCase")]
    LabeledEvent { created_at: DateTime<Utc>, label: LabelName, actor: Option<Login> },
    ClosedEvent { actor: Option<Login> },
    IssueComment { author: Option<Login> },
    RenamedTitleEvent { actor: Option<Login> },
    #[serde(rename_all = "camelCase")]
    PullRequestCommit { pull_request: CommitPullRequest },
    PullRequestReview { author: Option<Login> },
    ReadyForReviewEvent { actor: Option<Login> },
    ReviewRequestedEvent { actor: Option<Login> },
}

fn login(who: Option<Login>) -> Option<String> {
    who.map(|who| who.login)
}

impl From<RawEvent> for TimelineEvent {
    fn from(raw: RawEvent) -> Self {
        match raw {
            RawEvent::LabeledEvent { created_at, label, actor } => {
                Self::Labeled { label_name: label.name, actor: login(actor), created_at }
            }
            RawEvent::ClosedEvent { actor } => Self::Closed { actor: login(actor) },
            RawEvent::IssueComment { author } => Self::Comment { author: login(author) },
            RawEvent::RenamedTitleEvent { actor } => Self::RenamedTitle { actor: login(actor) },
            RawEvent::PullRequestCommit { pull_request } => {
                Self::Commit { author: login(pull_request.author) }
            }
            RawEvent::PullRequestReview { author } => Self::Review { author: login(author) },
            RawEvent::ReadyForReviewEvent { actor } => Self::ReadyForReview { actor: login(actor) },
            RawEvent::ReviewRequestedEvent { actor } => Self::ReviewRequested { actor: login(actor) },
        }
    }
}

#[derive(Deserialize)]
struct Reactions {
    #[serde(rename = "totalCount")]
    total_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIssue {
    number: u64,
    state: IssueState,
    state_reason: Option<StateReason>,
    assignees: Nodes<Login>,
    labels: Nodes<LabelName>,
    reactions: Reactions,
}

impl From<RawIssue> for IssueDetails {
    fn from(raw: RawIssue) -> Self {
        Self {
            number: raw.number,
            state: raw.state,
            state_reason: raw.state_reason,
            labels: raw.labels.nodes.into_iter().map(|label| label.name).collect(),
            reactions: raw.reactions.total_count,
            assignees: raw.assignees.nodes.into_iter().map(|who| who.login).collect(),
        }
    }
}

#[derive(Deserialize)]
struct FilePath {
    path: String,
}

#[derive(Deserialize)]
struct RawPullFiles {
    number: u64,
    state: PullState,
    files: Option<Nodes<FilePath>>,
}

impl From<RawPullFiles> for PullRequestFiles {
    fn from(raw: RawPullFiles) -> Self {
        Self {
            number: raw.number,
            state: raw.state,
            paths: raw.files.map(|files| files.nodes.into_iter().map(|f| f.path).collect()).unwrap_or_default(),
        }
    }
}
