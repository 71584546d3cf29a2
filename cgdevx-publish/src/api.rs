//! Pull-request REST client — the provider API subset the fallback needs.
//!
//! Three calls: create a pull request (201, or 422 when one already exists
//! for the branch), list open pull requests to recover the existing one, and
//! squash-merge. Auth is a bearer token header. The base URL is
//! configurable so tests can point the client at a local mock server.

use serde::Deserialize;

use cgdevx_core::types::{ApiSettings, RemoteTarget};

use crate::error::PublishError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// An open pull request on the output remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub head_ref: String,
    pub base_ref: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePullRequest {
    number: u64,
    html_url: Option<String>,
    head: WireRef,
    base: WireRef,
}

#[derive(Debug, Deserialize)]
struct WireRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

impl From<WirePullRequest> for PullRequest {
    fn from(wire: WirePullRequest) -> Self {
        PullRequest {
            number: wire.number,
            head_ref: wire.head.ref_name,
            base_ref: wire.base.ref_name,
            html_url: wire.html_url,
        }
    }
}

/// Result of a creation attempt.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(PullRequest),
    /// 422 — an equivalent pull request is already open for the branch.
    AlreadyExists,
}

/// Result of a merge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// The provider refused (required checks or reviews unmet).
    Refused(u16),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Minimal pull-request client for one `{owner}/{repo}`.
pub struct PullRequestApi {
    base_url: String,
    owner: String,
    repo: String,
    token: String,
    agent: ureq::Agent,
}

impl PullRequestApi {
    pub fn new(settings: &ApiSettings, remote: &RemoteTarget) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            owner: remote.owner.clone(),
            repo: remote.repo.clone(),
            token: settings.token.clone(),
            agent: ureq::Agent::new(),
        }
    }

    fn pulls_url(&self) -> String {
        format!("{}/repos/{}/{}/pulls", self.base_url, self.owner, self.repo)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        request
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
    }

    /// `POST /repos/{owner}/{repo}/pulls` — 201 with the new pull request,
    /// or [`CreateOutcome::AlreadyExists`] on 422.
    pub fn create(
        &self,
        head_branch: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<CreateOutcome, PublishError> {
        let payload = serde_json::json!({
            "title": title,
            "head": format!("{}:{}", self.owner, head_branch),
            "base": base,
            "body": body,
        });

        match self.authorize(self.agent.post(&self.pulls_url())).send_json(payload) {
            Ok(response) => {
                let wire: WirePullRequest =
                    response.into_json().map_err(PublishError::ApiPayload)?;
                Ok(CreateOutcome::Created(wire.into()))
            }
            Err(ureq::Error::Status(422, _)) => Ok(CreateOutcome::AlreadyExists),
            Err(e) => Err(PublishError::Api(Box::new(e))),
        }
    }

    /// `GET /repos/{owner}/{repo}/pulls?state=open&base=...` — recover the
    /// open pull request whose head is `head_branch`, if any.
    pub fn find_open(
        &self,
        head_branch: &str,
        base: &str,
    ) -> Result<Option<PullRequest>, PublishError> {
        let response = self
            .authorize(self.agent.get(&self.pulls_url()))
            .query("state", "open")
            .query("base", base)
            .call()
            .map_err(|e| PublishError::Api(Box::new(e)))?;

        let wire: Vec<WirePullRequest> =
            response.into_json().map_err(PublishError::ApiPayload)?;
        Ok(wire
            .into_iter()
            .map(PullRequest::from)
            .find(|pr| pr.head_ref == head_branch))
    }

    /// `PUT /repos/{owner}/{repo}/pulls/{number}/merge` with squash.
    ///
    /// A refusal (checks/reviews unmet) is an outcome, not an error.
    pub fn merge_squash(&self, number: u64) -> Result<MergeOutcome, PublishError> {
        let url = format!("{}/{}/merge", self.pulls_url(), number);
        let payload = serde_json::json!({ "merge_method": "squash" });

        match self.authorize(self.agent.put(&url)).send_json(payload) {
            Ok(_) => Ok(MergeOutcome::Merged),
            Err(ureq::Error::Status(code @ (405 | 409 | 422), _)) => {
                Ok(MergeOutcome::Refused(code))
            }
            Err(e) => Err(PublishError::Api(Box::new(e))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
