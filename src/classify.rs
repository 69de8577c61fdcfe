//! Status classifier
//!
//! Turns a raw HTTP status into a success or a structured [`ApiError`] by
//! consulting the descriptor's ordered rule table. Matching is
//! first-match-wins within a specificity tier, and a more specific matcher
//! always beats a more general one: exact codes, then ranges/classes, then
//! catch-alls. With no matching rule, a non-2xx status becomes a generic
//! unexpected-status error and a 2xx status resolves normally.

use crate::error::{ClientError, Result};
use crate::response::ApiResult;

/// Status-code pattern a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMatcher {
    /// One exact status code.
    Exact(u16),
    /// An inclusive status range, e.g. `Range(500, 599)`.
    Range(u16, u16),
    /// A whole status class: `Class(4)` matches 400..=499.
    Class(u16),
    /// Matches every status.
    Any,
}

impl StatusMatcher {
    fn matches(&self, status: u16) -> bool {
        match *self {
            Self::Exact(code) => status == code,
            Self::Range(lo, hi) => (lo..=hi).contains(&status),
            Self::Class(class) => status / 100 == class,
            Self::Any => true,
        }
    }

    /// Lower is more specific. Exact codes beat ranges/classes beat
    /// catch-alls.
    fn specificity(&self) -> u8 {
        match self {
            Self::Exact(_) => 0,
            Self::Range(_, _) | Self::Class(_) => 1,
            Self::Any => 2,
        }
    }
}

/// Outcome the rule assigns to matching statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Resolve the call even if the status is not 2xx.
    Success,
    /// Reject with an [`crate::error::ApiError`] carrying this message.
    Error(String),
}

/// One (pattern -> outcome) entry of the classifier table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRule {
    pub matcher: StatusMatcher,
    pub outcome: RuleOutcome,
}

impl StatusRule {
    /// A failure rule with a human-readable message.
    pub fn error(matcher: StatusMatcher, message: impl Into<String>) -> Self {
        Self {
            matcher,
            outcome: RuleOutcome::Error(message.into()),
        }
    }

    /// A success rule: statuses matching it resolve even outside 2xx.
    pub fn success(matcher: StatusMatcher) -> Self {
        Self {
            matcher,
            outcome: RuleOutcome::Success,
        }
    }

    /// The conventional per-status failure messages generated clients ship
    /// by default. Descriptors opt in and layer their own overrides before
    /// or after these.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::error(StatusMatcher::Exact(400), "Bad Request"),
            Self::error(StatusMatcher::Exact(401), "Unauthorized"),
            Self::error(StatusMatcher::Exact(403), "Forbidden"),
            Self::error(StatusMatcher::Exact(404), "Not Found"),
            Self::error(StatusMatcher::Exact(500), "Internal Server Error"),
            Self::error(StatusMatcher::Exact(502), "Bad Gateway"),
            Self::error(StatusMatcher::Exact(503), "Service Unavailable"),
        ]
    }
}

/// Classify a finalized [`ApiResult`] against the rule table.
///
/// Returns the result unchanged on success, or the matched rule's error.
pub fn classify(rules: &[StatusRule], result: ApiResult) -> Result<ApiResult> {
    let matched = (0..=2u8).find_map(|tier| {
        rules
            .iter()
            .find(|rule| rule.matcher.specificity() == tier && rule.matcher.matches(result.status))
    });

    match matched {
        Some(rule) => match &rule.outcome {
            RuleOutcome::Success => Ok(result),
            RuleOutcome::Error(message) => Err(ClientError::api_error(
                result.url,
                result.status,
                result.status_text,
                result.body,
                message.clone(),
            )),
        },
        None if result.ok => Ok(result),
        None => {
            let message = format!(
                "Unexpected status code: {} {}",
                result.status, result.status_text
            );
            Err(ClientError::api_error(
                result.url,
                result.status,
                result.status_text,
                result.body,
                message,
            ))
        }
    }
}
