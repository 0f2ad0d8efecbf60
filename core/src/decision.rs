//! Pure routing: classification + repository policy + issue text -> action.

use std::fmt;

use serde::Serialize;

use crate::classifier::Classification;
use crate::policy::RepoPolicy;

/// Inclusive lower bound for `AUTO_ACT`.
pub const AUTO_ACT_THRESHOLD: f64 = 0.85;
/// Inclusive lower bound for `OFFER`.
pub const OFFER_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    AutoAct,
    Offer,
    Clarify,
    Notify,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoAct => "AUTO_ACT",
            Self::Offer => "OFFER",
            Self::Clarify => "CLARIFY",
            Self::Notify => "NOTIFY",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub decision: Decision,
    pub reason: String,
}

impl Verdict {
    pub fn new(decision: Decision, reason: impl Into<String>) -> Self {
        Self {
            decision,
            reason: reason.into(),
        }
    }
}

/// Routing for a newly opened issue. First matching rule wins:
///
/// 1. open questions -> `CLARIFY`
/// 2. not auto-fixable -> `NOTIFY`
/// 3. sensitive pattern in `issue_text` -> `NOTIFY`
/// 4. auto action disabled for the repository -> `NOTIFY`
/// 5. confidence >= 0.85 -> `AUTO_ACT`
/// 6. confidence >= 0.70 -> `OFFER`
/// 7. otherwise `NOTIFY`
pub fn evaluate(c: &Classification, policy: &RepoPolicy, issue_text: &str) -> Verdict {
    if !c.open_questions.is_empty() {
        return Verdict::new(
            Decision::Clarify,
            format!("{} open question(s)", c.open_questions.len()),
        );
    }

    if !c.auto_fixable {
        return Verdict::new(Decision::Notify, "not auto-fixable");
    }

    if let Some(pattern) = policy.sensitive_patterns.first_match(issue_text) {
        return Verdict::new(
            Decision::Notify,
            format!("sensitive topic matched: {pattern}"),
        );
    }

    if !policy.auto_action_enabled {
        return Verdict::new(Decision::Notify, "auto action disabled for repository");
    }

    if c.confidence >= AUTO_ACT_THRESHOLD {
        Verdict::new(
            Decision::AutoAct,
            format!("confidence {:.2} >= {AUTO_ACT_THRESHOLD:.2}", c.confidence),
        )
    } else if c.confidence >= OFFER_THRESHOLD {
        Verdict::new(
            Decision::Offer,
            format!("confidence {:.2} >= {OFFER_THRESHOLD:.2}", c.confidence),
        )
    } else {
        Verdict::new(
            Decision::Notify,
            format!("confidence {:.2} below {OFFER_THRESHOLD:.2}", c.confidence),
        )
    }
}

pub fn decide(c: &Classification, policy: &RepoPolicy, issue_text: &str) -> Decision {
    evaluate(c, policy, issue_text).decision
}

/// Routing for an explicit fix request from a maintainer comment. The request
/// stands in for `autoFixable` and the confidence thresholds. Open questions,
/// sensitive topics and a repository without auto action still win.
pub fn evaluate_requested(c: &Classification, policy: &RepoPolicy, issue_text: &str) -> Verdict {
    if !c.open_questions.is_empty() {
        return Verdict::new(
            Decision::Clarify,
            format!("{} open question(s)", c.open_questions.len()),
        );
    }

    if let Some(pattern) = policy.sensitive_patterns.first_match(issue_text) {
        return Verdict::new(
            Decision::Notify,
            format!("sensitive topic matched: {pattern}"),
        );
    }

    if !policy.auto_action_enabled {
        return Verdict::new(Decision::Notify, "auto action disabled for repository");
    }

    Verdict::new(Decision::AutoAct, "fix requested by maintainer")
}

pub fn decide_requested(c: &Classification, policy: &RepoPolicy, issue_text: &str) -> Decision {
    evaluate_requested(c, policy, issue_text).decision
}
