//! Origin-based tag defaulting for new cases.
//!
//! The original UI exposed two entry points into the same records, "Cases"
//! and "Matters". Which one created a record is passed explicitly as a
//! [`CaseOrigin`] rather than read from ambient request context.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::legal::filenumber::{CASE_TAG, MATTER_TAG};

/// Entry point that created a case record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaseOrigin {
    Cases,
    Matters,
}

impl CaseOrigin {
    pub fn default_tag(self) -> &'static str {
        match self {
            Self::Cases => CASE_TAG,
            Self::Matters => MATTER_TAG,
        }
    }
}

/// Append `tag` unless it is already present.
pub fn attach_tag(tags: &mut Vec<String>, tag: &str) {
    if !tags.iter().any(|existing| existing == tag) {
        tags.push(tag.to_string());
    }
}

/// Resolve the tags for a newly created case.
///
/// Caller-supplied tags win outright: when any are given they are used
/// verbatim (deduplicated, order preserved) and no origin defaulting
/// happens. Otherwise the origin's tag is attached, or nothing when the
/// creation has no origin.
pub fn resolve_creation_tags(explicit: &[String], origin: Option<CaseOrigin>) -> Vec<String> {
    if !explicit.is_empty() {
        let mut tags = Vec::with_capacity(explicit.len());
        for tag in explicit {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                continue;
            }
            attach_tag(&mut tags, trimmed);
        }
        return tags;
    }

    let mut tags = Vec::new();
    if let Some(origin) = origin {
        attach_tag(&mut tags, origin.default_tag());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_origin_attaches_exactly_the_case_tag() {
        assert_eq!(
            resolve_creation_tags(&[], Some(CaseOrigin::Cases)),
            vec!["case".to_string()]
        );
        assert_eq!(
            resolve_creation_tags(&[], Some(CaseOrigin::Matters)),
            vec!["matter".to_string()]
        );
    }

    #[test]
    fn no_origin_attaches_nothing() {
        assert!(resolve_creation_tags(&[], None).is_empty());
    }

    #[test]
    fn explicit_tags_suppress_origin_defaulting() {
        let explicit = vec!["urgent".to_string()];
        assert_eq!(
            resolve_creation_tags(&explicit, Some(CaseOrigin::Cases)),
            vec!["urgent".to_string()]
        );
    }

    #[test]
    fn explicit_tags_are_deduplicated_and_trimmed() {
        let explicit = vec![
            "case".to_string(),
            " case ".to_string(),
            "".to_string(),
            "appeal".to_string(),
        ];
        assert_eq!(
            resolve_creation_tags(&explicit, None),
            vec!["case".to_string(), "appeal".to_string()]
        );
    }

    #[test]
    fn attach_tag_is_idempotent() {
        let mut tags = vec!["case".to_string()];
        attach_tag(&mut tags, "case");
        assert_eq!(tags, vec!["case".to_string()]);
    }
}
