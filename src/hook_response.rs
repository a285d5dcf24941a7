use serde::Serialize;

pub const NOT_A_BRANCH_PUSH: &str = "not a branch push";
pub const NO_HEAD_COMMIT: &str = "no head_commit";
pub const REGISTER_SOURCE_TIP: &str = "Register the app source in Press first";

/// Body returned for every delivery that passes authentication and parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HookResponse {
    Ignored {
        #[serde(skip_serializing_if = "Option::is_none")]
        event: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<&'static str>,
        #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },
    NoSources {
        repo: String,
        branch: String,
        tip: &'static str,
    },
    #[serde(rename = "ok")]
    Dispatched {
        repo: String,
        branch: String,
        commit: String,
        releases_created: Vec<String>,
        errors: Vec<DispatchError>,
    },
}

/// A release that could not be created for one app source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchError {
    pub source: String,
    pub error: String,
}

impl HookResponse {
    pub fn ignored_event(event: &str) -> Self {
        HookResponse::Ignored {
            event: Some(event.to_string()),
            reason: None,
            reference: None,
        }
    }

    pub fn not_a_branch_push(reference: &str) -> Self {
        HookResponse::Ignored {
            event: None,
            reason: Some(NOT_A_BRANCH_PUSH),
            reference: Some(reference.to_string()),
        }
    }

    pub fn no_head_commit() -> Self {
        HookResponse::Ignored {
            event: None,
            reason: Some(NO_HEAD_COMMIT),
            reference: None,
        }
    }

    pub fn no_sources(repo: &str, branch: &str) -> Self {
        HookResponse::NoSources {
            repo: repo.to_string(),
            branch: branch.to_string(),
            tip: REGISTER_SOURCE_TIP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ignored_shapes() {
        assert_eq!(
            serde_json::to_value(HookResponse::ignored_event("")).unwrap(),
            json!({ "status": "ignored", "event": "" })
        );
        assert_eq!(
            serde_json::to_value(HookResponse::not_a_branch_push("refs/tags/v1")).unwrap(),
            json!({ "status": "ignored", "reason": "not a branch push", "ref": "refs/tags/v1" })
        );
        assert_eq!(
            serde_json::to_value(HookResponse::no_head_commit()).unwrap(),
            json!({ "status": "ignored", "reason": "no head_commit" })
        );
    }

    #[test]
    fn no_sources_shape() {
        assert_eq!(
            serde_json::to_value(HookResponse::no_sources("demo", "main")).unwrap(),
            json!({
                "status": "no_sources",
                "repo": "demo",
                "branch": "main",
                "tip": "Register the app source in Press first"
            })
        );
    }

    #[test]
    fn dispatched_serializes_as_ok() {
        let response = HookResponse::Dispatched {
            repo: "demo".to_string(),
            branch: "main".to_string(),
            commit: "abcdef12".to_string(),
            releases_created: vec!["src1".to_string()],
            errors: vec![DispatchError {
                source: "src2".to_string(),
                error: "boom".to_string(),
            }],
        };

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "status": "ok",
                "repo": "demo",
                "branch": "main",
                "commit": "abcdef12",
                "releases_created": ["src1"],
                "errors": [{ "source": "src2", "error": "boom" }]
            })
        );
    }
}
