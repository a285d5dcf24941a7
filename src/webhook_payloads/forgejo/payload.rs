use super::{ForgejoRepository, ForgejoUser, HeadCommit};

pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Push event body. Forgejo and Gitea use the GitHub layout.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, Default)]
pub struct ForgejoPushWebhookPayload {
    #[serde(rename = "ref", default)]
    pub reference: String,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub repository: Option<ForgejoRepository>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
    #[serde(default)]
    pub pusher: Option<ForgejoUser>,
}

impl ForgejoPushWebhookPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Branch name for `refs/heads/<branch>` refs, `None` for tags and others.
    pub fn branch(&self) -> Option<&str> {
        self.reference.strip_prefix(BRANCH_REF_PREFIX)
    }

    pub fn repository_name(&self) -> &str {
        self.repository
            .as_ref()
            .map(|repository| repository.name.as_str())
            .unwrap_or_default()
    }

    /// The head commit, if the push carried one with a non-empty id.
    ///
    /// Branch deletions and empty pushes come without it.
    pub fn head_commit(&self) -> Option<&HeadCommit> {
        self.head_commit
            .as_ref()
            .filter(|commit| !commit.id.is_empty())
    }
}
