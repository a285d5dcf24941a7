mod forgejo_commit;
mod forgejo_repository;
mod forgejo_user;
mod payload;

pub use forgejo_commit::HeadCommit;
pub use forgejo_repository::ForgejoRepository;
pub use forgejo_user::ForgejoUser;
pub use payload::{ForgejoPushWebhookPayload, BRANCH_REF_PREFIX};

/// Reads a string field that Forgejo may send as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
