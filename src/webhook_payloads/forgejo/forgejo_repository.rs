#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, Default)]
pub struct ForgejoRepository {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
}
