#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, Default)]
pub struct ForgejoUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl ForgejoUser {
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("unknown")
    }
}
