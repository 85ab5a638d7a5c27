use serde::Deserialize;

/// Body shared by every name-only entity (organizations, positions, curators).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NamePayload {
    #[serde(alias = "Name")]
    pub name: Option<String>,
}
