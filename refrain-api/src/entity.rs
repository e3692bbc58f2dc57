use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Song,
    Prompt,
    Assignment,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Song => "song",
            EntityType::Prompt => "prompt",
            EntityType::Assignment => "assignment",
        }
    }

    /// What to call an item of this type when it has no title
    pub fn noun_phrase(&self) -> &'static str {
        match self {
            EntityType::Song => "a song",
            EntityType::Prompt => "a prompt",
            EntityType::Assignment => "an assignment",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies which comments belong together: one entity inside one dataset
/// of the remote store
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeKey {
    pub dataset: String,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
}

impl ScopeKey {
    pub fn new(dataset: &str, entity_type: EntityType, entity_id: &str) -> ScopeKey {
        ScopeKey {
            dataset: String::from(dataset),
            entity_type,
            entity_id: EntityId(String::from(entity_id)),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.dataset, self.entity_type, self.entity_id)
    }
}
