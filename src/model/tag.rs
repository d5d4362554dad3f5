use serde::{Deserialize, Serialize};

/// A tag as returned by `GET /tags`.
///
/// Tasks refer to tags by `name`, never by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}
