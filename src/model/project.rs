use serde::{Deserialize, Serialize};

use super::task::ValidationError;

/// A project as returned by `GET /projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form status label set by the service
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for `POST /projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

impl NewProject {
    pub fn new(name: &str, description: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Missing("project name"));
        }
        Ok(NewProject {
            name: name.to_string(),
            description: description.trim().to_string(),
        })
    }
}
