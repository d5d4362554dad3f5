use serde::{Deserialize, Serialize};

use super::task::ValidationError;

/// A team as returned by `GET /teams`.
///
/// Membership is not stored on the team; it is derived from task ownership
/// (see `ops::team_ops`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body for `POST /teams`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    pub members: Vec<String>,
}

impl NewTeam {
    /// Blank member names are dropped; the description defaults to
    /// `Team for <name>`.
    pub fn new(
        name: &str,
        description: Option<&str>,
        members: &[String],
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Missing("team name"));
        }
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Team for {}", name));
        Ok(NewTeam {
            name: name.to_string(),
            description,
            members: members
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}
