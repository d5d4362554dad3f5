use serde::{Deserialize, Serialize};

/// Credentials for one signed-in user.
///
/// The session is an explicit value handed to the HTTP collaborator; nothing
/// in the core looks it up on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Value for the `Authorization` header, when signed in
    pub fn bearer(&self) -> Option<String> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}

/// Body for `POST /api/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /api/signup`
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response of `POST /api/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Session {
            token: Some(resp.token),
            email: resp.email,
            name: resp.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_only_with_token() {
        assert_eq!(Session::anonymous().bearer(), None);
        let s = Session {
            token: Some(String::new()),
            ..Session::default()
        };
        assert!(!s.is_authenticated());

        let s: Session = LoginResponse {
            token: "abc".into(),
            email: Some("a@b.c".into()),
            name: None,
        }
        .into();
        assert_eq!(s.bearer().as_deref(), Some("Bearer abc"));
    }
}
