use serde::{Deserialize, Serialize};

use crate::roles;

/// `Viewer` is the authenticated principal making the current request.
///
/// Carries the user id used for ownership tests and the roles used for
/// permission lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// Id of the viewer's user record.
    id: String,
    /// Login handle, informational only.
    #[serde(default)]
    login: String,
    /// Assigned roles, lowercase.
    #[serde(default)]
    roles: Vec<String>,
}

impl Viewer {
    /// Create a new `Viewer` builder
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::default()
    }

    /// Unauthenticated caller: empty id, `guest` role only.
    #[must_use]
    pub fn guest() -> Self {
        ViewerBuilder::default().role(roles::GUEST).build()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Whether `user_id` names this viewer. An empty id never matches.
    #[must_use]
    pub fn is_user(&self, user_id: &str) -> bool {
        !self.id.is_empty() && self.id == user_id
    }
}

#[derive(Default)]
pub struct ViewerBuilder {
    id: Option<String>,
    login: Option<String>,
    roles: Vec<String>,
}

impl ViewerBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Add one role. Duplicates are ignored.
    #[must_use]
    pub fn role(mut self, role: &str) -> Self {
        let role = role.to_lowercase();
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    #[must_use]
    pub fn roles<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        roles
            .into_iter()
            .fold(self, |builder, role| builder.role(role.as_ref()))
    }

    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            id: self.id.unwrap_or_default(),
            login: self.login.unwrap_or_default(),
            roles: self.roles,
        }
    }
}
