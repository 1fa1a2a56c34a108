use serde::Serialize;

use crate::db::models::User;

/// What the login layer needs to know about whoever is making a request.
pub trait AuthUser {
    /// Stable string id, handed back to the loader on the next request.
    /// `None` for anonymous visitors.
    fn get_id(&self) -> Option<String>;

    fn is_active(&self) -> bool {
        true
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    fn is_anonymous(&self) -> bool {
        false
    }
}

impl AuthUser for User {
    fn get_id(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnonymousUser;

impl AuthUser for AnonymousUser {
    fn get_id(&self) -> Option<String> {
        None
    }

    fn is_active(&self) -> bool {
        false
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_anonymous(&self) -> bool {
        true
    }
}

/// The resolved identity for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(User),
    Anonymous(AnonymousUser),
}

impl Identity {
    pub fn anonymous() -> Self {
        Identity::Anonymous(AnonymousUser)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Anonymous(_) => None,
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            Identity::User(user) => Some(user),
            Identity::Anonymous(_) => None,
        }
    }

    fn as_auth_user(&self) -> &dyn AuthUser {
        match self {
            Identity::User(user) => user as &dyn AuthUser,
            Identity::Anonymous(anon) => anon as &dyn AuthUser,
        }
    }
}

impl AuthUser for Identity {
    fn get_id(&self) -> Option<String> {
        self.as_auth_user().get_id()
    }

    fn is_active(&self) -> bool {
        self.as_auth_user().is_active()
    }

    fn is_authenticated(&self) -> bool {
        self.as_auth_user().is_authenticated()
    }

    fn is_anonymous(&self) -> bool {
        self.as_auth_user().is_anonymous()
    }
}

/// JSON shape returned by `/auth/me`.
#[derive(Debug, Serialize)]
pub struct IdentityView {
    pub id: Option<String>,
    pub username: Option<String>,
    pub is_authenticated: bool,
    pub is_anonymous: bool,
}

impl From<&Identity> for IdentityView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.get_id(),
            username: identity.user().map(|u| u.username.clone()),
            is_authenticated: identity.is_authenticated(),
            is_anonymous: identity.is_anonymous(),
        }
    }
}
