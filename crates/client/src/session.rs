use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use api_types::auth::LoginResponse;
use serde::{Deserialize, Serialize};

/// Authenticated user, as returned by `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl From<LoginResponse> for Session {
    fn from(value: LoginResponse) -> Self {
        let display_name = if value.user.name.trim().is_empty() {
            value.user.email
        } else {
            value.user.name
        };
        Self {
            user_id: value.user.id,
            display_name,
            token: value.token,
        }
    }
}

/// Shared slot for the current [`Session`].
///
/// The transport only reads from it; login and logout write to it.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn set(&self, session: Session) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Removes the session, returning it.
    pub fn clear(&self) -> Option<Session> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
