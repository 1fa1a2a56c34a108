use std::sync::Arc;

use crate::auth::identity::Identity;
use crate::auth::loader::{DynUserLoader, LoaderError, UserLoader};

/// Turns the user id carried by a session into an [`Identity`].
///
/// The loader is supplied at construction; nothing is registered globally.
#[derive(Clone)]
pub struct LoginManager {
    loader: DynUserLoader,
}

impl LoginManager {
    pub fn new(loader: impl UserLoader + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    pub fn from_shared(loader: DynUserLoader) -> Self {
        Self { loader }
    }

    /// Resolve a session's user id. Missing or unknown ids become anonymous.
    pub fn restore(&self, user_id: Option<&str>) -> Result<Identity, LoaderError> {
        let Some(user_id) = user_id else {
            return Ok(Identity::anonymous());
        };

        match self.loader.load_user(user_id)? {
            Some(user) => Ok(Identity::User(user)),
            None => {
                tracing::debug!(user_id, "session user no longer exists");
                Ok(Identity::anonymous())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::AuthUser;
    use crate::db::models::User;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedLoader {
        calls: AtomicUsize,
    }

    impl UserLoader for FixedLoader {
        fn load_user(&self, user_id: &str) -> Result<Option<User>, LoaderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((user_id == "1").then(|| User {
                id: 1,
                username: "alice".into(),
                email: "alice@example.com".into(),
                image_file: "default.jpg".into(),
                password: "hash".into(),
            }))
        }
    }

    #[test]
    fn restore_without_id_skips_loader() {
        let loader = Arc::new(FixedLoader {
            calls: AtomicUsize::new(0),
        });
        let manager = LoginManager::from_shared(loader.clone());

        let identity = manager.restore(None).unwrap();
        assert!(identity.is_anonymous());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn restore_known_and_unknown_ids() {
        let manager = LoginManager::new(FixedLoader {
            calls: AtomicUsize::new(0),
        });

        let known = manager.restore(Some("1")).unwrap();
        assert_eq!(known.user().map(|u| u.username.as_str()), Some("alice"));

        let unknown = manager.restore(Some("2")).unwrap();
        assert!(unknown.is_anonymous());
    }
}
