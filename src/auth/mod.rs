pub mod handlers;
pub mod identity;
pub mod loader;
pub mod login_manager;
pub mod password;
pub mod session;

pub use identity::{AnonymousUser, AuthUser, Identity};
pub use loader::{load_user, SqliteUserLoader, UserLoader};
pub use login_manager::LoginManager;
