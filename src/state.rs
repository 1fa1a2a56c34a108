use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::loader::SqliteUserLoader;
use crate::auth::login_manager::LoginManager;
use crate::config::Config;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub login: LoginManager,
}

impl AppState {
    /// Wire the login manager to a loader over the same pool.
    pub fn new(db: DbPool, config: Config) -> Self {
        let login = LoginManager::new(SqliteUserLoader::new(db.clone()));
        Self { db, config, login }
    }
}
