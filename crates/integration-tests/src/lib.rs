//! Integration tests for the law office records core.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p law-office-integration-tests
//! ```
//!
//! Each test builds its own store in a temporary directory through
//! [`TestContext`], so tests never share state and need no external
//! services.
//!
//! # Test Categories
//!
//! - `auth` - Login, logout and the permission gate
//! - `users` - Account management and username reservation
//! - `integrity` - Foreign keys, uniqueness and delete restrictions
//! - `backup` - Snapshots and restores

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use law_office::config::{DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use law_office::models::ClientFields;
use law_office::{Database, OfficeConfig, RecordService, Session, UserDirectory, open_store};
use law_office_core::{Role, UserId};
use secrecy::SecretString;
use tempfile::TempDir;

/// A fresh store with the bootstrap administrator logged in.
pub struct TestContext {
    pub dir: TempDir,
    pub config: OfficeConfig,
    pub db: Database,
    pub admin: Session,
}

impl TestContext {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = OfficeConfig::in_dir(dir.path());
        let db = open_store(&config).await.unwrap();

        let mut admin = Session::new();
        assert!(
            admin
                .authenticate(&db, DEFAULT_ADMIN_USERNAME, &secret(DEFAULT_ADMIN_PASSWORD))
                .await,
            "bootstrap administrator should be able to log in"
        );

        Self {
            dir,
            config,
            db,
            admin,
        }
    }

    pub const fn users(&self) -> UserDirectory<'_> {
        UserDirectory::new(&self.db)
    }

    pub const fn records(&self) -> RecordService<'_> {
        RecordService::new(&self.db)
    }

    /// Create an account as the administrator.
    pub async fn create_user(&self, username: &str, password: &str, role: Role) -> UserId {
        self.users()
            .create(&self.admin, username, secret(password), username, role, None, None)
            .await
            .unwrap()
    }

    /// Log in, returning the session whatever the outcome.
    pub async fn login(&self, username: &str, password: &str) -> Session {
        let mut session = Session::new();
        session.authenticate(&self.db, username, &secret(password)).await;
        session
    }

    /// Create an account and return a logged-in session for it.
    pub async fn session_for(&self, username: &str, role: Role) -> Session {
        self.create_user(username, "pw", role).await;
        let session = self.login(username, "pw").await;
        assert!(session.is_authenticated());
        session
    }
}

pub fn secret(value: &str) -> SecretString {
    SecretString::from(value)
}

pub fn client_named(name: &str) -> ClientFields {
    ClientFields {
        name: name.to_owned(),
        ..ClientFields::default()
    }
}
