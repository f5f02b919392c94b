//! Client-side session and authorization core for the clinic management API.
//!
//! Two cooperating components carry the design weight here. The
//! [`SessionStore`](auth::session::SessionStore) owns the authenticated-user
//! record for the process lifetime, persists the bearer credential across
//! reloads, and publishes every change reactively. The authorization
//! evaluator, [`has_permission`](auth::permissions::has_permission), is a
//! pure predicate over the stored user that gates every privileged route and
//! affordance. Everything else in a front end (lists, forms, navigation) is a
//! mechanical consumer of these two plus the uniform [`resources`] layer.
//!
//! Typical bootstrap:
//!
//! ```no_run
//! use clinic_client::{ApiClient, Config, SessionStore};
//! use clinic_client::storage::FileCredentialStore;
//! use std::sync::Arc;
//!
//! # async fn bootstrap() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let api = Arc::new(ApiClient::new(&config)?);
//! let store = FileCredentialStore::new(config.session_file.clone());
//! let session = SessionStore::new(api.clone(), Box::new(store));
//! session.restore().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod resources;
pub mod storage;

pub use api::{ApiClient, AuthApi};
pub use auth::models::{Credential, LoginRequest, Permission, Role, User};
pub use auth::permissions::has_permission;
pub use auth::session::{SessionState, SessionStore};
pub use config::Config;
pub use errors::{ClientResult, Error};
pub use storage::{CredentialStorage, FileCredentialStore, MemoryCredentialStore};
