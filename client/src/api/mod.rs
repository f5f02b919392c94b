//! HTTP collaborator for the clinic REST API.
//!
//! `ApiClient` wraps a shared `reqwest::Client` plus the attached-header
//! state: the bearer credential has a single writer (the session store) and
//! is stamped onto every outgoing request. Any response with an
//! authentication-rejected status is mapped to `Error::SessionExpired` and
//! reported through the unauthorized hook, which is how mid-session token
//! rejection anywhere in the application routes back into the session
//! lifecycle.

use crate::auth::models::{Credential, LoginRequest, User};
use crate::config::Config;
use crate::errors::{ClientResult, Error};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// Callback fired when a request fails with an authentication-rejected
/// status. Installed once, by the session store.
pub type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// The identity surface the session store depends on: credential exchange,
/// identity resolution, and the attached-header state.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges username/password/tenant for a bearer credential.
    async fn exchange_credentials(&self, request: &LoginRequest) -> ClientResult<Credential>;

    /// Resolves the attached credential to the full user record.
    async fn fetch_current_user(&self) -> ClientResult<User>;

    /// Attaches the credential to all subsequent requests.
    fn set_bearer(&self, credential: &Credential);

    /// Clears the attached credential.
    fn clear_bearer(&self);
}

/// Typed client over the clinic REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer: RwLock<Option<String>>,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
}

impl ApiClient {
    /// Creates a client from configuration. No connection is opened until the
    /// first request.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(ApiClient {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bearer: RwLock::new(None),
            on_unauthorized: RwLock::new(None),
        })
    }

    /// Registers the callback fired when the API rejects the attached
    /// credential mid-session. The session store owns this slot.
    pub fn set_unauthorized_hook(&self, hook: UnauthorizedHook) {
        *self
            .on_unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Fetches and decodes a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.execute(self.http.get(self.endpoint(path))).await?;
        Ok(response.json().await?)
    }

    /// Creates a resource and decodes the record the server returns.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.http.post(self.endpoint(path)).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Replaces a resource and decodes the record the server returns.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.http.put(self.endpoint(path)).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Deletes a resource, discarding any response body.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(self.http.delete(self.endpoint(path))).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer_header(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn notify_unauthorized(&self) {
        let hook = self
            .on_unauthorized
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(hook) = hook.as_ref() {
            hook();
        }
    }

    /// Stamps the bearer header (when attached), sends the request, and maps
    /// failure statuses into the error taxonomy. Exactly one hook
    /// notification per authentication-rejected response.
    async fn execute(&self, request: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let request = match self.bearer_header() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            debug!("request rejected as unauthorized");
            self.notify_unauthorized();
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), message));
        }

        Ok(response)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    /// The exchange deliberately bypasses `execute`: a rejected login is an
    /// `Authentication` failure for the caller, not an expired session, so it
    /// must not fire the unauthorized hook.
    async fn exchange_credentials(&self, request: &LoginRequest) -> ClientResult<Credential> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .json(request)
            .send()
            .await
            .map_err(|err| {
                Error::authentication(format!("credential exchange unreachable: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::authentication(format!(
                "credential exchange rejected with status {status}"
            )));
        }

        response.json().await.map_err(|err| {
            Error::authentication(format!("malformed credential exchange response: {err}"))
        })
    }

    async fn fetch_current_user(&self) -> ClientResult<User> {
        self.get_json("users/me").await
    }

    fn set_bearer(&self, credential: &Credential) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) =
            Some(credential.header_value());
    }

    fn clear_bearer(&self) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        let config = Config {
            api_base_url: base_url.to_string(),
            request_timeout_seconds: 5,
            session_file: std::path::PathBuf::from("/tmp/unused-session.json"),
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn endpoint_joins_base_and_path() {
        let api = client("http://127.0.0.1:8000/api/");
        assert_eq!(
            api.endpoint("users/me"),
            "http://127.0.0.1:8000/api/users/me"
        );
        assert_eq!(
            api.endpoint("/pacientes/"),
            "http://127.0.0.1:8000/api/pacientes/"
        );
    }

    #[test]
    fn bearer_state_is_set_and_cleared() {
        let api = client("http://127.0.0.1:8000/api");
        assert_eq!(api.bearer_header(), None);

        api.set_bearer(&Credential {
            access_token: "abc".to_string(),
            token_type: "Bearer".to_string(),
        });
        assert_eq!(api.bearer_header(), Some("Bearer abc".to_string()));

        api.clear_bearer();
        assert_eq!(api.bearer_header(), None);
    }

    #[test]
    fn unauthorized_hook_fires_when_notified() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let api = client("http://127.0.0.1:8000/api");
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        api.set_unauthorized_hook(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        api.notify_unauthorized();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
