//! Uniform typed access to the entity CRUD endpoints.
//!
//! Every list/form screen consumes one `Resource` handle; screens never build
//! URLs or attach headers themselves. After a successful write the caller
//! refetches the dependent list rather than patching a local cache.

use crate::api::ApiClient;
use crate::errors::ClientResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed handle over one entity collection, e.g. `pacientes`.
pub struct Resource<T> {
    api: Arc<ApiClient>,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(api: Arc<ApiClient>, path: &str) -> Self {
        Resource {
            api,
            path: path.trim_matches('/').to_string(),
            _marker: PhantomData,
        }
    }

    pub async fn list(&self) -> ClientResult<Vec<T>> {
        self.api.get_json(&self.collection_path()).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<T> {
        self.api.get_json(&self.detail_path(id)).await
    }

    pub async fn create<B>(&self, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.api.post_json(&self.collection_path(), body).await
    }

    pub async fn update<B>(&self, id: i64, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.api.put_json(&self.detail_path(id), body).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&self.detail_path(id)).await
    }

    // The API serves collections under a trailing slash
    fn collection_path(&self) -> String {
        format!("{}/", self.path)
    }

    fn detail_path(&self, id: i64) -> String {
        format!("{}/{}", self.path, id)
    }
}

/// Clinic visible on the login screen's tenant selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
}

/// Lists the tenants available for selection before authentication. This is
/// the one endpoint consumed without a credential attached.
pub async fn public_tenants(api: &ApiClient) -> ClientResult<Vec<Tenant>> {
    api.get_json("clinicas-public/").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn api() -> Arc<ApiClient> {
        let config = Config {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            request_timeout_seconds: 5,
            session_file: std::path::PathBuf::from("/tmp/unused-session.json"),
        };
        Arc::new(ApiClient::new(&config).unwrap())
    }

    #[test]
    fn paths_are_normalized() {
        let resource: Resource<Tenant> = Resource::new(api(), "/pacientes/");
        assert_eq!(resource.collection_path(), "pacientes/");
        assert_eq!(resource.detail_path(5), "pacientes/5");
    }
}
