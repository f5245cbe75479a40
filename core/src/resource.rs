//! Generic CRUD service over one admin API collection.
//!
//! # Design
//! Every collection exposes the same surface: `POST /{coll}`,
//! `GET|PATCH|DELETE /{coll}/{id}`, and a paginated `GET /{coll}` that also
//! accepts a `custom_id` filter. `ResourceService` implements that surface
//! once; a type only needs to implement `Resource` to get it. As in
//! `AdminClient`, each operation is split into a pure `build_*` step and an
//! executing step.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::client::AdminClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::pagination::ListOpt;
use crate::transport::Transport;

/// An entity stored in an admin API collection.
pub trait Resource: Serialize + DeserializeOwned {
    /// Collection path, e.g. `/groups`.
    const COLLECTION: &'static str;

    /// Server identifier, when known.
    fn id(&self) -> Option<&str>;
}

#[derive(Deserialize)]
struct DataEnvelope<R> {
    #[serde(default = "Vec::new")]
    data: Vec<R>,
}

/// CRUD operations for `R` through a shared `AdminClient`.
pub struct ResourceService<'c, R, T> {
    client: &'c AdminClient<T>,
    _resource: PhantomData<fn() -> R>,
}

impl<'c, R: Resource, T: Transport> ResourceService<'c, R, T> {
    pub fn new(client: &'c AdminClient<T>) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn build_create(&self, entity: &R) -> Result<HttpRequest, ApiError> {
        self.client
            .new_request(HttpMethod::Post, R::COLLECTION, Vec::new(), Some(entity))
    }

    pub fn build_get(&self, id_or_name: &str) -> Result<HttpRequest, ApiError> {
        let path = entity_path::<R>(id_or_name, "Get")?;
        self.client.new_request::<()>(HttpMethod::Get, &path, Vec::new(), None)
    }

    pub fn build_get_by_custom_id(&self, custom_id: &str) -> Result<HttpRequest, ApiError> {
        if custom_id.is_empty() {
            return Err(ApiError::Validation(
                "custom_id cannot be empty for Get operation".to_string(),
            ));
        }
        let query = vec![("custom_id".to_string(), custom_id.to_string())];
        self.client
            .new_request::<()>(HttpMethod::Get, R::COLLECTION, query, None)
    }

    pub fn build_update(&self, entity: &R) -> Result<HttpRequest, ApiError> {
        let id = entity.id().unwrap_or_default();
        if id.is_empty() {
            return Err(ApiError::Validation(
                "ID cannot be empty for Update operation".to_string(),
            ));
        }
        let path = format!("{}/{}", R::COLLECTION, urlencoding::encode(id));
        self.client
            .new_request(HttpMethod::Patch, &path, Vec::new(), Some(entity))
    }

    pub fn build_delete(&self, id_or_name: &str) -> Result<HttpRequest, ApiError> {
        let path = entity_path::<R>(id_or_name, "Delete")?;
        self.client
            .new_request::<()>(HttpMethod::Delete, &path, Vec::new(), None)
    }

    /// Create `entity`. A caller-supplied id is sent as part of the body.
    #[instrument(skip_all, fields(collection = R::COLLECTION, id = entity.id()))]
    pub fn create(&self, ctx: &CancellationToken, entity: &R) -> Result<R, ApiError> {
        let req = self.build_create(entity)?;
        self.client.execute(ctx, req)
    }

    #[instrument(skip(self, ctx), fields(collection = R::COLLECTION))]
    pub fn get(&self, ctx: &CancellationToken, id_or_name: &str) -> Result<R, ApiError> {
        let req = self.build_get(id_or_name)?;
        self.client.execute(ctx, req)
    }

    /// Fetch the first entity whose `custom_id` matches.
    ///
    /// An empty result set is reported as `ApiError::NotFound`.
    #[instrument(skip(self, ctx), fields(collection = R::COLLECTION))]
    pub fn get_by_custom_id(&self, ctx: &CancellationToken, custom_id: &str) -> Result<R, ApiError> {
        let req = self.build_get_by_custom_id(custom_id)?;
        let envelope: DataEnvelope<R> = self.client.execute(ctx, req)?;
        envelope.data.into_iter().next().ok_or(ApiError::NotFound)
    }

    #[instrument(skip_all, fields(collection = R::COLLECTION, id = entity.id()))]
    pub fn update(&self, ctx: &CancellationToken, entity: &R) -> Result<R, ApiError> {
        let req = self.build_update(entity)?;
        self.client.execute(ctx, req)
    }

    #[instrument(skip(self, ctx), fields(collection = R::COLLECTION))]
    pub fn delete(&self, ctx: &CancellationToken, id_or_name: &str) -> Result<(), ApiError> {
        let req = self.build_delete(id_or_name)?;
        self.client.execute_empty(ctx, req)
    }

    /// Fetch one page. The returned options point at the next page, or are
    /// `None` once the collection is exhausted.
    #[instrument(skip_all, fields(collection = R::COLLECTION, offset = opt.offset.as_deref()))]
    pub fn list(&self, ctx: &CancellationToken, opt: &ListOpt) -> Result<(Vec<R>, Option<ListOpt>), ApiError> {
        let (data, next) = self.client.list(ctx, R::COLLECTION, opt)?;
        let entities = data
            .into_iter()
            .map(decode::<R>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entities, next))
    }

    /// Walk every page of the collection.
    ///
    /// This makes one request per page and can take a while on large
    /// collections. The first failing page aborts the walk.
    #[instrument(skip_all, fields(collection = R::COLLECTION))]
    pub fn list_all(&self, ctx: &CancellationToken) -> Result<Vec<R>, ApiError> {
        let mut all = Vec::new();
        let mut opt = Some(ListOpt::with_size(self.client.config().page_size));
        let mut pages = 0usize;
        while let Some(current) = opt {
            let (entities, next) = self.list(ctx, &current)?;
            all.extend(entities);
            opt = next;
            pages += 1;
        }
        info!(pages, total = all.len(), "listed collection");
        Ok(all)
    }
}

/// `/{collection}/{identifier}` with the identifier encoded as one segment.
fn entity_path<R: Resource>(id_or_name: &str, operation: &str) -> Result<String, ApiError> {
    if id_or_name.is_empty() {
        return Err(ApiError::Validation(format!(
            "identifier cannot be empty for {operation} operation"
        )));
    }
    Ok(format!("{}/{}", R::COLLECTION, urlencoding::encode(id_or_name)))
}

fn decode<R: DeserializeOwned>(record: Value) -> Result<R, ApiError> {
    serde_json::from_value(record).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
