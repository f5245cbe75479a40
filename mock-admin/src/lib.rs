use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub comment: Option<String>,
    pub custom_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Deserialize)]
pub struct CreateGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub custom_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub custom_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub size: Option<usize>,
    pub offset: Option<String>,
    pub custom_id: Option<String>,
    pub tags: Option<String>,
}

/// Groups in insertion order; list offsets index into it.
pub type Db = Arc<RwLock<Vec<Group>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route(
            "/groups/{id_or_name}",
            get(get_group).patch(update_group).delete(delete_group),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn not_found() -> (StatusCode, Json<Value>) {
    error(StatusCode::NOT_FOUND, "Not found")
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn position(groups: &[Group], id_or_name: &str) -> Option<usize> {
    groups
        .iter()
        .position(|g| g.id == id_or_name)
        .or_else(|| groups.iter().position(|g| g.name == id_or_name))
}

/// `a,b` matches any tag, `a/b` requires all of them.
fn matches_tags(group: &Group, filter: &str) -> bool {
    let tags = group.tags.as_deref().unwrap_or_default();
    if filter.contains('/') {
        filter.split('/').all(|t| tags.iter().any(|g| g == t))
    } else {
        filter.split(',').any(|t| tags.iter().any(|g| g == t))
    }
}

async fn list_groups(State(db): State<Db>, Query(params): Query<ListParams>) -> ApiResult<Json<Value>> {
    let groups = db.read().await;
    let filtered: Vec<&Group> = groups
        .iter()
        .filter(|g| match &params.custom_id {
            Some(custom_id) => g.custom_id.as_deref() == Some(custom_id.as_str()),
            None => true,
        })
        .filter(|g| params.tags.as_deref().map_or(true, |t| matches_tags(g, t)))
        .collect();

    let size = params.size.unwrap_or(DEFAULT_PAGE_SIZE);
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(error(
            StatusCode::BAD_REQUEST,
            &format!("size must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }
    let start = match params.offset.as_deref() {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| error(StatusCode::BAD_REQUEST, "invalid offset"))?,
        None => 0,
    };

    let end = start.saturating_add(size).min(filtered.len());
    let page: Vec<&Group> = filtered.get(start..end).unwrap_or_default().to_vec();
    debug!(start, end, total = filtered.len(), "list groups");

    let body = if end < filtered.len() {
        json!({ "data": page, "next": format!("/groups?offset={end}"), "offset": end.to_string() })
    } else {
        json!({ "data": page, "next": null })
    };
    Ok(Json(body))
}

async fn create_group(
    State(db): State<Db>,
    Json(input): Json<CreateGroup>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    let name = input
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "schema violation (name: required field missing)"))?;

    let mut groups = db.write().await;
    let id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    if groups.iter().any(|g| g.id == id || g.name == name) {
        return Err(error(StatusCode::CONFLICT, "UNIQUE violation detected"));
    }

    let ts = now();
    let group = Group {
        id,
        name,
        comment: input.comment,
        custom_id: input.custom_id,
        tags: input.tags,
        created_at: ts,
        updated_at: ts,
    };
    groups.push(group.clone());
    Ok((StatusCode::CREATED, Json(group)))
}

async fn get_group(State(db): State<Db>, Path(id_or_name): Path<String>) -> ApiResult<Json<Group>> {
    let groups = db.read().await;
    position(&groups, &id_or_name)
        .map(|i| Json(groups[i].clone()))
        .ok_or_else(not_found)
}

async fn update_group(
    State(db): State<Db>,
    Path(id_or_name): Path<String>,
    Json(input): Json<UpdateGroup>,
) -> ApiResult<Json<Group>> {
    let mut groups = db.write().await;
    let i = position(&groups, &id_or_name).ok_or_else(not_found)?;
    if let Some(name) = &input.name {
        let taken = groups.iter().enumerate().any(|(j, g)| j != i && &g.name == name);
        if taken {
            return Err(error(StatusCode::CONFLICT, "UNIQUE violation detected"));
        }
    }
    let group = &mut groups[i];
    if let Some(name) = input.name {
        group.name = name;
    }
    if let Some(comment) = input.comment {
        group.comment = Some(comment);
    }
    if let Some(custom_id) = input.custom_id {
        group.custom_id = Some(custom_id);
    }
    if let Some(tags) = input.tags {
        group.tags = Some(tags);
    }
    group.updated_at = now();
    Ok(Json(group.clone()))
}

async fn delete_group(State(db): State<Db>, Path(id_or_name): Path<String>) -> StatusCode {
    let mut groups = db.write().await;
    if let Some(i) = position(&groups, &id_or_name) {
        groups.remove(i);
    }
    StatusCode::NO_CONTENT
}
