//! The Group resource.
//!
//! A group is addressed by its `id` or its `name`, and optionally by a
//! caller-owned `custom_id`. Attributes this crate does not model are kept in
//! `extra` so a fetched group can be sent back without losing them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::AdminClient;
use crate::resource::{Resource, ResourceService};
use crate::transport::Transport;

/// A group as stored by the admin API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

impl Resource for Group {
    const COLLECTION: &'static str = "/groups";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Create, fetch, update, delete and list groups.
pub type GroupService<'c, T> = ResourceService<'c, Group, T>;

impl<T: Transport> AdminClient<T> {
    pub fn groups(&self) -> GroupService<'_, T> {
        ResourceService::new(self)
    }
}
