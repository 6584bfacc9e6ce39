//! PostgREST-compatible remote store over HTTP.
//!
//! Rows use the hosted table's snake_case columns; this module is the only
//! place that knows the column names.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use gallery_core::{
    remote::sort_published, Category, Item, ItemFields, ItemId, RemoteError, RemoteStore,
    RemoteUpdate,
};

const TIMEOUT: Duration = Duration::from_secs(30);

/// A row as the hosted table returns it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Row {
    id: i64,
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    audio_file: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    published_year: Option<i32>,
    #[serde(default)]
    display_order: Option<u32>,
}

impl From<Row> for Item {
    fn from(row: Row) -> Self {
        Item {
            id: ItemId(row.id),
            fields: ItemFields {
                title: row.title,
                creator: row.author.unwrap_or_default(),
                cover_image_ref: non_empty(row.cover_image),
                audio_ref: non_empty(row.audio_file),
                description: non_empty(row.description),
                rich_content: non_empty(row.content),
                category: Category::from(row.genre),
                year: row.published_year,
            },
            display_order: row.display_order.unwrap_or(0),
        }
    }
}

/// Editable columns. `cover_image` and `audio_file` are NOT NULL upstream.
#[derive(Debug, Serialize)]
struct RowFields<'a> {
    title: &'a str,
    author: &'a str,
    cover_image: &'a str,
    audio_file: &'a str,
    description: Option<&'a str>,
    content: Option<&'a str>,
    genre: &'a str,
    published_year: Option<i32>,
}

impl<'a> From<&'a ItemFields> for RowFields<'a> {
    fn from(f: &'a ItemFields) -> Self {
        RowFields {
            title: &f.title,
            author: &f.creator,
            cover_image: f.cover_image_ref.as_deref().unwrap_or_default(),
            audio_file: f.audio_ref.as_deref().unwrap_or_default(),
            description: f.description.as_deref(),
            content: f.rich_content.as_deref(),
            genre: f.category.as_str(),
            published_year: f.year,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Body for an insert: every editable column, unranked.
pub(crate) fn insert_body(fields: &ItemFields) -> Result<Value, RemoteError> {
    let mut body = serde_json::to_value(RowFields::from(fields))?;
    if let Value::Object(map) = &mut body {
        map.insert("display_order".into(), Value::from(0));
    }
    Ok(body)
}

/// Body for an update: only the columns the change carries.
pub(crate) fn update_body(change: &RemoteUpdate) -> Result<Value, RemoteError> {
    let mut map = match &change.fields {
        Some(fields) => match serde_json::to_value(RowFields::from(fields))? {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        None => Map::new(),
    };
    if let Some(order) = change.display_order {
        map.insert("display_order".into(), Value::from(order));
    }
    Ok(Value::Object(map))
}

fn map_err(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            RemoteError::Rejected(format!("HTTP {code}: {body}"))
        }
        ureq::Error::Transport(t) => RemoteError::Transport(t.to_string()),
    }
}

fn decode_err(err: std::io::Error) -> RemoteError {
    RemoteError::Rejected(format!("unreadable response: {err}"))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct RestRemote {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl RestRemote {
    /// `base_url` is the project URL, e.g. `https://<ref>.supabase.co`.
    pub fn new(base_url: &str, table: &str, api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
        Self {
            agent,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: &str) -> ureq::Request {
        self.agent
            .request(method, &self.endpoint)
            .set("apikey", &self.api_key)
            .set("Authorization", &format!("Bearer {}", self.api_key))
    }
}

impl std::fmt::Debug for RestRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestRemote")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RemoteStore for RestRemote {
    fn fetch_all(&self) -> Result<Vec<Item>, RemoteError> {
        let rows: Vec<Row> = self
            .request("GET")
            .query("select", "*")
            .query("order", "display_order.asc")
            .call()
            .map_err(map_err)?
            .into_json()
            .map_err(decode_err)?;
        let mut items: Vec<Item> = rows.into_iter().map(Item::from).collect();
        sort_published(&mut items);
        Ok(items)
    }

    fn insert(&self, fields: &ItemFields) -> Result<ItemId, RemoteError> {
        let rows: Vec<Row> = self
            .request("POST")
            .set("Prefer", "return=representation")
            .send_json(insert_body(fields)?)
            .map_err(map_err)?
            .into_json()
            .map_err(decode_err)?;
        rows.into_iter()
            .next()
            .map(|row| ItemId(row.id))
            .ok_or_else(|| RemoteError::Rejected("insert returned no row".into()))
    }

    fn update(&self, id: ItemId, change: &RemoteUpdate) -> Result<(), RemoteError> {
        self.request("PATCH")
            .query("id", &format!("eq.{id}"))
            .send_json(update_body(change)?)
            .map_err(map_err)?;
        Ok(())
    }

    fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        self.request("DELETE")
            .query("id", &format!("eq.{id}"))
            .call()
            .map_err(map_err)?;
        Ok(())
    }
}
