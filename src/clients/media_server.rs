//! Media server client
//!
//! The media server is authoritative for which streams exist. Different
//! server generations expose different listing endpoints and JSON shapes, so
//! the client walks a fallback chain and parses leniently: a stream without a
//! name is dropped, unknown fields are ignored.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::MediaServerConfig;
use crate::errors::{AppError, AppResult};

/// One live stream as reported by the media server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    pub name: String,
    pub title: Option<String>,
    pub dvr_days: Option<i32>,
}

#[async_trait]
pub trait MediaServerApi: Send + Sync {
    /// Fetch the complete current stream list
    async fn list_streams(&self) -> AppResult<Vec<MediaStream>>;
}

pub struct HttpMediaServerClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpMediaServerClient {
    pub fn new(config: &MediaServerConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    async fn fetch(&self, path: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    fn parse_streams(data: &Value) -> Vec<MediaStream> {
        let items: Vec<Value> = match data {
            Value::Array(items) => items.clone(),
            Value::Object(map) => {
                if let Some(Value::Array(items)) = map.get("streams") {
                    items.clone()
                } else if let Some(Value::Array(items)) = map.get("items") {
                    items.clone()
                } else {
                    // name -> config map
                    map.iter()
                        .filter_map(|(name, config)| {
                            config.as_object().map(|obj| {
                                let mut obj = obj.clone();
                                obj.insert("name".to_string(), Value::String(name.clone()));
                                Value::Object(obj)
                            })
                        })
                        .collect()
                }
            }
            _ => Vec::new(),
        };

        items
            .iter()
            .filter_map(Self::parse_stream)
            .collect()
    }

    fn parse_stream(item: &Value) -> Option<MediaStream> {
        let obj = item.as_object()?;
        let name = obj
            .get("name")
            .or_else(|| obj.get("stream_name"))
            .and_then(Value::as_str)?
            .to_string();
        if name.is_empty() {
            return None;
        }

        let title = obj
            .get("title")
            .or_else(|| obj.get("display_name"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(MediaStream {
            name,
            title,
            dvr_days: Self::extract_dvr_days(obj),
        })
    }

    /// DVR depth appears under several names and shapes across server versions
    fn extract_dvr_days(obj: &serde_json::Map<String, Value>) -> Option<i32> {
        for field in ["dvr", "dvr_days", "catchup_days", "archive_depth"] {
            match obj.get(field) {
                Some(Value::Number(n)) => {
                    if let Some(days) = n.as_i64() {
                        return i32::try_from(days).ok();
                    }
                }
                Some(Value::Object(inner)) => {
                    if let Some(days) = inner.get("days").and_then(Value::as_i64) {
                        return i32::try_from(days).ok();
                    }
                }
                _ => {}
            }
        }
        None
    }
}

#[async_trait]
impl MediaServerApi for HttpMediaServerClient {
    async fn list_streams(&self) -> AppResult<Vec<MediaStream>> {
        // Newer API first, then the legacy listings
        let endpoints = [
            "/streamer/api/v3/streams",
            "/flussonic/api/media",
            "/erlyvideo/api/streams",
        ];

        let mut last_error = None;
        for endpoint in endpoints {
            match self.fetch(endpoint).await {
                Ok(data) => {
                    let streams = Self::parse_streams(&data);
                    debug!(
                        endpoint,
                        count = streams.len(),
                        "fetched stream list from media server"
                    );
                    return Ok(streams);
                }
                Err(e) => {
                    debug!(endpoint, error = %e, "media server endpoint unavailable");
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::upstream(
            "media-server",
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no endpoint available".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_v3_stream_list() {
        let data = json!({
            "streams": [
                {"name": "sport1", "title": "Sport One", "dvr": 7},
                {"name": "news", "title": "News"},
            ]
        });
        let streams = HttpMediaServerClient::parse_streams(&data);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].name, "sport1");
        assert_eq!(streams[0].title.as_deref(), Some("Sport One"));
        assert_eq!(streams[0].dvr_days, Some(7));
        assert_eq!(streams[1].dvr_days, None);
    }

    #[test]
    fn parses_name_to_config_map() {
        let data = json!({
            "movies": {"title": "Movies", "dvr_days": 3},
            "kids": {"title": "Kids"},
        });
        let mut streams = HttpMediaServerClient::parse_streams(&data);
        streams.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].name, "kids");
        assert_eq!(streams[1].dvr_days, Some(3));
    }

    #[test]
    fn skips_entries_without_a_name() {
        let data = json!([
            {"title": "nameless"},
            {"name": "", "title": "empty"},
            {"name": "ok"},
        ]);
        let streams = HttpMediaServerClient::parse_streams(&data);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].name, "ok");
    }

    #[test]
    fn extracts_dvr_from_nested_object() {
        let data = json!([{"name": "s", "dvr": {"days": 14, "root": "/dvr"}}]);
        let streams = HttpMediaServerClient::parse_streams(&data);
        assert_eq!(streams[0].dvr_days, Some(14));
    }
}
