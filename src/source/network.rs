//! Network content source.
//!
//! Issues one `POST {base}/organizations/{org}/user-sessions` per session
//! start. The response body is `{ "content": [ ... ] }` where every entry
//! carries at least `triggerPoint` and `type`; the whole entry is kept as the
//! item's payload for the rendering layer.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::{ContentSource, FetchRequest};
use crate::content::{ContentItem, ContentKind};
use crate::error::{ConfigError, FetchError};
use crate::value::Attributes;

/// Request body sent to the content service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionContentRequest<'a> {
    user_id: &'a str,
    user_attributes: &'a Attributes,
}

/// Response body returned by the content service.
#[derive(Debug, Deserialize)]
struct SessionContentResponse {
    #[serde(default)]
    content: Vec<serde_json::Value>,
}

/// HTTP-backed content source.
#[derive(Debug, Clone)]
pub struct NetworkContentSource {
    client: Client,
    base_url: Url,
}

impl NetworkContentSource {
    /// Creates a source talking to `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint for an organization, with the code percent-encoded as a path segment.
    fn sessions_url(&self, organization_code: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Network {
                message: format!("base URL {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["organizations", organization_code, "user-sessions"]);
        Ok(url)
    }
}

#[async_trait]
impl ContentSource for NetworkContentSource {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<ContentItem>, FetchError> {
        let url = self.sessions_url(&request.organization_code)?;
        let body = SessionContentRequest {
            user_id: &request.user_id,
            user_attributes: &request.attributes,
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &request.organization_code, &text));
        }

        let decoded: SessionContentResponse =
            response.json().await.map_err(|e| FetchError::MalformedResponse {
                message: e.to_string(),
            })?;

        Ok(decode_catalog(decoded.content))
    }
}

fn classify_status(status: StatusCode, organization_code: &str, body: &str) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Unauthorized {
            message: format!("HTTP {} - {}", status.as_u16(), body),
        },
        StatusCode::NOT_FOUND => FetchError::InvalidOrg {
            org_code: organization_code.to_string(),
        },
        _ => FetchError::Network {
            message: format!("HTTP {} - {}", status.as_u16(), body),
        },
    }
}

/// Turns wire entries into items, skipping entries that cannot be placed.
fn decode_catalog(entries: Vec<serde_json::Value>) -> Vec<ContentItem> {
    let mut items = Vec::with_capacity(entries.len());

    for entry in entries {
        let trigger_point = entry.get("triggerPoint").and_then(serde_json::Value::as_str);
        let kind = entry
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::parse::<ContentKind>);

        match (trigger_point, kind) {
            (Some(code), Some(Ok(kind))) if !code.is_empty() => {
                let code = code.to_string();
                items.push(ContentItem::new(code, kind, entry));
            }
            (_, Some(Err(e))) => {
                tracing::warn!(error = %e, "skipping content entry with unknown type");
            }
            _ => {
                tracing::warn!("skipping content entry without triggerPoint or type");
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(NetworkContentSource::new("not a url").is_err());
        assert!(NetworkContentSource::new("mailto:someone@example.com").is_err());
        assert!(NetworkContentSource::new("https://content.example.com/api").is_ok());
    }

    #[test]
    fn sessions_url_encodes_organization() {
        let source = NetworkContentSource::new("https://content.example.com/api/").unwrap();
        let url = source.sessions_url("demo org").unwrap();
        assert_eq!(
            url.as_str(),
            "https://content.example.com/api/organizations/demo%20org/user-sessions"
        );
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "o", ""),
            FetchError::Unauthorized { .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "o", ""),
            FetchError::Unauthorized { .. }
        ));
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, "demo-org", ""),
            FetchError::InvalidOrg {
                org_code: "demo-org".to_string()
            }
        );
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "o", "upstream"),
            FetchError::Network { .. }
        ));
    }

    #[test]
    fn decode_keeps_entry_as_payload_and_skips_bad_entries() {
        let items = decode_catalog(vec![
            json!({"triggerPoint": "home", "type": "popup", "title": "Hello"}),
            json!({"triggerPoint": "home", "type": "carousel"}),
            json!({"type": "popup"}),
            json!({"triggerPoint": "settings", "type": "button-triggered"}),
        ]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind(), ContentKind::Popup);
        assert_eq!(items[0].payload()["title"], "Hello");
        assert_eq!(items[1].trigger_point(), "settings");
        assert_eq!(items[1].kind(), ContentKind::ButtonTriggered);
    }
}
