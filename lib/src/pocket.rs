//! Pocket API client: OAuth token flow and saved-item retrieval.

use crate::error::{PocketmarkError, Result};
use crate::models::SourceItem;
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

const API_BASE: &str = "https://getpocket.com";
pub const REDIRECT_URI: &str = "https://getpocket.com/connected_accounts";

/// Delay between access-token polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct RequestTokenResponse {
    code: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    username: Option<String>,
}

pub struct PocketClient {
    client: Client,
    consumer_key: String,
}

impl PocketClient {
    pub fn new(consumer_key: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            consumer_key: consumer_key.into(),
        })
    }

    /// First OAuth step: obtain a request token to be authorized by the user
    pub fn request_token(&self) -> Result<String> {
        let resp = self
            .client
            .post(format!("{}/v3/oauth/request", API_BASE))
            .header("X-Accept", "application/json")
            .form(&[
                ("consumer_key", self.consumer_key.as_str()),
                ("redirect_uri", REDIRECT_URI),
            ])
            .send()?;
        let resp = check_status(resp)?;
        let token: RequestTokenResponse = resp.json()?;
        log::debug!("Obtained Pocket request token");
        Ok(token.code)
    }

    /// Wait for the user to authorize `code` and exchange it for an access token
    pub fn poll_access_token(
        &self,
        code: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<String> {
        let started = Instant::now();
        loop {
            let sent = self
                .client
                .post(format!("{}/v3/oauth/authorize", API_BASE))
                .header("X-Accept", "application/json")
                .form(&[("consumer_key", self.consumer_key.as_str()), ("code", code)])
                .send();
            match sent {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    let token: AccessTokenResponse = resp.json()?;
                    if let Some(username) = &token.username {
                        log::info!("Authorized as Pocket user {}", username);
                    }
                    return Ok(token.access_token);
                }
                Ok(resp) => log::debug!("Authorization pending (status {})", resp.status()),
                Err(e) => log::debug!("Authorization poll failed: {}", e),
            }

            if started.elapsed() + interval > timeout {
                return Err(PocketmarkError::Auth(format!(
                    "no authorization after {} seconds",
                    timeout.as_secs()
                )));
            }
            thread::sleep(interval);
        }
    }

    /// Retrieve every saved item, oldest first, `page_size` items per request
    ///
    /// `on_page` is called with the running total after each page.
    pub fn fetch_items(
        &self,
        access_token: &str,
        page_size: usize,
        mut on_page: impl FnMut(usize),
    ) -> Result<Vec<SourceItem>> {
        let page_size = page_size.max(1);
        let mut items = Vec::new();
        loop {
            let resp = self
                .client
                .get(format!("{}/v3/get", API_BASE))
                .query(&[
                    ("consumer_key", self.consumer_key.as_str()),
                    ("access_token", access_token),
                    ("state", "all"),
                    ("detailType", "simple"),
                    ("sort", "oldest"),
                ])
                .query(&[("count", page_size), ("offset", items.len())])
                .send()?;
            let resp = check_status(resp)?;
            let page = parse_retrieve_response(resp.json()?)?;
            let received = page.len();
            items.extend(page);
            log::debug!("Fetched page of {} items ({} total)", received, items.len());
            on_page(items.len());

            if received < page_size {
                return Ok(items);
            }
        }
    }
}

/// Page the user opens to authorize a request token
pub fn authorize_url(request_token: &str) -> Result<String> {
    let url = Url::parse_with_params(
        &format!("{}/auth/authorize", API_BASE),
        &[("request_token", request_token), ("redirect_uri", REDIRECT_URI)],
    )
    .map_err(|e| PocketmarkError::Other(e.to_string()))?;
    Ok(url.to_string())
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    // Pocket explains failures in this header
    let detail = resp
        .headers()
        .get("X-Error")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Err(status_error(status, detail.as_deref()))
}

fn status_error(status: StatusCode, detail: Option<&str>) -> PocketmarkError {
    let msg = match status.as_u16() {
        400 => "HTTP 400 Bad Request - invalid consumer key or request",
        401 => "HTTP 401 Unauthorized - the access token is invalid or expired",
        403 => "HTTP 403 Forbidden - invalid consumer key or missing permissions",
        429 => "HTTP 429 Too Many Requests - Pocket rate limit reached",
        500..=599 => "HTTP 5xx Server Error - Pocket is experiencing issues",
        _ => "HTTP request failed with non-success status",
    };
    let msg = match detail {
        Some(detail) => format!("{} ({})", msg, detail),
        None => format!("{} (Status: {})", msg, status),
    };
    match status.as_u16() {
        400 | 401 | 403 => PocketmarkError::Auth(msg),
        _ => PocketmarkError::Other(msg),
    }
}

/// Items of one `/v3/get` response, in `sort_id` order
///
/// `list` is an object keyed by item id, or an empty array when nothing matched.
pub fn parse_retrieve_response(response: Value) -> Result<Vec<SourceItem>> {
    let list = match response {
        Value::Object(mut object) => object.remove("list").unwrap_or(Value::Null),
        _ => {
            return Err(PocketmarkError::Json(
                "retrieve response is not an object".to_string(),
            ))
        }
    };
    let entries = match list {
        Value::Object(map) => map,
        Value::Array(array) if array.is_empty() => return Ok(Vec::new()),
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(PocketmarkError::Json(
                "\"list\" is neither an object nor an empty array".to_string(),
            ))
        }
    };

    let mut ranked = Vec::with_capacity(entries.len());
    for (position, (key, mut entry)) in entries.into_iter().enumerate() {
        let sort_id = entry.get("sort_id").and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        });
        if let Value::Object(fields) = &mut entry {
            fields
                .entry("item_id")
                .or_insert_with(|| Value::from(key.as_str()));
        }
        let item: SourceItem = serde_json::from_value(entry)?;
        ranked.push((sort_id.unwrap_or(position as u64), position, item));
    }
    ranked.sort_by_key(|(sort_id, position, _)| (*sort_id, *position));
    Ok(ranked.into_iter().map(|(_, _, item)| item).collect())
}

/// Read items saved earlier: a `/v3/get` response or a plain list of items
pub fn load_items_file(path: &Path) -> Result<Vec<SourceItem>> {
    let raw = fs::read(path)?;
    let value: Value = serde_json::from_slice(&raw)?;
    let items = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => parse_retrieve_response(other)?,
    };
    log::debug!("Loaded {} items from {:?}", items.len(), path);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn ids(items: &[SourceItem]) -> Vec<&str> {
        items.iter().map(|i| i.item_id.as_str()).collect()
    }

    #[test]
    fn test_parse_orders_by_sort_id() {
        let response = json!({
            "status": 1,
            "list": {
                "300": {"item_id": "300", "sort_id": 2, "given_url": "https://c.example/"},
                "100": {"item_id": "100", "sort_id": 0, "resolved_title": "A", "resolved_url": "https://a.example/"},
                "200": {"item_id": "200", "sort_id": "1", "given_title": "B"}
            }
        });
        let items = parse_retrieve_response(response).unwrap();
        assert_eq!(ids(&items), vec!["100", "200", "300"]);
        assert_eq!(items[0].title(), "A");
        assert_eq!(items[1].url(), None);
    }

    #[test]
    fn test_parse_without_sort_id_keeps_response_order() {
        let response = json!({
            "list": {
                "9": {"given_url": "https://nine.example/"},
                "3": {"given_url": "https://three.example/"}
            }
        });
        let items = parse_retrieve_response(response).unwrap();
        assert_eq!(ids(&items), vec!["9", "3"]);
    }

    #[rstest]
    #[case(json!({"status": 2, "list": []}))]
    #[case(json!({"status": 1, "list": {}}))]
    #[case(json!({"status": 1}))]
    fn test_parse_empty_list(#[case] response: Value) {
        assert!(parse_retrieve_response(response).unwrap().is_empty());
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!({"list": [{"item_id": "1"}]}))]
    #[case(json!({"list": "nope"}))]
    fn test_parse_rejects_unexpected_shapes(#[case] response: Value) {
        assert!(matches!(
            parse_retrieve_response(response),
            Err(PocketmarkError::Json(_))
        ));
    }

    #[test]
    fn test_load_items_file_accepts_both_shapes() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{"list": {"1": {"item_id": "1", "sort_id": 0, "given_url": "https://a.example/"}}}"#,
        )
        .unwrap();
        assert_eq!(ids(&load_items_file(file.path()).unwrap()), vec!["1"]);

        fs::write(
            file.path(),
            r#"[{"item_id": "5", "given_title": "Five"}, {"item_id": "6"}]"#,
        )
        .unwrap();
        let items = load_items_file(file.path()).unwrap();
        assert_eq!(ids(&items), vec!["5", "6"]);
        assert_eq!(items[0].title(), "Five");
    }

    #[test]
    fn test_authorize_url_encodes_parameters() {
        let url = authorize_url("abc-123").unwrap();
        assert_eq!(
            url,
            "https://getpocket.com/auth/authorize?request_token=abc-123\
             &redirect_uri=https%3A%2F%2Fgetpocket.com%2Fconnected_accounts"
        );
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, true)]
    #[case(StatusCode::FORBIDDEN, true)]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, false)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    fn test_status_errors(#[case] status: StatusCode, #[case] is_auth: bool) {
        let err = status_error(status, None);
        assert_eq!(matches!(err, PocketmarkError::Auth(_)), is_auth);
        assert!(err.to_string().contains(status.as_str()));
    }

    #[test]
    fn test_status_error_uses_pocket_detail() {
        let err = status_error(StatusCode::FORBIDDEN, Some("Invalid consumer key."));
        assert!(err.to_string().contains("Invalid consumer key."));
    }
}
