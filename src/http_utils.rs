//! HTTP plumbing for the metadata service.
//!
//! [`ApiClient`] wraps a `reqwest` client with the JSON and bearer headers
//! built by [`crate::credentials::Credentials::build_client`]. Every
//! request is logged with its `Authorization` value redacted, a 404 becomes
//! [`RequestError::NotFound`] and every other non-2xx status is raised as a
//! plain HTTP error.

use reqwest::{
    header::{HeaderMap, AUTHORIZATION},
    Client, Method, Response, StatusCode,
};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

pub const REDACTED: &str = "[REDACTED]";

/// Error emitted while talking to the metadata service
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("the API base URL has not been configured")]
    MissingBaseUrl,
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("the API access token can not be sent as an HTTP header")]
    InvalidToken,
    #[error("resource not found: {0}")]
    NotFound(Url),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Joins the configured base URL and API prefix into a directory-style URL.
pub fn api_root(base_url: &Url, api_prefix: &str) -> Result<Url, RequestError> {
    let base = base_url.as_str().trim_end_matches('/');
    let prefix = api_prefix.trim_matches('/');
    let root = if prefix.is_empty() {
        format!("{}/", base)
    } else {
        format!("{}/{}/", base, prefix)
    };
    Ok(Url::parse(&root)?)
}

/// Renders headers for the log with the bearer token blanked out.
pub fn redacted_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            if name == AUTHORIZATION {
                format!("{}: {}", name, REDACTED)
            } else {
                format!("{}: {}", name, value.to_str().unwrap_or("<binary>"))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Client bound to one API root and one set of request headers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    root: Url,
    headers: HeaderMap,
}

impl ApiClient {
    pub fn new(root: Url, headers: HeaderMap) -> Result<Self, RequestError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            root,
            headers,
        })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Resolves a relative, already percent-encoded path against the API root.
    pub fn url(&self, path: &str) -> Result<Url, RequestError> {
        Ok(Url::parse(&format!("{}{}", self.root, path))?)
    }

    /// GET a JSON document. An empty body is returned as `null`.
    pub async fn get(&self, path: &str) -> Result<Value, RequestError> {
        let response = self.execute(Method::GET, path, None).await?;
        let text = response.text().await?;
        trace!("Response body: {}", text);

        if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    /// PUT a JSON document, discarding the response body.
    pub async fn put(&self, path: &str, body: &Value) -> Result<(), RequestError> {
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        trace!("Response body: {}", response.text().await?);
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), RequestError> {
        let response = self.execute(Method::DELETE, path, None).await?;
        trace!("Response body: {}", response.text().await?);
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, RequestError> {
        let url = self.url(path)?;

        let mut builder = self
            .client
            .request(method, url.clone())
            .headers(self.headers.clone());
        if let Some(body) = body {
            builder = builder.body(serde_json::to_string(body)?);
        }
        let request = builder.build()?;

        debug!("{} {}", request.method(), request.url());
        debug!("Request headers: {}", redacted_headers(request.headers()));
        if let Some(body) = body {
            trace!("Request body: {}", body);
        }

        let response = self.client.execute(request).await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Err(RequestError::NotFound(url));
        }
        Ok(response.error_for_status()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::header::{HeaderValue, ACCEPT};
    use serde_json::json;

    #[test]
    fn test_api_root_normalizes_slashes() {
        let base = Url::parse("https://fleet.example.com/").unwrap();
        assert_eq!(
            api_root(&base, "/api/v1").unwrap().as_str(),
            "https://fleet.example.com/api/v1/"
        );
        assert_eq!(
            api_root(&base, "").unwrap().as_str(),
            "https://fleet.example.com/"
        );

        let nested = Url::parse("https://fleet.example.com/center").unwrap();
        assert_eq!(
            api_root(&nested, "api/v1/").unwrap().as_str(),
            "https://fleet.example.com/center/api/v1/"
        );
    }

    #[test]
    fn test_redacted_headers_hide_the_token() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret-token"));

        let rendered = redacted_headers(&headers);
        assert!(rendered.contains("accept: application/json"));
        assert!(rendered.contains("authorization: [REDACTED]"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn test_url_keeps_encoded_segments() {
        let client = ApiClient::new(
            Url::parse("http://localhost/api/v1/").unwrap(),
            HeaderMap::new(),
        )
        .unwrap();
        let url = client.url("assets/42/metadata/display%20name").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost/api/v1/assets/42/metadata/display%20name"
        );
    }

    #[tokio::test]
    async fn test_not_found_and_server_errors_are_distinct() {
        let server = MockServer::start_async().await;
        let missing = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        let broken = server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        });

        let client = ApiClient::new(Url::parse(&server.url("/")).unwrap(), HeaderMap::new())
            .unwrap();

        assert!(matches!(
            client.get("missing").await,
            Err(RequestError::NotFound(_))
        ));
        assert!(matches!(
            client.get("broken").await,
            Err(RequestError::HttpError(_))
        ));
        missing.assert();
        broken.assert();
    }

    #[tokio::test]
    async fn test_get_parses_json_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/thing");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"rack": "3"}));
        });

        let client = ApiClient::new(Url::parse(&server.url("/")).unwrap(), HeaderMap::new())
            .unwrap();
        let body = client.get("thing").await.unwrap();
        assert_eq!(body, json!({"rack": "3"}));
        mock.assert();
    }
}
