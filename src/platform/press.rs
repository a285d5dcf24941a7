use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AppSource, ReleasePlatform, SettingsProvider, SourceFilter};
use crate::error::PlatformError;
use crate::webhook_payloads::forgejo::HeadCommit;

pub const DEFAULT_RELEASE_METHOD: &str =
    "press.press.doctype.github_webhook_log.github_webhook_log.create_app_release";

const APP_SOURCE_RESOURCE: &str = "/api/resource/App%20Source";
const ERROR_LOG_RESOURCE: &str = "/api/resource/Error%20Log";
const SINGLE_VALUE_METHOD: &str = "/api/method/frappe.client.get_single_value";

/// API key pair of a Press administrator. Every platform call is made with it.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCredentials {
    pub api_key: String,
    pub api_secret: SecretString,
}

impl AdminCredentials {
    fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.api_secret.expose_secret())
    }
}

#[derive(Deserialize)]
struct SingleValue {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ResourceList<T> {
    data: Vec<T>,
}

/// Frappe REST client for a Press site.
///
/// Frappe commits at the end of every API request, so [`ReleasePlatform::commit`]
/// has nothing left to do here.
pub struct PressClient {
    http: reqwest::Client,
    base_url: String,
    credentials: AdminCredentials,
    release_method: String,
}

impl PressClient {
    pub fn new(
        base_url: &str,
        credentials: AdminCredentials,
        release_method: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            release_method: release_method.unwrap_or_else(|| DEFAULT_RELEASE_METHOD.to_string()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PlatformError> {
        let response = request
            .header(AUTHORIZATION, self.credentials.authorization())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SettingsProvider for PressClient {
    async fn webhook_secret(&self) -> Result<Option<String>, PlatformError> {
        let request = self.http.get(self.url(SINGLE_VALUE_METHOD)).query(&[
            ("doctype", "Press Settings"),
            ("field", "github_webhook_secret"),
        ]);

        let response: SingleValue = self.send(request).await?;
        Ok(response.message.filter(|secret| !secret.is_empty()))
    }
}

#[async_trait]
impl ReleasePlatform for PressClient {
    async fn find_app_sources(
        &self,
        filter: &SourceFilter,
    ) -> Result<Vec<AppSource>, PlatformError> {
        let filters = json!([
            ["branch", "=", filter.branch],
            ["repository", "=", filter.repository],
            ["enabled", "=", 1],
        ]);
        let request = self.http.get(self.url(APP_SOURCE_RESOURCE)).query(&[
            ("filters", filters.to_string()),
            ("fields", json!(["name", "app"]).to_string()),
            ("limit_page_length", "0".to_string()),
        ]);

        let response: ResourceList<AppSource> = self.send(request).await?;
        Ok(response.data)
    }

    async fn create_app_release(
        &self,
        source: &str,
        app: &str,
        commit: &HeadCommit,
    ) -> Result<(), PlatformError> {
        let path = format!("/api/method/{}", self.release_method);
        let request = self.http.post(self.url(&path)).json(&json!({
            "source": source,
            "app": app,
            "commit": commit,
        }));

        let _: Value = self.send(request).await?;
        Ok(())
    }

    async fn log_error(&self, title: &str, message: &str) {
        let request = self.http.post(self.url(ERROR_LOG_RESOURCE)).json(&json!({
            "method": title,
            "error": message,
        }));

        if let Err(e) = self.send::<Value>(request).await {
            tracing::warn!("Could not write Error Log entry: {e}");
        }
    }

    async fn commit(&self) -> Result<(), PlatformError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUTH: &str = "token admin-key:admin-secret";

    fn client(server: &MockServer) -> PressClient {
        let credentials = AdminCredentials {
            api_key: "admin-key".to_string(),
            api_secret: SecretString::from("admin-secret"),
        };
        PressClient::new(&server.uri(), credentials, None, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn reads_webhook_secret_from_press_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SINGLE_VALUE_METHOD))
            .and(query_param("doctype", "Press Settings"))
            .and(query_param("field", "github_webhook_secret"))
            .and(header("Authorization", AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "s3cr3t" })))
            .expect(1)
            .mount(&server)
            .await;

        let secret = client(&server).webhook_secret().await.unwrap();
        assert_eq!(secret.as_deref(), Some("s3cr3t"));
    }

    #[tokio::test]
    async fn empty_secret_reads_as_unset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SINGLE_VALUE_METHOD))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "" })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).webhook_secret().await.unwrap(), None);
    }

    #[tokio::test]
    async fn queries_enabled_app_sources() {
        let server = MockServer::start().await;
        let filters = json!([
            ["branch", "=", "main"],
            ["repository", "=", "demo"],
            ["enabled", "=", 1],
        ]);
        Mock::given(method("GET"))
            .and(path(APP_SOURCE_RESOURCE))
            .and(query_param("filters", filters.to_string()))
            .and(query_param("fields", r#"["name","app"]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "name": "src1", "app": "demo-app" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sources = client(&server)
            .find_app_sources(&SourceFilter {
                repository: "demo".to_string(),
                branch: "main".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            sources,
            vec![AppSource {
                name: "src1".to_string(),
                app: "demo-app".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn posts_release_with_commit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/api/method/{DEFAULT_RELEASE_METHOD}")))
            .and(header("Authorization", AUTH))
            .and(body_json(json!({
                "source": "src1",
                "app": "demo-app",
                "commit": { "id": "abcdef1234567890", "message": "bump" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": null })))
            .expect(1)
            .mount(&server)
            .await;

        let commit: HeadCommit =
            serde_json::from_value(json!({ "id": "abcdef1234567890", "message": "bump" })).unwrap();

        client(&server)
            .create_app_release("src1", "demo-app", &commit)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(417).set_body_string("App Release exists"))
            .mount(&server)
            .await;

        let result = client(&server)
            .create_app_release("src1", "demo-app", &HeadCommit::default())
            .await;

        match result {
            Err(PlatformError::Status { status, body }) => {
                assert_eq!(status, 417);
                assert_eq!(body, "App Release exists");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_log_failures_are_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ERROR_LOG_RESOURCE))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).log_error("Forgejo Webhook", "boom").await;
    }
}
