//! reqwest-backed [`RemoteInventory`] for the platform's REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::RemoteError;
use super::types::{is_xml_file, FileId, ParserOptions, ProjectId, RemoteFile, RemoteProject};
use super::RemoteInventory;
use crate::config::AppConfig;
use crate::parser::{ExpectedConfiguration, XML_PARSER_ID};

/// Page size requested from list endpoints (platform maximum).
const PAGE_LIMIT: usize = 500;

/// Maximum number of retries for transient errors.
const MAX_RETRIES: u32 = 2;
/// Base delay for exponential backoff.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// `{"data": [{"data": {...}}, ...]}`
#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Vec<Wrapped<T>>,
}

/// `{"data": {...}}`
#[derive(Debug, Deserialize)]
struct Wrapped<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileOptionsPayload {
    #[serde(default)]
    parser_options: Option<ParserOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateFileBody {
    parser_id: u64,
    parser_options: ParserOptions,
}

/// Talks to the platform over HTTPS with a bearer token.
pub struct HttpInventory {
    client: Client,
    api_url: String,
    enterprise_api_url: String,
    token: Option<SecretString>,
}

impl HttpInventory {
    /// Creates an inventory client.
    ///
    /// Group listings go to `enterprise_api_url` when set, everything else to
    /// `api_url`. Every request is bounded by `timeout`.
    pub fn new(
        api_url: impl Into<String>,
        enterprise_api_url: Option<String>,
        token: Option<SecretString>,
        timeout: Duration,
        max_redirects: usize,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(max_redirects))
            .build()
            .map_err(|e| RemoteError::Client(format!("Failed to create HTTP client: {}", e)))?;

        let api_url = api_url.into().trim_end_matches('/').to_string();
        let enterprise_api_url = enterprise_api_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_url.clone());

        if token.is_none() {
            warn!("No API token configured; requests to {} will be unauthenticated", api_url);
        }

        Ok(Self {
            client,
            api_url,
            enterprise_api_url,
            token,
        })
    }

    pub fn from_config(config: &AppConfig, token: Option<SecretString>) -> Result<Self, RemoteError> {
        Self::new(
            config.api_url.clone(),
            config.enterprise_api_url.clone(),
            token,
            Duration::from_secs(config.request_timeout_secs),
            config.max_redirects,
        )
    }

    fn projects_url(&self, group_id: &str) -> String {
        format!("{}/groups/{}/projects", self.enterprise_api_url, group_id)
    }

    fn files_url(&self, project_id: ProjectId) -> String {
        format!("{}/projects/{}/files", self.api_url, project_id)
    }

    fn file_url(&self, project_id: ProjectId, file_id: FileId) -> String {
        format!("{}/projects/{}/files/{}", self.api_url, project_id, file_id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Sends a request, retrying transient failures with exponential backoff.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&UpdateFileBody>,
    ) -> Result<Option<T>, RemoteError> {
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), url, body).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    attempt += 1;
                    warn!(
                        "Request {} {} failed ({}), retry {}/{} in {:?}",
                        method, url, e, attempt, MAX_RETRIES, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&UpdateFileBody>,
    ) -> Result<Option<T>, RemoteError> {
        let mut builder = self.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RemoteError::status(url, status.as_u16(), &text));
        }

        if method == Method::PATCH {
            return Ok(None);
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| RemoteError::from_reqwest(url, e))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        self.send(Method::GET, url, None)
            .await?
            .ok_or_else(|| RemoteError::Decode {
                url: url.to_string(),
                message: "empty response".to_string(),
            })
    }

    /// Follows `offset`/`limit` pagination until a short page is returned.
    async fn get_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, RemoteError> {
        let mut items = Vec::new();
        let mut offset = 0;
        loop {
            let page_url = format!("{}?limit={}&offset={}", url, PAGE_LIMIT, offset);
            let page: ListEnvelope<T> = self.get(&page_url).await?;
            let count = page.data.len();
            items.extend(page.data.into_iter().map(|w| w.data));
            if count < PAGE_LIMIT {
                return Ok(items);
            }
            offset += count;
        }
    }
}

#[async_trait]
impl RemoteInventory for HttpInventory {
    async fn list_projects_in_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<RemoteProject>, RemoteError> {
        let projects: Vec<RemoteProject> = self.get_all(&self.projects_url(group_id)).await?;
        debug!("Group {} has {} projects", group_id, projects.len());
        Ok(projects)
    }

    async fn list_files(&self, project_id: ProjectId) -> Result<Vec<RemoteFile>, RemoteError> {
        let files: Vec<RemoteFile> = self.get_all(&self.files_url(project_id)).await?;
        let total = files.len();
        let xml: Vec<RemoteFile> = files.into_iter().filter(|f| is_xml_file(&f.name)).collect();
        debug!(
            "Project {} has {} files, {} XML",
            project_id,
            total,
            xml.len()
        );
        Ok(xml)
    }

    async fn get_file_configuration(
        &self,
        project_id: ProjectId,
        file_id: FileId,
    ) -> Result<Option<ParserOptions>, RemoteError> {
        let file: Wrapped<FileOptionsPayload> = self.get(&self.file_url(project_id, file_id)).await?;
        Ok(file.data.parser_options)
    }

    async fn update_file_configuration(
        &self,
        project_id: ProjectId,
        file_id: FileId,
        configuration: &ExpectedConfiguration,
    ) -> Result<(), RemoteError> {
        let body = UpdateFileBody {
            parser_id: XML_PARSER_ID,
            parser_options: configuration.to_parser_options(),
        };
        self.send::<serde_json::Value>(Method::PATCH, &self.file_url(project_id, file_id), Some(&body))
            .await?;
        info!(
            "Updated parser configuration for file {} in project {}",
            file_id, project_id
        );
        Ok(())
    }
}
