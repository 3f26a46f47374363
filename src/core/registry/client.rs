use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::model::{
    CategoryTag, GameVersionTag, LoaderTag, Project, SearchQuery, SearchResults, Version,
    VersionFilter,
};
use crate::core::error::{InstallerError, InstallerResult};

const DEFAULT_API_BASE: &str = "https://api.modrinth.com/v2";

/// Query surface the install pipeline needs from the content registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn search_projects(&self, query: &SearchQuery) -> InstallerResult<SearchResults>;

    async fn get_project(&self, id: &str) -> InstallerResult<Project>;

    async fn get_projects(&self, ids: &[String]) -> InstallerResult<Vec<Project>>;

    /// Versions of a project, filtered server-side by loader / game version.
    /// The registry returns them newest-first.
    async fn get_versions(
        &self,
        project_id: &str,
        filter: &VersionFilter,
    ) -> InstallerResult<Vec<Version>>;

    async fn get_version(&self, id: &str) -> InstallerResult<Version>;

    async fn get_versions_by_id(&self, ids: &[String]) -> InstallerResult<Vec<Version>>;

    // Tag vocabularies used by the presentation layer's filter pickers.
    async fn get_categories(&self) -> InstallerResult<Vec<CategoryTag>>;
    async fn get_game_versions(&self) -> InstallerResult<Vec<GameVersionTag>>;
    async fn get_loaders(&self) -> InstallerResult<Vec<LoaderTag>>;
}

/// HTTP implementation against a Modrinth-shaped v2 API.
pub struct HttpRegistry {
    client: Client,
    base_url: String,
}

impl HttpRegistry {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root (test servers, staging).
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> InstallerResult<T> {
        debug!("Registry GET {}", url);
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InstallerError::RegistryApi(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Facet groups for the search endpoint. Each inner group is OR'd, groups are
/// AND'd together; the registry expects the whole structure JSON-encoded.
fn search_facets(query: &SearchQuery) -> Option<String> {
    let mut groups: Vec<Vec<String>> = Vec::new();

    if let Some(project_type) = query.project_type {
        groups.push(vec![format!("project_type:{}", project_type)]);
    }
    if let Some(game_version) = query.game_version.as_deref() {
        groups.push(vec![format!("versions:{}", game_version)]);
    }
    if let Some(loader) = query.loader.as_deref() {
        groups.push(vec![format!("categories:{}", loader)]);
    }
    for category in &query.categories {
        groups.push(vec![format!("categories:{}", category)]);
    }

    if groups.is_empty() {
        None
    } else {
        serde_json::to_string(&groups).ok()
    }
}

/// Version-list filter parameters. Values are JSON arrays per the wire format,
/// e.g. `loaders=["fabric"]`.
fn version_filter_params(filter: &VersionFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !filter.loaders.is_empty() {
        if let Ok(encoded) = serde_json::to_string(&filter.loaders) {
            params.push(("loaders", encoded));
        }
    }
    if !filter.game_versions.is_empty() {
        if let Ok(encoded) = serde_json::to_string(&filter.game_versions) {
            params.push(("game_versions", encoded));
        }
    }
    params
}

#[async_trait]
impl RegistryClient for HttpRegistry {
    async fn search_projects(&self, query: &SearchQuery) -> InstallerResult<SearchResults> {
        let url = format!("{}/search", self.base_url);

        let mut params = vec![
            ("query", query.query.clone()),
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(facets) = search_facets(query) {
            params.push(("facets", facets));
        }
        if let Some(index) = query.index.as_deref() {
            params.push(("index", index.to_string()));
        }

        self.get_json(&url, &params).await
    }

    async fn get_project(&self, id: &str) -> InstallerResult<Project> {
        let url = format!("{}/project/{}", self.base_url, id);
        self.get_json(&url, &[]).await
    }

    async fn get_projects(&self, ids: &[String]) -> InstallerResult<Vec<Project>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/projects", self.base_url);
        let mut projects = Vec::with_capacity(ids.len());

        // Chunked to keep the encoded id list below URL length limits.
        for chunk in ids.chunks(50) {
            let ids_json = serde_json::to_string(chunk)?;
            let mut batch: Vec<Project> = self.get_json(&url, &[("ids", ids_json)]).await?;
            projects.append(&mut batch);
        }

        Ok(projects)
    }

    async fn get_versions(
        &self,
        project_id: &str,
        filter: &VersionFilter,
    ) -> InstallerResult<Vec<Version>> {
        let url = format!("{}/project/{}/version", self.base_url, project_id);
        let params = version_filter_params(filter);
        self.get_json(&url, &params).await
    }

    async fn get_version(&self, id: &str) -> InstallerResult<Version> {
        let url = format!("{}/version/{}", self.base_url, id);
        self.get_json(&url, &[]).await
    }

    async fn get_versions_by_id(&self, ids: &[String]) -> InstallerResult<Vec<Version>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/versions", self.base_url);
        let mut versions = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(50) {
            let ids_json = serde_json::to_string(chunk)?;
            let mut batch: Vec<Version> = self.get_json(&url, &[("ids", ids_json)]).await?;
            versions.append(&mut batch);
        }

        Ok(versions)
    }

    async fn get_categories(&self) -> InstallerResult<Vec<CategoryTag>> {
        let url = format!("{}/tag/category", self.base_url);
        self.get_json(&url, &[]).await
    }

    async fn get_game_versions(&self) -> InstallerResult<Vec<GameVersionTag>> {
        let url = format!("{}/tag/game_version", self.base_url);
        self.get_json(&url, &[]).await
    }

    async fn get_loaders(&self) -> InstallerResult<Vec<LoaderTag>> {
        let url = format!("{}/tag/loader", self.base_url);
        self.get_json(&url, &[]).await
    }
}
