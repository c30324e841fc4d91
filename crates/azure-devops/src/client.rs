//! Azure DevOps REST 클라이언트
//!
//! [`AzureDevOpsConnector`]는 프로세스 전체에서 하나의 `reqwest::Client`
//! (커넥션 풀)를 공유하고, `connect`마다 조직 URL과 PAT를 묶은
//! [`AzureDevOpsCatalog`] 세션을 만듭니다. `connect` 자체는 원격 호출을 하지 않습니다.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::Response;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tokio_util::io::StreamReader;
use tracing::debug;
use url::Url;

use reposcan_core::catalog::{
    CatalogConnector, Credential, FileEntry, OP_FETCH_FILE_CONTENT, OP_LIST_FILES,
    OP_LIST_PROJECTS, OP_LIST_REPOSITORIES, ProjectPage, ProjectRef, RemoteCatalog,
    RepositoryRef,
};
use reposcan_core::config::CatalogConfig;
use reposcan_core::error::CatalogError;

use crate::error::{is_auth_failure, status_error, transport_error};
use crate::models::{GitItem, GitRepository, ListResponse, TeamProject};

/// 파일 내용 스트림
pub type ContentStream = StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>;

/// 다음 프로젝트 페이지 토큰을 담는 응답 헤더
pub const CONTINUATION_TOKEN_HEADER: &str = "x-ms-continuationtoken";

const USER_AGENT: &str = concat!("reposcan/", env!("CARGO_PKG_VERSION"));
const ACCEPT_JSON: &str = "application/json";
const ACCEPT_OCTET_STREAM: &str = "application/octet-stream";

/// 조직별 카탈로그 세션 팩토리
#[derive(Debug, Clone)]
pub struct AzureDevOpsConnector {
    client: reqwest::Client,
    base_url: Url,
    api_version: String,
    timeout: Duration,
}

impl AzureDevOpsConnector {
    /// 설정으로 커넥터를 생성합니다.
    ///
    /// # Errors
    /// 기본 URL이 유효하지 않거나 HTTP 클라이언트를 만들 수 없으면
    /// [`CatalogError::Unavailable`]을 반환합니다.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            CatalogError::Unavailable(format!("invalid base url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Unavailable(format!(
                "base url '{}' cannot carry path segments",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_version: config.api_version.clone(),
            timeout: config.request_timeout(),
        })
    }
}

impl CatalogConnector for AzureDevOpsConnector {
    type Catalog = AzureDevOpsCatalog;

    async fn connect(
        &self,
        organization: &str,
        credential: &Credential,
    ) -> Result<Self::Catalog, CatalogError> {
        if organization.is_empty() {
            return Err(CatalogError::Unavailable(
                "organization must not be empty".to_owned(),
            ));
        }

        let mut organization_url = self.base_url.clone();
        organization_url
            .path_segments_mut()
            .map_err(|()| CatalogError::Unavailable("base url cannot be a base".to_owned()))?
            .pop_if_empty()
            .push(organization);

        debug!(organization, url = %organization_url, "catalog session created");

        Ok(AzureDevOpsCatalog {
            client: self.client.clone(),
            organization_url,
            credential: credential.clone(),
            api_version: self.api_version.clone(),
            timeout: self.timeout,
        })
    }
}

/// 한 조직에 대한 Azure DevOps 세션
#[derive(Debug, Clone)]
pub struct AzureDevOpsCatalog {
    client: reqwest::Client,
    organization_url: Url,
    credential: Credential,
    api_version: String,
    timeout: Duration,
}

impl AzureDevOpsCatalog {
    /// 조직 URL (`{base_url}/{organization}`)
    pub fn organization_url(&self) -> &Url {
        &self.organization_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.organization_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::Unavailable("organization url cannot be a base".to_owned()))?
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    fn repository_items(&self, project: &str, repository: &str) -> Result<Url, CatalogError> {
        self.endpoint(&[project, "_apis", "git", "repositories", repository, "items"])
    }

    async fn get(
        &self,
        operation: &str,
        url: Url,
        accept: &str,
        repository: Option<&str>,
    ) -> Result<Response, CatalogError> {
        debug!(operation, path = url.path(), "catalog request");

        let response = self
            .client
            .get(url)
            .basic_auth("", Some(self.credential.secret()))
            .header(ACCEPT, accept)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(operation, &e))?;

        let status = response.status();
        if status.is_success() && !is_auth_failure(status) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(operation, repository, status, &body);
        debug!(operation, status = status.as_u16(), error = %err, "catalog request failed");
        Err(err)
    }

    async fn read_list<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<Vec<T>, CatalogError> {
        response
            .json::<ListResponse<T>>()
            .await
            .map(|list| list.value)
            .map_err(|e| transport_error(operation, &e))
    }

    async fn project_page(&self, url: Url) -> Result<ProjectPage, CatalogError> {
        let response = self.get(OP_LIST_PROJECTS, url, ACCEPT_JSON, None).await?;
        let continuation_token = response
            .headers()
            .get(CONTINUATION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let projects = Self::read_list::<TeamProject>(OP_LIST_PROJECTS, response)
            .await?
            .into_iter()
            .map(ProjectRef::from)
            .collect();

        Ok(ProjectPage {
            projects,
            continuation_token,
        })
    }
}

impl RemoteCatalog for AzureDevOpsCatalog {
    type Content = ContentStream;

    async fn list_projects(&self) -> Result<ProjectPage, CatalogError> {
        let url = self.endpoint(&["_apis", "projects"])?;
        self.project_page(url).await
    }

    async fn list_more_projects(&self, continuation_token: &str) -> Result<ProjectPage, CatalogError> {
        let mut url = self.endpoint(&["_apis", "projects"])?;
        url.query_pairs_mut()
            .append_pair("continuationToken", continuation_token);
        self.project_page(url).await
    }

    async fn list_repositories(&self, project: &str) -> Result<Vec<RepositoryRef>, CatalogError> {
        let url = self.endpoint(&[project, "_apis", "git", "repositories"])?;
        let response = self.get(OP_LIST_REPOSITORIES, url, ACCEPT_JSON, None).await?;
        let repositories = Self::read_list::<GitRepository>(OP_LIST_REPOSITORIES, response).await?;
        Ok(repositories.into_iter().map(RepositoryRef::from).collect())
    }

    async fn list_files(&self, project: &str, repository: &str) -> Result<Vec<FileEntry>, CatalogError> {
        let mut url = self.repository_items(project, repository)?;
        url.query_pairs_mut().append_pair("recursionLevel", "Full");
        let response = self
            .get(OP_LIST_FILES, url, ACCEPT_JSON, Some(repository))
            .await?;
        let items = Self::read_list::<GitItem>(OP_LIST_FILES, response).await?;
        Ok(items.into_iter().map(FileEntry::from).collect())
    }

    async fn fetch_file_content(
        &self,
        project: &str,
        repository: &str,
        path: &str,
    ) -> Result<Self::Content, CatalogError> {
        let mut url = self.repository_items(project, repository)?;
        url.query_pairs_mut()
            .append_pair("path", path)
            .append_pair("includeContent", "true");
        let response = self
            .get(OP_FETCH_FILE_CONTENT, url, ACCEPT_OCTET_STREAM, Some(repository))
            .await?;

        let stream = response.bytes_stream().map_err(io::Error::other).boxed();
        Ok(StreamReader::new(stream))
    }
}
