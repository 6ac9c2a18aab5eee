use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{configuration::PhantombusterSettings, domain::RawProfile};

const API_KEY_HEADER: &str = "X-Phantombuster-Key-1";

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Invalid PhantomBuster base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("Request to PhantomBuster failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("PhantomBuster {operation} returned {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AgentLaunchRequest {
    pub id: String,
    pub arguments: AgentArguments,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AgentArguments {
    pub search: String,
}

impl AgentLaunchRequest {
    pub fn new(agent_id: &str, search_url: String) -> Self {
        AgentLaunchRequest {
            id: agent_id.to_string(),
            arguments: AgentArguments { search: search_url },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    Running,
    Finished,
    Error,
    Other(String),
}

impl From<&str> for AgentStatus {
    fn from(value: &str) -> Self {
        match value {
            "running" => AgentStatus::Running,
            "finished" => AgentStatus::Finished,
            "error" => AgentStatus::Error,
            other => AgentStatus::Other(other.to_string()),
        }
    }
}

/// What we read out of a fetch-output response. `data` is `None` unless the
/// provider sent an actual array.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AgentOutput {
    pub data: Option<Vec<RawProfile>>,
    pub status: Option<AgentStatus>,
}

impl AgentOutput {
    pub fn is_settled(&self) -> bool {
        matches!(
            self.status,
            Some(AgentStatus::Finished) | Some(AgentStatus::Error)
        )
    }
}

impl From<&Value> for AgentOutput {
    fn from(value: &Value) -> Self {
        AgentOutput {
            data: value
                .get("data")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(RawProfile::from).collect()),
            status: value
                .get("status")
                .and_then(Value::as_str)
                .map(AgentStatus::from),
        }
    }
}

/// The two PhantomBuster agent operations the search needs.
#[async_trait]
pub trait AgentProvider: Send + Sync {
    async fn launch(&self, request: &AgentLaunchRequest) -> Result<(), ProviderError>;

    async fn fetch_output(&self, agent_id: &str) -> Result<AgentOutput, ProviderError>;
}

pub struct PhantombusterClient {
    client: Client,
    api_key: String,
    launch_url: Url,
    fetch_output_url: Url,
}

#[derive(Serialize)]
struct FetchOutputQuery<'a> {
    id: &'a str,
}

impl PhantombusterClient {
    pub fn new(settings: &PhantombusterSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        let mut base_url = Url::parse(&settings.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(PhantombusterClient {
            client,
            api_key: settings.api_key.clone(),
            launch_url: base_url.join("agents/launch")?,
            fetch_output_url: base_url.join("agents/fetch-output")?,
        })
    }
}

async fn ensure_success(operation: &'static str, res: Response) -> Result<Response, ProviderError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    Err(ProviderError::UnexpectedStatus {
        operation,
        status,
        body,
    })
}

#[async_trait]
impl AgentProvider for PhantombusterClient {
    async fn launch(&self, request: &AgentLaunchRequest) -> Result<(), ProviderError> {
        let res = self
            .client
            .post(self.launch_url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;
        let res = ensure_success("launch", res).await?;

        let body = res.text().await?;
        log::info!("Launched agent {}: {}", request.id, body);
        Ok(())
    }

    async fn fetch_output(&self, agent_id: &str) -> Result<AgentOutput, ProviderError> {
        let res = self
            .client
            .get(self.fetch_output_url.clone())
            .query(&FetchOutputQuery { id: agent_id })
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let res = ensure_success("fetch-output", res).await?;

        let body = res.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(json) => Ok(AgentOutput::from(&json)),
            Err(e) => {
                log::warn!("Error when deserializing agent output to json: {:?}", e);
                Ok(AgentOutput::default())
            }
        }
    }
}
