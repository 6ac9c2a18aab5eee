use std::sync::Arc;

use serde::Serialize;

use crate::{
    configuration::PhantombusterSettings,
    domain::{Profile, SearchQuery, SearchRequest, ValidationError},
};

use super::{
    poll_for_output, AgentLaunchRequest, AgentProvider, PhantombusterClient, PollBudget,
    ProviderError, Sleeper, TokioSleeper,
};

const GENERIC_FAILURE: &str = "Failed to retrieve LinkedIn profiles";

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid request body")]
    InvalidBody(String),
    #[error("{}", GENERIC_FAILURE)]
    Upstream(#[from] ProviderError),
    #[error("{}", GENERIC_FAILURE)]
    Internal(String),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub profiles: Vec<Profile>,
}

/// Launches the configured agent for one search and waits for its output.
///
/// The agent id is fixed by configuration, so concurrent searches share one
/// agent and may observe each other's output.
pub struct ProfileSearch {
    provider: Arc<dyn AgentProvider>,
    sleeper: Arc<dyn Sleeper>,
    agent_id: String,
    budget: PollBudget,
}

impl ProfileSearch {
    pub fn new(
        provider: Arc<dyn AgentProvider>,
        sleeper: Arc<dyn Sleeper>,
        agent_id: String,
        budget: PollBudget,
    ) -> Self {
        ProfileSearch {
            provider,
            sleeper,
            agent_id,
            budget,
        }
    }

    pub fn from_settings(settings: &PhantombusterSettings) -> Result<Self, ProviderError> {
        let client = PhantombusterClient::new(settings)?;

        Ok(ProfileSearch::new(
            Arc::new(client),
            Arc::new(TokioSleeper),
            settings.agent_id.clone(),
            PollBudget::from(settings),
        ))
    }

    pub async fn handle(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let query = SearchQuery::parse(request)?;
        let search_url = query.search_url();
        log::info!(
            "Searching profiles at {:?} for {} titles",
            query.company,
            query.titles.as_slice().len()
        );

        let launch = AgentLaunchRequest::new(&self.agent_id, search_url);
        self.provider.launch(&launch).await?;

        let state = poll_for_output(
            self.provider.as_ref(),
            self.sleeper.as_ref(),
            &self.agent_id,
            self.budget,
        )
        .await?;

        let profiles = state
            .into_results()
            .into_iter()
            .map(Profile::from)
            .collect();

        Ok(SearchResponse { profiles })
    }
}
