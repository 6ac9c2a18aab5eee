use std::time::Duration;

use async_trait::async_trait;

use crate::{
    configuration::{
        PhantombusterSettings, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MILLIS,
    },
    domain::RawProfile,
};

use super::{AgentOutput, AgentProvider, ProviderError};

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollBudget {
    fn default() -> Self {
        PollBudget {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MILLIS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl From<&PhantombusterSettings> for PollBudget {
    fn from(settings: &PhantombusterSettings) -> Self {
        PollBudget {
            interval: settings.poll_interval(),
            max_attempts: settings.max_poll_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Polling { attempt: u32 },
    Done(Vec<RawProfile>),
    TimedOut,
}

impl PollState {
    pub fn start(budget: PollBudget) -> Self {
        match budget.max_attempts {
            0 => PollState::TimedOut,
            _ => PollState::Polling { attempt: 0 },
        }
    }

    /// Folds one fetched output into the machine. Results only count when
    /// `data` was an array; the agent is done once they are non-empty or it
    /// reports `finished` / `error`.
    pub fn advance(self, output: AgentOutput, budget: PollBudget) -> Self {
        let attempt = match self {
            PollState::Polling { attempt } => attempt + 1,
            settled => return settled,
        };

        let settled = output.is_settled();
        if let Some(results) = output.data {
            if !results.is_empty() || settled {
                return PollState::Done(results);
            }
        }

        if attempt >= budget.max_attempts {
            PollState::TimedOut
        } else {
            PollState::Polling { attempt }
        }
    }

    pub fn into_results(self) -> Vec<RawProfile> {
        match self {
            PollState::Done(results) => results,
            PollState::Polling { .. } | PollState::TimedOut => Vec::new(),
        }
    }
}

/// Waits `budget.interval` before every fetch-output call until the agent
/// is done or the attempts run out. A failed fetch aborts the loop.
pub async fn poll_for_output(
    provider: &dyn AgentProvider,
    sleeper: &dyn Sleeper,
    agent_id: &str,
    budget: PollBudget,
) -> Result<PollState, ProviderError> {
    let mut state = PollState::start(budget);

    while let PollState::Polling { attempt } = state {
        sleeper.sleep(budget.interval).await;

        let output = provider.fetch_output(agent_id).await?;
        log::debug!(
            "Poll attempt {}/{} for agent {}: status {:?}, {} results",
            attempt + 1,
            budget.max_attempts,
            agent_id,
            output.status,
            output.data.as_ref().map_or(0, Vec::len)
        );

        state = state.advance(output, budget);
    }

    match &state {
        PollState::Done(results) => {
            log::info!("Agent {} done with {} results", agent_id, results.len())
        }
        PollState::TimedOut => log::info!(
            "Agent {} produced no output after {} attempts",
            agent_id,
            budget.max_attempts
        ),
        PollState::Polling { .. } => {}
    }

    Ok(state)
}
