//! LegalAssistant - the query surface front ends talk to.
//!
//! Builds prompts, sends them through the failover dispatcher and normalizes
//! whatever comes back into a [`StructuredDocument`].

use futures::Stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

use super::cooldown::cooldown_stream;
use super::errors::{ceil_secs, AssistantError};
use super::prompts::{case_analysis_prompt, chat_prompt, CaseDetails, ChatTurn, SYSTEM_INSTRUCTION};
use crate::adapters::ai::{FailoverDispatcher, GeminiConfig, GeminiProvider};
use crate::adapters::rate_limiter::SlidingWindowGovernor;
use crate::config::AppConfig;
use crate::domain::document::{CaseAnalysisResult, ResponseNormalizer, StructuredDocument};
use crate::ports::{AIError, CompletionRequest, GenerationParams};

/// Case analysis goes to the primary (stronger) model first.
const ANALYZE_PREFERS_PRIMARY: bool = true;

/// Chat goes to the secondary (faster) model first.
const CHAT_PREFERS_PRIMARY: bool = false;

/// Default number of remembered chat turns.
pub const DEFAULT_HISTORY_TURNS: usize = 5;

/// Legal information assistant.
pub struct LegalAssistant {
    dispatcher: FailoverDispatcher,
    normalizer: ResponseNormalizer,
    params: GenerationParams,
    history: Mutex<VecDeque<ChatTurn>>,
    history_turns: usize,
}

impl LegalAssistant {
    pub fn new(dispatcher: FailoverDispatcher) -> Self {
        Self {
            dispatcher,
            normalizer: ResponseNormalizer::new(),
            params: GenerationParams::default(),
            history: Mutex::new(VecDeque::new()),
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }

    /// Wires Gemini providers for both tiers and a sliding-window governor
    /// from configuration. Call [`AppConfig::validate`] first.
    pub fn from_config(config: &AppConfig) -> Result<Self, AIError> {
        let api_key = config.ai.api_key.clone().unwrap_or_default();
        let provider = |model: &str| {
            GeminiProvider::new(
                GeminiConfig::new(api_key.clone())
                    .with_model(model)
                    .with_base_url(config.ai.base_url.clone())
                    .with_timeout(config.ai.timeout()),
            )
        };

        let primary = provider(&config.ai.primary_model)?;
        let secondary = provider(&config.ai.secondary_model)?;
        let governor = SlidingWindowGovernor::new(config.governor);

        let dispatcher =
            FailoverDispatcher::new(Arc::new(governor), Arc::new(primary), Arc::new(secondary));

        Ok(Self::new(dispatcher)
            .with_params(config.generation.params())
            .with_history_turns(config.chat.history_turns))
    }

    /// Sets the generation parameters sent with every request.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Sets how many chat turns are replayed as context. Zero disables history.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Replaces the response normalizer.
    pub fn with_normalizer(mut self, normalizer: ResponseNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// True if a request would be admitted right now.
    pub fn can_submit(&self) -> bool {
        self.dispatcher.governor().check_admission()
    }

    /// Whole seconds until a request would be admitted, rounded up.
    pub fn seconds_until_next_submit(&self) -> u64 {
        ceil_secs(self.dispatcher.governor().time_until_next_admission())
    }

    /// Countdown ticking once per second until submission is possible.
    pub fn cooldown(&self) -> impl Stream<Item = u64> {
        cooldown_stream(Arc::clone(self.dispatcher.governor()))
    }

    /// Answers a free-form question.
    pub async fn chat(&self, message: &str) -> Result<StructuredDocument, AssistantError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AssistantError::EmptyInput("question"));
        }

        let history: Vec<ChatTurn> = self.history.lock().iter().cloned().collect();
        let prompt = chat_prompt(message, &history);

        let raw = self.complete(prompt, CHAT_PREFERS_PRIMARY).await?;
        let document = self.normalizer.parse(&raw, message);

        self.remember(message, &document);
        Ok(document)
    }

    /// Analyzes a case description.
    pub async fn analyze(&self, case: &CaseDetails) -> Result<StructuredDocument, AssistantError> {
        case.validate()?;

        let prompt = case_analysis_prompt(case);
        let raw = self.complete(prompt, ANALYZE_PREFERS_PRIMARY).await?;
        let document = self.normalizer.parse(&raw, &case.topic_hint());

        info!(
            case_type = %case.case_type,
            items = document.content.len(),
            "Case analysis complete"
        );
        Ok(document)
    }

    /// Analyzes a case and files the answer into named buckets.
    pub async fn analyze_case(
        &self,
        case: &CaseDetails,
    ) -> Result<CaseAnalysisResult, AssistantError> {
        let document = self.analyze(case).await?;
        Ok(CaseAnalysisResult::from(&document))
    }

    /// Forgets earlier chat turns.
    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Number of remembered chat turns.
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    async fn complete(&self, prompt: String, prefer_primary: bool) -> Result<String, AssistantError> {
        let request = CompletionRequest::new(prompt)
            .with_system_prompt(SYSTEM_INSTRUCTION)
            .with_params(self.params);

        let response = self
            .dispatcher
            .send(
                |target| {
                    let request = request.clone();
                    async move { target.provider.complete(request).await }
                },
                prefer_primary,
            )
            .await?;

        debug!(model = %response.model, chars = response.content.len(), "Received answer");
        Ok(response.content)
    }

    fn remember(&self, question: &str, document: &StructuredDocument) {
        if self.history_turns == 0 {
            return;
        }
        let mut history = self.history.lock();
        history.push_back(ChatTurn {
            question: question.to_string(),
            answer: format!("{}: {}", document.title, document.summary),
        });
        while history.len() > self.history_turns {
            history.pop_front();
        }
    }
}
