//! Thread engine: one complete run of the continuation loop.
//!
//! Load snapshot -> pick persona -> render prompt -> generate -> sanitize ->
//! post -> append -> save. Appending and saving are the last steps, so any
//! earlier failure leaves the previously persisted snapshot untouched.

use tokio::sync::Mutex;
use tracing::{Instrument, info, info_span, warn};

use threadbot_types::error::{FeedError, StoreError};
use threadbot_types::llm::{GenerationRequest, LlmError, SamplingParams};
use threadbot_types::thread::StrongRef;

use crate::feed::FeedClient;
use crate::llm::box_provider::BoxLlmProvider;
use crate::repository::conversation::{ConversationRepository, load_or_empty};

use super::poster::ThreadPoster;
use super::prompt::{build_prompt, render_history};
use super::registry::PersonaRegistry;
use super::sanitize::sanitize;

/// Errors that abort a run. Nothing is saved when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Post(#[from] FeedError),

    #[error("another run is already in progress")]
    AlreadyRunning,
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub sequence: u64,
    pub persona_handle: String,
    pub message: String,
    pub strong_ref: StrongRef,
    pub reply: bool,
}

/// Engine knobs that are not collaborators.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub sampling: SamplingParams,
    pub max_post_length: usize,
}

/// Drives runs against a repository, a feed client and a generation backend.
///
/// Generic over repository and feed so tests can use in-memory doubles; the
/// generation backend is type-erased and picked once at construction.
pub struct ThreadEngine<R: ConversationRepository, F: FeedClient> {
    repo: R,
    feed: F,
    provider: BoxLlmProvider,
    registry: PersonaRegistry,
    options: EngineOptions,
    run_guard: Mutex<()>,
}

impl<R: ConversationRepository, F: FeedClient> ThreadEngine<R, F> {
    pub fn new(
        repo: R,
        feed: F,
        provider: BoxLlmProvider,
        registry: PersonaRegistry,
        options: EngineOptions,
    ) -> Self {
        Self {
            repo,
            feed,
            provider,
            registry,
            options,
            run_guard: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Perform one run.
    ///
    /// Fails with [`RunError::AlreadyRunning`] if another run on this engine
    /// has not finished. A reply that is blank after sanitizing is never
    /// posted; the run fails with [`LlmError::EmptyCompletion`] instead.
    pub async fn run_once(&self) -> Result<RunReport, RunError> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| RunError::AlreadyRunning)?;

        let mut store = load_or_empty(&self.repo).await?;
        let persona = self.registry.pick_random();
        info!(
            handle = %persona.handle,
            posts = store.post_count(),
            "continuing thread"
        );

        let history = render_history(&store);
        let request = GenerationRequest {
            system_prompt: persona.system_prompt.clone(),
            prompt: build_prompt(&history),
            params: self.options.sampling.clone(),
        };

        let span = info_span!(
            "gen_ai.generate",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = self.provider.model(),
            gen_ai.request.max_tokens = request.params.max_new_tokens,
            gen_ai.request.temperature = request.params.temperature,
            gen_ai.request.stream = %self.provider.delivery(),
        );
        let raw = self.provider.generate(&request).instrument(span).await?;

        let message = sanitize(&raw, self.options.max_post_length);
        if message.trim().is_empty() {
            warn!(raw_len = raw.len(), "generated reply is empty after sanitizing");
            return Err(RunError::Provider(LlmError::EmptyCompletion));
        }

        let post = ThreadPoster::new(&self.feed)
            .publish(&store, persona, &message)
            .await?;

        let report = RunReport {
            sequence: post.id,
            persona_handle: persona.handle.clone(),
            message: post.message.clone(),
            strong_ref: post.strong_ref.clone(),
            reply: post.is_reply(),
        };

        store.append(post)?;
        self.repo.save(&store).await?;

        info!(
            sequence = report.sequence,
            handle = %report.persona_handle,
            uri = %report.strong_ref.uri,
            "thread advanced"
        );
        Ok(report)
    }
}
