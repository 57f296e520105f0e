//! SendChatMessage command handler.
//!
//! Answers a question over the corpus with retrieved passages, recent
//! history, learnings and the active analysis as context.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::AnalysisError;
use super::support::retrieve_all;
use crate::application::Workspace;
use crate::config::AnalysisConfig;
use crate::domain::analysis::GroundingMetadata;
use crate::domain::chat::ChatMessage;
use crate::domain::documents::RetrievedChunk;
use crate::domain::learning::select_for_chat;
use crate::domain::prompt::compose_chat;
use crate::ports::{GenerationRequest, Generator, Retriever, StateStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendChatMessageCommand {
    pub message: String,
}

impl SendChatMessageCommand {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendChatMessageResult {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
    pub retrieved_context: Vec<RetrievedChunk>,
}

/// Handler for SendChatMessage commands.
pub struct SendChatMessageHandler {
    generator: Arc<dyn Generator>,
    retriever: Arc<dyn Retriever>,
    state_store: Arc<dyn StateStore>,
    config: AnalysisConfig,
}

impl SendChatMessageHandler {
    pub fn new(
        generator: Arc<dyn Generator>,
        retriever: Arc<dyn Retriever>,
        state_store: Arc<dyn StateStore>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            generator,
            retriever,
            state_store,
            config,
        }
    }

    pub async fn handle(
        &self,
        cmd: SendChatMessageCommand,
        workspace: &mut Workspace,
    ) -> Result<SendChatMessageResult, AnalysisError> {
        // 1. Validate
        let question = ChatMessage::user(cmd.message.trim())?;

        // 2. Retrieve; an unavailable index only degrades the answer
        let chunks = match retrieve_all(
            self.retriever.as_ref(),
            &format!("{} compliance requirements", question.text()),
            self.config.chat_top_k,
        )
        .await
        {
            Ok(chunks) => chunks,
            Err(err) => {
                warn!(error = %err, "Chat retrieval failed, answering without context");
                Vec::new()
            }
        };

        // 3. Learnings and prompt
        let learnings = select_for_chat(
            workspace.learnings(),
            workspace.analyses().active(),
            workspace.saved_analyses(),
            self.config.max_chat_learnings,
        );
        let prompt = compose_chat(
            question.text(),
            workspace.chat_history(),
            &chunks,
            &learnings,
            workspace.analyses().active(),
            &self.config.prompt_budget(),
        );
        debug!(
            chunks = chunks.len(),
            learnings = learnings.len(),
            user_chars = prompt.user.len(),
            "Chat prompt composed"
        );

        // 4. Generate; on failure the question is not recorded
        let response = self
            .generator
            .generate(
                GenerationRequest::new(prompt.user)
                    .with_system_instruction(prompt.system)
                    .with_web_search(),
            )
            .await?;

        // 5. Record both turns and persist
        let answer = ChatMessage::bot(response.text.clone(), response.grounding.clone(), chunks.clone());
        let grounding = answer.grounding_metadata().cloned();
        workspace.push_chat_turn(question, answer);
        workspace.persist(self.state_store.as_ref()).await?;

        info!(
            history = workspace.chat_history().len(),
            retrieved = chunks.len(),
            "Chat reply recorded"
        );

        Ok(SendChatMessageResult {
            text: response.text,
            grounding,
            retrieved_context: chunks,
        })
    }
}
