//! ChatHandler - Relay a conversation to the model.

use std::sync::Arc;
use thiserror::Error;

use crate::application::gateway::{CompletionEventStream, CompletionGateway, GatewayError};
use crate::domain::conversation::{ConversationError, ConversationTurn, Message};
use crate::ports::{CompletionProvider, PromptCatalog};

/// Command to relay a conversation.
#[derive(Debug, Clone)]
pub struct ChatCommand {
    pub messages: Vec<Message>,
}

/// Error type for chat relay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    /// The message list had nothing to relay.
    #[error(transparent)]
    InvalidInput(#[from] ConversationError),

    /// The model call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Handler for conversational chat, with the system prompt as instruction.
pub struct ChatHandler<P: ?Sized + CompletionProvider> {
    gateway: CompletionGateway<P>,
    prompts: Arc<dyn PromptCatalog>,
    temperature: f32,
}

impl<P: ?Sized + CompletionProvider> ChatHandler<P> {
    pub fn new(
        gateway: CompletionGateway<P>,
        prompts: Arc<dyn PromptCatalog>,
        temperature: f32,
    ) -> Self {
        Self {
            gateway,
            prompts,
            temperature,
        }
    }

    /// Returns the complete model reply.
    pub async fn handle(&self, cmd: ChatCommand) -> Result<String, ChatError> {
        let turn = ConversationTurn::from_messages(&cmd.messages)?;

        let reply = self
            .gateway
            .complete_once(turn, Some(self.prompts.system_prompt()), self.temperature)
            .await?;

        Ok(reply)
    }
}

impl<P: ?Sized + CompletionProvider + 'static> ChatHandler<P> {
    /// Returns the model reply as an event stream.
    ///
    /// Input is validated before the stream is created, so an invalid
    /// conversation never reaches the provider.
    pub fn handle_stream(&self, cmd: ChatCommand) -> Result<CompletionEventStream, ChatError> {
        let turn = ConversationTurn::from_messages(&cmd.messages)?;

        Ok(self
            .gateway
            .complete_stream(turn, Some(self.prompts.system_prompt()), self.temperature))
    }
}
