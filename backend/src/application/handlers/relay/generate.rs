//! GenerateHandler - One-shot generation from a single prompt.

use crate::application::gateway::{CompletionEventStream, CompletionGateway, GatewayError};
use crate::domain::conversation::ConversationTurn;
use crate::ports::CompletionProvider;

/// Command to generate text from a prompt.
#[derive(Debug, Clone)]
pub struct GenerateCommand {
    pub prompt: String,
}

/// Handler for generic generation without a system instruction.
pub struct GenerateHandler<P: ?Sized + CompletionProvider> {
    gateway: CompletionGateway<P>,
    temperature: f32,
}

impl<P: ?Sized + CompletionProvider> GenerateHandler<P> {
    pub fn new(gateway: CompletionGateway<P>, temperature: f32) -> Self {
        Self {
            gateway,
            temperature,
        }
    }

    pub async fn handle(&self, cmd: GenerateCommand) -> Result<String, GatewayError> {
        self.gateway
            .complete_once(ConversationTurn::single(cmd.prompt), None, self.temperature)
            .await
    }
}

impl<P: ?Sized + CompletionProvider + 'static> GenerateHandler<P> {
    pub fn handle_stream(&self, cmd: GenerateCommand) -> CompletionEventStream {
        self.gateway
            .complete_stream(ConversationTurn::single(cmd.prompt), None, self.temperature)
    }
}
