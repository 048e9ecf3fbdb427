use async_trait::async_trait;
use std::sync::Arc;

use super::{AgentOptions, AgentStream, GenerationAgent};
use crate::errors::AgentError;
use crate::stream::AgentMessage;

type FinishHook = Arc<dyn Fn(&AgentOptions) + Send + Sync>;

/// Replays a fixed list of messages.
///
/// The finish hook runs after the last message is delivered, before the
/// optional failure, and is where tests create the artifacts a real agent
/// would have written.
#[derive(Clone, Default)]
pub struct ScriptedAgent {
    messages: Vec<AgentMessage>,
    failure: Option<String>,
    on_finish: Option<FinishHook>,
}

impl ScriptedAgent {
    pub fn new(messages: Vec<AgentMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// End the stream with an error after all messages.
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn on_finish(mut self, hook: impl Fn(&AgentOptions) + Send + Sync + 'static) -> Self {
        self.on_finish = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for ScriptedAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedAgent")
            .field("messages", &self.messages.len())
            .field("failure", &self.failure)
            .field("on_finish", &self.on_finish.is_some())
            .finish()
    }
}

#[async_trait]
impl GenerationAgent for ScriptedAgent {
    async fn query(&self, _prompt: &str, options: &AgentOptions) -> Result<AgentStream, AgentError> {
        let messages = self.messages.clone();
        let failure = self.failure.clone();
        let on_finish = self.on_finish.clone();
        let options = options.clone();

        let stream = async_stream::stream! {
            for message in messages {
                yield Ok(message);
            }
            if let Some(hook) = on_finish {
                hook(&options);
            }
            if let Some(message) = failure {
                yield Err(AgentError::Scripted(message));
            }
        };
        Ok(Box::pin(stream))
    }
}
