//! Text-generation interaction: one system + one user turn per call.
//!
//! Every text step in the pipeline is a single request with no retry. This
//! module only binds the generator to the run's model and temperature and
//! logs timing; the instruction texts live in [`crate::prompts`].

use crate::error::LinkpostError;
use crate::service::{ChatMessage, TextGenerator};
use std::time::Instant;
use tracing::debug;

/// A text generator bound to the model and temperature of one run.
#[derive(Clone, Copy)]
pub struct TextCall<'a> {
    generator: &'a dyn TextGenerator,
    model: &'a str,
    temperature: f32,
}

impl<'a> TextCall<'a> {
    pub fn new(generator: &'a dyn TextGenerator, model: &'a str, temperature: f32) -> Self {
        Self {
            generator,
            model,
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        self.model
    }

    /// Send one system + user exchange and return the reply text.
    ///
    /// `label` names the step in debug logs only.
    pub async fn ask(&self, label: &str, system: &str, user: &str) -> Result<String, LinkpostError> {
        let start = Instant::now();
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let reply = self
            .generator
            .chat(self.model, &messages, self.temperature)
            .await?;
        debug!(
            "{}: {} chars in, {} chars out, {:?}",
            label,
            system.len() + user.len(),
            reply.len(),
            start.elapsed()
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, Vec<ChatMessage>, f32)>>,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        async fn chat(
            &self,
            model: &str,
            messages: &[ChatMessage],
            temperature: f32,
        ) -> Result<String, LinkpostError> {
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), messages.to_vec(), temperature));
            Ok("reply".into())
        }
    }

    #[tokio::test]
    async fn ask_sends_system_then_user() {
        let recorder = Recorder::default();
        let call = TextCall::new(&recorder, "kimi-k2-5", 0.4);
        let reply = call.ask("test", "be brief", "hello").await.unwrap();
        assert_eq!(reply, "reply");

        let seen = recorder.seen.lock().unwrap();
        let (model, messages, temperature) = &seen[0];
        assert_eq!(model, "kimi-k2-5");
        assert_eq!(*temperature, 0.4);
        assert_eq!(messages[0], ChatMessage::system("be brief"));
        assert_eq!(messages[1], ChatMessage::user("hello"));
    }
}
