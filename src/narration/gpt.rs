use super::speech::Synthesizer;
use super::{question_prompt, report_prompt, NarrationService};
use crate::classifier::VoiceMetrics;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct GptConfig {
    pub endpoint: String,
    pub model: String,
    pub question_max_tokens: u32,
    pub report_max_tokens: u32,
}

impl Default for GptConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            question_max_tokens: 300,
            report_max_tokens: 250,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Narration backed by a chat-completion endpoint plus a synthesizer
///
/// One outstanding call at a time per session; no client-side timeout
/// and no retries.
pub struct GptNarrator {
    client: Client,
    api_key: String,
    config: GptConfig,
    synthesizer: Box<dyn Synthesizer>,
}

impl GptNarrator {
    pub fn new(api_key: String, config: GptConfig, synthesizer: Box<dyn Synthesizer>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            config,
            synthesizer,
        }
    }

    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Chat-completion request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Chat-completion API error ({}): {}", status, body);
            anyhow::bail!("Chat-completion API returned {}", status);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat-completion response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("Chat-completion response contained no choices")
    }
}

#[async_trait::async_trait]
impl NarrationService for GptNarrator {
    async fn generate_questions(&self, category: &str) -> Result<Vec<String>> {
        info!("Generating questions for category: {}", category);

        let content = self
            .complete(question_prompt(category), self.config.question_max_tokens)
            .await?;

        let questions: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        info!("Generated {} questions", questions.len());
        Ok(questions)
    }

    async fn generate_report(&self, metrics: &VoiceMetrics) -> Result<String> {
        info!(
            "Generating report (pitch {:.4}, speed {:.6}, {} / {})",
            metrics.pitch, metrics.speed, metrics.speed_category, metrics.confidence
        );

        self.complete(report_prompt(metrics), self.config.report_max_tokens)
            .await
    }

    fn speak(&self, text: &str) {
        self.synthesizer.speak(text);
    }

    fn stop_speaking(&self) {
        self.synthesizer.stop();
    }
}
