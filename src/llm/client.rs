use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .expect("failed to build shared reqwest client")
});

pub fn shared_client() -> &'static Client {
    &HTTP_CLIENT
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct LlmClient {
    endpoint_url: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(endpoint_url: impl Into<String>, model: impl Into<String>, timeout_s: u64) -> Self {
        LlmClient {
            endpoint_url: endpoint_url.into(),
            model: model.into(),
            timeout: Duration::from_secs(timeout_s),
        }
    }

    /// `GET <endpoint>/api/tags` returning HTTP 200.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.endpoint_url);
        match shared_client().get(&url).timeout(self.timeout).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// `POST <endpoint>/api/generate` with `{model, prompt, stream: false,
    /// options: {temperature}}`. Returns the raw `response` string.
    pub async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, String> {
        let url = format!("{}/api/generate", self.endpoint_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: temperature.min(0.3),
            },
        };

        let resp = shared_client()
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("endpoint returned status {}", resp.status()));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| format!("failed to parse generate response envelope: {e}"))?;

        Ok(parsed.response)
    }
}
