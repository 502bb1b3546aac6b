use std::future::Future;

use tracing::{info, warn};

use crate::config::ResonanceConfig;
use crate::error::GameError;

use super::prompts;
use super::{AlchemicalResponse, AlchemistOracle, IncantationRequest};

/// Text-generation collaborator backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiOracle {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiOracle {
    pub fn new(api_key: Option<String>, settings: &ResonanceConfig) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env(settings: &ResonanceConfig) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_some() {
            info!("GEMINI_API_KEY found, incantations enabled");
        } else {
            warn!("GEMINI_API_KEY not set, every incantation will fizzle");
        }
        Self::new(api_key, settings)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl AlchemistOracle for GeminiOracle {
    fn consult(
        &self,
        request: IncantationRequest,
    ) -> impl Future<Output = Result<AlchemicalResponse, GameError>> + Send {
        let api_key = self.api_key.clone();
        let client = self.client.clone();
        let url = self.url();

        async move {
            let api_key = api_key.ok_or_else(|| {
                GameError::ResonanceRequestFailed("no API key configured".to_string())
            })?;

            let body = request_body(&request);

            let response = client
                .post(&url)
                .query(&[("key", api_key.as_str())])
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    GameError::ResonanceRequestFailed(format!("HTTP request failed: {}", e))
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(GameError::ResonanceRequestFailed(format!(
                    "Gemini API returned {}: {}",
                    status, text
                )));
            }

            let resp_json: serde_json::Value = response.json().await.map_err(|e| {
                GameError::ResonanceRequestFailed(format!("Failed to parse response JSON: {}", e))
            })?;

            parse_generate_content(&resp_json)
        }
    }
}

fn request_body(request: &IncantationRequest) -> serde_json::Value {
    serde_json::json!({
        "systemInstruction": {
            "parts": [{ "text": prompts::SYSTEM_INSTRUCTION }]
        },
        "contents": [
            {
                "role": "user",
                "parts": [{
                    "text": prompts::build_prompt(&request.incantation_text, &request.state_summary)
                }]
            }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": prompts::response_schema()
        }
    })
}

/// Pulls the alchemist's JSON answer out of a `generateContent` response.
pub fn parse_generate_content(
    resp_json: &serde_json::Value,
) -> Result<AlchemicalResponse, GameError> {
    let content_text = resp_json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| {
            GameError::ResonanceRequestFailed("No text in Gemini response".to_string())
        })?;

    serde_json::from_str::<AlchemicalResponse>(content_text.trim()).map_err(|e| {
        GameError::ResonanceRequestFailed(format!(
            "Failed to parse alchemist's JSON: {}. Raw: {}",
            e, content_text
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
    }

    #[test]
    fn parses_a_well_formed_answer() {
        let resp = wrap(
            r#"{"message":"Marvellous!","bonusMultiplier":2.5,"unlockedLore":"Rubies remember fire."}"#,
        );
        let parsed = parse_generate_content(&resp).unwrap();
        assert_eq!(parsed.message, "Marvellous!");
        assert_eq!(parsed.bonus_multiplier, 2.5);
        assert_eq!(parsed.unlocked_lore, "Rubies remember fire.");
    }

    #[test]
    fn missing_field_is_a_failure() {
        let resp = wrap(r#"{"message":"Hmm","unlockedLore":"..."}"#);
        assert!(matches!(
            parse_generate_content(&resp),
            Err(GameError::ResonanceRequestFailed(_))
        ));
    }

    #[test]
    fn missing_candidates_is_a_failure() {
        let resp = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(parse_generate_content(&resp).is_err());
    }

    #[test]
    fn body_carries_prompt_and_schema() {
        let body = request_body(&IncantationRequest {
            incantation_text: "By quartz and moon".to_string(),
            state_summary: "Crystals: {}".to_string(),
        });
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("By quartz and moon"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn without_a_key_the_call_fails_fast() {
        let oracle = GeminiOracle::new(None, &ResonanceConfig::default());
        assert!(!oracle.has_api_key());
        let result = oracle
            .consult(IncantationRequest {
                incantation_text: "hello".to_string(),
                state_summary: String::new(),
            })
            .await;
        assert!(matches!(result, Err(GameError::ResonanceRequestFailed(_))));
    }
}
