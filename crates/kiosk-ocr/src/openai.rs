//! OpenAI-compatible chat completions with an image attachment.

use kiosk_core::ocr::ImageInput;
use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result};

const PROVIDER: &str = "openai";

const PROMPT: &str = "Transcribe all text on this identity card exactly as printed, \
                      one printed line per output line. Reply with the text only.";

pub struct OpenAiVision {
  pub(crate) client:   Client,
  pub(crate) api_key:  String,
  pub(crate) model:    String,
  pub(crate) endpoint: String,
}

#[derive(Deserialize)]
struct Completion {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: Message,
}

#[derive(Deserialize)]
struct Message {
  content: Option<String>,
}

fn parse_response(body: &str) -> Result<String> {
  let parsed: Completion = serde_json::from_str(body)?;
  let choice = parsed.choices.into_iter().next().ok_or_else(|| Error::Malformed {
    provider: PROVIDER,
    reason:   "no choices in completion".into(),
  })?;
  Ok(choice.message.content.unwrap_or_default())
}

impl OpenAiVision {
  fn request_body(&self, image: &ImageInput) -> serde_json::Value {
    serde_json::json!({
      "model": self.model,
      "temperature": 0,
      "messages": [{
        "role": "user",
        "content": [
          { "type": "text", "text": PROMPT },
          { "type": "image_url", "image_url": { "url": image.to_data_url() } }
        ]
      }]
    })
  }

  pub(crate) async fn recognize(&self, image: &ImageInput) -> Result<String> {
    let resp = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&self.request_body(image))
      .send()
      .await?;

    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
      return Err(Error::Provider { provider: PROVIDER, status: status.as_u16(), body: text });
    }
    parse_response(&text)
  }
}
