//! Google Cloud Vision `images:annotate` with `TEXT_DETECTION`.

use kiosk_core::ocr::ImageInput;
use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result};

const PROVIDER: &str = "google_vision";

pub struct GoogleVision {
  pub(crate) client:   Client,
  pub(crate) api_key:  String,
  pub(crate) endpoint: String,
}

#[derive(Deserialize)]
struct AnnotateResponse {
  #[serde(default)]
  responses: Vec<AnnotateResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
  #[serde(default)]
  text_annotations: Vec<TextAnnotation>,
  error:            Option<Status>,
}

#[derive(Deserialize)]
struct TextAnnotation {
  #[serde(default)]
  description: String,
}

#[derive(Deserialize)]
struct Status {
  #[serde(default)]
  message: String,
}

/// The full-text annotation is always the first entry; no entries means no
/// text was found.
fn parse_response(body: &str) -> Result<String> {
  let parsed: AnnotateResponse = serde_json::from_str(body)?;
  let Some(result) = parsed.responses.into_iter().next() else {
    return Ok(String::new());
  };
  if let Some(status) = result.error {
    return Err(Error::Malformed { provider: PROVIDER, reason: status.message });
  }
  Ok(
    result
      .text_annotations
      .into_iter()
      .next()
      .map(|a| a.description)
      .unwrap_or_default(),
  )
}

impl GoogleVision {
  pub(crate) async fn recognize(&self, image: &ImageInput) -> Result<String> {
    let body = serde_json::json!({
      "requests": [{
        "image":    { "content": image.to_base64() },
        "features": [{ "type": "TEXT_DETECTION" }]
      }]
    });

    let resp = self
      .client
      .post(&self.endpoint)
      .header("x-goog-api-key", &self.api_key)
      .json(&body)
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
