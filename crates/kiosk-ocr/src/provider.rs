//! Provider selection.

use std::{path::PathBuf, time::Duration};

use kiosk_core::ocr::{ImageInput, TextRecognizer};
use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result, google::GoogleVision, openai::OpenAiVision, tesseract::Tesseract};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 { 30 }

fn default_tesseract_binary() -> PathBuf { PathBuf::from("tesseract") }

fn default_language() -> String { "eng".to_string() }

fn default_google_endpoint() -> String {
  "https://vision.googleapis.com/v1/images:annotate".to_string()
}

fn default_openai_endpoint() -> String {
  "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_openai_model() -> String { "gpt-4o-mini".to_string() }

/// The `[ocr]` configuration section; `provider` selects the variant.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum OcrConfig {
  None,
  /// On-device recognition with the `tesseract` command-line tool.
  Tesseract {
    #[serde(default = "default_tesseract_binary")]
    binary:       PathBuf,
    #[serde(default = "default_language")]
    language:     String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
  },
  GoogleVision {
    api_key:      String,
    #[serde(default = "default_google_endpoint")]
    endpoint:     String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
  },
  /// Any OpenAI-compatible chat-completions endpoint with vision support.
  Openai {
    api_key:      String,
    #[serde(default = "default_openai_model")]
    model:        String,
    #[serde(default = "default_openai_endpoint")]
    endpoint:     String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
  },
}

impl Default for OcrConfig {
  fn default() -> Self { Self::None }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// The configured OCR backend.
pub enum OcrProvider {
  Disabled,
  Tesseract(Tesseract),
  GoogleVision(GoogleVision),
  OpenAiVision(OpenAiVision),
}

fn http_client(timeout: Duration) -> Result<Client> {
  Ok(Client::builder().timeout(timeout).build()?)
}

fn require_key(provider: &str, key: &str) -> Result<String> {
  if key.trim().is_empty() {
    return Err(Error::Config(format!("{provider} requires an api_key")));
  }
  Ok(key.trim().to_owned())
}

impl OcrProvider {
  pub fn from_config(cfg: &OcrConfig) -> Result<Self> {
    Ok(match cfg {
      OcrConfig::None => Self::Disabled,
      OcrConfig::Tesseract { binary, language, timeout_secs } => {
        Self::Tesseract(Tesseract {
          binary:   binary.clone(),
          language: language.clone(),
          timeout:  Duration::from_secs(*timeout_secs),
        })
      }
      OcrConfig::GoogleVision { api_key, endpoint, timeout_secs } => {
        Self::GoogleVision(GoogleVision {
          client:   http_client(Duration::from_secs(*timeout_secs))?,
          api_key:  require_key("google_vision", api_key)?,
          endpoint: endpoint.clone(),
        })
      }
      OcrConfig::Openai { api_key, model, endpoint, timeout_secs } => {
        Self::OpenAiVision(OpenAiVision {
          client:   http_client(Duration::from_secs(*timeout_secs))?,
          api_key:  require_key("openai", api_key)?,
          model:    model.clone(),
          endpoint: endpoint.clone(),
        })
      }
    })
  }

  /// Short provider name for logs.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Disabled => "disabled",
      Self::Tesseract(_) => "tesseract",
      Self::GoogleVision(_) => "google_vision",
      Self::OpenAiVision(_) => "openai",
    }
  }

  pub fn is_enabled(&self) -> bool { !matches!(self, Self::Disabled) }
}

impl TextRecognizer for OcrProvider {
  type Error = Error;

  async fn recognize_text(&self, image: &ImageInput) -> Result<String> {
    tracing::debug!(
      provider = self.name(),
      bytes = image.bytes.len(),
      media_type = %image.media_type,
      "running OCR"
    );
    let text = match self {
      Self::Disabled => return Err(Error::Disabled),
      Self::Tesseract(p) => p.recognize(image).await,
      Self::GoogleVision(p) => p.recognize(image).await,
      Self::OpenAiVision(p) => p.recognize(image).await,
    };
    match &text {
      Ok(t) => tracing::info!(provider = self.name(), chars = t.len(), "OCR complete"),
      Err(e) => tracing::warn!(provider = self.name(), error = %e, "OCR failed"),
    }
    text
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(value: serde_json::Value) -> OcrConfig {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn tesseract_config_defaults() {
    let cfg = parse(serde_json::json!({ "provider": "tesseract" }));
    assert_eq!(
      cfg,
      OcrConfig::Tesseract {
        binary:       PathBuf::from("tesseract"),
        language:     "eng".into(),
        timeout_secs: 30,
      }
    );
  }

  #[test]
  fn google_config_requires_key() {
    let cfg = parse(serde_json::json!({ "provider": "google_vision", "api_key": " " }));
    assert!(matches!(OcrProvider::from_config(&cfg), Err(Error::Config(_))));
  }

  #[test]
  fn openai_config_builds_provider() {
    let cfg = parse(serde_json::json!({ "provider": "openai", "api_key": "sk-test" }));
    let provider = OcrProvider::from_config(&cfg).unwrap();
    assert_eq!(provider.name(), "openai");
    assert!(provider.is_enabled());
  }

  #[test]
  fn none_is_default() {
    assert_eq!(OcrConfig::default(), OcrConfig::None);
    assert_eq!(parse(serde_json::json!({ "provider": "none" })), OcrConfig::None);
  }

  #[tokio::test]
  async fn disabled_provider_refuses() {
    let provider = OcrProvider::from_config(&OcrConfig::None).unwrap();
    let image = ImageInput::new(vec![0xff, 0xd8], "image/jpeg");
    assert!(matches!(provider.recognize_text(&image).await, Err(Error::Disabled)));
  }
}
