//! On-device OCR through the `tesseract` command-line tool.

use std::{path::PathBuf, process::Stdio, time::Duration};

use kiosk_core::ocr::ImageInput;
use tokio::{io::AsyncWriteExt as _, process::Command};

use crate::{Error, Result};

pub struct Tesseract {
  pub(crate) binary:   PathBuf,
  pub(crate) language: String,
  pub(crate) timeout:  Duration,
}

impl Tesseract {
  fn command(&self) -> Command {
    let mut cmd = Command::new(&self.binary);
    cmd
      .args(["stdin", "stdout", "-l", self.language.as_str()])
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);
    cmd
  }

  pub(crate) async fn recognize(&self, image: &ImageInput) -> Result<String> {
    let mut child = self.command().spawn()?;

    // Feed stdin from its own task so a full stdout pipe cannot stall us.
    let mut stdin = child
      .stdin
      .take()
      .ok_or_else(|| Error::Tesseract("stdin was not captured".into()))?;
    let bytes = image.bytes.clone();
    let writer = tokio::spawn(async move {
      stdin.write_all(&bytes).await?;
      stdin.shutdown().await
    });

    let output = tokio::time::timeout(self.timeout, child.wait_with_output())
      .await
      .map_err(|_| Error::Timeout(self.timeout))??;

    // A broken pipe here just means tesseract gave up early; its exit status
    // says why.
    if let Ok(Err(e)) = writer.await {
      tracing::debug!(error = %e, "tesseract closed stdin early");
    }

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
      return Err(Error::Tesseract(format!("{}: {stderr}", output.status)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}
