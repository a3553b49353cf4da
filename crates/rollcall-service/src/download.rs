//! In-memory artifacts ready for a browser-style "save as".

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use serde::{Deserialize, Serialize};

/// A rendered token packaged for immediate preview or download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadableArtifact {
  /// Suggested file name, `student_<subject_id>_qrcode.png`.
  pub filename: String,
  /// `data:image/png;base64,…`
  pub data_uri: String,
}

impl DownloadableArtifact {
  pub fn png(subject_id: &str, png: &[u8]) -> Self {
    Self {
      filename: download_filename(subject_id),
      data_uri: format!("data:image/png;base64,{}", B64.encode(png)),
    }
  }
}

/// `student_<subject_id>_qrcode.png`, with path separators in the id replaced
/// so the result is always a single file name.
pub fn download_filename(subject_id: &str) -> String {
  let safe: String = subject_id
    .chars()
    .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
    .collect();
  format!("student_{safe}_qrcode.png")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filename_and_data_uri() {
    let artifact = DownloadableArtifact::png("S100", b"\x89PNG");
    assert_eq!(artifact.filename, "student_S100_qrcode.png");
    assert_eq!(artifact.data_uri, "data:image/png;base64,iVBORw==");
  }

  #[test]
  fn filename_never_contains_a_path() {
    assert_eq!(download_filename("../S1"), "student_.._S1_qrcode.png");
    assert_eq!(download_filename("a\\b"), "student_a_b_qrcode.png");
  }
}
