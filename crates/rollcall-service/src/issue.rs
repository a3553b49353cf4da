//! The issuance workflow: encode a token, then write artifact and record.
//!
//! The two writes form a saga with no compensating action:
//!
//! 1. `put` the PNG into the artifact store. Failure aborts; no record is
//!    written, so metadata never points at an artifact that was never stored.
//! 2. `create` the record. Failure leaves the artifact from step 1 orphaned.
//!    It is logged and reported, never rolled back.
//!
//! Nothing is retried. Re-submitting creates a new record, possibly with a
//! duplicate subject id.

use std::sync::Arc;

use rollcall_core::{
  record::{NewRecord, SubjectRecord},
  session::SessionGate,
  store::{ArtifactStore, RecordStore},
  token::TokenPayload,
};
use rollcall_token::TokenEncoder;
use serde::{Deserialize, Serialize};

use crate::{
  download::DownloadableArtifact,
  error::{IssueError, WriteStage},
};

/// Operator input for a new token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
  pub subject_name: String,
  pub subject_id:   String,
}

/// A successfully issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issued {
  pub record:    SubjectRecord,
  /// The exact string carried by the code.
  pub canonical: String,
  /// The rendered code, for immediate preview or download.
  pub artifact:  DownloadableArtifact,
}

pub struct IssuanceWorkflow<R, A> {
  records:   Arc<R>,
  artifacts: Arc<A>,
  encoder:   TokenEncoder,
}

impl<R, A> IssuanceWorkflow<R, A>
where
  R: RecordStore,
  A: ArtifactStore,
{
  pub fn new(records: Arc<R>, artifacts: Arc<A>, encoder: TokenEncoder) -> Self {
    Self { records, artifacts, encoder }
  }

  /// Issue a token for `request` on behalf of the operator in `session`.
  ///
  /// Authorization, validation and encoding all happen before the first
  /// store write.
  pub async fn issue(
    &self,
    session: &impl SessionGate,
    request: IssueRequest,
  ) -> Result<Issued, IssueError> {
    let operator = session
      .current_identity()
      .ok_or(IssueError::Unauthorized)?;

    let payload = TokenPayload::new(request.subject_name, request.subject_id)
      .map_err(IssueError::Validation)?;
    let token = self.encoder.encode(&payload).map_err(IssueError::Encoding)?;
    let key = payload.artifact_key();

    if let Err(e) = self.artifacts.put(&key, token.png.clone()).await {
      tracing::warn!(%key, error = %e, "artifact write failed; no record created");
      return Err(IssueError::StoreWrite {
        stage:             WriteStage::Artifact,
        orphaned_artifact: None,
        source:            Box::new(e),
      });
    }

    let input = NewRecord {
      subject_name: payload.subject_name().to_owned(),
      subject_id:   payload.subject_id().to_owned(),
      artifact_key: key.clone(),
    };
    let record = match self.records.create(input).await {
      Ok(record) => record,
      Err(e) => {
        tracing::warn!(%key, error = %e, "record write failed; artifact orphaned");
        return Err(IssueError::StoreWrite {
          stage:             WriteStage::Record,
          orphaned_artifact: Some(key),
          source:            Box::new(e),
        });
      }
    };

    tracing::info!(
      operator = %operator.name,
      record_id = %record.record_id,
      subject_id = %record.subject_id,
      "token issued"
    );

    let artifact = DownloadableArtifact::png(&record.subject_id, &token.png);
    Ok(Issued { record, canonical: token.canonical, artifact })
  }
}
