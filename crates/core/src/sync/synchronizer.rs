//! Poll-loop front end for the snapshot.

use tracing::{debug, info, warn};

use super::snapshot::{MergeOutcome, Snapshot};
use super::types::SyncPayload;
use super::PayloadError;

/// Owns the snapshot of one WebUI session and tracks the response id.
///
/// Merging requires `&mut Synchronizer`, so at most one merge can be in
/// flight per session.
#[derive(Debug, Default)]
pub struct Synchronizer {
    snapshot: Option<Snapshot>,
    rid: u64,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response id to send with the next poll (0 requests a full update).
    pub fn rid(&self) -> u64 {
        self.rid
    }

    /// The current snapshot, if a payload has been applied since the last
    /// reset.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Apply one poll response.
    ///
    /// A full update (or the first payload of a session) rebuilds the
    /// snapshot from scratch; anything else is merged incrementally.
    pub fn apply(&mut self, payload: SyncPayload) -> MergeOutcome {
        let next_rid = payload.rid;
        if let Some(rid) = next_rid {
            if rid < self.rid && !payload.is_full_update() {
                warn!(previous = self.rid, rid, "sync response id went backwards");
            }
        }

        let outcome = match self.snapshot.as_mut() {
            Some(snapshot) if !payload.is_full_update() => snapshot.merge(payload),
            _ => {
                if self.snapshot.is_some() {
                    info!("server requested a full update, rebuilding snapshot");
                }
                self.snapshot = Some(Snapshot::create(payload));
                MergeOutcome::REBUILT
            }
        };

        if let Some(rid) = next_rid {
            self.rid = rid;
        }
        debug!(rid = self.rid, ?outcome, "applied sync payload");
        outcome
    }

    /// Parse and apply a JSON poll response.
    pub fn apply_json(&mut self, json: &str) -> Result<MergeOutcome, PayloadError> {
        let payload: SyncPayload = serde_json::from_str(json)?;
        Ok(self.apply(payload))
    }

    /// Forget everything; the next poll requests a full update.
    pub fn reset(&mut self) {
        self.snapshot = None;
        self.rid = 0;
    }
}
