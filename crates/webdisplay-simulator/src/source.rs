//! Where snapshots come from: the device itself, or a recording.

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use webdisplay_core::{Snapshot, SnapshotSource, TransportError};

/// Upper bound for one HTTP round trip, so a dead device cannot stall the UI.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Polls the device's frame buffer endpoint.
pub struct HttpSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        let agent = ureq::builder().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            url: url.to_string(),
        }
    }
}

impl SnapshotSource for HttpSource {
    fn fetch(&mut self) -> Result<Snapshot, TransportError> {
        let response = match self.agent.get(&self.url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(TransportError::Request(format!("HTTP status {}", code)));
            }
            Err(e) => return Err(TransportError::Request(e.to_string())),
        };
        response
            .into_json::<Snapshot>()
            .map_err(|e| TransportError::Parse(e.to_string()))
    }
}

/// Plays back recorded snapshots in order, starting over after the last one.
pub struct ReplaySource {
    snapshots: Vec<Snapshot>,
    next: usize,
}

impl ReplaySource {
    /// Read a JSON file holding either one snapshot or an array of them.
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let body = fs::read(path)
            .map_err(|e| TransportError::Request(format!("{}: {}", path.display(), e)))?;
        let snapshots = match serde_json::from_slice::<Vec<Snapshot>>(&body) {
            Ok(snapshots) => snapshots,
            Err(_) => vec![Snapshot::from_json(&body)?],
        };
        info!("Replaying {} snapshot(s) from {}", snapshots.len(), path.display());
        Self::from_snapshots(snapshots)
    }

    pub fn from_snapshots(snapshots: Vec<Snapshot>) -> Result<Self, TransportError> {
        if snapshots.is_empty() {
            return Err(TransportError::Parse("recording holds no snapshots".into()));
        }
        Ok(Self { snapshots, next: 0 })
    }
}

impl SnapshotSource for ReplaySource {
    fn fetch(&mut self) -> Result<Snapshot, TransportError> {
        let snapshot = self.snapshots[self.next].clone();
        debug!("Replaying snapshot {}/{}", self.next + 1, self.snapshots.len());
        self.next = (self.next + 1) % self.snapshots.len();
        Ok(snapshot)
    }
}
