//! Parameters bounding how long the progress tracker waits on each hop.

use serde::{Deserialize, Serialize};

use super::default::{LIGHT_CLIENT_SCAN_BLOCKS, SCAN_BLOCKS};

/// Scan windows for the progress tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerParams {
    /// Number of bridge hub blocks to wait for the beacon light client to catch up.
    pub light_client_scan_blocks: usize,

    /// Number of blocks to scan on each hop for the expected delivery event.
    pub scan_blocks: usize,

    /// Optional wall-clock bound, in seconds, on the wait for each hop.
    #[serde(default)]
    pub hop_timeout_secs: Option<u64>,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            light_client_scan_blocks: LIGHT_CLIENT_SCAN_BLOCKS,
            scan_blocks: SCAN_BLOCKS,
            hop_timeout_secs: None,
        }
    }
}
