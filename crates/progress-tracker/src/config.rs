//! How long the tracker waits on each hop.

use std::time::Duration;

use snowbridge_planner_params::tracker::TrackerParams;

/// TrackerConfig bounds every wait of a [`track`](crate::tracker::track) call.
///
/// Each hop is given a window counted in blocks: the light client hop counts execution head
/// updates, every other hop counts finalized blocks of the chain it watches. An optional
/// wall-clock bound applies on top of the block window.
///
/// Construct it with [`Default::default`] or from [`TrackerParams`] and adjust it with the member
/// methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Head updates to wait for the light client to pass the submission block.
    pub(crate) light_client_scan_blocks: usize,

    /// Blocks to scan on each later hop.
    pub(crate) scan_blocks: usize,

    /// Wall-clock bound on each hop.
    pub(crate) hop_timeout: Option<Duration>,
}

impl TrackerConfig {
    /// Updates the light client window and returns the updated config.
    pub fn with_light_client_scan_blocks(mut self, n: usize) -> Self {
        self.light_client_scan_blocks = n;
        self
    }

    /// Updates the per-hop block window and returns the updated config.
    pub fn with_scan_blocks(mut self, n: usize) -> Self {
        self.scan_blocks = n;
        self
    }

    /// Bounds each hop by `timeout` and returns the updated config.
    ///
    /// The block window still applies; whichever runs out first ends the wait.
    pub fn with_hop_timeout(mut self, timeout: Duration) -> Self {
        self.hop_timeout = Some(timeout);
        self
    }

    /// The light client window, in head updates.
    pub const fn light_client_scan_blocks(&self) -> usize {
        self.light_client_scan_blocks
    }

    /// The per-hop window, in blocks.
    pub const fn scan_blocks(&self) -> usize {
        self.scan_blocks
    }

    /// The per-hop wall-clock bound, if any.
    pub const fn hop_timeout(&self) -> Option<Duration> {
        self.hop_timeout
    }
}

impl From<TrackerParams> for TrackerConfig {
    fn from(params: TrackerParams) -> Self {
        Self {
            light_client_scan_blocks: params.light_client_scan_blocks,
            scan_blocks: params.scan_blocks,
            hop_timeout: params.hop_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerParams::default().into()
    }
}

#[cfg(test)]
mod tests {
    use snowbridge_planner_params::default::{LIGHT_CLIENT_SCAN_BLOCKS, SCAN_BLOCKS};

    use super::*;

    #[test]
    fn test_default_follows_params() {
        let config = TrackerConfig::default();

        assert_eq!(config.light_client_scan_blocks(), LIGHT_CLIENT_SCAN_BLOCKS);
        assert_eq!(config.scan_blocks(), SCAN_BLOCKS);
        assert_eq!(config.hop_timeout(), None);
    }

    #[test]
    fn test_builder_overrides() {
        let params = TrackerParams {
            hop_timeout_secs: Some(30),
            ..Default::default()
        };

        let config = TrackerConfig::from(params)
            .with_scan_blocks(5)
            .with_light_client_scan_blocks(2);

        assert_eq!(config.scan_blocks(), 5);
        assert_eq!(config.light_client_scan_blocks(), 2);
        assert_eq!(config.hop_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            config.with_hop_timeout(Duration::from_millis(5)).hop_timeout(),
            Some(Duration::from_millis(5))
        );
    }
}
