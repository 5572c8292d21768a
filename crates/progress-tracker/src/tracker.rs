//! The milestone stream of a submitted transfer.
//!
//! Every subscription is opened before the first wait, so an event finalized while an earlier hop
//! is still being watched is buffered rather than missed.

use std::fmt;

use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use snowbridge_planner::transfer::Transfer;
use snowbridge_planner_chain_api::{
    bridge_hub::BridgeHubClient,
    events::{BlockEvents, ChainEvent, ChainStream, ExecutionHeadUpdate},
    parachain::ParachainClient,
};
use snowbridge_planner_primitives::topic::{forwarded_topic_id, MessageId};
use tracing::{debug, info, warn};

use crate::{
    config::TrackerConfig,
    errors::{TrackerError, TrackerResult},
    milestone::{Hop, Milestone},
    receipt::MessageReceipt,
};

/// Milestones of one transfer, ending after the last hop or at the first error.
pub type MilestoneStream = BoxStream<'static, TrackerResult<Milestone>>;

/// Chains a transfer crosses after leaving Ethereum.
#[derive(Clone, Copy)]
pub struct TrackerChains<'a> {
    bridge_hub: &'a dyn BridgeHubClient,
    asset_hub: &'a dyn ParachainClient,
    destination: Option<&'a dyn ParachainClient>,
}

impl<'a> TrackerChains<'a> {
    /// Chains every transfer crosses.
    pub fn new(bridge_hub: &'a dyn BridgeHubClient, asset_hub: &'a dyn ParachainClient) -> Self {
        Self {
            bridge_hub,
            asset_hub,
            destination: None,
        }
    }

    /// Adds the parachain a transfer is forwarded to from AssetHub.
    pub fn with_destination(mut self, destination: &'a dyn ParachainClient) -> Self {
        self.destination = Some(destination);
        self
    }
}

impl fmt::Debug for TrackerChains<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerChains")
            .field("bridge_hub", &self.bridge_hub.para_id())
            .field("asset_hub", &self.asset_hub.para_id())
            .field("destination", &self.destination.map(|d| d.para_id()))
            .finish()
    }
}

/// What the tracker correlates events against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedTransfer {
    /// The submitted message.
    pub receipt: MessageReceipt,

    /// The topic the transfer's programs carry.
    pub topic: MessageId,

    /// The parachain the transfer ends on.
    pub destination_para_id: u32,
}

impl TrackedTransfer {
    /// Correlates a planned transfer with the receipt of its submission.
    pub fn new(transfer: &Transfer, receipt: MessageReceipt) -> Self {
        Self {
            receipt,
            topic: transfer.computed.topic,
            destination_para_id: transfer.input.request.destination_para_id,
        }
    }

    /// Whether `id` is the transfer's topic or the topic a hop forwards it under.
    fn is_topic(&self, id: &MessageId) -> bool {
        *id == self.topic || *id == forwarded_topic_id(&self.topic)
    }
}

/// Opens the subscriptions a transfer needs and returns its milestone stream.
///
/// The stream yields one milestone per hop in hop order, ending after AssetHub or, when the
/// transfer is forwarded, after the destination parachain. The first error is yielded and ends
/// the stream.
pub async fn track(
    chains: TrackerChains<'_>,
    transfer: TrackedTransfer,
    config: TrackerConfig,
) -> TrackerResult<MilestoneStream> {
    let asset_hub_para_id = chains.asset_hub.para_id();
    let forwarded = transfer.destination_para_id != asset_hub_para_id;

    let destination_events = if forwarded {
        let destination = chains
            .destination
            .filter(|d| d.para_id() == transfer.destination_para_id)
            .ok_or(TrackerError::MissingDestination(transfer.destination_para_id))?;
        Some(destination.block_events().await?)
    } else {
        None
    };

    let head_updates = chains.bridge_hub.execution_head_updates().await?;
    let bridge_hub_events = chains.bridge_hub.block_events().await?;
    let asset_hub_events = chains.asset_hub.block_events().await?;
    let light_client_head = chains.bridge_hub.latest_execution_block().await?;

    debug!(
        topic = %transfer.topic,
        nonce = transfer.receipt.nonce,
        destination = transfer.destination_para_id,
        %light_client_head,
        "tracking transfer"
    );

    let progress = Progress {
        transfer,
        config,
        light_client_head,
        head_updates,
        bridge_hub_events,
        asset_hub_events,
        destination_events,
        next: Some(Hop::LightClient),
    };

    Ok(stream::unfold(progress, |mut progress| async move {
        let hop = progress.next?;
        let result = progress.reach(hop).await;
        match &result {
            Ok(milestone) => {
                info!(topic = %progress.transfer.topic, %milestone, "transfer progressed");
                progress.next = progress.after(hop);
            }
            Err(err) => {
                warn!(topic = %progress.transfer.topic, %hop, %err, "transfer stopped");
                progress.next = None;
            }
        }
        Some((result, progress))
    })
    .boxed())
}

struct Progress {
    transfer: TrackedTransfer,
    config: TrackerConfig,
    light_client_head: u64,
    head_updates: ChainStream<ExecutionHeadUpdate>,
    bridge_hub_events: ChainStream<BlockEvents>,
    asset_hub_events: ChainStream<BlockEvents>,
    destination_events: Option<ChainStream<BlockEvents>>,
    next: Option<Hop>,
}

impl Progress {
    fn after(&self, hop: Hop) -> Option<Hop> {
        match hop {
            Hop::LightClient => Some(Hop::BridgeHub),
            Hop::BridgeHub => Some(Hop::AssetHub),
            Hop::AssetHub => self
                .destination_events
                .is_some()
                .then_some(Hop::Destination(self.transfer.destination_para_id)),
            Hop::Destination(_) => None,
        }
    }

    async fn reach(&mut self, hop: Hop) -> TrackerResult<Milestone> {
        match self.config.hop_timeout {
            Some(after) => tokio::time::timeout(after, self.scan(hop))
                .await
                .map_err(|_| TrackerError::Deadline { hop, after })?,
            None => self.scan(hop).await,
        }
    }

    async fn scan(&mut self, hop: Hop) -> TrackerResult<Milestone> {
        let transfer = &self.transfer;
        let window = self.config.scan_blocks;

        match hop {
            Hop::LightClient => {
                let target = transfer.receipt.block_number;
                if self.light_client_head >= target {
                    return Ok(Milestone::IncludedByLightClient {
                        execution_block: self.light_client_head,
                    });
                }

                let window = self.config.light_client_scan_blocks;
                scan_window(&mut self.head_updates, window, hop, |update| {
                    (update.execution_block >= target).then_some(Ok(
                        Milestone::IncludedByLightClient {
                            execution_block: update.execution_block,
                        },
                    ))
                })
                .await
            }
            Hop::BridgeHub => {
                let receipt = &transfer.receipt;
                scan_window(&mut self.bridge_hub_events, window, hop, |block| {
                    block.events.iter().find_map(|event| match event {
                        ChainEvent::InboundMessageReceived {
                            channel_id,
                            nonce,
                            message_id,
                        } if *message_id == receipt.message_id
                            || (*channel_id == receipt.channel_id && *nonce == receipt.nonce) =>
                        {
                            Some(Ok(Milestone::ReceivedOnBridgeHub {
                                block: block.number,
                                nonce: *nonce,
                            }))
                        }
                        _ => None,
                    })
                })
                .await
            }
            Hop::AssetHub => {
                scan_window(&mut self.asset_hub_events, window, hop, |block| {
                    processed(transfer, hop, block)
                })
                .await
            }
            Hop::Destination(para_id) => {
                let events = self
                    .destination_events
                    .as_mut()
                    .ok_or(TrackerError::MissingDestination(para_id))?;
                scan_window(events, window, hop, |block| processed(transfer, hop, block)).await
            }
        }
    }
}

/// Looks at up to `window` items of `stream` for the one `found` recognizes.
async fn scan_window<T, F>(
    stream: &mut ChainStream<T>,
    window: usize,
    hop: Hop,
    mut found: F,
) -> TrackerResult<Milestone>
where
    F: FnMut(&T) -> Option<TrackerResult<Milestone>>,
{
    for _ in 0..window {
        let item = stream.next().await.ok_or(TrackerError::StreamEnded(hop))??;
        if let Some(result) = found(&item) {
            return result;
        }
    }

    Err(TrackerError::Timeout {
        hop,
        blocks: window,
    })
}

/// The outcome of the transfer's message in `block`, if the message queue processed it there.
fn processed(
    transfer: &TrackedTransfer,
    hop: Hop,
    block: &BlockEvents,
) -> Option<TrackerResult<Milestone>> {
    block.events.iter().find_map(|event| match event {
        ChainEvent::MessageQueueProcessed { id, success, .. } if transfer.is_topic(id) => {
            Some(if *success {
                Ok(match hop {
                    Hop::Destination(para_id) => Milestone::ProcessedOnDestination {
                        para_id,
                        block: block.number,
                    },
                    _ => Milestone::ProcessedOnAssetHub {
                        block: block.number,
                    },
                })
            } else {
                Err(TrackerError::Rejected {
                    hop,
                    block: block.number,
                })
            })
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use snowbridge_planner::prelude::{
        create_transfer, get_delivery_fee, Connections, FeeOptions, PlanContext, TransferRequest,
    };
    use snowbridge_planner_chain_api::errors::ChainError;
    use snowbridge_planner_test_utils::{
        fixtures,
        mocks::{MockBridgeHub, MockParachain},
    };

    use super::*;

    const SUBMISSION_BLOCK: u64 = 20_005;

    fn topic() -> MessageId {
        MessageId::new([0x5a; 32])
    }

    fn receipt() -> MessageReceipt {
        MessageReceipt {
            transaction_hash: [1; 32],
            block_number: SUBMISSION_BLOCK,
            block_hash: [2; 32],
            channel_id: [3; 32],
            nonce: 9,
            message_id: MessageId::new([0x6b; 32]),
        }
    }

    fn transfer(destination_para_id: u32) -> TrackedTransfer {
        TrackedTransfer {
            receipt: receipt(),
            topic: topic(),
            destination_para_id,
        }
    }

    fn block(number: u32, events: Vec<ChainEvent>) -> BlockEvents {
        BlockEvents {
            number,
            hash: [number as u8; 32],
            events,
        }
    }

    fn processed_event(id: MessageId, success: bool) -> ChainEvent {
        ChainEvent::MessageQueueProcessed {
            id,
            origin_para_id: None,
            success,
        }
    }

    /// Chains on which every hop of a transfer to the destination is observed.
    fn delivering_chains() -> (MockBridgeHub, MockParachain, MockParachain) {
        let bridge_hub = fixtures::bridge_hub();
        {
            let mut state = bridge_hub.state();
            state.latest_execution_block = 20_000;
            state.head_updates = vec![
                ExecutionHeadUpdate {
                    bridge_hub_block: [0; 32],
                    execution_block: 20_003,
                },
                ExecutionHeadUpdate {
                    bridge_hub_block: [0; 32],
                    execution_block: 20_010,
                },
            ];
            state.events = vec![
                block(100, Vec::new()),
                block(
                    101,
                    vec![ChainEvent::InboundMessageReceived {
                        channel_id: [3; 32],
                        nonce: 9,
                        message_id: receipt().message_id,
                    }],
                ),
            ];
        }

        let asset_hub = fixtures::asset_hub();
        asset_hub.state().events = vec![
            block(500, vec![processed_event(MessageId::new([0xff; 32]), false)]),
            block(501, vec![processed_event(topic(), true)]),
        ];

        let destination = fixtures::destination();
        destination.state().events = vec![block(
            800,
            vec![processed_event(forwarded_topic_id(&topic()), true)],
        )];

        (bridge_hub, asset_hub, destination)
    }

    async fn collect(
        chains: TrackerChains<'_>,
        transfer: TrackedTransfer,
        config: TrackerConfig,
    ) -> Vec<TrackerResult<Milestone>> {
        track(chains, transfer, config)
            .await
            .unwrap()
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_milestones_follow_hop_order() {
        let (bridge_hub, asset_hub, destination) = delivering_chains();
        let chains = TrackerChains::new(&bridge_hub, &asset_hub).with_destination(&destination);

        let milestones = collect(
            chains,
            transfer(fixtures::DESTINATION_PARA_ID),
            TrackerConfig::default(),
        )
        .await;

        assert_eq!(
            milestones,
            vec![
                Ok(Milestone::IncludedByLightClient {
                    execution_block: 20_010
                }),
                Ok(Milestone::ReceivedOnBridgeHub {
                    block: 101,
                    nonce: 9
                }),
                Ok(Milestone::ProcessedOnAssetHub { block: 501 }),
                Ok(Milestone::ProcessedOnDestination {
                    para_id: fixtures::DESTINATION_PARA_ID,
                    block: 800
                }),
            ]
        );
    }

    #[tokio::test]
    async fn test_asset_hub_transfer_ends_at_asset_hub() {
        let (bridge_hub, asset_hub, _) = delivering_chains();
        bridge_hub.state().latest_execution_block = SUBMISSION_BLOCK;
        let chains = TrackerChains::new(&bridge_hub, &asset_hub);

        let milestones = collect(
            chains,
            transfer(fixtures::ASSET_HUB_PARA_ID),
            TrackerConfig::default(),
        )
        .await;

        let hops: Vec<_> = milestones
            .into_iter()
            .map(|milestone| milestone.unwrap().hop())
            .collect();
        assert_eq!(hops, vec![Hop::LightClient, Hop::BridgeHub, Hop::AssetHub]);
    }

    #[tokio::test]
    async fn test_rejected_message_ends_the_stream() {
        let (bridge_hub, asset_hub, destination) = delivering_chains();
        asset_hub.state().events = vec![block(501, vec![processed_event(topic(), false)])];
        let chains = TrackerChains::new(&bridge_hub, &asset_hub).with_destination(&destination);

        let milestones = collect(
            chains,
            transfer(fixtures::DESTINATION_PARA_ID),
            TrackerConfig::default(),
        )
        .await;

        assert_eq!(milestones.len(), 3);
        let err = milestones[2].clone().unwrap_err();
        assert_eq!(
            err,
            TrackerError::Rejected {
                hop: Hop::AssetHub,
                block: 501
            }
        );
        assert!(err.arrived());
    }

    #[tokio::test]
    async fn test_block_window_elapses() {
        let (bridge_hub, asset_hub, destination) = delivering_chains();
        bridge_hub.state().events = vec![block(100, Vec::new()), block(101, Vec::new())];
        let chains = TrackerChains::new(&bridge_hub, &asset_hub).with_destination(&destination);
        let config = TrackerConfig::default().with_scan_blocks(2);

        let milestones = collect(chains, transfer(fixtures::DESTINATION_PARA_ID), config).await;

        let err = milestones.last().unwrap().clone().unwrap_err();
        assert_eq!(
            err,
            TrackerError::Timeout {
                hop: Hop::BridgeHub,
                blocks: 2
            }
        );
        assert!(!err.arrived());
    }

    #[tokio::test]
    async fn test_light_client_window_elapses() {
        let (bridge_hub, asset_hub, destination) = delivering_chains();
        let chains = TrackerChains::new(&bridge_hub, &asset_hub).with_destination(&destination);
        let config = TrackerConfig::default().with_light_client_scan_blocks(1);

        let milestones = collect(chains, transfer(fixtures::DESTINATION_PARA_ID), config).await;

        assert_eq!(
            milestones,
            vec![Err(TrackerError::Timeout {
                hop: Hop::LightClient,
                blocks: 1
            })]
        );
    }

    #[tokio::test]
    async fn test_hop_timeout_bounds_a_silent_chain() {
        let (bridge_hub, asset_hub, destination) = delivering_chains();
        destination.state().events.clear();
        let chains = TrackerChains::new(&bridge_hub, &asset_hub).with_destination(&destination);
        let after = Duration::from_millis(20);
        let config = TrackerConfig::default().with_hop_timeout(after);

        let milestones = collect(chains, transfer(fixtures::DESTINATION_PARA_ID), config).await;

        assert_eq!(milestones.len(), 4);
        assert_eq!(
            milestones[3],
            Err(TrackerError::Deadline {
                hop: Hop::Destination(fixtures::DESTINATION_PARA_ID),
                after
            })
        );
    }

    #[tokio::test]
    async fn test_forwarded_transfer_needs_destination_client() {
        let (bridge_hub, asset_hub, _) = delivering_chains();
        let chains = TrackerChains::new(&bridge_hub, &asset_hub);

        let res = track(
            chains,
            transfer(fixtures::DESTINATION_PARA_ID),
            TrackerConfig::default(),
        )
        .await;

        assert!(matches!(
            res,
            Err(TrackerError::MissingDestination(fixtures::DESTINATION_PARA_ID))
        ));
    }

    #[tokio::test]
    async fn test_subscription_failure_is_returned() {
        let (bridge_hub, asset_hub, _) = delivering_chains();
        asset_hub.state().transport_error = Some("connection reset".to_string());
        let chains = TrackerChains::new(&bridge_hub, &asset_hub);

        let res = track(
            chains,
            transfer(fixtures::ASSET_HUB_PARA_ID),
            TrackerConfig::default(),
        )
        .await;

        assert!(matches!(
            res,
            Err(TrackerError::Chain(ChainError::Transport(_)))
        ));
    }

    #[tokio::test]
    async fn test_planned_transfer_is_correlated_by_topic() {
        let registry = fixtures::registry();
        let gateway = fixtures::gateway();
        let (bridge_hub, asset_hub, destination) = delivering_chains();
        let ctx = PlanContext::new(
            &registry,
            Connections::new(&gateway, &bridge_hub, &asset_hub).with_destination(&destination),
        );
        let options = FeeOptions::default();
        let fee = get_delivery_fee(
            &ctx,
            &fixtures::SUFFICIENT_TOKEN,
            fixtures::DESTINATION_PARA_ID,
            &options,
        )
        .await
        .unwrap();
        let request = TransferRequest {
            source_account: fixtures::SOURCE_ACCOUNT,
            beneficiary: fixtures::BENEFICIARY.to_string(),
            token: fixtures::SUFFICIENT_TOKEN,
            destination_para_id: fixtures::DESTINATION_PARA_ID,
            amount: 10_000,
        };
        let planned = create_transfer(&ctx, request, fee, options).await.unwrap();

        let tracked = TrackedTransfer::new(&planned, receipt());

        assert_eq!(tracked.topic, planned.computed.topic);
        assert_eq!(tracked.destination_para_id, fixtures::DESTINATION_PARA_ID);
        assert!(tracked.is_topic(&forwarded_topic_id(&planned.computed.topic)));
        assert!(!tracked.is_topic(&receipt().message_id));
    }
}
