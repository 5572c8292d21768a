//! Re-exports of the planning entry points and the types they exchange.

pub use super::{
    context::{Connections, PlanContext},
    create_transfer,
    errors::{PlannerError, PlannerResult},
    get_delivery_fee,
    inter_network::{
        create_inter_network_transfer, get_inter_network_fee, validate_inter_network_transfer,
        InterNetworkPlan, InterNetworkRequest, InterNetworkToken,
    },
    l2::{
        create_l2_transfer, get_l2_delivery_fee, validate_l2_transfer, L2Transfer,
        L2TransferRequest,
    },
    options::FeeOptions,
    registration::{
        create_registration, get_registration_fee, validate_registration, RegistrationFee,
        RegistrationRequest, TokenRegistration,
    },
    status::{bridge_status, BridgeStatus},
    topology::Topology,
    transfer::{approve_call, Transfer, TransferRequest},
    validate_transfer,
    validation::{DryRunStatus, ValidationKind, ValidationLog, ValidationReason, ValidationResult},
};
