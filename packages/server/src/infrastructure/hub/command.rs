//! Requests accepted by the dispatcher.

use tokio::sync::oneshot;

use crate::domain::{
    BroadcastMessage, Connection, ConnectionId, DispatchReport, HubError, HubStats, MemberInfo,
    RoomId,
};

/// One request to the dispatcher, with the channel its answer goes back on.
#[derive(Debug)]
pub enum HubCommand {
    Register {
        connection: Connection,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    Unregister {
        connection_id: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
    Dispatch {
        message: BroadcastMessage,
        reply: oneshot::Sender<Result<DispatchReport, HubError>>,
    },
    Members {
        room_id: RoomId,
        reply: oneshot::Sender<Vec<MemberInfo>>,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}
