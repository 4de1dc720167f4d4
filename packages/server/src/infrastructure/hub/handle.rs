//! Cloneable front end to the dispatcher.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    BroadcastMessage, Connection, ConnectionHub, ConnectionId, ConnectionSession, DispatchReport,
    HubError, HubStats, MemberInfo, RoomId, SenderId, SenderLabel,
};

use super::command::HubCommand;

/// Handle passed to every component that registers, unregisters or dispatches.
///
/// Cloning is cheap; all clones talk to the same dispatcher.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
    outbound_capacity: usize,
}

impl HubHandle {
    pub(super) fn new(commands: mpsc::Sender<HubCommand>, outbound_capacity: usize) -> Self {
        Self {
            commands,
            outbound_capacity,
        }
    }

    async fn request<T: Send>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HubCommand + Send,
    ) -> Result<T, HubError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| HubError::Stopped)?;
        response.await.map_err(|_| HubError::Stopped)
    }
}

#[async_trait]
impl ConnectionHub for HubHandle {
    async fn register(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        sender_id: SenderId,
        sender_label: SenderLabel,
    ) -> Result<ConnectionSession, HubError> {
        let (connection, session) = Connection::new(
            connection_id,
            room_id,
            sender_id,
            sender_label,
            self.outbound_capacity,
        );
        let abandoned = connection.abandoned();
        let connection_id = connection.id().clone();
        self.request(|reply| HubCommand::Register { connection, reply })
            .await??;

        // A session dropped without unregistering (e.g. an upgrade that never
        // completed) must not stay in the room.
        let hub = self.clone();
        tokio::spawn(async move {
            abandoned.await;
            if let Ok(true) = hub.unregister(&connection_id).await {
                tracing::info!(
                    connection_id = %connection_id,
                    "Unregistered connection whose session was dropped"
                );
            }
        });
        Ok(session)
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Result<bool, HubError> {
        let connection_id = connection_id.clone();
        self.request(|reply| HubCommand::Unregister {
            connection_id,
            reply,
        })
        .await
    }

    async fn dispatch(&self, message: BroadcastMessage) -> Result<DispatchReport, HubError> {
        self.request(|reply| HubCommand::Dispatch { message, reply })
            .await?
    }

    async fn members(&self, room_id: &RoomId) -> Result<Vec<MemberInfo>, HubError> {
        let room_id = room_id.clone();
        self.request(|reply| HubCommand::Members { room_id, reply })
            .await
    }

    async fn stats(&self) -> Result<HubStats, HubError> {
        self.request(|reply| HubCommand::Stats { reply }).await
    }

    fn is_stopped(&self) -> bool {
        self.commands.is_closed()
    }

    async fn shutdown(&self) -> Result<(), HubError> {
        self.request(|reply| HubCommand::Shutdown { reply }).await
    }
}
