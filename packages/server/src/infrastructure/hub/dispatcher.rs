//! The single actor that owns the membership table.
//!
//! Every register, unregister and dispatch is applied here one at a time, in
//! the order received, so iterating a room's members never overlaps with a
//! change to that room.

use std::ops::ControlFlow;

use tokio::sync::mpsc;

use crate::{
    domain::{
        BroadcastMessage, Connection, ConnectionId, DispatchReport, Frame, HubError, HubStats,
        RoomMembershipTable,
    },
    infrastructure::dto::websocket::ChatMessageDto,
};

use super::command::HubCommand;

pub struct Dispatcher {
    table: RoomMembershipTable,
    commands: mpsc::Receiver<HubCommand>,
}

impl Dispatcher {
    pub fn new(commands: mpsc::Receiver<HubCommand>) -> Self {
        Self {
            table: RoomMembershipTable::new(),
            commands,
        }
    }

    /// Process commands until shutdown is requested or every handle is dropped.
    pub async fn run(mut self) {
        tracing::info!("Hub dispatcher started");

        while let Some(command) = self.commands.recv().await {
            if self.handle(command).is_break() {
                break;
            }
        }

        // Reject anything still queued: dropping the receiver drops the reply
        // senders, so waiting callers observe `HubError::Stopped`.
        self.commands.close();
        let closed = self.table.drain();
        tracing::info!(closed = closed.len(), "Hub dispatcher stopped");
    }

    fn handle(&mut self, command: HubCommand) -> ControlFlow<()> {
        match command {
            HubCommand::Register { connection, reply } => {
                let _ = reply.send(self.register(connection));
            }
            HubCommand::Unregister {
                connection_id,
                reply,
            } => {
                let _ = reply.send(self.unregister(&connection_id));
            }
            HubCommand::Dispatch { message, reply } => {
                let _ = reply.send(self.dispatch(&message));
            }
            HubCommand::Members { room_id, reply } => {
                let _ = reply.send(self.table.members(&room_id));
            }
            HubCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
            HubCommand::Shutdown { reply } => {
                // Close the command channel before replying so that handles
                // report stopped as soon as `shutdown` returns.
                self.commands.close();
                let closed = self.table.drain();
                tracing::info!(closed = closed.len(), "Hub shutdown requested");
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn register(&mut self, connection: Connection) -> Result<(), HubError> {
        let connection_id = connection.id().clone();
        let room_id = connection.room_id().clone();

        match self.table.join(connection) {
            Ok(()) => {
                tracing::info!(
                    room_id = %room_id,
                    connection_id = %connection_id,
                    connections = self.table.connection_count(),
                    "Connection registered"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Rejected duplicate registration: {}", e);
                Err(HubError::DuplicateConnection(connection_id.into_string()))
            }
        }
    }

    fn unregister(&mut self, connection_id: &ConnectionId) -> bool {
        let Some(room_id) = self.table.room_of(connection_id).cloned() else {
            tracing::debug!(connection_id = %connection_id, "Unregister ignored, not registered");
            return false;
        };

        let removed = self.table.leave(&room_id, connection_id).is_some();
        if removed {
            tracing::info!(
                room_id = %room_id,
                connection_id = %connection_id,
                connections = self.table.connection_count(),
                "Connection unregistered"
            );
        }
        removed
    }

    /// Serialize once, then try every member's queue without waiting.
    ///
    /// Members whose queue rejects the frame are unregistered on the spot; a
    /// failing member never stops delivery to the rest.
    fn dispatch(&mut self, message: &BroadcastMessage) -> Result<DispatchReport, HubError> {
        let frame: Frame = serde_json::to_string(&ChatMessageDto::from(message))
            .map_err(|e| {
                tracing::error!(room_id = %message.room_id, "Failed to serialize message: {}", e);
                HubError::Serialization(e.to_string())
            })?
            .into();

        let mut report = DispatchReport::default();
        for member in self.table.snapshot(&message.room_id) {
            match member.enqueue(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        room_id = %message.room_id,
                        connection_id = %member.id(),
                        "Evicting connection: {}",
                        e
                    );
                    report.evicted.push(member.id().clone());
                }
            }
        }

        for connection_id in &report.evicted {
            self.table.leave(&message.room_id, connection_id);
        }

        tracing::debug!(
            room_id = %message.room_id,
            delivered = report.delivered,
            evicted = report.evicted.len(),
            "Dispatched message"
        );
        Ok(report)
    }

    fn stats(&self) -> HubStats {
        HubStats {
            rooms: self.table.room_count(),
            connections: self.table.connection_count(),
        }
    }
}
