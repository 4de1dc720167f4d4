//! Connection: one live duplex session's outbound side.
//!
//! The hub owns the [`Connection`] (the sending half of a bounded queue plus the
//! close flag). The session tasks own the [`ConnectionSession`] returned next to
//! it: the writer drains [`OutboundQueue`] to the socket, the reader watches
//! [`ClosedSignal`] so that eviction stops it promptly.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    watch,
};

use super::{
    entity::MemberInfo,
    error::EnqueueError,
    value_object::{ConnectionId, RoomId, SenderId, SenderLabel},
};

/// Serialized wire frame, shared between every member of a broadcast.
pub type Frame = Arc<str>;

/// Hub-owned half of a connection.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    room_id: RoomId,
    sender_id: SenderId,
    sender_label: SenderLabel,
    outbound: mpsc::Sender<Frame>,
    closed: AtomicBool,
    close_signal: watch::Sender<bool>,
}

impl Connection {
    /// Create a connection bound to `room_id` with an outbound queue of
    /// `capacity` frames, and the session half that consumes it.
    pub fn new(
        id: ConnectionId,
        room_id: RoomId,
        sender_id: SenderId,
        sender_label: SenderLabel,
        capacity: usize,
    ) -> (Self, ConnectionSession) {
        let (outbound, receiver) = mpsc::channel(capacity.max(1));
        let (close_signal, closed_rx) = watch::channel(false);
        let closed = ClosedSignal { rx: closed_rx };

        let session = ConnectionSession {
            id: id.clone(),
            room_id: room_id.clone(),
            queue: OutboundQueue {
                receiver,
                closed: closed.clone(),
            },
            closed,
        };

        let connection = Self {
            id,
            room_id,
            sender_id,
            sender_label,
            outbound,
            closed: AtomicBool::new(false),
            close_signal,
        };

        (connection, session)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn member_info(&self) -> MemberInfo {
        MemberInfo {
            connection_id: self.id.clone(),
            sender_id: self.sender_id.clone(),
            sender_label: self.sender_label.clone(),
        }
    }

    /// Place `frame` on the outbound queue without waiting.
    ///
    /// A full queue is reported as [`EnqueueError::Backpressure`]; the queue
    /// never grows past its capacity.
    pub fn enqueue(&self, frame: Frame) -> Result<(), EnqueueError> {
        if self.is_closed() {
            return Err(EnqueueError::Closed);
        }
        match self.outbound.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(EnqueueError::Backpressure),
            Err(TrySendError::Closed(_)) => Err(EnqueueError::Closed),
        }
    }

    /// Mark the connection closed and wake the session tasks.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.close_signal.send_replace(true);
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Future that resolves once the session half has been dropped, i.e. no
    /// task will ever read this connection's queue again.
    pub fn abandoned(&self) -> impl Future<Output = ()> + Send + 'static {
        let outbound = self.outbound.clone();
        async move { outbound.closed().await }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Session-owned half of a connection, handed out by the hub on register.
#[derive(Debug)]
pub struct ConnectionSession {
    pub id: ConnectionId,
    pub room_id: RoomId,
    pub queue: OutboundQueue,
    pub closed: ClosedSignal,
}

/// Receiving end of a connection's outbound queue.
#[derive(Debug)]
pub struct OutboundQueue {
    receiver: mpsc::Receiver<Frame>,
    closed: ClosedSignal,
}

impl OutboundQueue {
    /// Wait for the next frame. Returns `None` once the connection is closed;
    /// frames still buffered at that point are abandoned.
    pub async fn recv(&mut self) -> Option<Frame> {
        tokio::select! {
            biased;
            _ = self.closed.wait() => None,
            frame = self.receiver.recv() => frame,
        }
    }

    /// Number of frames waiting to be written.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Lifecycle signal that resolves when the connection is closed or dropped.
#[derive(Debug, Clone)]
pub struct ClosedSignal {
    rx: watch::Receiver<bool>,
}

impl ClosedSignal {
    /// Resolve once the connection has been closed.
    pub async fn wait(&mut self) {
        // Err means the hub dropped the connection, which also counts as closed.
        let _ = self.rx.wait_for(|closed| *closed).await;
    }

    pub fn is_closed(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}
