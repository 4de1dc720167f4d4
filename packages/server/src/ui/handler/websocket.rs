//! WebSocket connection handlers.
//!
//! 1 つの WebSocket セッションは 2 つのタスクで構成される。
//!
//! - reader: 受信フレームを `SendMessageUseCase` に渡す。接続が閉じられたら終了
//! - writer: 送信キューのフレームをソケットに書き出す。キューが閉じられたら終了
//!
//! ハブへの登録はアップグレードの完了後に行い、どちらかのタスクが終了した時点で
//! もう一方を止めて登録解除する。

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;

use crate::{
    domain::{
        ChatMessage, ClosedSignal, ConnectionId, ConnectionSession, MessageContent,
        OutboundQueue, RoomId, SenderId, SenderLabel, ValueObjectError,
    },
    ui::state::AppState,
    usecase::{ConnectError, SendMessageError},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub room: String,
    pub usn: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Identity of the participant behind one WebSocket session.
#[derive(Debug, Clone)]
struct Participant {
    room_id: RoomId,
    sender_id: SenderId,
    sender_label: SenderLabel,
}

impl TryFrom<ConnectQuery> for Participant {
    type Error = ValueObjectError;

    fn try_from(query: ConnectQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            room_id: RoomId::try_from(query.room)?,
            sender_id: SenderId::try_from(query.user_id)?,
            sender_label: SenderLabel::try_from(query.usn)?,
        })
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let participant = match Participant::try_from(query) {
        Ok(participant) => participant,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket connection: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    if !state.connect_participant_usecase.is_available() {
        tracing::warn!(
            room_id = %participant.room_id,
            "Hub is not running. Rejecting connection."
        );
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    // 登録はアップグレードの完了後に行う
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, participant)))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, participant: Participant) {
    // 接続 ID はセッションごとにサーバーが採番する
    let connection_id = ConnectionId::generate();

    let session = match state
        .connect_participant_usecase
        .execute(
            participant.room_id.clone(),
            connection_id.clone(),
            participant.sender_id.clone(),
            participant.sender_label.clone(),
        )
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                room_id = %participant.room_id,
                "Failed to register connection: {}",
                e
            );
            let code = match &e {
                ConnectError::DuplicateConnection(_) => close_code::POLICY,
                ConnectError::HubUnavailable => close_code::AGAIN,
            };
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code,
                    reason: e.to_string().into(),
                })))
                .await;
            return;
        }
    };
    tracing::info!(
        connection_id = %connection_id,
        room_id = %participant.room_id,
        sender_id = %participant.sender_id,
        "WebSocket session started"
    );

    let ConnectionSession { queue, closed, .. } = session;
    let (sender, receiver) = socket.split();

    let mut send_task = tokio::spawn(writer_loop(queue, sender));
    let mut recv_task = tokio::spawn(reader_loop(
        receiver,
        closed,
        state.clone(),
        participant,
        connection_id.clone(),
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let removed = state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await;
    tracing::info!(
        connection_id = %connection_id,
        unregistered = removed,
        "Connection closed"
    );
}

/// Write queued frames to the socket until the connection is closed.
async fn writer_loop(mut queue: OutboundQueue, mut sender: SplitSink<WebSocket, Message>) {
    while let Some(frame) = queue.recv().await {
        if sender
            .send(Message::Text(frame.to_string().into()))
            .await
            .is_err()
        {
            return;
        }
    }
    let _ = sender.send(Message::Close(None)).await;
}

/// Read inbound frames and hand each one to the send use case.
async fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    mut closed: ClosedSignal,
    state: Arc<AppState>,
    participant: Participant,
    connection_id: ConnectionId,
) {
    loop {
        let msg = tokio::select! {
            _ = closed.wait() => {
                tracing::debug!(connection_id = %connection_id, "Connection closed by hub");
                break;
            }
            msg = receiver.next() => msg,
        };

        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!(connection_id = %connection_id, "WebSocket error: {}", e);
                break;
            }
            None => break,
        };

        let text = match msg {
            Message::Text(text) => text.to_string(),
            Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Dropping binary frame that is not valid UTF-8"
                    );
                    continue;
                }
            },
            Message::Close(_) => {
                tracing::info!(connection_id = %connection_id, "Client requested close");
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        let content = match MessageContent::try_from(text) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, "Dropping message: {}", e);
                continue;
            }
        };

        let message = ChatMessage::new(
            participant.room_id.clone(),
            participant.sender_id.clone(),
            participant.sender_label.clone(),
            content,
        );
        match state.send_message_usecase.execute(message).await {
            Ok(outcome) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    delivered = outcome.report.delivered,
                    evicted = outcome.report.evicted.len(),
                    persisted = outcome.persisted,
                    "Message dispatched"
                );
            }
            Err(SendMessageError::HubUnavailable) => {
                tracing::warn!(connection_id = %connection_id, "Hub stopped, closing session");
                break;
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, "Failed to send message: {}", e);
            }
        }
    }
}
