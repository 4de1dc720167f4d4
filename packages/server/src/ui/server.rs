//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::usecase::{
    ConnectParticipantUseCase, DisconnectParticipantUseCase, GetHubStatsUseCase,
    GetRoomMembersUseCase, GetRoomMessagesUseCase, SendMessageUseCase,
};

use super::{
    handler::{
        get_hub_stats, get_room_members, get_room_messages, health_check, websocket_handler,
    },
    state::AppState,
};

/// WebSocket chat server
///
/// This struct holds the use cases behind every endpoint and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_participant_usecase,
///     disconnect_participant_usecase,
///     send_message_usecase,
///     get_room_members_usecase,
///     get_room_messages_usecase,
///     get_hub_stats_usecase,
/// );
/// server.run(&config.bind_addr(), shutdown_signal()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `connect_participant_usecase` - UseCase for participant connection
    /// * `disconnect_participant_usecase` - UseCase for participant disconnection
    /// * `send_message_usecase` - UseCase for message sending
    /// * `get_room_members_usecase` - UseCase for listing the members of a room
    /// * `get_room_messages_usecase` - UseCase for reading stored messages
    /// * `get_hub_stats_usecase` - UseCase for hub-wide counters
    pub fn new(
        connect_participant_usecase: Arc<ConnectParticipantUseCase>,
        disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_room_members_usecase: Arc<GetRoomMembersUseCase>,
        get_room_messages_usecase: Arc<GetRoomMessagesUseCase>,
        get_hub_stats_usecase: Arc<GetHubStatsUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_participant_usecase,
                disconnect_participant_usecase,
                send_message_usecase,
                get_room_members_usecase,
                get_room_messages_usecase,
                get_hub_stats_usecase,
            }),
        }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        // ブラウザクライアントは別オリジンから接続する
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/hub/stats", get(get_hub_stats))
            .route("/api/rooms/{room_id}/members", get(get_room_members))
            .route("/api/rooms/{room_id}/messages", get(get_room_messages))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `bind_addr` and serve until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run<F>(self, bind_addr: &str, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!("WebSocket chat server listening on {}", local_addr);
        tracing::info!(
            "Connect to: ws://{}/ws?room=<room>&usn=<name>&userId=<id>",
            local_addr
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
