//! Room chat server.
//!
//! Participants connect to `/ws?room=<room>&usn=<name>&userId=<id>`; every message
//! is broadcast to all current members of the sender's room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --outbound-capacity 64
//! HIROBA_PORT=3000 cargo run --bin hiroba-server
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    config::{DEFAULT_COMMAND_CAPACITY, DEFAULT_OUTBOUND_CAPACITY, HubConfig, ServerConfig},
    domain::ConnectionHub,
    infrastructure::{hub::Hub, sink::InMemoryMessageSink},
    ui::{Server, shutdown_signal},
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetHubStatsUseCase,
        GetRoomMembersUseCase, GetRoomMessagesUseCase, SendMessageUseCase,
    },
};
use hiroba_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Room chat server with per-room broadcast", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// Frames a connection may have waiting before it is dropped as a slow consumer
    #[arg(long, env = "HIROBA_OUTBOUND_CAPACITY", default_value_t = DEFAULT_OUTBOUND_CAPACITY)]
    outbound_capacity: usize,

    /// Requests that may queue up in front of the hub dispatcher
    #[arg(long, env = "HIROBA_COMMAND_CAPACITY", default_value_t = DEFAULT_COMMAND_CAPACITY)]
    command_capacity: usize,

    /// Maximum number of messages kept in memory (unbounded when omitted)
    #[arg(long, env = "HIROBA_HISTORY_CAPACITY")]
    history_capacity: Option<usize>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "HIROBA_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            hub: HubConfig {
                outbound_capacity: self.outbound_capacity,
                command_capacity: self.command_capacity,
            },
            history_capacity: self.history_capacity,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match args.server_config().validate() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Hub (single dispatcher)
    // 2. Message sink
    // 3. UseCases
    // 4. Server

    // 1. Start the hub
    let (hub_handle, hub_task) = Hub::start(config.hub);
    let hub: Arc<dyn ConnectionHub> = Arc::new(hub_handle);
    tracing::info!(
        outbound_capacity = config.hub.outbound_capacity,
        command_capacity = config.hub.command_capacity,
        "Hub started"
    );

    // 2. Create the message sink (in-memory store)
    let sink = Arc::new(match config.history_capacity {
        Some(capacity) => InMemoryMessageSink::with_capacity(capacity),
        None => InMemoryMessageSink::new(),
    });
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 3. Create UseCases
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(hub.clone()));
    let disconnect_participant_usecase =
        Arc::new(DisconnectParticipantUseCase::new(hub.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        sink.clone(),
        hub.clone(),
        clock,
    ));
    let get_room_members_usecase = Arc::new(GetRoomMembersUseCase::new(hub.clone()));
    let get_room_messages_usecase = Arc::new(GetRoomMessagesUseCase::new(sink));
    let get_hub_stats_usecase = Arc::new(GetHubStatsUseCase::new(hub.clone()));

    // 4. Create and run the server
    let server = Server::new(
        connect_participant_usecase,
        disconnect_participant_usecase,
        send_message_usecase,
        get_room_members_usecase,
        get_room_messages_usecase,
        get_hub_stats_usecase,
    );

    // Stop the hub first so that every WebSocket session ends and the
    // graceful shutdown does not wait on them.
    let shutdown_hub = hub.clone();
    let shutdown = async move {
        shutdown_signal().await;
        if let Err(e) = shutdown_hub.shutdown().await {
            tracing::warn!("Hub was already stopped: {}", e);
        }
    };

    if let Err(e) = server.run(&config.bind_addr(), shutdown).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = hub_task.await {
        tracing::error!("Hub task failed: {}", e);
    }
}
