//! The `warbotsd` binary: a tarpc RPC frontend over the Turn Dispatcher, in
//! the same shape as the teacher's tarpc JSON-over-TCP server.

mod dispatcher;

use std::net::{IpAddr, Ipv6Addr};
use std::sync::Arc;

use futures::prelude::*;
use tarpc::{
    context::Context,
    server::{self, incoming::Incoming, Channel},
    tokio_serde::formats::Json,
};
use tracing_subscriber::EnvFilter;

use common::cli;
use common::conf;
use common::game::dispatcher_types::{GameSummary, ServerEvent};
use common::game::ids::{GameId, PlayerId};
use common::game::orders::Orders;
use common::game::player::EmpireColor;
use common::game::store::InMemoryStore;
use common::game::view::PlayerView;
use common::rpc::{ColorAvailability, WarbotsResult, WarbotsRpc};

use dispatcher::Dispatcher;

#[derive(Clone)]
struct WarbotsServer {
    dispatcher: Arc<Dispatcher>,
}

#[tarpc::server]
impl WarbotsRpc for WarbotsServer {
    async fn list_open_games(self, _: Context) -> Vec<GameSummary> {
        self.dispatcher.list_open_games().await
    }

    async fn list_my_games(self, _: Context, player: PlayerId) -> Vec<GameSummary> {
        self.dispatcher.list_my_games(player).await
    }

    async fn create_game(
        self,
        _: Context,
        player: PlayerId,
        name: String,
        grid_size: u16,
        max_players: usize,
        turn_timer_secs: u64,
        empire_name: String,
        empire_color: EmpireColor,
    ) -> WarbotsResult<GameId> {
        self.dispatcher
            .create_game(player, name, grid_size, max_players, turn_timer_secs, empire_name, empire_color)
            .await
    }

    async fn join_game(
        self,
        _: Context,
        game: GameId,
        player: PlayerId,
        empire_name: String,
        empire_color: EmpireColor,
    ) -> WarbotsResult<()> {
        self.dispatcher.join_game(game, player, empire_name, empire_color).await
    }

    async fn available_colors(self, _: Context, game: GameId) -> WarbotsResult<ColorAvailability> {
        self.dispatcher.available_colors(game).await
    }

    async fn start_game(self, _: Context, game: GameId, player: PlayerId) -> WarbotsResult<()> {
        self.dispatcher.start_game(game, player).await
    }

    async fn delete_game(self, _: Context, game: GameId, player: PlayerId) -> WarbotsResult<()> {
        self.dispatcher.delete_game(game, player).await
    }

    async fn state(self, _: Context, game: GameId, player: PlayerId) -> WarbotsResult<PlayerView> {
        self.dispatcher.state(game, player).await
    }

    async fn submit_turn(self, _: Context, game: GameId, player: PlayerId, orders: Orders) -> WarbotsResult<bool> {
        self.dispatcher.submit_turn(game, player, orders).await
    }

    async fn save_draft(self, _: Context, game: GameId, player: PlayerId, orders: Orders) -> WarbotsResult<()> {
        self.dispatcher.save_draft(game, player, orders).await
    }

    async fn poll_events(self, _: Context, game: GameId, since: usize) -> WarbotsResult<Vec<ServerEvent>> {
        self.dispatcher.poll_events(game, since).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli::app("warbotsd", "lsv").get_matches();

    let verbosity = matches.get_count("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli::verbosity_filter(verbosity)))
        .init();

    let seed = matches.get_one::<u64>("seed").copied();
    let listen: &String = matches.get_one("listen").unwrap();
    let addr: std::net::SocketAddr = listen
        .parse()
        .unwrap_or((IpAddr::V6(Ipv6Addr::LOCALHOST), 7654).into());

    let store = Arc::new(InMemoryStore::new());
    let dispatcher = Dispatcher::new(store, seed);

    tracing::info!(%addr, version = conf::APP_VERSION, "starting warbotsd");

    let mut listener = tarpc::serde_transport::tcp::listen(&addr, Json::default).await?;
    listener.config_mut().max_frame_length(usize::MAX);
    listener
        .filter_map(|r| future::ready(r.ok()))
        .map(server::BaseChannel::with_defaults)
        .max_channels_per_key(4, |t| t.transport().peer_addr().unwrap().ip())
        .map(|channel| {
            let server = WarbotsServer {
                dispatcher: dispatcher.clone(),
            };
            channel.execute(server.serve())
        })
        .buffer_unordered(64)
        .for_each(|_| async {})
        .await;

    Ok(())
}
