use clap::Parser;
use log::{debug, error, info};
use server::events::GameEvent;
use server::game::{GameState, SharedGame};
use server::map::MapGrid;
use server::network::Server;
use server::render::WorldView;
use shared::MAX_PLAYERS;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Map file name inside the maps directory (default map if omitted or missing)
    #[arg(short, long)]
    map: Option<String>,

    /// Directory holding map files
    #[arg(long, default_value = "maps")]
    maps_dir: PathBuf,

    /// Maximum number of players connected at once
    #[arg(long, default_value_t = MAX_PLAYERS)]
    max_players: usize,

    /// Seed for spawn positions, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let map = MapGrid::load_named(&args.maps_dir, args.map.as_deref())?;
    info!("Playing on '{}'", map.name());

    let (event_tx, event_rx) = mpsc::unbounded_channel::<GameEvent>();
    let world = WorldView::new(&map);

    let state = match args.seed {
        Some(seed) => GameState::with_seed(map, seed),
        None => GameState::new(map),
    };
    let game = SharedGame::new(state, Arc::new(event_tx));

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, game, args.max_players).await?;

    let render_handle = tokio::spawn(render_world(world, event_rx));

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    render_handle.abort();
    Ok(())
}

/// Keeps a text picture of the dungeon up to date and logs it on every change.
async fn render_world(mut world: WorldView, mut events: mpsc::UnboundedReceiver<GameEvent>) {
    while let Some(event) = events.recv().await {
        if world.apply(event) == 0 {
            debug!(
                "Event #{} arrived early, {} waiting",
                event.seq,
                world.held_back()
            );
            continue;
        }

        let slot = event.kind.slot();
        match (world.player_position(slot), world.gold_needed(slot)) {
            (Some(pos), Some(gold)) => debug!("Player {} at {}, {} gold to go", slot, pos, gold),
            (Some(pos), None) => debug!("Player {} at {}", slot, pos),
            (None, _) => debug!("Player {} is off the board", slot),
        }
        debug!("World after event #{}:\n{}", event.seq, world.render());
    }
}
