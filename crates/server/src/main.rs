mod config;
mod connection;
mod events;
mod server;
mod tui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use lookout::{EntityRegistry, SkinLibrary, World};

use config::ServerConfig;
use events::ServerEvent;
use server::GameServer;
use tui::TuiState;

#[derive(Parser)]
#[command(name = "lookout-server")]
#[command(about = "Lookout game server")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = lookout::DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = lookout::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    #[arg(short, long, default_value_t = 64)]
    max_clients: usize,

    #[arg(long, default_value_t = lookout::cull::DEFAULT_VIEWPORT_WIDTH)]
    viewport_width: u32,

    #[arg(long, default_value_t = lookout::cull::DEFAULT_VIEWPORT_HEIGHT)]
    viewport_height: u32,

    #[arg(long, default_value_t = lookout::cull::DEFAULT_CULL_MARGIN)]
    cull_margin: f64,

    #[arg(long, help = "Load skins from this directory instead of the built-in set")]
    skins_dir: Option<PathBuf>,

    #[arg(long)]
    headless: bool,
}

struct Running {
    shutdown: watch::Sender<bool>,
    game: JoinHandle<()>,
    accept: JoinHandle<()>,
}

impl Running {
    async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.game.await;
        let _ = self.accept.await;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    let config = ServerConfig {
        tick_rate: args.tick_rate,
        max_clients: args.max_clients,
        viewport_width: args.viewport_width,
        viewport_height: args.viewport_height,
        cull_margin: args.cull_margin,
        skins_dir: args.skins_dir,
        ..Default::default()
    };

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let skins = match &config.skins_dir {
        Some(dir) => SkinLibrary::from_dir(dir)
            .with_context(|| format!("loading skins from {}", dir.display()))?,
        None => SkinLibrary::embedded().context("loading built-in skins")?,
    };
    let skin_count = skins.len();
    let registry = EntityRegistry::new(skins).with_spawn(config.spawn);
    let world = World::with_registry(registry, config.culler());
    let mut server = GameServer::new(config, world);

    let runtime = Runtime::new()?;
    let listener = runtime
        .block_on(TcpListener::bind(&bind_addr))
        .with_context(|| format!("binding {}", bind_addr))?;
    let local_addr = listener.local_addr()?;

    let dashboard = if args.headless {
        None
    } else {
        server.take_events().map(|events| (events, server.subscribe_stats()))
    };
    let (shutdown, shutdown_rx) = watch::channel(false);
    let accept = runtime.spawn(connection::accept_loop(
        listener,
        server.inbound(),
        shutdown_rx.clone(),
    ));
    let game = runtime.spawn(server.run(shutdown_rx));
    let running = Running {
        shutdown,
        game,
        accept,
    };

    if args.headless {
        log::info!("Server started on {} with {} skins", local_addr, skin_count);
        runtime.block_on(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to wait for ctrl-c: {}", e);
            }
            log::info!("Server shutting down");
            running.stop().await;
        });
    } else {
        let (mut events, stats) = dashboard.context("event stream already taken")?;
        let started = format!("Server started on {} with {} skins", local_addr, skin_count);
        let result = run_with_tui(started, &mut events, stats);
        runtime.block_on(running.stop());
        result?;
    }

    Ok(())
}

fn run_with_tui(
    started: String,
    events: &mut mpsc::UnboundedReceiver<ServerEvent>,
    stats: watch::Receiver<server::ServerStats>,
) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut tui_state = TuiState::new();
    tui_state.log_info(started);

    let mut running = true;
    while running {
        while let Ok(event) = events.try_recv() {
            match event {
                ServerEvent::ClientConnected {
                    conn_id,
                    addr,
                    entity_id,
                    skin,
                } => {
                    tui_state.log_info(format!(
                        "Client {} connected from {} (entity {}, skin {})",
                        conn_id, addr, entity_id, skin
                    ));
                }
                ServerEvent::ClientDisconnected {
                    conn_id,
                    entity_id,
                    reason,
                } => {
                    tui_state.log_info(format!(
                        "Client {} {} (entity {} removed)",
                        conn_id,
                        reason.as_str(),
                        entity_id
                    ));
                }
                ServerEvent::ConnectionDenied { addr, reason } => {
                    tui_state.log_warn(format!("Connection denied to {}: {}", addr, reason));
                }
                ServerEvent::MessageDiscarded { conn_id, error } => {
                    tui_state.log_warn(format!(
                        "Discarded message from client {}: {}",
                        conn_id, error
                    ));
                }
            }
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => running = false,
                        KeyCode::PageUp => tui_state.scroll_up(),
                        KeyCode::PageDown => tui_state.scroll_down(),
                        KeyCode::End => tui_state.scroll_to_bottom(),
                        _ => {}
                    }
                }
            }
        }

        let stats = stats.borrow().clone();
        terminal.draw(|frame| {
            tui::render(frame, &tui_state, &stats);
        })?;
    }

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    Ok(())
}
