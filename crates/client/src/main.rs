mod debug;
mod game;
pub mod net;

use clap::Parser;

use net::{ClientConfig, NetworkClient};
use net::config::{DEFAULT_MOVE_SPEED, parse_delay_ms};
use net::interpolation::DEFAULT_INTERPOLATION_DELAY_MS;

#[derive(Parser)]
#[command(name = "lookout")]
#[command(about = "Lookout bot client")]
struct Args {
    #[arg(
        short,
        long,
        default_value = "ws://127.0.0.1:3000",
        help = "Server WebSocket URL"
    )]
    server: String,

    #[arg(long, default_value_t = lookout::DEFAULT_INPUT_RATE)]
    input_rate: u32,

    #[arg(long, default_value_t = DEFAULT_INTERPOLATION_DELAY_MS, value_parser = parse_delay_ms)]
    interpolation_delay_ms: f64,

    #[arg(long, default_value_t = DEFAULT_MOVE_SPEED, help = "Pixels moved per input tick")]
    speed: i32,

    #[arg(long, help = "Disconnect after this many seconds")]
    duration_secs: Option<u64>,

    #[arg(long, default_value_t = 5, help = "Seconds between stats lines (0 disables)")]
    stats_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ClientConfig {
        server_url: args.server,
        input_rate: args.input_rate,
        interpolation_delay_ms: args.interpolation_delay_ms,
        speed: args.speed,
        duration_secs: args.duration_secs,
        stats_interval_secs: Some(args.stats_interval_secs),
    };

    NetworkClient::new(config).run().await
}
