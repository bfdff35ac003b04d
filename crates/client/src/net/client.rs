use std::time::Instant;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use lookout::{ClientMessage, ServerMessage, decode_frame};

use crate::debug::DebugStats;
use crate::game::WanderBot;
use crate::net::config::ClientConfig;
use crate::net::interpolation::Interpolator;
use crate::net::state::{ClientStateStore, OwnEntity};

/// Connection-side state of a bot client. All of it lives on one task.
pub struct NetworkClient {
    config: ClientConfig,
    store: ClientStateStore,
    bot: WanderBot,
    stats: DebugStats,
    rng: StdRng,
}

impl NetworkClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: ClientConfig, rng: StdRng) -> Self {
        let store = ClientStateStore::new(Interpolator::new(config.interpolation_delay()));
        Self {
            config,
            store,
            bot: WanderBot::new(Instant::now()),
            stats: DebugStats::new(),
            rng,
        }
    }

    pub fn store(&self) -> &ClientStateStore {
        &self.store
    }

    pub fn stats(&self) -> &DebugStats {
        &self.stats
    }

    /// Applies one message from the server. Returns `false` once the server
    /// has closed the connection.
    pub fn handle_message(&mut self, message: Message, now: Instant) -> bool {
        match message {
            Message::Text(text) => self.handle_text(&text),
            Message::Binary(frame) => self.handle_frame(&frame, now),
            Message::Close(frame) => {
                match frame {
                    Some(frame) => log::info!("Server closed connection: {}", frame.reason),
                    None => log::info!("Server closed connection"),
                }
                return false;
            }
            _ => {}
        }
        true
    }

    fn handle_text(&mut self, text: &str) {
        match ServerMessage::from_json(text) {
            Ok(ServerMessage::Init {
                id,
                skin,
                skin_name,
            }) => {
                log::info!(
                    "Joined as entity {} wearing {} ({} bytes)",
                    id,
                    skin_name,
                    skin.len()
                );
                self.store.set_own(OwnEntity {
                    id,
                    skin_name,
                    skin,
                });
            }
            Err(e) => log::debug!("Discarding server message: {}", e),
        }
    }

    fn handle_frame(&mut self, frame: &[u8], now: Instant) {
        match decode_frame(frame) {
            Ok(records) => {
                self.stats.record_frame(now, frame.len(), records.len());
                self.store.apply_snapshot(records, now);
            }
            Err(e) => {
                log::warn!("Dropping snapshot frame: {}", e);
                self.stats.record_decode_error();
            }
        }
    }

    /// One input tick: the bot's move, if any, then its current look target.
    /// The look target is the bot's pointer and is never debounced.
    pub fn input_step(&mut self, now: Instant) -> Vec<ClientMessage> {
        let mut commands = Vec::with_capacity(2);

        self.bot.update(&mut self.rng, now);
        if let Some((dx, dy)) = self.bot.input().to_move(self.config.speed) {
            commands.push(ClientMessage::Move { dx, dy });
        }

        let target = self.bot.look_target(self.store.camera(now), now);
        commands.push(ClientMessage::Look {
            x: target.x,
            y: target.y,
        });

        commands
    }

    pub async fn run(mut self) -> Result<()> {
        let url = self.config.server_url.clone();
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("connecting to {}", url))?;
        log::info!("Connected to {}", url);

        let (mut sink, mut source) = ws_stream.split();

        let mut input_tick = time::interval(self.config.input_interval());
        input_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_tick = self.config.stats_interval().map(|period| {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        let deadline = self.config.duration().map(|d| time::Instant::now() + d);

        loop {
            tokio::select! {
                message = source.next() => match message {
                    Some(Ok(message)) => {
                        if !self.handle_message(message, Instant::now()) {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e).context("reading from server"),
                    None => break,
                },
                _ = input_tick.tick() => {
                    for command in self.input_step(Instant::now()) {
                        sink.send(Message::Text(command.to_json()?)).await?;
                        self.stats.record_sent(&command);
                    }
                }
                _ = next_tick(&mut stats_tick) => {
                    log::info!("{}", self.stats);
                }
                _ = sleep_until(deadline) => {
                    log::info!("Run time elapsed, disconnecting");
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }

        log::info!("Final stats: {}", self.stats);
        Ok(())
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<time::Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
