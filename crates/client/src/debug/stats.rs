use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use lookout::ClientMessage;

const SAMPLE_COUNT: usize = 60;

/// Rolling counters for the client's periodic stats line.
pub struct DebugStats {
    frame_times: VecDeque<Instant>,
    frame_rate: f32,
    frames_received: u64,
    bytes_received: u64,
    decode_errors: u64,
    moves_sent: u64,
    looks_sent: u64,
    visible_entities: usize,
}

impl Default for DebugStats {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugStats {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(SAMPLE_COUNT),
            frame_rate: 0.0,
            frames_received: 0,
            bytes_received: 0,
            decode_errors: 0,
            moves_sent: 0,
            looks_sent: 0,
            visible_entities: 0,
        }
    }

    pub fn record_frame(&mut self, now: Instant, bytes: usize, entities: usize) {
        self.frames_received += 1;
        self.bytes_received += bytes as u64;
        self.visible_entities = entities;

        if self.frame_times.len() >= SAMPLE_COUNT {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(now);

        if let Some(oldest) = self.frame_times.front() {
            let elapsed = now.duration_since(*oldest).as_secs_f32();
            if elapsed > 0.0 {
                self.frame_rate = (self.frame_times.len() - 1) as f32 / elapsed;
            }
        }
    }

    pub fn record_decode_error(&mut self) {
        self.decode_errors += 1;
    }

    pub fn record_sent(&mut self, message: &ClientMessage) {
        match message {
            ClientMessage::Move { .. } => self.moves_sent += 1,
            ClientMessage::Look { .. } => self.looks_sent += 1,
        }
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }
}

impl fmt::Display for DebugStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} frames/s, {} frames ({} bytes), {} visible, {} moves / {} looks sent, {} decode errors",
            self.frame_rate,
            self.frames_received,
            self.bytes_received,
            self.visible_entities,
            self.moves_sent,
            self.looks_sent,
            self.decode_errors
        )
    }
}
