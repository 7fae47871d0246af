use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};
use zeromq::{Socket, SocketRecv, SubSocket, ZmqMessage};

use crate::{error::Error, handler::collector::Collector, provider::NodeRpc};

pub const HASHBLOCK_TOPIC: &str = "hashblock";
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(10);

const BLOCK_HASH_LEN: usize = 32;

/// Block notification subscription feeding the collector.
pub struct Event<'a, R: NodeRpc> {
    endpoint: String,
    collector: Collector<'a, R>,
}

impl<'a, R: NodeRpc> Event<'a, R> {
    pub fn new(endpoint: String, collector: Collector<'a, R>) -> Self {
        Self {
            endpoint,
            collector,
        }
    }

    /// Runs until the process is stopped. Transport failures are retried
    /// after `RECONNECT_INTERVAL`, blocks missed meanwhile are not.
    pub async fn run(&mut self) -> Result<(), Error> {
        loop {
            if let Err(e) = self.init().await {
                error!(
                    "ZMQ subscription failed with error {}, reconnecting in {}s...",
                    e,
                    RECONNECT_INTERVAL.as_secs()
                );
            }

            sleep(RECONNECT_INTERVAL).await;
        }
    }

    async fn init(&mut self) -> Result<(), Error> {
        let mut socket = SubSocket::new();

        socket.connect(&self.endpoint).await.map_err(|e| {
            Error::TransportError(format!(
                "connect to {} failed: {}",
                self.endpoint, e
            ))
        })?;

        socket.subscribe(HASHBLOCK_TOPIC).await.map_err(|e| {
            Error::TransportError(format!(
                "subscribe to {} failed: {}",
                HASHBLOCK_TOPIC, e
            ))
        })?;

        info!("ZMQ subscribed to {} on {}", HASHBLOCK_TOPIC, self.endpoint);

        loop {
            let message = socket.recv().await.map_err(|e| {
                Error::TransportError(format!("receive failed: {}", e))
            })?;

            self.handle_message(message).await;
        }
    }

    async fn handle_message(&mut self, message: ZmqMessage) {
        let frames: Vec<&[u8]> = (0..message.len())
            .filter_map(|index| message.get(index))
            .map(|frame| &frame[..])
            .collect();

        let hash = match block_hash(&frames) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Skipping notification: {}", e);
                return;
            },
        };

        // Failures are logged with block context by the collector; the
        // block is left for reconciliation.
        if let Ok(processed) = self.collector.process_block(&hash).await {
            let failed = processed.failed_stores();
            if !failed.is_empty() {
                warn!(
                    "Block {} missing from: {}",
                    processed.sample.block_nr,
                    failed.join(", ")
                );
            }
        }
    }
}

/// Extracts the hex block hash from `[topic, hash, sequence]` frames.
fn block_hash(frames: &[&[u8]]) -> Result<String, Error> {
    match frames {
        [topic, rest @ ..] if *topic == HASHBLOCK_TOPIC.as_bytes() => {
            match rest.first() {
                Some(hash) if hash.len() == BLOCK_HASH_LEN => {
                    Ok(hex::encode(hash))
                },
                Some(hash) => Err(Error::TransportError(format!(
                    "block hash has {} bytes",
                    hash.len()
                ))),
                None => Err(Error::TransportError(String::from(
                    "missing block hash frame",
                ))),
            }
        },
        [topic, ..] => Err(Error::TransportError(format!(
            "unexpected topic {}",
            String::from_utf8_lossy(topic)
        ))),
        [] => Err(Error::TransportError(String::from("empty message"))),
    }
}
