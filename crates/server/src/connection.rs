use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// What connection tasks report to the game task.
#[derive(Debug)]
pub enum Inbound {
    Connected {
        conn_id: u64,
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<Message>,
    },
    Message {
        conn_id: u64,
        text: String,
    },
    Closed {
        conn_id: u64,
    },
}

/// Accepts sockets until `shutdown` flips, spawning a handler per connection.
pub async fn accept_loop(
    listener: TcpListener,
    inbound: mpsc::UnboundedSender<Inbound>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut next_conn_id = 0u64;

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    next_conn_id += 1;
                    let conn_id = next_conn_id;
                    let inbound = inbound.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, conn_id, inbound).await {
                            log::debug!("Connection {} from {} ended: {}", conn_id, addr, e);
                        }
                    });
                }
                Err(e) => log::error!("Accept failed: {}", e),
            },
            _ = shutdown.changed() => break,
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    conn_id: u64,
    inbound: mpsc::UnboundedSender<Inbound>,
) -> Result<(), WsError> {
    stream.set_nodelay(true)?;
    let ws_stream = accept_async(stream).await?;
    log::debug!("WebSocket handshake complete for {}", addr);

    let (mut sink, mut source) = ws_stream.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    if inbound
        .send(Inbound::Connected {
            conn_id,
            addr,
            outbound,
        })
        .is_err()
    {
        return Ok(());
    }

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = sink.send(message).await {
                log::debug!("Write to connection {} failed: {}", conn_id, e);
                break;
            }
            if closing {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let mut result = Ok(());
    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if inbound.send(Inbound::Message { conn_id, text }).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    let _ = inbound.send(Inbound::Closed { conn_id });
    let _ = writer.await;
    result
}
