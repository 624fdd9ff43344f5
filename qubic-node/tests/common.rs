#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use qubic_proto::HEADER_SIZE;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpListener,
};

/// Composes one raw frame with a zero dedup token.
pub fn frame(packet_type: u8, payload: &[u8]) -> Vec<u8> {
    let size = HEADER_SIZE + payload.len();
    let mut bytes = vec![size as u8, (size >> 8) as u8, (size >> 16) as u8, packet_type];
    bytes.extend_from_slice(&[0; 4]);
    bytes.extend_from_slice(payload);

    bytes
}

/// The greeting every node sends on connect: a public-peers frame followed by
/// an unrelated broadcast.
pub fn greeting() -> Vec<u8> {
    let mut bytes = frame(0, &[127, 0, 0, 1, 10, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
    bytes.extend_from_slice(&frame(1, &[0xEE; 32]));

    bytes
}

pub type RequestLog = Arc<Mutex<Vec<(u8, Vec<u8>)>>>;

/// Serves scripted responses on one stream: reads frames and answers each
/// through `handler`, recording every request seen.
pub async fn serve_stream<S, F>(mut stream: S, log: RequestLog, mut handler: F)
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FnMut(u8, &[u8]) -> Vec<u8>,
{
    loop {
        let mut header = [0u8; HEADER_SIZE];
        if stream.read_exact(&mut header).await.is_err() {
            return;
        }

        let size =
            (header[0] as usize) | (header[1] as usize) << 8 | (header[2] as usize) << 16;
        let mut payload = vec![0u8; size - HEADER_SIZE];
        if stream.read_exact(&mut payload).await.is_err() {
            return;
        }

        log.lock()
            .unwrap()
            .push((header[3], {
                // keep the dedup token visible to assertions
                let mut with_dejavu = header[4..].to_vec();
                with_dejavu.extend_from_slice(&payload);
                with_dejavu
            }));

        let response = handler(header[3], &payload);
        if !response.is_empty() && stream.write_all(&response).await.is_err() {
            return;
        }
    }
}

/// Spawns a TCP stub node; returns its port, the request log and a counter of
/// accepted connections.
pub async fn spawn_node<F>(handler: F) -> (u16, RequestLog, Arc<AtomicUsize>)
where
    F: Fn(u8, &[u8]) -> Vec<u8> + Clone + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let accepted = Arc::new(AtomicUsize::new(0));

    let task_log = log.clone();
    let task_accepted = accepted.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            task_accepted.fetch_add(1, Ordering::SeqCst);

            let log = task_log.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                if stream.write_all(&greeting()).await.is_err() {
                    return;
                }
                serve_stream(stream, log, handler).await;
            });
        }
    });

    (port, log, accepted)
}
