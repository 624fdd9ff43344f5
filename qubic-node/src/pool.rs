use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::{
    client::Client,
    error::{Error, Result},
    peers::PeerSource,
};

/// Pool sizing and peer discovery knobs.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Connections opened eagerly when the pool is created.
    pub initial_cap: u32,
    /// Idle connections kept around after release.
    pub max_idle: u32,
    /// Hard bound on live connections.
    pub max_cap: u32,
    /// Idle connections older than this are closed on acquire, which avoids
    /// handing out peers that already dropped the socket.
    pub idle_timeout: Duration,
    /// Node port to dial on every discovered peer.
    pub node_port: String,
    /// Deadline for one peer-list fetch.
    pub peer_fetch_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_cap: 1,
            max_idle: 4,
            max_cap: 16,
            idle_timeout: Duration::from_secs(30),
            node_port: "21841".to_string(),
            peer_fetch_timeout: Duration::from_secs(5),
        }
    }
}

struct IdleClient {
    client: Client,
    released_at: Instant,
}

struct PoolState {
    idle: VecDeque<IdleClient>,
    live: u32,
}

/// Shared pool of node clients over a peer-discovery source.
///
/// Acquire hands out an idle client or dials a random fresh peer; release
/// returns healthy clients to the idle set and closes the rest. State
/// mutations are serialized, connects happen outside the lock.
pub struct Pool<P: PeerSource> {
    config: PoolConfig,
    peer_source: P,
    state: Mutex<PoolState>,
}

impl<P: PeerSource> Pool<P> {
    /// Creates the pool and eagerly opens `initial_cap` connections.
    pub async fn connect(config: PoolConfig, peer_source: P) -> Result<Self> {
        let pool = Self {
            config,
            peer_source,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                live: 0,
            }),
        };

        for _ in 0..pool.config.initial_cap {
            let client = pool.create_client().await?;
            let mut state = pool.state.lock().await;
            state.live += 1;
            state.idle.push_back(IdleClient {
                client,
                released_at: Instant::now(),
            });
        }

        Ok(pool)
    }

    /// Takes a client out of the pool, dialing a new peer when no live idle
    /// entry remains.
    pub async fn acquire(&self) -> Result<Client> {
        {
            let mut state = self.state.lock().await;

            while let Some(entry) = state.idle.pop_front() {
                if entry.released_at.elapsed() > self.config.idle_timeout {
                    debug!("evicting idle connection to {}", entry.client.peer());
                    state.live -= 1;
                    continue;
                }

                return Ok(entry.client);
            }

            if state.live >= self.config.max_cap {
                return Err(Error::PoolExhausted);
            }

            // reserve the slot before connecting outside the lock
            state.live += 1;
        }

        match self.create_client().await {
            Ok(client) => Ok(client),
            Err(e) => {
                self.state.lock().await.live -= 1;
                Err(e)
            }
        }
    }

    /// Returns a client to the idle set. Unhealthy clients and overflow
    /// beyond `max_idle` are closed instead.
    pub async fn release(&self, client: Client) {
        let mut state = self.state.lock().await;

        if !client.is_healthy() {
            warn!("dropping unhealthy connection to {}", client.peer());
            state.live -= 1;
            return;
        }

        if state.idle.len() as u32 >= self.config.max_idle {
            debug!("idle set full, closing connection to {}", client.peer());
            state.live -= 1;
            return;
        }

        state.idle.push_back(IdleClient {
            client,
            released_at: Instant::now(),
        });
    }

    /// Closes a client without returning it to the idle set.
    pub async fn discard(&self, client: Client) {
        drop(client);
        self.state.lock().await.live -= 1;
    }

    /// Live connections, both idle and handed out.
    pub async fn live_connections(&self) -> u32 {
        self.state.lock().await.live
    }

    async fn create_client(&self) -> Result<Client> {
        let peer_list = timeout(self.config.peer_fetch_timeout, self.peer_source.fetch())
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Error::PeerSource)?;

        if peer_list.peers.is_empty() {
            return Err(Error::NoPeersAvailable);
        }

        let peer = &peer_list.peers[rand::thread_rng().gen_range(0..peer_list.peers.len())];
        debug!(
            "got {} peers, dialing random peer {peer}",
            peer_list.peers.len()
        );

        let client = Client::connect(peer, &self.config.node_port).await?;
        info!("connected to {}", client.peer());

        Ok(client)
    }
}
