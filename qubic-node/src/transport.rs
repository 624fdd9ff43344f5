use std::time::Duration;

use log::debug;
use qubic_base::traits::FromBytes;
use qubic_proto::{types::ExchangePublicPeers, Header, MessageType, HEADER_SIZE};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// An exclusively owned stream to one peer.
///
/// The peer greets every connection with an `ExchangePublicPeers` frame and
/// one trailing broadcast; both are consumed during [`Connection::connect`]
/// so requests start on a clean stream position.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    stream: S,
    peer: String,
    timeout: Duration,
    healthy: bool,
    in_flight: bool,
    greeting: ExchangePublicPeers,
}

impl Connection<TcpStream> {
    pub async fn connect(ip: &str, port: &str, deadline: Duration) -> Result<Self> {
        let addr = format!("{ip}:{port}");
        let stream = timeout(deadline, TcpStream::connect(&addr))
            .await
            .map_err(|_| Error::Timeout)??;

        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(30));
        socket2::SockRef::from(&stream).set_tcp_keepalive(&keepalive)?;

        let mut conn = Connection::with_stream(stream, addr, deadline);
        conn.consume_greeting().await?;

        debug!("connected to {}", conn.peer);
        Ok(conn)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> Connection<S> {
    /// Wraps an established stream without performing the greeting exchange.
    pub fn with_stream(stream: S, peer: String, timeout: Duration) -> Self {
        Self {
            stream,
            peer,
            timeout,
            healthy: true,
            in_flight: false,
            greeting: ExchangePublicPeers::default(),
        }
    }

    /// Reads the greeting pair: the public-peers frame and the unrelated
    /// broadcast the node sends right after it.
    pub async fn consume_greeting(&mut self) -> Result<()> {
        let (header, payload) = self.read_frame().await?;
        if !header.is_type(MessageType::ExchangePublicPeers) {
            return Err(Error::MissingResponse {
                expected: MessageType::ExchangePublicPeers as u8,
            });
        }

        self.greeting = ExchangePublicPeers::from_bytes(&payload)?;
        let _ = self.read_frame().await?;

        Ok(())
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Peers announced in the greeting frame.
    pub fn announced_peers(&self) -> &ExchangePublicPeers {
        &self.greeting
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy && !self.in_flight
    }

    pub fn mark_unhealthy(&mut self) {
        self.healthy = false;
    }

    /// Claims the stream for one request. Fails when an earlier request was
    /// dropped mid-flight, since the stream position is then indeterminate.
    pub(crate) fn begin_request(&mut self) -> Result<()> {
        if self.in_flight {
            self.healthy = false;
            return Err(Error::Cancelled);
        }
        if !self.healthy {
            return Err(Error::Cancelled);
        }

        self.in_flight = true;
        Ok(())
    }

    pub(crate) fn end_request(&mut self) {
        self.in_flight = false;
    }

    pub(crate) async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match timeout(self.timeout, self.stream.write_all(data)).await {
            Err(_) => {
                self.healthy = false;
                Err(Error::Timeout)
            }
            Ok(Err(e)) => {
                self.healthy = false;
                Err(e.into())
            }
            Ok(Ok(())) => Ok(()),
        }
    }

    /// Reads one full frame, header plus payload.
    pub(crate) async fn read_frame(&mut self) -> Result<(Header, Vec<u8>)> {
        let mut header_buffer = [0u8; HEADER_SIZE];
        self.read_exact(&mut header_buffer).await?;

        let header = Header::from_bytes(&header_buffer);
        // the 3 byte field is already capped at 24 bits
        let size = header.get_size();
        if size < HEADER_SIZE {
            self.healthy = false;
            return Err(Error::MalformedFrame(size));
        }

        let mut payload = vec![0u8; size - HEADER_SIZE];
        self.read_exact(&mut payload).await?;

        Ok((header, payload))
    }

    async fn read_exact(&mut self, buffer: &mut [u8]) -> Result<()> {
        match timeout(self.timeout, self.stream.read_exact(buffer)).await {
            Err(_) => {
                self.healthy = false;
                Err(Error::Timeout)
            }
            Ok(Err(e)) => {
                self.healthy = false;
                Err(e.into())
            }
            Ok(Ok(_)) => Ok(()),
        }
    }
}
