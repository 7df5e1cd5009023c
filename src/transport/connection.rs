//! Connection Handler
//!
//! Owns the TCP stream to the unit and performs one send/read at a time.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::BytesMut;

use super::cleanup::clean_response;
use crate::config::Config;
use crate::error::{HvError, Result};

/// Wire terminator appended to every command
pub const TERMINATOR: &[u8] = b"\r\n";

/// Size of a single socket read while draining a reply
pub const READ_CHUNK_SIZE: usize = 4096;

/// A connection to one HV control unit
pub struct Connection {
    /// TCP stream (unbuffered: replies are drained with a raw read loop)
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,

    /// Set after a transport error; the stream is no longer trusted
    broken: bool,
}

impl Connection {
    /// Open a connection using the endpoint and timeout from `config`.
    ///
    /// The timeout bounds the TCP handshake and is then installed as the
    /// read and write timeout of the stream.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::connect(&config.host, config.port, config.timeout)
    }

    /// Open a connection to `host:port`
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        if timeout.is_zero() {
            return Err(HvError::Config("timeout must be positive".to_string()));
        }

        let candidates: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| HvError::Connection {
                addr: addr.clone(),
                source,
            })?
            .collect();

        let mut last_err = std::io::Error::new(ErrorKind::NotFound, "no addresses resolved");
        for candidate in &candidates {
            match TcpStream::connect_timeout(candidate, timeout) {
                Ok(stream) => {
                    tracing::debug!("Connected to {} ({})", addr, candidate);
                    return Self::from_stream(stream, timeout);
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_err = e;
                }
            }
        }

        Err(HvError::Connection {
            addr,
            source: last_err,
        })
    }

    /// Wrap an already connected stream and install timeouts
    pub fn from_stream(stream: TcpStream, timeout: Duration) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Commands are tiny; don't let Nagle hold them back
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        Ok(Self {
            stream,
            peer_addr,
            broken: false,
        })
    }

    /// Send a command, appending CR LF.
    ///
    /// The text goes out byte-for-byte; no escaping is applied.
    pub fn send_command(&mut self, text: &str) -> Result<()> {
        self.ensure_usable()?;

        let mut message = Vec::with_capacity(text.len() + TERMINATOR.len());
        message.extend_from_slice(text.as_bytes());
        message.extend_from_slice(TERMINATOR);

        tracing::debug!("Send to {}: {:?}", self.peer_addr, text);

        let written = self
            .stream
            .write_all(&message)
            .and_then(|_| self.stream.flush());
        if let Err(e) = written {
            return Err(self.mark_broken(e));
        }
        Ok(())
    }

    /// Drain the socket until it goes idle and return the cleaned reply.
    ///
    /// A read timeout is the normal end of a reply, not an error. So is a
    /// zero-length read (peer closed). Every call therefore waits at least
    /// one full timeout before returning.
    pub fn read_response(&mut self) -> Result<String> {
        self.ensure_usable()?;

        let mut buffer = BytesMut::with_capacity(READ_CHUNK_SIZE);
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    tracing::debug!("Peer {} closed the stream", self.peer_addr);
                    break;
                }
                Ok(n) => {
                    tracing::trace!("Recv {} bytes from {}", n, self.peer_addr);
                    buffer.extend_from_slice(&chunk[..n]);
                }
                // Idle: reply complete (Windows reports TimedOut instead of WouldBlock)
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == ErrorKind::TimedOut => break,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.mark_broken(e)),
            }
        }

        let response = clean_response(&buffer);
        tracing::trace!("Response from {}: {:?}", self.peer_addr, response);
        Ok(response)
    }

    /// Discard anything the unit pushed without being asked
    pub fn drain(&mut self) -> Result<()> {
        let junk = self.read_response()?;
        if !junk.is_empty() {
            tracing::debug!("Drained {} unsolicited bytes: {:?}", junk.len(), junk);
        }
        Ok(())
    }

    /// Shut the stream down in both directions
    pub fn close(self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(HvError::Transport(e)),
        }
    }

    /// Whether an earlier transport error invalidated this connection
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.broken {
            return Err(HvError::ConnectionBroken);
        }
        Ok(())
    }

    fn mark_broken(&mut self, error: std::io::Error) -> HvError {
        tracing::warn!("Connection to {} is broken: {}", self.peer_addr, error);
        self.broken = true;
        HvError::Transport(error)
    }
}
