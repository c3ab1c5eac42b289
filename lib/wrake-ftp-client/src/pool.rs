/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpSocket, TcpStream};

use crate::connection::{FtpConnection, FtpConnectionPool, FtpConnectionRole, PoolTicket};
use crate::error::FtpConnectError;
use crate::types::RemoteAddr;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A TCP-backed connection pool keyed by resolved peer address.
///
/// Control connections checked back in are kept on a per-peer idle list
/// and served to later checkouts of the same endpoint. Data connections
/// are single use and never enter the idle list.
pub struct FtpTcpConnectionPool {
    bind_ip: Option<IpAddr>,
    connect_timeout: Duration,
    idle: Mutex<HashMap<SocketAddr, Vec<TcpStream>>>,
    live: Arc<AtomicUsize>,
}

impl Default for FtpTcpConnectionPool {
    fn default() -> Self {
        FtpTcpConnectionPool {
            bind_ip: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            idle: Mutex::new(HashMap::new()),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FtpTcpConnectionPool {
    pub fn new() -> Self {
        FtpTcpConnectionPool::default()
    }

    pub fn set_bind_ip(&mut self, ip: IpAddr) {
        self.bind_ip = Some(ip);
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// Number of connections currently checked out and not yet returned
    /// or discarded.
    pub fn outstanding(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    fn ticket(&self) -> PoolTicket {
        PoolTicket::new(self.live.clone())
    }

    fn pop_idle(&self, peer: SocketAddr) -> Option<TcpStream> {
        let mut idle = self.idle.lock().ok()?;
        idle.get_mut(&peer).and_then(Vec::pop)
    }

    async fn connect(&self, peer: SocketAddr) -> io::Result<TcpStream> {
        match self.bind_ip {
            Some(ip) => {
                let socket = if peer.is_ipv4() {
                    TcpSocket::new_v4()?
                } else {
                    TcpSocket::new_v6()?
                };
                socket.bind(SocketAddr::new(ip, 0))?;
                socket.connect(peer).await
            }
            None => TcpStream::connect(peer).await,
        }
    }
}

#[async_trait]
impl FtpConnectionPool<TcpStream, FtpConnectError<io::Error>> for FtpTcpConnectionPool {
    async fn check_out(
        &self,
        addr: &RemoteAddr,
        role: FtpConnectionRole,
    ) -> Result<FtpConnection<TcpStream>, FtpConnectError<io::Error>> {
        let resolved = tokio::net::lookup_host((addr.host(), addr.port()))
            .await
            .map_err(FtpConnectError::ConnectIoError)?;

        let mut last_err = FtpConnectError::NoAddressResolved;
        for peer in resolved {
            if role == FtpConnectionRole::Control {
                if let Some(stream) = self.pop_idle(peer) {
                    return Ok(FtpConnection::new(stream, role, peer, true, self.ticket()));
                }
            }

            match tokio::time::timeout(self.connect_timeout, self.connect(peer)).await {
                Ok(Ok(stream)) => {
                    return Ok(FtpConnection::new(stream, role, peer, false, self.ticket()));
                }
                Ok(Err(e)) => last_err = FtpConnectError::ConnectIoError(e),
                Err(_) => last_err = FtpConnectError::ConnectTimedOut,
            }
        }

        Err(last_err)
    }

    async fn check_in(&self, conn: FtpConnection<TcpStream>) {
        if conn.role() != FtpConnectionRole::Control {
            // data connections are single use
            return;
        }
        let peer = conn.peer_addr();
        let stream = conn.into_stream();
        if let Ok(mut idle) = self.idle.lock() {
            idle.entry(peer).or_default().push(stream);
        }
    }
}
