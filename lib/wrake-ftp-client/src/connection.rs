/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::types::RemoteAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FtpConnectionRole {
    Control,
    Data,
}

/// Tracks one live checkout in the owning pool's bookkeeping.
///
/// The ticket is released when dropped, so a connection discarded on any
/// path, including task cancellation, is still accounted for as returned.
#[derive(Debug)]
pub struct PoolTicket {
    live: Arc<AtomicUsize>,
}

impl PoolTicket {
    pub fn new(live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::Relaxed);
        PoolTicket { live }
    }
}

impl Drop for PoolTicket {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}

pin_project! {
    /// An owned transport handle lent out by a pool.
    ///
    /// Exactly one live handle exists per checkout. Return it with
    /// [`FtpConnectionPool::check_in`] to allow reuse, or drop it to
    /// discard the transport.
    pub struct FtpConnection<T> {
        #[pin]
        stream: T,
        role: FtpConnectionRole,
        peer_addr: SocketAddr,
        reused: bool,
        ticket: PoolTicket,
    }
}

impl<T> FtpConnection<T> {
    pub fn new(
        stream: T,
        role: FtpConnectionRole,
        peer_addr: SocketAddr,
        reused: bool,
        ticket: PoolTicket,
    ) -> Self {
        FtpConnection {
            stream,
            role,
            peer_addr,
            reused,
            ticket,
        }
    }

    #[inline]
    pub fn role(&self) -> FtpConnectionRole {
        self.role
    }

    #[inline]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Whether this handle was served from the idle list rather than
    /// freshly established.
    #[inline]
    pub fn is_reused(&self) -> bool {
        self.reused
    }

    /// Take the transport back out, releasing the checkout ticket.
    pub fn into_stream(self) -> T {
        let FtpConnection { stream, .. } = self;
        stream
    }
}

impl<T: AsyncRead> AsyncRead for FtpConnection<T> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.project().stream.poll_read(cx, buf)
    }
}

impl<T: AsyncWrite> AsyncWrite for FtpConnection<T> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.project().stream.poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().stream.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().stream.poll_shutdown(cx)
    }
}

/// Lends and reclaims pooled transport connections keyed by endpoint.
///
/// `check_out` suspends until a connection is free or newly established.
/// A handed-out connection must be checked in (reuse) or dropped
/// (discard) exactly once; ticket bookkeeping covers both paths.
#[async_trait]
pub trait FtpConnectionPool<T, E>
where
    T: AsyncRead + AsyncWrite + Send,
    E: std::error::Error,
{
    async fn check_out(
        &self,
        addr: &RemoteAddr,
        role: FtpConnectionRole,
    ) -> Result<FtpConnection<T>, E>;

    /// Return a connection for reuse by a later checkout of the same
    /// endpoint.
    async fn check_in(&self, conn: FtpConnection<T>);
}
