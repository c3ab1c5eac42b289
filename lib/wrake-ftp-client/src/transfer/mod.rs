/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::net::IpAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::body::FtpBodySink;
use crate::config::FtpClientConfig;
use crate::connection::{FtpConnection, FtpConnectionPool, FtpConnectionRole};
use crate::control::{FtpCommand, FtpControlChannel};
use crate::error::FtpTransferError;
use crate::observer::{ByteTap, ByteTapList, TapId};
use crate::reply::FtpReply;
use crate::types::RemoteAddr;

/// Holds the data connection acquired so far for one command cycle.
///
/// The slot is filled by the acquisition step and inspected by the
/// cleanup step, so cleanup releases exactly what was acquired no matter
/// where the cycle stopped.
struct DataConnectionSlot<T> {
    conn: Option<FtpConnection<T>>,
}

impl<T> DataConnectionSlot<T> {
    fn new() -> Self {
        DataConnectionSlot { conn: None }
    }

    fn acquired(&mut self, conn: FtpConnection<T>) -> &mut FtpConnection<T> {
        self.conn.insert(conn)
    }

    fn release(&mut self) -> Option<FtpConnection<T>> {
        self.conn.take()
    }
}

/// Drives the data channel for exactly one command/reply cycle.
///
/// The data connection is single use: once acquired it is always
/// released before `execute` returns, whatever the outcome. Dropping the
/// handle closes the transport and returns the checkout to the pool's
/// bookkeeping. Attached read taps are likewise detached before return.
/// Sink content written before a failure is left in place.
pub(crate) struct FtpDataTransfer<'a, CP> {
    pool: &'a CP,
    config: &'a FtpClientConfig,
    read_taps: ByteTapList,
    attached: Vec<TapId>,
}

impl<'a, CP> FtpDataTransfer<'a, CP> {
    pub(crate) fn new(pool: &'a CP, config: &'a FtpClientConfig) -> Self {
        FtpDataTransfer {
            pool,
            config,
            read_taps: ByteTapList::default(),
            attached: Vec::new(),
        }
    }

    /// Observe raw bytes read from the data channel.
    pub(crate) fn add_read_tap(&mut self, tap: ByteTap) {
        let id = self.read_taps.add(tap);
        self.attached.push(id);
    }

    pub(crate) async fn execute<S, T, E, B>(
        mut self,
        control: &mut FtpControlChannel<S>,
        command: FtpCommand,
        path: &str,
        control_peer: IpAddr,
        sink: &mut B,
    ) -> Result<FtpReply, FtpTransferError<E>>
    where
        CP: FtpConnectionPool<T, E>,
        S: AsyncRead + AsyncWrite + Unpin,
        T: AsyncRead + AsyncWrite + Send + Unpin,
        E: std::error::Error,
        B: FtpBodySink + ?Sized,
    {
        let mut slot = DataConnectionSlot::new();
        let r = self
            .drive(control, command, path, control_peer, sink, &mut slot)
            .await;
        if let Some(conn) = slot.release() {
            drop(conn);
        }
        // detach exactly the taps that were attached for this cycle
        for id in self.attached.drain(..) {
            self.read_taps.remove(id);
        }
        r
    }

    async fn drive<S, T, E, B>(
        &mut self,
        control: &mut FtpControlChannel<S>,
        command: FtpCommand,
        path: &str,
        control_peer: IpAddr,
        sink: &mut B,
        slot: &mut DataConnectionSlot<T>,
    ) -> Result<FtpReply, FtpTransferError<E>>
    where
        CP: FtpConnectionPool<T, E>,
        S: AsyncRead + AsyncWrite + Unpin,
        T: AsyncRead + AsyncWrite + Send + Unpin,
        E: std::error::Error,
        B: FtpBodySink + ?Sized,
    {
        // nothing to release if negotiation fails here, before acquisition
        let addr = control
            .negotiate_data_channel(control_peer, self.config.always_try_epsv)
            .await
            .map_err(FtpTransferError::NegotiationFailed)?;

        let conn = self
            .pool
            .check_out(&RemoteAddr::from(addr), FtpConnectionRole::Data)
            .await
            .map_err(FtpTransferError::DataConnectFailed)?;
        let data = slot.acquired(conn);

        control
            .start_transfer(command, path)
            .await
            .map_err(FtpTransferError::CommandFailed)?;

        let mut buf = vec![0u8; self.config.transfer.copy_buffer_size];
        loop {
            let n = data
                .read(&mut buf)
                .await
                .map_err(FtpTransferError::DataReadFailed)?;
            if n == 0 {
                break;
            }
            self.read_taps.notify(&buf[..n]);
            sink.append(&buf[..n])
                .await
                .map_err(FtpTransferError::SinkIoFailed)?;
        }

        // close the data connection before waiting for the end reply;
        // servers only send it once their side of the channel is done
        let _ = slot.release();

        match tokio::time::timeout(
            self.config.transfer.end_wait_timeout,
            control.wait_transfer_end(command),
        )
        .await
        {
            Ok(r) => r.map_err(FtpTransferError::<E>::from),
            Err(_) => Err(FtpTransferError::EndWaitTimeout),
        }
    }
}
