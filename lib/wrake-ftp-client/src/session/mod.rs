/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::body::FtpBodySink;
use crate::config::FtpClientConfig;
use crate::connection::{FtpConnection, FtpConnectionPool, FtpConnectionRole};
use crate::control::{FtpCommand, FtpControlChannel};
use crate::error::{FtpAuthStatus, FtpLoginError, FtpSessionError};
use crate::recorder::{FtpRecorderSink, SharedRecorder};
use crate::reply::FtpReply;
use crate::request::FtpRequest;
use crate::response::{FtpListingResponse, FtpResponse};
use crate::transfer::FtpDataTransfer;

mod fallback;

/// Drives the full lifecycle of one fetch or listing request.
///
/// A session owns at most one control connection for its lifetime, and
/// transiently at most one data connection per command cycle. The control
/// connection is acquired by the first `fetch`/`fetch_listing` call and
/// stays with the session until [`clean`](Self::clean) returns it for
/// reuse or [`close`](Self::close) discards it; both are safe to call at
/// any time, in any order, any number of times.
pub struct FtpFetchSession<CP, T>
where
    T: AsyncRead + AsyncWrite,
{
    pool: Arc<CP>,
    config: Arc<FtpClientConfig>,
    recorder: Option<SharedRecorder>,
    control: Option<FtpControlChannel<FtpConnection<T>>>,
}

/// Tees listing bytes into an internal buffer for decoding while they
/// are appended to the caller's sink.
struct ListingCollector<'a, B: ?Sized> {
    inner: &'a mut B,
    buf: Vec<u8>,
}

impl<'a, B: FtpBodySink + ?Sized> ListingCollector<'a, B> {
    fn new(inner: &'a mut B) -> Self {
        ListingCollector {
            inner,
            buf: Vec::new(),
        }
    }

    fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }
}

#[async_trait]
impl<'a, B: FtpBodySink + ?Sized> FtpBodySink for ListingCollector<'a, B> {
    async fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(data);
        self.inner.append(data).await
    }

    async fn reset(&mut self) -> io::Result<()> {
        self.buf.clear();
        self.inner.reset().await
    }
}

impl<CP, T> FtpFetchSession<CP, T>
where
    T: AsyncRead + AsyncWrite + Send + Unpin,
{
    pub fn new(pool: Arc<CP>, config: Arc<FtpClientConfig>) -> Self {
        FtpFetchSession {
            pool,
            config,
            recorder: None,
            control: None,
        }
    }

    pub fn set_recorder(&mut self, recorder: SharedRecorder) {
        self.recorder = Some(recorder);
    }

    fn with_recorder<F>(&self, f: F)
    where
        F: FnOnce(&mut dyn FtpRecorderSink),
    {
        if let Some(recorder) = &self.recorder {
            if let Ok(mut guard) = recorder.lock() {
                f(&mut *guard);
            }
        }
    }

    /// Fetch a single file into `body`.
    ///
    /// On failure whatever was partially written to `body` is left in
    /// place for the caller to inspect or discard.
    pub async fn fetch<E, B>(
        &mut self,
        mut request: FtpRequest,
        body: &mut B,
    ) -> Result<FtpResponse, FtpSessionError<E>>
    where
        CP: FtpConnectionPool<T, E>,
        E: std::error::Error,
        B: FtpBodySink + ?Sized,
    {
        self.prepare(&mut request).await?;
        let reply = self.run_transfer(&request, FtpCommand::RETR, body).await?;
        Ok(self.finalize(request, reply))
    }

    /// Fetch a directory listing into `body` and decode it.
    ///
    /// A machine-readable listing is attempted first. If the server does
    /// not know the command, the sink is reset and a single legacy LIST
    /// attempt is made instead; its outcome, good or bad, is final.
    pub async fn fetch_listing<E, B>(
        &mut self,
        mut request: FtpRequest,
        body: &mut B,
    ) -> Result<FtpListingResponse, FtpSessionError<E>>
    where
        CP: FtpConnectionPool<T, E>,
        E: std::error::Error,
        B: FtpBodySink + ?Sized,
    {
        self.prepare(&mut request).await?;

        let mut collector = ListingCollector::new(body);
        let (reply, files) = match self
            .run_transfer(&request, FtpCommand::MLSD, &mut collector)
            .await
        {
            Ok(reply) => {
                let files =
                    crate::facts::parse_machine_listing(&collector.text(), false).unwrap_or_default();
                (reply, files)
            }
            Err(e) if fallback::should_degrade_to_list(&e) => {
                crate::log_msg!(
                    "server does not support MLSD, falling back to LIST for {}",
                    request.path()
                );
                collector
                    .reset()
                    .await
                    .map_err(FtpSessionError::SinkIoFailed)?;
                let reply = self
                    .run_transfer(&request, FtpCommand::LIST, &mut collector)
                    .await?;
                let files = crate::listing::parse_legacy_listing(&collector.text());
                (reply, files)
            }
            Err(e) => return Err(e),
        };

        let response = self.finalize(request, reply);
        Ok(FtpListingResponse {
            request: response.request,
            reply: response.reply,
            files,
        })
    }

    /// Best-effort return of the control connection for reuse. Safe to
    /// call when nothing was acquired, and idempotent.
    pub async fn clean<E>(&mut self)
    where
        CP: FtpConnectionPool<T, E>,
        E: std::error::Error,
    {
        if let Some(channel) = self.control.take() {
            self.pool.check_in(channel.into_stream()).await;
        }
    }

    /// Hard discard of the control connection, skipping reuse. Safe in
    /// the same way as [`clean`](Self::clean).
    pub fn close(&mut self) {
        let _ = self.control.take();
    }

    /// Politely QUIT, then discard the control connection. A failed QUIT
    /// still discards.
    pub async fn quit(&mut self) {
        if let Some(channel) = self.control.as_mut() {
            let _ = channel.send_quit().await;
        }
        self.close();
    }

    async fn prepare<E>(&mut self, request: &mut FtpRequest) -> Result<(), FtpSessionError<E>>
    where
        CP: FtpConnectionPool<T, E>,
        E: std::error::Error,
    {
        if self.control.is_some() {
            return Err(FtpSessionError::SessionInUse);
        }

        let conn = self
            .pool
            .check_out(request.addr(), FtpConnectionRole::Control)
            .await
            .map_err(FtpSessionError::ConnectFailed)?;
        request.set_address(conn.peer_addr());
        let fresh = !conn.is_reused();

        let mut channel = FtpControlChannel::new(conn, self.config.control.clone());
        if let Some(recorder) = &self.recorder {
            let r = Arc::clone(recorder);
            channel.add_command_tap(Box::new(move |data| {
                if let Ok(mut r) = r.lock() {
                    r.request_control_data(data);
                }
            }));
            let r = Arc::clone(recorder);
            channel.add_reply_tap(Box::new(move |data| {
                if let Ok(mut r) = r.lock() {
                    r.response_control_data(data);
                }
            }));
        }

        self.with_recorder(|r| r.begin_control(request));

        let greeting_timeout = self.config.greeting_timeout;
        let channel = self.control.insert(channel);

        // a reused control connection already consumed its greeting
        if fresh {
            match tokio::time::timeout(greeting_timeout, channel.wait_greetings()).await {
                Ok(r) => r.map_err(FtpSessionError::CommandFailed)?,
                Err(_) => return Err(FtpSessionError::GreetingTimeout),
            }
        }

        let status = channel
            .send_username(request.username())
            .await
            .map_err(|e| FtpSessionError::LoginFailed(e.into()))?;
        let status = match status {
            FtpAuthStatus::NeedPassword => channel
                .send_password(request.password())
                .await
                .map_err(|e| FtpSessionError::LoginFailed(e.into()))?,
            s => s,
        };
        match status {
            FtpAuthStatus::LoggedIn => {}
            FtpAuthStatus::NeedAccount => {
                return Err(FtpSessionError::LoginFailed(FtpLoginError::AccountIsNeeded));
            }
            FtpAuthStatus::NotLoggedIn | FtpAuthStatus::NeedPassword => {
                return Err(FtpSessionError::LoginFailed(FtpLoginError::NotLoggedIn));
            }
        }

        channel
            .set_binary_type()
            .await
            .map_err(FtpSessionError::CommandFailed)?;

        self.with_recorder(|r| r.pre_response(request));

        Ok(())
    }

    async fn run_transfer<E, B>(
        &mut self,
        request: &FtpRequest,
        command: FtpCommand,
        body: &mut B,
    ) -> Result<FtpReply, FtpSessionError<E>>
    where
        CP: FtpConnectionPool<T, E>,
        E: std::error::Error,
        B: FtpBodySink + ?Sized,
    {
        let control_peer = match request.address() {
            Some(addr) => addr.ip(),
            None => return Err(FtpSessionError::NotConnected),
        };
        let Some(channel) = self.control.as_mut() else {
            return Err(FtpSessionError::NotConnected);
        };

        let mut transfer = FtpDataTransfer::new(self.pool.as_ref(), self.config.as_ref());
        if let Some(recorder) = &self.recorder {
            let r = Arc::clone(recorder);
            transfer.add_read_tap(Box::new(move |data| {
                if let Ok(mut r) = r.lock() {
                    r.response_data(data);
                }
            }));
        }

        transfer
            .execute(channel, command, request.path(), control_peer, body)
            .await
            .map_err(FtpSessionError::from)
    }

    fn finalize(&self, request: FtpRequest, reply: FtpReply) -> FtpResponse {
        let response = FtpResponse { request, reply };
        self.with_recorder(|r| r.response(&response.request, &response.reply));
        self.with_recorder(|r| r.end_control(&response.request, &response.reply));
        response
    }
}
