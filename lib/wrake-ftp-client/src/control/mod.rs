/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::net::{IpAddr, SocketAddr};

use tokio::io::{AsyncRead, AsyncWrite, BufStream};

use crate::config::FtpControlConfig;
use crate::error::{FtpAuthStatus, FtpCommandError, FtpTransferServerError};
use crate::observer::{ByteTap, ByteTapList, TapId};
use crate::reply::FtpReply;

mod response;

mod command;
pub use command::FtpCommand;

/// The command/reply side of one session's control connection.
///
/// Owns the buffered stream for the lifetime of the session; the pooled
/// connection is taken back out with [`into_stream`](Self::into_stream)
/// when the session returns it for reuse.
pub(crate) struct FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite,
{
    config: FtpControlConfig,
    stream: BufStream<T>,
    command_taps: ByteTapList,
    reply_taps: ByteTapList,
}

impl<T> FtpControlChannel<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: T, config: FtpControlConfig) -> Self {
        FtpControlChannel {
            config,
            stream: BufStream::new(stream),
            command_taps: ByteTapList::default(),
            reply_taps: ByteTapList::default(),
        }
    }

    /// Observe raw outgoing command bytes.
    pub(crate) fn add_command_tap(&mut self, tap: ByteTap) -> TapId {
        self.command_taps.add(tap)
    }

    /// Observe raw incoming reply bytes.
    pub(crate) fn add_reply_tap(&mut self, tap: ByteTap) -> TapId {
        self.reply_taps.add(tap)
    }

    pub(crate) fn into_stream(self) -> T {
        self.stream.into_inner()
    }

    pub(crate) async fn wait_greetings(&mut self) -> Result<(), FtpCommandError> {
        loop {
            let reply = self.read_raw_response().await?;
            return match reply.code() {
                120 => continue,
                220 => Ok(()),
                421 => Err(FtpCommandError::ServiceNotAvailable),
                n => Err(FtpCommandError::UnexpectedReplyCode(
                    FtpCommand::GREETING,
                    n,
                )),
            };
        }
    }

    pub(crate) async fn send_username(
        &mut self,
        name: Option<&str>,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::USER;
        let username = name.unwrap_or("anonymous");
        self.send_cmd1(cmd, username)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send username").await?;
        match reply.code() {
            500 => Err(FtpCommandError::CommandUnrecognized(cmd)),
            501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword),
            332 => Ok(FtpAuthStatus::NeedAccount),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_password(
        &mut self,
        pass: Option<&str>,
    ) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::PASS;
        let password = pass.unwrap_or("anonymous@");
        self.send_cmd1(cmd, password)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send password").await?;
        match reply.code() {
            500 => Err(FtpCommandError::CommandUnrecognized(cmd)),
            501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            503 => Err(FtpCommandError::BadCommandSequence(cmd)),
            530 => Ok(FtpAuthStatus::NotLoggedIn),
            202 => Err(FtpCommandError::CommandNotImplemented(cmd)), // not fatal but unexpected
            230 => Ok(FtpAuthStatus::LoggedIn),
            332 => Ok(FtpAuthStatus::NeedAccount),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    pub(crate) async fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::QUIT;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("send quit").await?;
        match reply.code() {
            500 => Err(FtpCommandError::CommandUnrecognized(cmd)),
            221 => Ok(()),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    /// Switch the transfer representation to binary.
    pub(crate) async fn set_binary_type(&mut self) -> Result<(), FtpCommandError> {
        let cmd = FtpCommand::TYPE_I;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("set binary type").await?;
        match reply.code() {
            500 => Err(FtpCommandError::CommandUnrecognized(cmd)),
            501 | 504 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            200 => Ok(()),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    async fn request_pasv_addr(&mut self) -> Result<SocketAddr, FtpCommandError> {
        let cmd = FtpCommand::PASV;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request pasv addr").await?;
        match reply.code() {
            500 => Err(FtpCommandError::CommandUnrecognized(cmd)),
            501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            227 => match reply.parse_pasv_227_reply() {
                Some(addr) => Ok(addr),
                None => Err(FtpCommandError::InvalidReplySyntax(cmd, 227)),
            },
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    async fn request_epsv_port(&mut self) -> Result<u16, FtpCommandError> {
        let cmd = FtpCommand::EPSV;
        self.send_cmd(cmd)
            .await
            .map_err(FtpCommandError::SendFailed)?;

        let reply = self.timed_read_raw_response("request epsv port").await?;
        match reply.code() {
            500 => Err(FtpCommandError::CommandUnrecognized(cmd)),
            501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 | 522 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            229 => match reply.parse_epsv_229_reply() {
                Some(port) => Ok(port),
                None => Err(FtpCommandError::InvalidReplySyntax(cmd, 229)),
            },
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    /// Negotiate the address the data connection must target.
    ///
    /// Passive mode only: EPSV is preferred when enabled, degrading to
    /// PASV when the server does not support it. A PASV reply carrying an
    /// unspecified address is resolved against the control peer address.
    pub(crate) async fn negotiate_data_channel(
        &mut self,
        control_peer: IpAddr,
        always_try_epsv: bool,
    ) -> Result<SocketAddr, FtpCommandError> {
        if always_try_epsv {
            match self.request_epsv_port().await {
                Ok(port) => return Ok(SocketAddr::new(control_peer, port)),
                Err(
                    FtpCommandError::CommandUnrecognized(_)
                    | FtpCommandError::CommandNotImplemented(_)
                    | FtpCommandError::RejectedCommandSyntax(_),
                ) => {}
                Err(e) => return Err(e),
            }
        }

        let addr = self.request_pasv_addr().await?;
        if addr.ip().is_unspecified() {
            Ok(SocketAddr::new(control_peer, addr.port()))
        } else {
            Ok(addr)
        }
    }

    /// Issue a transfer command and wait for the preliminary reply that
    /// opens the data phase.
    pub(crate) async fn start_transfer(
        &mut self,
        cmd: FtpCommand,
        path: &str,
    ) -> Result<(), FtpCommandError> {
        if path.is_empty() {
            self.send_cmd(cmd)
                .await
                .map_err(FtpCommandError::SendFailed)?;
        } else {
            self.send_cmd1(cmd, path)
                .await
                .map_err(FtpCommandError::SendFailed)?;
        }

        let reply = self.timed_read_raw_response("start transfer").await?;
        match reply.code() {
            500 => Err(FtpCommandError::CommandUnrecognized(cmd)),
            501 => Err(FtpCommandError::RejectedCommandSyntax(cmd)),
            502 => Err(FtpCommandError::CommandNotImplemented(cmd)),
            530 => Err(FtpCommandError::NotLoggedIn),
            125 | 150 => Ok(()),
            421 => Err(FtpCommandError::ServiceNotAvailable),
            n @ (450 | 550) => Err(FtpCommandError::FileUnavailable(cmd, n)),
            n => Err(FtpCommandError::UnexpectedReplyCode(cmd, n)),
        }
    }

    /// Wait for the reply that terminates the data phase of `cmd`.
    pub(crate) async fn wait_transfer_end(
        &mut self,
        cmd: FtpCommand,
    ) -> Result<FtpReply, FtpTransferServerError> {
        let reply = self.read_raw_response().await?;
        match reply.code() {
            226 | 250 => Ok(reply.to_reply()),
            425 => Err(FtpTransferServerError::DataTransferNotEstablished),
            426 => Err(FtpTransferServerError::DataTransferLost),
            451 => Err(FtpTransferServerError::ServerFailed),
            n => Err(FtpTransferServerError::UnexpectedEndReplyCode(cmd, n)),
        }
    }
}
