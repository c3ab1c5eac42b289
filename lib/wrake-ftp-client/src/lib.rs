/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

//! FTP fetch session engine for the wrake crawler.
//!
//! For each requested resource a [`FtpFetchSession`] checks a control
//! connection out of a shared pool, authenticates, issues a transfer or
//! listing command, drives a second pooled connection for the data
//! channel, and decodes directory listings with a protocol-level
//! fallback from MLSD to the legacy LIST command. Pooled connections are
//! released on every exit path. An optional [`FtpRecorderSink`] observes
//! traffic without affecting the fetch.

mod body;
mod client;
mod config;
mod connection;
mod control;
mod debug;
mod error;
mod io;
mod observer;
mod pool;
mod recorder;
mod reply;
mod request;
mod response;
mod session;
mod transfer;
mod types;

pub mod facts;
pub mod listing;

pub use body::{FtpBodySink, MemoryBody};
pub use client::FtpFetchClient;
pub use config::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};
pub use connection::{FtpConnection, FtpConnectionPool, FtpConnectionRole, PoolTicket};
pub use control::FtpCommand;
pub use debug::{FTP_DEBUG_LOG_LEVEL, FTP_DEBUG_LOG_TARGET};
pub use error::{
    FtpCommandError, FtpConnectError, FtpFileFactsParseError, FtpLoginError, FtpRawResponseError,
    FtpSessionError, FtpTransferError, FtpTransferServerError,
};
pub use facts::{FtpFileEntryType, FtpFileFacts};
pub use pool::FtpTcpConnectionPool;
pub use recorder::{FtpRecorderSink, SharedRecorder};
pub use reply::{FtpReply, FtpReplyClass};
pub use request::FtpRequest;
pub use response::{FtpListingResponse, FtpResponse};
pub use session::FtpFetchSession;
pub use types::{RemoteAddr, RemoteAddrParseError};
