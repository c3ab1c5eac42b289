/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::FtpClientConfig;
use crate::recorder::SharedRecorder;
use crate::session::FtpFetchSession;

/// Shared entry point producing one [`FtpFetchSession`] per request.
///
/// The pool is the only state shared between the sessions of one client;
/// everything else in a session is exclusively owned by it.
pub struct FtpFetchClient<CP> {
    pool: Arc<CP>,
    config: Arc<FtpClientConfig>,
}

impl<CP> FtpFetchClient<CP> {
    pub fn new(pool: CP, config: FtpClientConfig) -> Self {
        FtpFetchClient {
            pool: Arc::new(pool),
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn pool(&self) -> &Arc<CP> {
        &self.pool
    }

    pub fn session<T>(&self) -> FtpFetchSession<CP, T>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        FtpFetchSession::new(self.pool.clone(), self.config.clone())
    }

    pub fn session_with_recorder<T>(&self, recorder: SharedRecorder) -> FtpFetchSession<CP, T>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let mut session = self.session();
        session.set_recorder(recorder);
        session
    }
}
