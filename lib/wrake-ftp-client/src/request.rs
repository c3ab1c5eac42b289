/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::net::SocketAddr;

use crate::types::RemoteAddr;

/// A single resource to fetch from an FTP server.
///
/// All fields are fixed at construction except the resolved peer address,
/// which is assigned once a control connection has been checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpRequest {
    addr: RemoteAddr,
    path: String,
    username: Option<String>,
    password: Option<String>,
    address: Option<SocketAddr>,
}

impl FtpRequest {
    pub fn new(addr: RemoteAddr, path: impl Into<String>) -> Self {
        FtpRequest {
            addr,
            path: path.into(),
            username: None,
            password: None,
            address: None,
        }
    }

    pub fn set_credentials(
        &mut self,
        username: impl Into<String>,
        password: Option<impl Into<String>>,
    ) {
        self.username = Some(username.into());
        self.password = password.map(Into::into);
    }

    #[inline]
    pub fn addr(&self) -> &RemoteAddr {
        &self.addr
    }

    #[inline]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    #[inline]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[inline]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The resolved address of the control connection, once assigned.
    #[inline]
    pub fn address(&self) -> Option<SocketAddr> {
        self.address
    }

    pub(crate) fn set_address(&mut self, address: SocketAddr) {
        self.address = Some(address);
    }
}
