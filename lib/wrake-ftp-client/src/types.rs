/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteAddrParseError {
    #[error("empty host")]
    EmptyHost,
    #[error("invalid port")]
    InvalidPort,
    #[error("unbalanced brackets in host")]
    UnbalancedBrackets,
}

/// A remote endpoint as requested, before name resolution.
///
/// The host part may be a domain name or an IP literal. IPv6 literals use
/// the usual bracket form when paired with a port, e.g. `[::1]:2121`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteAddr {
    host: String,
    port: u16,
}

impl RemoteAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        RemoteAddr {
            host: host.into(),
            port,
        }
    }

    #[inline]
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }
}

impl From<SocketAddr> for RemoteAddr {
    fn from(addr: SocketAddr) -> Self {
        RemoteAddr {
            host: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for RemoteAddr {
    type Err = RemoteAddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RemoteAddrParseError::EmptyHost);
        }

        if let Some(stripped) = s.strip_prefix('[') {
            // bracketed IPv6 literal, optionally followed by :port
            let Some((host, rest)) = stripped.split_once(']') else {
                return Err(RemoteAddrParseError::UnbalancedBrackets);
            };
            if host.is_empty() {
                return Err(RemoteAddrParseError::EmptyHost);
            }
            let port = match rest.strip_prefix(':') {
                Some(p) => u16::from_str(p).map_err(|_| RemoteAddrParseError::InvalidPort)?,
                None if rest.is_empty() => 0,
                None => return Err(RemoteAddrParseError::UnbalancedBrackets),
            };
            return Ok(RemoteAddr::new(host, port));
        }

        if IpAddr::from_str(s).is_ok() {
            // a bare IPv6 literal has no port part
            return Ok(RemoteAddr::new(s, 0));
        }

        match s.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(RemoteAddrParseError::EmptyHost);
                }
                let port = u16::from_str(port).map_err(|_| RemoteAddrParseError::InvalidPort)?;
                Ok(RemoteAddr::new(host, port))
            }
            None => Ok(RemoteAddr::new(s, 0)),
        }
    }
}
