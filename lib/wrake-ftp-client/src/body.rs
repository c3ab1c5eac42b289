/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// A byte destination for transferred content.
///
/// `reset` rewinds to the start and truncates, discarding everything
/// written so far. It is used when a failed listing attempt is retried
/// with the legacy command so the two outputs are never concatenated.
#[async_trait]
pub trait FtpBodySink: Send {
    async fn append(&mut self, data: &[u8]) -> io::Result<()>;
    async fn reset(&mut self) -> io::Result<()>;
}

/// An in-memory body sink, readable back after the fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBody {
    buf: Vec<u8>,
}

impl MemoryBody {
    pub fn new() -> Self {
        MemoryBody::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[async_trait]
impl FtpBodySink for MemoryBody {
    async fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    async fn reset(&mut self) -> io::Result<()> {
        self.buf.clear();
        Ok(())
    }
}

#[async_trait]
impl FtpBodySink for tokio::fs::File {
    async fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data).await
    }

    async fn reset(&mut self) -> io::Result<()> {
        self.rewind().await?;
        self.set_len(0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_body_append_reset() {
        let mut body = MemoryBody::new();
        body.append(b"abc").await.unwrap();
        body.append(b"def").await.unwrap();
        assert_eq!(body.as_slice(), b"abcdef");

        body.reset().await.unwrap();
        assert!(body.is_empty());

        body.append(b"xyz").await.unwrap();
        assert_eq!(body.into_inner(), b"xyz");
    }
}
