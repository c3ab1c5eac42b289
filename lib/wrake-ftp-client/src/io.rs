/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::future::Future;
use std::io;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::AsyncBufRead;

pub(crate) trait LimitedBufReadExt: AsyncBufRead {
    /// Read into `buf` until `delimiter` is seen, EOF is hit, or `max_len`
    /// bytes have been appended. Returns (delimiter found, bytes appended).
    fn limited_read_until<'a>(
        &'a mut self,
        delimiter: u8,
        max_len: usize,
        buf: &'a mut Vec<u8>,
    ) -> LimitedReadUntil<'a, Self>
    where
        Self: Unpin,
    {
        LimitedReadUntil::new(self, delimiter, max_len, buf)
    }
}

impl<R: AsyncBufRead + ?Sized> LimitedBufReadExt for R {}

pub(crate) struct LimitedReadUntil<'a, R: ?Sized> {
    reader: &'a mut R,
    delimiter: u8,
    read: usize,
    limit: usize,
    buf: &'a mut Vec<u8>,
}

impl<'a, R> LimitedReadUntil<'a, R>
where
    R: AsyncBufRead + ?Sized + Unpin,
{
    fn new(reader: &'a mut R, delimiter: u8, max_len: usize, buf: &'a mut Vec<u8>) -> Self {
        Self {
            reader,
            delimiter,
            read: 0,
            limit: max_len,
            buf,
        }
    }
}

fn read_until_internal<R: AsyncBufRead + ?Sized>(
    mut reader: Pin<&mut R>,
    cx: &mut Context<'_>,
    delimiter: u8,
    read: &mut usize,
    limit: usize,
    buf: &mut Vec<u8>,
) -> Poll<io::Result<(bool, usize)>> {
    loop {
        let (done, used) = {
            let available = ready!(reader.as_mut().poll_fill_buf(cx))?;
            match memchr::memchr(delimiter, available) {
                Some(i) => {
                    buf.extend_from_slice(&available[..=i]);
                    (true, i + 1)
                }
                None => {
                    let room = limit - *read;
                    if available.len() >= room {
                        buf.extend_from_slice(&available[..room]);
                        (false, room)
                    } else {
                        buf.extend_from_slice(available);
                        (false, available.len())
                    }
                }
            }
        };
        reader.as_mut().consume(used);
        *read += used;
        if done || used == 0 || *read >= limit {
            return Poll::Ready(Ok((done, mem::replace(read, 0))));
        }
    }
}

impl<R: AsyncBufRead + ?Sized + Unpin> Future for LimitedReadUntil<'_, R> {
    type Output = io::Result<(bool, usize)>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Self {
            reader,
            delimiter,
            read,
            limit,
            buf,
        } = &mut *self;
        read_until_internal(Pin::new(reader), cx, *delimiter, read, *limit, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn read_lines_with_limit() {
        let data: &[u8] = b"200 ok\r\nrest";
        let mut reader = BufReader::new(data);
        let mut buf = Vec::new();

        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(found);
        assert_eq!(len, 8);
        assert_eq!(buf, b"200 ok\r\n");

        buf.clear();
        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(!found);
        assert_eq!(len, 4);
        assert_eq!(buf, b"rest");

        buf.clear();
        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(!found);
        assert_eq!(len, 0);
    }

    #[tokio::test]
    async fn line_longer_than_limit() {
        let data: &[u8] = b"aaaaaaaaaa\n";
        let mut reader = BufReader::new(data);
        let mut buf = Vec::new();

        let (found, len) = reader.limited_read_until(b'\n', 4, &mut buf).await.unwrap();
        assert!(!found);
        assert_eq!(len, 4);
        assert_eq!(buf, b"aaaa");
    }

    #[tokio::test]
    async fn read_across_chunks() {
        let mock = tokio_test::io::Builder::new()
            .read(b"226 tra")
            .read(b"nsfer done\r\n")
            .build();
        let mut reader = BufReader::new(mock);
        let mut buf = Vec::new();

        let (found, len) = reader.limited_read_until(b'\n', 64, &mut buf).await.unwrap();
        assert!(found);
        assert_eq!(len, 19);
        assert_eq!(buf, b"226 transfer done\r\n");
    }
}
