/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

//! Session tests against a scripted localhost FTP server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

use wrake_ftp_client::{
    FtpClientConfig, FtpCommandError, FtpFetchClient, FtpFetchSession, FtpFileEntryType,
    FtpLoginError, FtpRecorderSink, FtpReply, FtpRequest, FtpSessionError, FtpTcpConnectionPool,
    MemoryBody, RemoteAddr,
};

const UNIX_LISTING: &[u8] =
    b"-rw-r--r--   1 ftp  ftp        10 Jan  1  2020 a.txt\r\ndrwxr-xr-x   2 ftp  ftp      4096 Jan  2  2020 sub\r\n";

#[derive(Clone, Copy)]
enum MlsdBehavior {
    Serve(&'static [u8]),
    Refuse(u16),
    FailAfterData(u16, &'static [u8]),
}

#[derive(Clone)]
struct StubConfig {
    auth_ok: bool,
    payload: &'static [u8],
    mlsd: MlsdBehavior,
    list_payload: &'static [u8],
    commands: Arc<Mutex<Vec<String>>>,
}

impl StubConfig {
    fn new() -> Self {
        StubConfig {
            auth_ok: true,
            payload: b"hello",
            mlsd: MlsdBehavior::Serve(b"type=file;size=10;modify=20200101000000; a.txt\r\n"),
            list_payload: UNIX_LISTING,
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn command_index(&self, prefix: &str) -> Option<usize> {
        self.commands()
            .iter()
            .position(|c| c.starts_with(prefix))
    }
}

async fn spawn_stub(config: StubConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let config = config.clone();
            tokio::spawn(async move {
                let _ = serve_control(stream, config).await;
            });
        }
    });
    addr
}

async fn serve_data(
    wr: &mut OwnedWriteHalf,
    data_listener: &mut Option<TcpListener>,
    payload: &[u8],
    end_line: &str,
) -> std::io::Result<()> {
    let Some(listener) = data_listener.take() else {
        wr.write_all(b"425 use PASV or EPSV first\r\n").await?;
        return Ok(());
    };
    wr.write_all(b"150 opening data connection\r\n").await?;
    let (mut data, _) = listener.accept().await?;
    data.write_all(payload).await?;
    data.shutdown().await?;
    drop(data);
    wr.write_all(end_line.as_bytes()).await?;
    Ok(())
}

async fn serve_control(stream: TcpStream, config: StubConfig) -> std::io::Result<()> {
    let (rd, mut wr) = stream.into_split();
    let mut lines = BufReader::new(rd).lines();
    let mut data_listener: Option<TcpListener> = None;

    wr.write_all(b"220 stub server ready\r\n").await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end().to_string();
        config.commands.lock().unwrap().push(line.clone());
        let (verb, _arg) = match line.split_once(' ') {
            Some((v, a)) => (v.to_uppercase(), a.to_string()),
            None => (line.to_uppercase(), String::new()),
        };

        match verb.as_str() {
            "USER" => wr.write_all(b"331 password required\r\n").await?,
            "PASS" => {
                if config.auth_ok {
                    wr.write_all(b"230 logged in\r\n").await?;
                } else {
                    wr.write_all(b"530 login incorrect\r\n").await?;
                }
            }
            "TYPE" => wr.write_all(b"200 type set\r\n").await?,
            "EPSV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                let port = listener.local_addr()?.port();
                data_listener = Some(listener);
                wr.write_all(
                    format!("229 Entering Extended Passive Mode (|||{port}|)\r\n").as_bytes(),
                )
                .await?;
            }
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                let port = listener.local_addr()?.port();
                data_listener = Some(listener);
                wr.write_all(
                    format!(
                        "227 Entering Passive Mode (127,0,0,1,{},{})\r\n",
                        port >> 8,
                        port & 0xff
                    )
                    .as_bytes(),
                )
                .await?;
            }
            "RETR" => {
                serve_data(
                    &mut wr,
                    &mut data_listener,
                    config.payload,
                    "226 transfer complete\r\n",
                )
                .await?;
            }
            "MLSD" => match config.mlsd {
                MlsdBehavior::Serve(payload) => {
                    serve_data(
                        &mut wr,
                        &mut data_listener,
                        payload,
                        "226 transfer complete\r\n",
                    )
                    .await?;
                }
                MlsdBehavior::Refuse(code) => {
                    wr.write_all(format!("{code} MLSD not supported\r\n").as_bytes())
                        .await?;
                }
                MlsdBehavior::FailAfterData(code, payload) => {
                    serve_data(
                        &mut wr,
                        &mut data_listener,
                        payload,
                        &format!("{code} MLSD not supported\r\n"),
                    )
                    .await?;
                }
            },
            "LIST" => {
                serve_data(
                    &mut wr,
                    &mut data_listener,
                    config.list_payload,
                    "226 transfer complete\r\n",
                )
                .await?;
            }
            "QUIT" => {
                wr.write_all(b"221 goodbye\r\n").await?;
                break;
            }
            _ => wr.write_all(b"502 command not implemented\r\n").await?,
        }
    }

    Ok(())
}

fn request_for(addr: SocketAddr, path: &str) -> FtpRequest {
    FtpRequest::new(RemoteAddr::new(addr.ip().to_string(), addr.port()), path)
}

fn new_client() -> FtpFetchClient<FtpTcpConnectionPool> {
    FtpFetchClient::new(FtpTcpConnectionPool::new(), FtpClientConfig::default())
}

type TcpSession = FtpFetchSession<FtpTcpConnectionPool, TcpStream>;

#[tokio::test(flavor = "multi_thread")]
async fn fetch_end_to_end() {
    let config = StubConfig::new();
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();
    let mut session: TcpSession = client.session();
    let mut body = MemoryBody::new();
    let response = session
        .fetch(request_for(addr, "/pub/hello.txt"), &mut body)
        .await
        .unwrap();

    assert_eq!(body.as_slice(), b"hello");
    assert_eq!(response.reply.code(), 226);
    assert_eq!(response.request.address(), Some(addr));

    // the control connection is still checked out until released
    assert_eq!(client.pool().outstanding(), 1);
    session.clean().await;
    assert_eq!(client.pool().outstanding(), 0);

    assert_eq!(config.command_index("RETR /pub/hello.txt"), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_listing_machine_decode() {
    let config = StubConfig::new();
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();
    let mut session: TcpSession = client.session();
    let mut body = MemoryBody::new();
    let response = session
        .fetch_listing(request_for(addr, "/"), &mut body)
        .await
        .unwrap();

    assert_eq!(response.files.len(), 1);
    let entry = &response.files[0];
    assert_eq!(entry.name(), "a.txt");
    assert_eq!(*entry.entry_type(), FtpFileEntryType::File);
    assert_eq!(entry.size(), Some(10));
    assert_eq!(response.reply.code(), 226);

    // no LIST was needed
    assert_eq!(config.command_index("LIST"), None);

    session.clean().await;
    assert_eq!(client.pool().outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_listing_falls_back_to_list() {
    let mut config = StubConfig::new();
    config.mlsd = MlsdBehavior::Refuse(502);
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();
    let mut session: TcpSession = client.session();
    let mut body = MemoryBody::new();
    let response = session
        .fetch_listing(request_for(addr, "/pub"), &mut body)
        .await
        .unwrap();

    assert_eq!(response.files.len(), 2);
    assert_eq!(response.files[0].name(), "a.txt");
    assert_eq!(response.files[0].size(), Some(10));
    assert!(response.files[1].entry_type().is_dir());

    // the legacy attempt reuses the same path
    let mlsd = config.command_index("MLSD /pub").unwrap();
    let list = config.command_index("LIST /pub").unwrap();
    assert!(mlsd < list);

    session.clean().await;
    assert_eq!(client.pool().outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_listing_no_fallback_on_permanent_error() {
    let mut config = StubConfig::new();
    config.mlsd = MlsdBehavior::Refuse(550);
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();
    let mut session: TcpSession = client.session();
    let mut body = MemoryBody::new();
    let err = session
        .fetch_listing(request_for(addr, "/secret"), &mut body)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FtpSessionError::CommandFailed(FtpCommandError::FileUnavailable(_, 550))
    ));
    assert_eq!(config.command_index("LIST"), None);

    session.close();
    assert_eq!(client.pool().outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn sink_is_reset_before_legacy_attempt() {
    let mut config = StubConfig::new();
    config.mlsd = MlsdBehavior::FailAfterData(502, b"abc");
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();
    let mut session: TcpSession = client.session();
    let mut body = MemoryBody::new();
    let response = session
        .fetch_listing(request_for(addr, "/pub"), &mut body)
        .await
        .unwrap();

    // the partial MLSD bytes must not leak into the final body
    assert_eq!(body.as_slice(), UNIX_LISTING);
    assert_eq!(response.files.len(), 2);

    session.clean().await;
    assert_eq!(client.pool().outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_rejected_is_fatal() {
    let mut config = StubConfig::new();
    config.auth_ok = false;
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();
    let mut session: TcpSession = client.session();
    let mut body = MemoryBody::new();
    let err = session
        .fetch(request_for(addr, "/pub/hello.txt"), &mut body)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FtpSessionError::LoginFailed(FtpLoginError::NotLoggedIn)
    ));
    // no transfer command was ever issued
    assert_eq!(config.command_index("RETR"), None);

    session.close();
    assert_eq!(client.pool().outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn clean_and_close_are_idempotent() {
    let config = StubConfig::new();
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();

    // releasing a session that never connected is a no-op
    let mut idle_session: TcpSession = client.session();
    idle_session.clean().await;
    idle_session.close();

    let mut session: TcpSession = client.session();
    let mut body = MemoryBody::new();
    session
        .fetch(request_for(addr, "/pub/hello.txt"), &mut body)
        .await
        .unwrap();

    session.clean().await;
    session.clean().await;
    session.close();
    assert_eq!(client.pool().outstanding(), 0);
}

#[derive(Default)]
struct RecorderLog {
    events: Vec<String>,
    data: Vec<u8>,
    control_out: usize,
    control_in: usize,
}

struct CollectingRecorder {
    log: Arc<Mutex<RecorderLog>>,
}

impl FtpRecorderSink for CollectingRecorder {
    fn begin_control(&mut self, _request: &FtpRequest) {
        self.log.lock().unwrap().events.push("begin_control".into());
    }

    fn request_control_data(&mut self, data: &[u8]) {
        self.log.lock().unwrap().control_out += data.len();
    }

    fn response_control_data(&mut self, data: &[u8]) {
        self.log.lock().unwrap().control_in += data.len();
    }

    fn pre_response(&mut self, _request: &FtpRequest) {
        self.log.lock().unwrap().events.push("pre_response".into());
    }

    fn response_data(&mut self, data: &[u8]) {
        self.log.lock().unwrap().data.extend_from_slice(data);
    }

    fn response(&mut self, _request: &FtpRequest, reply: &FtpReply) {
        let mut log = self.log.lock().unwrap();
        log.events.push(format!("response:{}", reply.code()));
    }

    fn end_control(&mut self, _request: &FtpRequest, reply: &FtpReply) {
        let mut log = self.log.lock().unwrap();
        log.events.push(format!("end_control:{}", reply.code()));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn recorder_does_not_change_the_fetch() {
    let config = StubConfig::new();
    let addr = spawn_stub(config.clone()).await;

    let client = new_client();

    let log = Arc::new(Mutex::new(RecorderLog::default()));
    let recorder = CollectingRecorder { log: log.clone() };
    let mut recorded_session: TcpSession =
        client.session_with_recorder(Arc::new(Mutex::new(recorder)));
    let mut recorded_body = MemoryBody::new();
    let recorded_response = recorded_session
        .fetch(request_for(addr, "/pub/hello.txt"), &mut recorded_body)
        .await
        .unwrap();
    recorded_session.clean().await;

    let mut plain_session: TcpSession = client.session();
    let mut plain_body = MemoryBody::new();
    let plain_response = plain_session
        .fetch(request_for(addr, "/pub/hello.txt"), &mut plain_body)
        .await
        .unwrap();
    plain_session.clean().await;

    // field for field identical outcome with and without a recorder
    assert_eq!(recorded_response, plain_response);
    assert_eq!(recorded_body, plain_body);
    assert_eq!(client.pool().outstanding(), 0);

    let log = log.lock().unwrap();
    assert_eq!(
        log.events,
        vec![
            "begin_control".to_string(),
            "pre_response".to_string(),
            "response:226".to_string(),
            "end_control:226".to_string(),
        ]
    );
    assert_eq!(log.data, b"hello");
    assert!(log.control_out > 0);
    assert!(log.control_in > 0);
}
