/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::io;
use std::net::IpAddr;
use std::str::FromStr;

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use clap_complete::Shell;
use tokio::net::TcpStream;

use wrake_ftp_client::{
    FtpClientConfig, FtpFetchClient, FtpFetchSession, FtpRequest, FtpTcpConnectionPool, RemoteAddr,
};

mod logger;

mod cmd_get;
mod cmd_list;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_SOURCE_IP: &str = "source-ip";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

type FtpTcpSession = FtpFetchSession<FtpTcpConnectionPool, TcpStream>;

fn build_cli_args() -> Command {
    Command::new("wrake-ftp")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("FTP server address")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_USERNAME)
                .help("FTP username")
                .num_args(1)
                .value_name("USERNAME")
                .short('u')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PASSWORD)
                .help("FTP password")
                .num_args(1)
                .value_name("PASSWORD")
                .short('p')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SOURCE_IP)
                .help("source ip address")
                .num_args(1)
                .value_name("IP ADDRESS")
                .value_parser(value_parser!(IpAddr))
                .long("source")
                .short('s')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_list::command())
        .subcommand(cmd_get::command())
}

pub(crate) fn build_request(server: &RemoteAddr, args: &ArgMatches, path: &str) -> FtpRequest {
    let mut request = FtpRequest::new(server.clone(), path);
    if let Some(username) = args.get_one::<String>(GLOBAL_ARG_USERNAME) {
        request.set_credentials(username, args.get_one::<String>(GLOBAL_ARG_PASSWORD));
    }
    request
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    let logger = logger::SyncLogger::new(verbose_level);
    logger
        .into_global_logger()
        .map_err(|e| anyhow!("failed to install logger: {e}"))?;

    let server = args
        .get_one::<String>(GLOBAL_ARG_SERVER)
        .ok_or_else(|| anyhow!("no server address given"))?;
    let mut server =
        RemoteAddr::from_str(server).map_err(|e| anyhow!("invalid server address: {e}"))?;
    if server.port() == 0 {
        server.set_port(21);
    }

    let mut pool = FtpTcpConnectionPool::new();
    if let Some(ip) = args.get_one::<IpAddr>(GLOBAL_ARG_SOURCE_IP) {
        pool.set_bind_ip(*ip);
    }
    let client = FtpFetchClient::new(pool, FtpClientConfig::default());

    if let Some((subcommand, args)) = args.subcommand() {
        let mut session: FtpTcpSession = client.session();

        let ret = match subcommand {
            cmd_list::COMMAND => cmd_list::run(&mut session, &server, args).await,
            cmd_get::COMMAND => cmd_get::run(&mut session, &server, args).await,
            cmd => Err(anyhow!("invalid subcommand {cmd}")),
        };

        session.quit().await;

        ret
    } else {
        Err(anyhow!("no subcommand found"))
    }
}
