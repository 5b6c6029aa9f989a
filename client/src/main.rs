// ./client stun.example.org --port 3478 --local_port 0

use clap::{Arg, Command};
use log::{debug, error};

use client::client::{bind_local, probe, resolve_server};

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    env_logger::init();

    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun client for discovering the mapped address")
        .arg(
            Arg::new("host")
                .takes_value(true)
                .required(true)
                .help("stun server host"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .takes_value(true)
                .default_value("3478")
                .help("stun server port")
                .value_parser(clap::value_parser!(u16).range(1..)),
        )
        .arg(
            Arg::new("local_port")
                .long("local_port")
                .takes_value(true)
                .default_value("0")
                .help("local port, 0 for ephemeral")
                .value_parser(clap::value_parser!(u16)),
        )
        .get_matches();

    let host: &String = app.get_one("host").expect("wrong host");
    let port: u16 = *app.get_one("port").expect("wrong port");
    let local_port: u16 = *app.get_one("local_port").expect("wrong local port");

    let server = match resolve_server(host, port).await {
        Ok(v) => v,
        Err(e) => {
            error!("error, resolve, {:?}", e);
            std::process::exit(1);
        }
    };

    let sock = match bind_local(server, local_port).await {
        Ok(v) => v,
        Err(e) => {
            error!("error, bind, {:?}", e);
            std::process::exit(1);
        }
    };

    let local_addr = sock.local_addr();
    debug!("local addr: {:?}", local_addr);

    match probe(&sock, server).await {
        Ok(v) => {
            println!("sent addr: {}", v.sent_to);
            println!("from addr: {}", v.recv_from);
            println!("stun addr: {}", v.mapped_address);
        }
        Err(e) => {
            error!("error, probe, {:?}", e);
            std::process::exit(1);
        }
    }
}
