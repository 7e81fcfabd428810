use checkers::start_server;
use env_logger;
use futures::executor::block_on;
use log::{error, info, LevelFilter};
use std::env;
use std::net::SocketAddrV4;
use std::str::FromStr;

const DEFAULT_ADDRESS: &str = "127.0.0.1:1337";

fn main() {
    env_logger::builder()
        .filter_module("checkers", LevelFilter::Trace)
        .init();
    let args: Vec<String> = env::args().collect();
    let address: &str = match args.len() {
        1 => DEFAULT_ADDRESS,
        2 => &args[1],
        _ => {
            println!("usage: ./server {{ipv4 address}}, example: ./server 127.0.0.1:1337");
            return;
        }
    };
    let address = match SocketAddrV4::from_str(address) {
        Ok(address) => address,
        Err(_) => {
            println!("bad ipv4 address: {}", address);
            return;
        }
    };
    info!("server started");
    if let Err(e) = block_on(start_server(address)) {
        error!("server ended in error: {e}");
    }
}
