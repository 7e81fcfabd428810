use anyhow::{Error, Result};
use async_std::channel::Sender;
use async_std::io::{stdin, BufReader, Stdin};
use async_std::net::TcpStream;
use async_std::task;
use async_std::task::{block_on, JoinHandle};
use checkers::{
    handle_connection, Conn, Event, GameOutcome, Message, Move, Received, Side, Square,
    MAX_MESSAGE_SIZE,
};
use futures::{join, AsyncBufReadExt, StreamExt};
use log::{error, info, warn, LevelFilter};
use std::env;
use std::str::FromStr;

const DEFAULT_ADDRESS: &str = "127.0.0.1:1337";

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();
    if let Err(e) = block_on(run_client()) {
        error!("client stopped on error {}", e);
    }
}

async fn run_client() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let address: &str = match args.len() {
        1 => DEFAULT_ADDRESS,
        2 => &args[1],
        _ => Err(Error::msg(
            "usage: ./client {server address}, example: ./client 127.0.0.1:1337",
        ))?,
    };
    let mut conn: Conn<Message, Message> =
        handle_connection(TcpStream::connect(address).await?, MAX_MESSAGE_SIZE);
    let side = match conn.next().await {
        Some(Received::Response(Message {
            event: Event::Join(side),
            ..
        })) => side,
        _ => Err(Error::msg("no seat assignment from server"))?,
    };
    if !side.is_player() {
        println!("match is full, try again later");
        return Ok(());
    }
    println!("seated as {:?}", side);
    print_help();
    let handle1 = accept_input(stdin(), side, conn.sender().clone());
    let handle2 = print_server_events(conn);
    join!(handle1, handle2);
    Ok(())
}

fn accept_input(input: Stdin, side: Side, sender: Sender<Message>) -> JoinHandle<()> {
    task::spawn(async move {
        let reader = BufReader::new(input);
        let mut lines = reader.lines();
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) => match parse_command(&line, side) {
                    Some(msg) => {
                        let resigned = matches!(msg.event, Event::Resign(_));
                        if sender.send(msg).await.is_err() {
                            info!("server closed");
                            break;
                        }
                        if resigned {
                            break;
                        }
                    }
                    None => print_help(),
                },
                Err(e) => {
                    warn!("read line error: {}", e);
                }
            }
        }
    })
}

fn print_server_events(mut conn: Conn<Message, Message>) -> JoinHandle<()> {
    task::spawn(async move {
        while let Some(rsp) = conn.next().await {
            match rsp {
                Received::Response(msg) => {
                    println!("{}", event_to_string(msg.event));
                }
                Received::Error(e) => {
                    error!("connection error: {:?}", e);
                    break;
                }
            }
        }
        println!("connection closed");
    })
}

fn parse_command(line: &str, side: Side) -> Option<Message> {
    let line = line.to_lowercase();
    if line.starts_with("move") {
        let coords: Vec<i8> = line
            .split_whitespace()
            .skip(1)
            .filter_map(|x| i8::from_str(x).ok())
            .collect();
        if coords.len() != 4 {
            return None;
        }
        let mv = Move::new(
            Square::new(coords[0], coords[1]),
            Square::new(coords[2], coords[3]),
        );
        Some(Message::game_move(side, mv))
    } else if line.starts_with("resign") {
        Some(Message::resign(side))
    } else {
        None
    }
}

fn print_help() {
    println!(
        "commands:\n\
        - move 'from row' 'from col' 'to row' 'to col'\n\
        - resign"
    );
}

fn event_to_string(event: Event) -> String {
    match event {
        Event::Join(side) => format!("seat assignment: {:?}", side),
        Event::PlayerConnected(side) => format!("{:?} has connected, game on", side),
        Event::Move(side, mv) => format!(
            "{:?} moved ({}, {}) -> ({}, {})",
            side, mv.start.row, mv.start.col, mv.end.row, mv.end.col
        ),
        Event::Resign(side) => format!("{:?} resigned", side),
        Event::GameOutcome(outcome) => match outcome {
            GameOutcome::RedResigned => "red resigned, white wins".to_string(),
            GameOutcome::WhiteResigned => "white resigned, red wins".to_string(),
            GameOutcome::RedWins => "red wins".to_string(),
            GameOutcome::WhiteWins => "white wins".to_string(),
            GameOutcome::Draw => "draw".to_string(),
            GameOutcome::Unknown => "match still undecided".to_string(),
        },
    }
}
