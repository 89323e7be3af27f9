use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pista_board::{Board, BoardState, api::HttpApi};
use tokio::{
    io::{AsyncBufReadExt, BufReader, stdin},
    time::interval,
};
use tracing_subscriber::{EnvFilter, fmt};

/// Terminal client for the guest book. Prints the board, refreshes it
/// on a fixed interval, and posts each line typed on stdin.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the site backend
    #[arg(default_value = "http://localhost:8080")]
    server: String,

    /// Seconds between board refreshes
    #[arg(long, default_value_t = 10)]
    poll: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let mut board = Board::new(HttpApi::new(&args.server));
    board.refresh().await;
    print_board(&board);

    let mut poll = interval(Duration::from_secs(args.poll));
    poll.tick().await;

    let mut lines = BufReader::new(stdin()).lines();

    loop {
        tokio::select! {
            _ = poll.tick() => {
                board.refresh().await;
                print_board(&board);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                board.set_input(line);
                match board.submit().await {
                    Ok(()) => print_board(&board),
                    Err(e) => println!("Could not post: {e}"),
                }
            }
        }
    }

    Ok(())
}

fn print_board(board: &Board<HttpApi>) {
    match board.state() {
        BoardState::Loading => println!("Loading messages..."),
        BoardState::Ready(entries) => {
            println!("--- Guest book, {} messages ---", entries.len());
            for entry in entries {
                println!("{}", entry.html);
                println!("    {}", entry.posted);
            }
        }
        BoardState::Error(message) => println!("Failed to load messages: {message}"),
    }
}
