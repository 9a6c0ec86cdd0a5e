use clap::Parser;
use client::display::ServerLine;
use client::network::Connection;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    let mut conn = Connection::connect(&args.server).await?;
    println!("Connected. Commands: HELLO, MOVE <N|E|S|W>, PICKUP, LOOK");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            input = stdin.next_line() => {
                match input? {
                    Some(line) => conn.send_line(line.trim()).await?,
                    None => {
                        info!("Input closed, leaving the dungeon");
                        conn.close().await?;
                        return Ok(());
                    }
                }
            }
            reply = conn.read_line() => {
                match reply? {
                    Some(line) => {
                        let parsed = ServerLine::classify(&line);
                        println!("{}", parsed.describe());
                        if parsed == ServerLine::Winner {
                            return Ok(());
                        }
                    }
                    None => {
                        eprintln!("Server connection error");
                        std::process::exit(1);
                    }
                }
            }
        }
    }
}
