//! Smoke-test client: joins a running server, wanders about for a few turns
//! and prints every reply.

use rand::seq::SliceRandom;
use shared::protocol::Command;
use shared::{Direction, LOOK_RADIUS};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    println!("Connecting to {}", server_addr);
    let stream = TcpStream::connect(&server_addr).await?;
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half).lines();

    let mut rng = rand::thread_rng();
    let mut script = vec![Command::Hello, Command::Look];
    for _ in 0..10 {
        if let Some(direction) = Direction::ALL.choose(&mut rng) {
            script.push(Command::Move(*direction));
        }
        script.push(Command::Pickup);
    }
    script.push(Command::Look);

    for command in script {
        println!("> {}", command);
        write_half
            .write_all(format!("{}\n", command).as_bytes())
            .await?;

        let expected_lines = match command {
            Command::Look => LOOK_RADIUS,
            _ => 1,
        };
        for _ in 0..expected_lines {
            match reader.next_line().await? {
                Some(line) => {
                    println!("< {}", line);
                    if line == shared::protocol::FAIL && command == Command::Pickup {
                        if let Some(reason) = reader.next_line().await? {
                            println!("< {}", reason);
                        }
                    }
                }
                None => {
                    println!("Server closed the connection");
                    return Ok(());
                }
            }
        }

        sleep(Duration::from_millis(200)).await;
    }

    println!("Test client finished");
    Ok(())
}
