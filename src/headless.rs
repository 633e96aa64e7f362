//! Line-oriented front-end.
//!
//! Each line typed on stdin is sent as a message; every new transcript entry
//! is printed to stdout. Runs until stdin closes or Ctrl+C is pressed, then
//! shuts the messenger down.

use crate::messenger::{ChatError, Messenger};
use crate::session::ConnectionInfo;
use crate::transcript::Entry;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// How long to wait for queued messages before exiting.
const EXIT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Open the port given on the command line.
///
/// A failure is reported and the messenger stays up without a connection;
/// sends then fail with the usual "no port" error.
pub fn open_port(messenger: &mut Messenger, port_name: &str) -> Option<ConnectionInfo> {
    match messenger.connect_to(port_name) {
        Ok(info) => {
            info!("Connected to {} at {} baud", info.port_name, info.baud_rate);
            Some(info)
        }
        Err(e) => {
            eprintln!("Error connecting to COM port: {e}");
            None
        }
    }
}

/// Run against the process's stdin/stdout until EOF or Ctrl+C.
pub async fn run(messenger: &mut Messenger, poll_interval: Duration) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    run_with(messenger, poll_interval, stdin, stdout, ctrl_c).await
}

/// Drive the messenger from `input` and print entries to `output` until the
/// input ends or `interrupt` resolves.
pub async fn run_with<R, W, I>(
    messenger: &mut Messenger,
    poll_interval: Duration,
    input: R,
    mut output: W,
    interrupt: I,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: std::future::Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(interrupt);

    loop {
        let printed = messenger.transcript().len();
        tokio::select! {
            _ = &mut interrupt => {
                info!("Application interrupted by user.");
                break;
            }
            _ = ticker.tick() => {
                messenger.poll_tick();
            }
            line = lines.next_line() => match line {
                Ok(Some(text)) => {
                    messenger.input = text;
                    match messenger.send() {
                        Ok(()) | Err(ChatError::EmptyMessage) => {}
                        Err(e) => {
                            output.write_all(format!("!! {e}\n").as_bytes()).await?;
                        }
                    }
                    messenger.input.clear();
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            },
        }
        print_entries(&mut output, messenger.transcript().since(printed)).await?;
    }

    if messenger.session().is_connected() {
        if let Err(e) = messenger.session().flush(EXIT_FLUSH_TIMEOUT) {
            warn!("Pending messages not written before exit: {}", e);
        }
    }
    messenger.shutdown();
    output.flush().await
}

async fn print_entries<W>(output: &mut W, entries: &[Entry]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for entry in entries {
        output.write_all(format!("{entry}\n").as_bytes()).await?;
    }
    if !entries.is_empty() {
        output.flush().await?;
    }
    Ok(())
}
