use crate::carousel::Point;
use crate::events::HostEvent;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/album-carousel.sock";

/// Parses one control line, e.g. `press 960 540` or `halt`.
pub fn parse_command(line: &str) -> Option<HostEvent> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;

    let mut point = || -> Option<Point> {
        let x = words.next()?.parse().ok()?;
        let y = words.next()?.parse().ok()?;
        Some(Point::new(x, y))
    };

    match verb.to_ascii_lowercase().as_str() {
        "press" => point().map(HostEvent::Press),
        "move" => point().map(HostEvent::Move),
        "release" => point().map(HostEvent::Release),
        "cancel" => Some(HostEvent::Cancel),
        "reset" => Some(HostEvent::Reset),
        "halt" => Some(HostEvent::Halt),
        _ => None,
    }
}

pub async fn run_server(tx: Sender<HostEvent>) {
    // Cleanup old socket if it exists
    if fs_err::metadata(SOCKET_PATH).is_ok() {
        let _ = fs_err::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        match parse_command(&line) {
                            Some(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            None => log::warn!("Ignoring unknown command: {:?}", line.trim()),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pointer_commands() {
        assert_eq!(
            parse_command("press 960 540"),
            Some(HostEvent::Press(Point::new(960.0, 540.0)))
        );
        assert_eq!(
            parse_command("  MOVE 12.5 -3\n"),
            Some(HostEvent::Move(Point::new(12.5, -3.0)))
        );
        assert_eq!(
            parse_command("release 0 0"),
            Some(HostEvent::Release(Point::new(0.0, 0.0)))
        );
        assert_eq!(parse_command("cancel"), Some(HostEvent::Cancel));
        assert_eq!(parse_command("reset"), Some(HostEvent::Reset));
        assert_eq!(parse_command("halt"), Some(HostEvent::Halt));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("press"), None);
        assert_eq!(parse_command("press 1"), None);
        assert_eq!(parse_command("move x y"), None);
        assert_eq!(parse_command("spin 3"), None);
    }
}
