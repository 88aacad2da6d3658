// Server loop module
// Accepts connections until shutdown, then drains the open ones within a deadline

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use super::signal::shutdown_signal;
use crate::config::AppState;
use crate::logger;

/// Poll interval while waiting for connections to close
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Serve until SIGTERM or Ctrl+C
pub async fn serve(listener: TcpListener, state: Arc<AppState>) {
    serve_until(listener, state, shutdown_signal()).await;
}

/// Serve until `shutdown` resolves
pub async fn serve_until(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (drain_tx, drain_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            &drain_rx,
                        );
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    // Stop accepting before waiting on the open connections
    drop(listener);
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));
    drain_tx.send_replace(true);

    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    let remaining = drain(&active_connections, grace).await;
    logger::log_shutdown_complete(remaining);
}

/// Wait for the counter to reach zero; returns what is left at the deadline
async fn drain(active_connections: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            return 0;
        }
        tokio::select! {
            () = tokio::time::sleep(DRAIN_POLL) => {}
            () = tokio::time::sleep_until(deadline) => {
                return active_connections.load(Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn request(addr: std::net::SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let config = Config::from_toml_str("[logging]\naccess_log = false").unwrap();
        let state = Arc::new(AppState::new(&config));
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_until(listener, state, async {
            let _ = stop_rx.await;
        }));

        let response = request(
            addr,
            "GET /person/detail/3 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 201"), "{response}");
        assert!(response.contains(r#"{"3":"It exists!"}"#));

        let response = request(
            addr,
            "POST /login HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Type: application/x-www-form-urlencoded\r\nContent-Length: 31\r\n\r\n\
             username=miguel2021&password=pw",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains("Login Succesfully!"));

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_oversized_body() {
        let config =
            Config::from_toml_str("[logging]\naccess_log = false\n[http]\nmax_body_size = 8").unwrap();
        let state = Arc::new(AppState::new(&config));
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_until(listener, state, async {
            let _ = stop_rx.await;
        }));

        let response = request(
            addr,
            "POST /person/new HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Type: application/json\r\nContent-Length: 16\r\n\r\n\
             {\"first_name\":1}",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 413"), "{response}");

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let counter = AtomicUsize::new(0);
        assert_eq!(drain(&counter, Duration::from_secs(1)).await, 0);

        let counter = AtomicUsize::new(2);
        assert_eq!(drain(&counter, Duration::from_millis(60)).await, 2);
    }
}
