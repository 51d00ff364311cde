//! Connection lifecycle checks with a hand-driven TCP peer.
//!
//! The peer accepts one connection, optionally writes a canned reply, then
//! waits for the client to close its side. A fetch that leaks its connection
//! never produces that EOF.

use std::net::SocketAddr;
use std::time::Duration;

use fetch_core::{fetch_with_timeout, ErrorKind, Fetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const CLOSE_DEADLINE: Duration = Duration::from_secs(2);

async fn peer(reply: Option<&'static [u8]>) -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => {
                    let _ = closed_tx.send(());
                    return;
                }
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }

        if let Some(reply) = reply {
            socket.write_all(reply).await.unwrap();
        }

        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = closed_tx.send(());
    });

    (addr, closed_rx)
}

async fn assert_closed(closed: oneshot::Receiver<()>) {
    let result = tokio::time::timeout(CLOSE_DEADLINE, closed).await;
    assert!(
        matches!(result, Ok(Ok(()))),
        "client kept the connection open after the call returned"
    );
}

#[tokio::test]
async fn connection_closed_after_success() {
    let (addr, closed) = peer(Some(&b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nOK"[..])).await;

    let body = fetch_with_timeout(&format!("http://{addr}/"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(body, "OK");
    assert_closed(closed).await;
}

#[tokio::test]
async fn connection_closed_after_http_error() {
    let (addr, closed) =
        peer(Some(&b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n"[..])).await;

    let err = fetch_with_timeout(&format!("http://{addr}/"), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "status 404");
    assert_closed(closed).await;
}

#[tokio::test]
async fn connection_closed_after_timeout_waiting_for_headers() {
    let (addr, closed) = peer(None).await;

    let err = fetch_with_timeout(&format!("http://{addr}/"), Duration::from_millis(300))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_closed(closed).await;
}

#[tokio::test]
async fn timeout_covers_body_read() {
    // Promises 100 bytes, delivers 2, then stalls.
    let (addr, closed) = peer(Some(&b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\nOK"[..])).await;

    let err = fetch_with_timeout(&format!("http://{addr}/"), Duration::from_millis(300))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_closed(closed).await;
}

#[tokio::test]
async fn connection_closed_when_caller_cancels() {
    let (addr, closed) = peer(None).await;
    let fetcher = Fetcher::new();
    let url = format!("http://{addr}/");

    tokio::select! {
        _ = fetcher.fetch_with_timeout(&url, Duration::from_secs(30)) => {
            panic!("peer never answers, fetch cannot finish");
        }
        _ = tokio::time::sleep(Duration::from_millis(200)) => {}
    }
    assert_closed(closed).await;
}
