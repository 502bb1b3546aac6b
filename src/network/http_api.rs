use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::protocol::GameSnapshotView;
use crate::store::GameStore;

/// Lightweight read-only HTTP API for the stats and chart views.
///
/// `GET /snapshot` returns the current snapshot as JSON. Anything else is a
/// 404. Runs next to the WebSocket server, on its own port.
pub async fn start(addr: String, store: GameStore) {
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind HTTP API on {}: {}", addr, e);
            return;
        }
    };

    info!("HTTP API listening on http://{}", addr);

    loop {
        let (mut stream, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("HTTP API accept error: {}", e);
                continue;
            }
        };

        let store = store.clone();
        tokio::spawn(async move {
            let mut buf = [0u8; 4096];
            let n = match stream.read(&mut buf).await {
                Ok(n) => n,
                Err(_) => return,
            };
            let request = String::from_utf8_lossy(&buf[..n]);
            let response = respond(&request, &store);
            let _ = stream.write_all(response.as_bytes()).await;
        });
    }
}

fn respond(request: &str, store: &GameStore) -> String {
    // CORS preflight
    if request.starts_with("OPTIONS") {
        return "HTTP/1.1 204 No Content\r\n\
            Access-Control-Allow-Origin: *\r\n\
            Access-Control-Allow-Methods: GET, OPTIONS\r\n\
            Access-Control-Allow-Headers: Content-Type\r\n\
            \r\n"
            .to_string();
    }

    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    if !request.starts_with("GET") || path != "/snapshot" {
        return "HTTP/1.1 404 Not Found\r\n\
            Access-Control-Allow-Origin: *\r\n\
            Content-Length: 0\r\n\
            \r\n"
            .to_string();
    }

    let view = GameSnapshotView::from(store.snapshot().as_ref());
    let body = serde_json::to_string(&view).unwrap_or_else(|_| "null".to_string());

    format!(
        "HTTP/1.1 200 OK\r\n\
        Content-Type: application/json\r\n\
        Access-Control-Allow-Origin: *\r\n\
        Content-Length: {}\r\n\
        \r\n\
        {}",
        body.len(),
        body,
    )
}
