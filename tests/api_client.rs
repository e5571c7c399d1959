use price_compare::api::{ApiClient, PriceApi};
use price_compare::config::AppConfig;
use price_compare::model::ApiError;

use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the backend saw of one request.
#[derive(Debug)]
struct Received {
    method: String,
    target: String,
    headers: HashMap<String, String>,
    body: String,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

/// Serves exactly one HTTP/1.1 exchange on a loopback port and hands back
/// the request it got.
async fn serve_once(status: u16, reply: &'static str) -> (String, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = find_header_end(&buf) {
                break end;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap().split(' ');
        let method = request_line.next().unwrap().to_string();
        let target = request_line.next().unwrap().to_string();
        let headers: HashMap<String, String> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        let body_len: usize = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        while buf.len() < header_end + body_len {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8(buf[header_end..header_end + body_len].to_vec()).unwrap();

        let reason = if status == 200 { "OK" } else { "Error" };
        let response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{reply}",
            reply.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        Received {
            method,
            target,
            headers,
            body,
        }
    });

    (base_url, handle)
}

fn client_for(base_url: &str) -> ApiClient {
    let config = AppConfig {
        api_base_url: format!("{base_url}/"),
        request_timeout_seconds: 5,
        ..AppConfig::default()
    };
    ApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn search_encodes_query_and_sends_ngrok_header() {
    let (base_url, server) = serve_once(
        200,
        r#"[{ "title": "Apple iPhone 15", "site": "Amazon", "price": 79999.6 }]"#,
    )
    .await;

    let results = client_for(&base_url).search("iphone 15 & case").await.unwrap();
    let seen = server.await.unwrap();

    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/api/search?query=iphone+15+%26+case");
    assert_eq!(seen.header("ngrok-skip-browser-warning"), Some("true"));
    assert!(seen.header("user-agent").unwrap().starts_with("price-compare/"));
    assert_eq!(results.query, "iphone 15 & case");
    assert_eq!(results.listings[0].id, "Amazon-apple-iphone15-79999");
}

#[tokio::test]
async fn track_posts_listing_in_api_shape() {
    let (search_url, search_server) = serve_once(
        200,
        r#"[{ "title": "Pixel 8", "site": "Flipkart", "price": 50000 }]"#,
    )
    .await;
    let listing = client_for(&search_url)
        .search("pixel")
        .await
        .unwrap()
        .listings
        .remove(0);
    search_server.await.unwrap();

    let (base_url, server) = serve_once(200, r#"{ "success": true, "message": "ok" }"#).await;
    let ack = client_for(&base_url).track(&listing).await.unwrap();
    let seen = server.await.unwrap();

    assert!(ack.success);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.target, "/api/track");
    assert_eq!(seen.header("content-type"), Some("application/json"));
    let body = seen.json();
    assert_eq!(body["id"], "Flipkart-pixel-8-50000");
    assert_eq!(body["title"], "Pixel 8");
    assert_eq!(body["price"], 50000.0);
    assert!(body.get("baseProductId").is_none());
}

#[tokio::test]
async fn untrack_posts_product_id() {
    let (base_url, server) = serve_once(200, r#"{ "success": true, "message": "ok" }"#).await;

    let ack = client_for(&base_url)
        .untrack("Amazon-apple-iphone15-79999")
        .await
        .unwrap();
    let seen = server.await.unwrap();

    assert!(ack.success);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.target, "/api/untrack");
    assert_eq!(seen.header("content-type"), Some("application/json"));
    assert_eq!(seen.header("ngrok-skip-browser-warning"), Some("true"));
    assert_eq!(
        seen.json(),
        json!({ "productId": "Amazon-apple-iphone15-79999" })
    );
}

#[tokio::test]
async fn price_alert_posts_product_id_and_target() {
    let (base_url, server) = serve_once(200, r#"{ "message": "alert saved" }"#).await;

    let ack = client_for(&base_url)
        .set_price_alert("Flipkart-pixel-8-50000", 45000.0)
        .await
        .unwrap();
    let seen = server.await.unwrap();

    assert!(ack.success);
    assert_eq!(ack.message, "alert saved");
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.target, "/api/price-alert");
    assert_eq!(
        seen.json(),
        json!({ "productId": "Flipkart-pixel-8-50000", "targetPrice": 45000.0 })
    );
}

#[tokio::test]
async fn tracked_keeps_server_ids() {
    let (base_url, server) = serve_once(
        200,
        r#"[{ "id": "srv-7", "title": "Pixel 8", "site": "Flipkart", "price": 1 }]"#,
    )
    .await;

    let listings = client_for(&base_url).tracked().await.unwrap();
    let seen = server.await.unwrap();

    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/api/tracked");
    assert_eq!(listings[0].id, "srv-7");
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let (base_url, server) = serve_once(500, r#"{ "error": "boom" }"#).await;

    let err = client_for(&base_url).tracked().await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ApiError::Status(500)), "got {err:?}");
}

#[tokio::test]
async fn non_json_body_maps_to_decode() {
    let (base_url, server) = serve_once(200, "<html>maintenance</html>").await;

    let err = client_for(&base_url).untrack("x").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}
