//! End-to-end exchanges over real sockets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pnp_server::client::PnpClient;
use pnp_server::protocol::{self, status, Method, Request, Response};
use pnp_server::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

fn health_router() -> Router {
    let mut router = Router::new();
    router.get("/health", |_: &Request, res: &mut Response| {
        res.set_status(status::OK).set_body("ok");
    });
    router
}

#[tokio::test]
async fn test_health_scenario() {
    let server = common::start_server(health_router()).await;
    let mut client = PnpClient::connect(server.addr, common::test_codec()).await.unwrap();

    let reply = client
        .exchange(br#"{"method":"get","path":"/health","headers":{},"body":""}"#)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&reply).unwrap();

    assert_eq!(value, serde_json::json!({"status": 200, "headers": {}, "body": "ok"}));
}

#[tokio::test]
async fn test_missing_route_scenario() {
    let server = common::start_server(Router::new()).await;
    let mut client = PnpClient::connect(server.addr, common::test_codec()).await.unwrap();

    let res = client.send(&Request::new(Method::Post, "/missing")).await.unwrap();

    assert_eq!(res.status, 404);
    assert_eq!(res.body, "Not Found");
}

#[tokio::test]
async fn test_handler_invoked_once_per_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut router = Router::new();
    router.post("/items", move |req: &Request, res: &mut Response| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        res.set_status(status::OK)
            .set_header("x-count", n.to_string())
            .set_body(format!("created {}", req.body));
    });

    let server = common::start_server(router).await;
    let mut client = PnpClient::connect(server.addr, common::test_codec()).await.unwrap();

    let res = client
        .send(&Request::new(Method::Post, "/items").with_body("apple"))
        .await
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(res.body, "created apple");
    assert_eq!(res.headers["x-count"], "1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_requests_on_one_connection_answered_in_order() {
    let mut router = Router::new();
    router.get("/echo", |req: &Request, res: &mut Response| {
        res.set_status(status::OK).set_body(req.header("seq").unwrap_or_default());
    });

    let server = common::start_server(router).await;
    let mut client = PnpClient::connect(server.addr, common::test_codec()).await.unwrap();

    for seq in 0..20 {
        let req = Request::new(Method::Get, "/echo").with_header("seq", seq.to_string());
        let res = client.send(&req).await.unwrap();
        assert_eq!(res.body, seq.to_string());
    }
}

#[tokio::test]
async fn test_pipelined_frames_answered_first_in_first_out() {
    let mut router = Router::new();
    router.get("/echo", |req: &Request, res: &mut Response| {
        res.set_status(status::OK).set_body(req.header("seq").unwrap_or_default());
    });

    let server = common::start_server(router).await;
    let codec = common::test_codec();
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.set_nodelay(true).unwrap();

    // Write every frame before reading anything back. The pauses keep each
    // frame in its own read on the server side.
    let count = 5;
    for seq in 0..count {
        let req = Request::new(Method::Get, "/echo").with_header("seq", seq.to_string());
        let frame = codec.encrypt(&protocol::encode_request(&req).unwrap()).unwrap();
        stream.write_all(&frame).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // Single-digit bodies make every reply frame the same length.
    let mut sample = Response::default();
    sample.set_status(status::OK).set_body("0");
    let reply_len = codec.encrypt(&protocol::encode(&sample).unwrap()).unwrap().len();

    let mut bodies = Vec::new();
    for _ in 0..count {
        let mut frame = vec![0u8; reply_len];
        tokio::time::timeout(Duration::from_secs(2), stream.read_exact(&mut frame))
            .await
            .expect("reply did not arrive")
            .unwrap();
        let res = protocol::decode_response(&codec.decrypt(&frame).unwrap()).unwrap();
        assert_eq!(res.status, 200);
        bodies.push(res.body);
    }

    assert_eq!(bodies, vec!["0", "1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_re_registered_route_uses_latest_handler() {
    let mut router = Router::new();
    router
        .get("/version", |_: &Request, res: &mut Response| {
            res.set_status(status::OK).set_body("v1");
        })
        .get("/version", |_: &Request, res: &mut Response| {
            res.set_status(status::OK).set_body("v2");
        });

    let server = common::start_server(router).await;
    let mut client = PnpClient::connect(server.addr, common::test_codec()).await.unwrap();

    let res = client.send(&Request::new(Method::Get, "/version")).await.unwrap();
    assert_eq!(res.body, "v2");
}

#[tokio::test]
async fn test_concurrent_connections() {
    let server = common::start_server(health_router()).await;

    let concurrency = 16;
    let requests_per_task = 10;
    let mut tasks = Vec::new();

    for _ in 0..concurrency {
        let addr = server.addr;
        tasks.push(tokio::spawn(async move {
            let mut client = PnpClient::connect(addr, common::test_codec()).await.unwrap();
            let mut ok = 0;
            for _ in 0..requests_per_task {
                let res = client.send(&Request::new(Method::Get, "/health")).await.unwrap();
                if res.status == 200 {
                    ok += 1;
                }
            }
            ok
        }));
    }

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }
    assert_eq!(total, concurrency * requests_per_task);
}
