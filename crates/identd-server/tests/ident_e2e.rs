//! End-to-end tests driving a real TCP listener on loopback.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use identd_core::owner::OwnerId;
use identd_server::{IdentConfig, IdentService, ListenerStatus};
use identd_test_utils::{MockDirectory, MockOwner, addressing};

fn loopback_config() -> IdentConfig {
    IdentConfig::new()
        .with_bind_addr("127.0.0.1".parse().unwrap())
        .with_port(0)
        .with_read_timeout(Duration::from_secs(5))
}

async fn listening_addr(service: &IdentService) -> SocketAddr {
    match service.status().await.listener {
        ListenerStatus::Listening(addr) => addr,
        other => panic!("listener not up: {other:?}"),
    }
}

/// One full wire exchange: connect, send the line, read until the responder
/// closes.
async fn query(addr: SocketAddr, line: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(line.as_bytes()).await.unwrap();
    let mut reply = String::new();
    stream.read_to_string(&mut reply).await.unwrap();
    reply
}

#[tokio::test]
async fn end_to_end_userid() {
    let directory = MockDirectory::new();
    directory.push(MockOwner::connected(
        1,
        "alice/net1",
        "alice",
        addressing("127.0.0.1", 54321, "127.0.0.1", 6667),
    ));
    let service = IdentService::new(loopback_config(), directory);

    service
        .register(MockOwner::new(1, "alice/net1", "alice"))
        .await;
    let addr = listening_addr(&service).await;

    let reply = query(addr, "54321, 6667\r\n").await;
    assert_eq!(reply, "54321, 6667 : USERID : UNIX : alice\r\n");

    service.unregister(OwnerId(1)).await;
}

#[tokio::test]
async fn no_user_over_the_wire() {
    let service = IdentService::new(loopback_config(), MockDirectory::new());
    service.register(MockOwner::new(1, "alice/net1", "alice")).await;
    let addr = listening_addr(&service).await;

    let reply = query(addr, "4321, 113\r\n").await;
    assert_eq!(reply, "4321, 113 : ERROR : NO-USER\r\n");

    service.unregister(OwnerId(1)).await;
}

#[tokio::test]
async fn invalid_port_over_the_wire() {
    let service = IdentService::new(loopback_config(), MockDirectory::new());
    service.register(MockOwner::new(1, "alice/net1", "alice")).await;
    let addr = listening_addr(&service).await;

    let reply = query(addr, "notaport,7\r\n").await;
    assert_eq!(reply, "0, 0 : ERROR : INVALID-PORT\r\n");

    service.unregister(OwnerId(1)).await;
}

#[tokio::test]
async fn lookup_scope_is_the_whole_directory() {
    // The registry gates listener lifecycle only; the matching scan covers
    // every owner the directory knows, registered or not.
    let directory = MockDirectory::new();
    directory.push(MockOwner::connected(
        7,
        "carol/net2",
        "carol",
        addressing("127.0.0.1", 40000, "127.0.0.1", 6697),
    ));
    let service = IdentService::new(loopback_config(), directory);

    // A different owner holds the listener open.
    service.register(MockOwner::new(1, "alice/net1", "alice")).await;
    let addr = listening_addr(&service).await;

    let reply = query(addr, "40000, 6697\r\n").await;
    assert_eq!(reply, "40000, 6697 : USERID : UNIX : carol\r\n");

    service.unregister(OwnerId(1)).await;
}

#[tokio::test]
async fn each_connection_serves_exactly_one_query() {
    let directory = MockDirectory::new();
    directory.push(MockOwner::connected(
        1,
        "alice/net1",
        "alice",
        addressing("127.0.0.1", 54321, "127.0.0.1", 6667),
    ));
    let service = IdentService::new(loopback_config(), directory);
    service.register(MockOwner::new(1, "alice/net1", "alice")).await;
    let addr = listening_addr(&service).await;

    let first = query(addr, "54321, 6667\r\n").await;
    let second = query(addr, "1, 2\r\n").await;
    assert_eq!(first, "54321, 6667 : USERID : UNIX : alice\r\n");
    assert_eq!(second, "1, 2 : ERROR : NO-USER\r\n");

    service.unregister(OwnerId(1)).await;
}

#[tokio::test]
async fn concurrent_queries_get_independent_replies() {
    let directory = MockDirectory::new();
    directory.push(MockOwner::connected(
        1,
        "alice/net1",
        "alice",
        addressing("127.0.0.1", 54321, "127.0.0.1", 6667),
    ));
    let service = Arc::new(IdentService::new(loopback_config(), directory));
    service.register(MockOwner::new(1, "alice/net1", "alice")).await;
    let addr = listening_addr(&service).await;

    let mut tasks = Vec::new();
    for i in 0..10u16 {
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                let reply = query(addr, "54321, 6667\r\n").await;
                assert_eq!(reply, "54321, 6667 : USERID : UNIX : alice\r\n");
            } else {
                let reply = query(addr, &format!("{i}, 9\r\n")).await;
                assert_eq!(reply, format!("{i}, 9 : ERROR : NO-USER\r\n"));
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    service.unregister(OwnerId(1)).await;
}

#[tokio::test]
async fn listener_closes_after_last_unregister() {
    let service = IdentService::new(loopback_config(), MockDirectory::new());
    service.register(MockOwner::new(1, "alice/net1", "alice")).await;
    let addr = listening_addr(&service).await;

    // Reachable while registered.
    let probe = TcpStream::connect(addr).await;
    assert!(probe.is_ok());
    drop(probe);

    service.unregister(OwnerId(1)).await;

    // Socket teardown happens when the aborted accept task is dropped.
    let mut closed = false;
    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_err() {
            closed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(closed, "listener still accepting after last unregister");
}

#[tokio::test]
async fn admin_status_reflects_wire_traffic() {
    let directory = MockDirectory::new();
    directory.push(MockOwner::connected(
        1,
        "alice/net1",
        "alice",
        addressing("127.0.0.1", 54321, "127.0.0.1", 6667),
    ));
    let service = IdentService::new(loopback_config(), directory);
    service.register(MockOwner::new(1, "alice/net1", "alice")).await;
    let addr = listening_addr(&service).await;

    query(addr, "54321, 6667\r\n").await;

    let lines = service.admin_command("status", true).await;
    assert!(
        lines
            .iter()
            .any(|l| l == "Last IDENT request: 54321, 6667 from 127.0.0.1 on 127.0.0.1")
    );
    assert!(
        lines
            .iter()
            .any(|l| l == "Last IDENT reply: 54321, 6667 : USERID : UNIX : alice")
    );

    service.unregister(OwnerId(1)).await;
}
