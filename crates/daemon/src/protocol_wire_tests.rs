// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tokio::io::BufReader;

#[tokio::test]
async fn request_round_trips_over_a_duplex_pipe() {
    let (client, server) = tokio::io::duplex(4096);
    let (server_read, _server_write) = tokio::io::split(server);
    let (_client_read, mut client_write) = tokio::io::split(client);

    write_request(&mut client_write, &Request::Ping, DEFAULT_TIMEOUT)
        .await
        .unwrap();

    let mut reader = BufReader::new(server_read);
    let req = read_request(&mut reader, DEFAULT_TIMEOUT).await.unwrap();
    assert_eq!(req, Request::Ping);
}

#[tokio::test]
async fn response_round_trips_over_a_duplex_pipe() {
    let (client, server) = tokio::io::duplex(4096);
    let (client_read, _client_write) = tokio::io::split(client);
    let (_server_read, mut server_write) = tokio::io::split(server);

    write_response(&mut server_write, &Response::err("nope"), DEFAULT_TIMEOUT)
        .await
        .unwrap();

    let mut reader = BufReader::new(client_read);
    let resp = read_response(&mut reader, DEFAULT_TIMEOUT).await.unwrap();
    assert_eq!(resp, Response::err("nope"));
}

#[tokio::test]
async fn closed_connection_is_reported() {
    let (client, server) = tokio::io::duplex(64);
    drop(client);
    let (server_read, _) = tokio::io::split(server);
    let mut reader = BufReader::new(server_read);

    let err = read_request(&mut reader, DEFAULT_TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn slow_peer_times_out() {
    let (_client, server) = tokio::io::duplex(64);
    let (server_read, _) = tokio::io::split(server);
    let mut reader = BufReader::new(server_read);

    let err = read_request(&mut reader, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));
}

#[tokio::test]
async fn oversized_line_is_rejected() {
    let (client, server) = tokio::io::duplex(MAX_LINE_BYTES * 2 + 64);
    let (server_read, _server_write) = tokio::io::split(server);
    let (_client_read, mut client_write) = tokio::io::split(client);

    let writer = tokio::spawn(async move {
        use tokio::io::AsyncWriteExt;
        let big = vec![b'x'; MAX_LINE_BYTES + 16];
        let _ = client_write.write_all(&big).await;
        let _ = client_write.write_all(b"\n").await;
    });

    let mut reader = BufReader::new(server_read);
    let err = read_request(&mut reader, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge));
    writer.abort();
}

#[tokio::test]
async fn garbage_line_is_a_json_error() {
    let (client, server) = tokio::io::duplex(256);
    let (server_read, _server_write) = tokio::io::split(server);
    let (_client_read, mut client_write) = tokio::io::split(client);

    use tokio::io::AsyncWriteExt;
    client_write.write_all(b"not json\n").await.unwrap();

    let mut reader = BufReader::new(server_read);
    let err = read_request(&mut reader, DEFAULT_TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Json(_)));
}
