//! Integration tests for the transport layer
//!
//! These tests exercise the one-shot session against real sockets bound to
//! an ephemeral local port.

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::protocol::CameleonError;
    use crate::transport::{framing, TcpTransport};

    /// Accept one connection, capture the framed request, answer with
    /// `reply` (already a complete packet), then report whether the client
    /// closed its end.
    async fn one_shot_peer(
        listener: TcpListener,
        reply: Vec<u8>,
    ) -> tokio::task::JoinHandle<(Vec<u8>, bool)> {
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut header = [0u8; framing::HEADER_LEN];
            socket.read_exact(&mut header).await.unwrap();
            let total: usize = std::str::from_utf8(&header).unwrap().parse().unwrap();
            let mut body = vec![0u8; total - framing::HEADER_LEN];
            socket.read_exact(&mut body).await.unwrap();

            socket.write_all(&reply).await.unwrap();
            socket.flush().await.unwrap();

            // A clean EOF here means the client closed the connection.
            let mut probe = [0u8; 1];
            let closed = matches!(socket.read(&mut probe).await, Ok(0));
            (body, closed)
        })
    }

    #[tokio::test]
    async fn execute_round_trips_one_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let reply = framing::frame(b"pong").unwrap();
        let peer = one_shot_peer(listener, reply).await;

        let transport = TcpTransport::new();
        let response = transport.execute(&addr, b"ping").await.unwrap();
        assert_eq!(response, b"pong");

        let (request, closed) = peer.await.unwrap();
        assert_eq!(request, b"ping");
        assert!(closed, "client must close the connection after the exchange");
    }

    #[tokio::test]
    async fn connection_refused_is_a_connection_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let transport = TcpTransport::new();
        let err = transport.execute(&addr, b"ping").await.unwrap_err();
        assert!(matches!(err, CameleonError::Connection(_)));
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_connection_error() {
        let transport = TcpTransport::new();
        let err = transport
            .execute("no-such-host.invalid:1403", b"ping")
            .await
            .unwrap_err();
        assert!(matches!(err, CameleonError::Connection(_)));
    }

    #[tokio::test]
    async fn malformed_reply_header_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let peer = one_shot_peer(listener, b"not-digits".to_vec()).await;

        let transport = TcpTransport::new();
        let err = transport.execute(&addr, b"ping").await.unwrap_err();
        assert!(matches!(err, CameleonError::MalformedHeader(_)));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn truncated_reply_body_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        // Header promises 90 body bytes; the peer hangs up after 5.
        let peer = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; framing::frame(b"ping").unwrap().len()];
            socket.read_exact(&mut request).await.unwrap();
            socket.write_all(b"0000000100short").await.unwrap();
            socket.flush().await.unwrap();
        });

        let transport = TcpTransport::new();
        let err = transport.execute(&addr, b"ping").await.unwrap_err();
        assert!(matches!(err, CameleonError::TruncatedBody { .. }));
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn calls_may_run_concurrently() {
        let mut handles = Vec::new();
        for _ in 0..4 {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap().to_string();
            let reply = framing::frame(b"pong").unwrap();
            let peer = one_shot_peer(listener, reply).await;
            handles.push((addr, peer));
        }

        let transport = std::sync::Arc::new(TcpTransport::new());
        let mut calls = Vec::new();
        for (addr, _) in &handles {
            let transport = transport.clone();
            let addr = addr.clone();
            calls.push(tokio::spawn(
                async move { transport.execute(&addr, b"ping").await },
            ));
        }

        for call in calls {
            assert_eq!(call.await.unwrap().unwrap(), b"pong");
        }
    }
}
