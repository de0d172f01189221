//! Local WebSocket server for transport tests.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;

// ============================================================================
// TestServer
// ============================================================================

/// A WebSocket server bound to `127.0.0.1` on a random port.
pub(crate) struct TestServer {
    listener: TcpListener,
    port: u16,
}

impl TestServer {
    /// Binds to a random port.
    pub(crate) async fn bind() -> Self {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let listener = TcpListener::bind(addr).await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        Self { listener, port }
    }

    /// Returns a URL nothing listens on.
    pub(crate) async fn unused_ws_url() -> String {
        let server = Self::bind().await;
        let url = server.ws_url();
        drop(server);
        url
    }

    /// Returns the WebSocket URL for this server.
    pub(crate) fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Accepts one client, echoing its requested sub-protocol.
    pub(crate) async fn accept(&self) -> WebSocketStream<TcpStream> {
        let (stream, _) = self.listener.accept().await.expect("accept");
        tokio_tungstenite::accept_hdr_async(stream, echo_sub_protocol)
            .await
            .expect("handshake")
    }
}

/// Handshake callback that agrees to whatever sub-protocol was offered.
fn echo_sub_protocol(request: &Request, mut response: Response) -> Result<Response, ErrorResponse> {
    if let Some(protocol) = request.headers().get(SEC_WEBSOCKET_PROTOCOL) {
        response
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, protocol.clone());
    }
    Ok(response)
}
