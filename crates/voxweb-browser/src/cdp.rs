//! Minimal Chrome DevTools Protocol client.
//!
//! One WebSocket connection attached to one page target. Commands are
//! correlated to responses by id through a pending map; events are not
//! consumed - the driver polls page state via `Runtime.evaluate` instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use voxweb_protocols::error::BrowserError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, BrowserError>>>>>;

const CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct BrowserVersion {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
    #[serde(rename = "Browser", default)]
    browser: String,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct CdpMessage {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<CdpErrorBody>,
    method: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdpErrorBody {
    code: i64,
    message: String,
}

/// A CDP connection attached to a single page session.
pub(crate) struct CdpConnection {
    ws_tx: tokio::sync::Mutex<WsSink>,
    pending: Pending,
    next_id: AtomicU64,
    session_id: String,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpConnection {
    /// Connect to a Chrome debugging endpoint and attach to a page target,
    /// creating one if the browser has none open.
    pub(crate) async fn connect(endpoint: &str) -> Result<Self, BrowserError> {
        let version_url = format!("{}/json/version", endpoint);
        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| BrowserError::ConnectionFailed(format!("{}: {}", endpoint, e)))?;
        debug!("Connected to browser: {}", version.browser);

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| BrowserError::ConnectionFailed(format!("WebSocket: {}", e)))?;
        let (ws_sink, ws_source) = ws_stream.split();

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        let mut conn = Self {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            pending,
            next_id: AtomicU64::new(1),
            session_id: String::new(),
            recv_task,
        };

        let target_id = Self::find_page_target(endpoint).await?;
        let result = conn
            .send(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
                None,
            )
            .await?;
        conn.session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| BrowserError::ConnectionFailed("missing sessionId".to_string()))?
            .to_string();

        conn.call("Page.enable", None).await?;
        conn.call("Runtime.enable", None).await?;
        debug!(session = %conn.session_id, "Attached to page target");

        Ok(conn)
    }

    /// Pick the first open page, or open a blank one.
    async fn find_page_target(endpoint: &str) -> Result<String, BrowserError> {
        let pages: Vec<PageInfo> = reqwest::get(format!("{}/json/list", endpoint))
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        if let Some(page) = pages.into_iter().find(|p| p.kind == "page") {
            debug!(url = %page.url, "Reusing open page");
            return Ok(page.id);
        }

        // Chrome requires PUT for /json/new
        let page: PageInfo = reqwest::Client::new()
            .put(format!("{}/json/new", endpoint))
            .send()
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        Ok(page.id)
    }

    async fn receive_loop(mut ws_source: WsSource, pending: Pending) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpMessage>(&text) {
                        Ok(parsed) => {
                            if let Some(id) = parsed.id {
                                if let Some(tx) = pending.lock().remove(&id) {
                                    let result = match parsed.error {
                                        Some(e) => Err(BrowserError::Protocol {
                                            code: e.code,
                                            message: e.message,
                                        }),
                                        None => Ok(parsed.result.unwrap_or(Value::Null)),
                                    };
                                    let _ = tx.send(result);
                                }
                            } else if let Some(method) = parsed.method {
                                trace!("CDP event: {}", method);
                            }
                        }
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Send a command within the attached page session.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, BrowserError> {
        let session = self.session_id.clone();
        self.send(method, params, Some(&session)).await
    }

    async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, BrowserError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let mut request = json!({"id": id, "method": method});
        if let Some(params) = params {
            request["params"] = params;
        }
        if let Some(session) = session_id {
            if !session.is_empty() {
                request["sessionId"] = json!(session);
            }
        }

        let payload = request.to_string();
        trace!("CDP send: {}", payload);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(payload.into()))
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BrowserError::ConnectionFailed("connection closed".to_string())),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(BrowserError::Timeout(method.to_string()))
            }
        }
    }

    /// Evaluate a JavaScript expression and return its value.
    pub(crate) async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let description = details["exception"]["description"]
                .as_str()
                .unwrap_or("JavaScript exception");
            return Err(BrowserError::ActionFailed(description.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Navigate the attached page.
    pub(crate) async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let result = self.call("Page.navigate", Some(json!({"url": url}))).await?;
        if let Some(err) = result.get("errorText").and_then(|v| v.as_str()) {
            if !err.is_empty() {
                return Err(BrowserError::NavigationFailed(err.to_string()));
            }
        }
        Ok(())
    }

    /// Capture a PNG screenshot; `beyond_viewport` covers the full document.
    pub(crate) async fn capture_png(&self, beyond_viewport: bool) -> Result<Vec<u8>, BrowserError> {
        let result = self
            .call(
                "Page.captureScreenshot",
                Some(json!({
                    "format": "png",
                    "captureBeyondViewport": beyond_viewport,
                })),
            )
            .await?;
        let data = result["data"]
            .as_str()
            .ok_or_else(|| BrowserError::ActionFailed("screenshot data missing".to_string()))?;
        BASE64
            .decode(data)
            .map_err(|e| BrowserError::ActionFailed(format!("screenshot decode: {}", e)))
    }
}

impl Drop for CdpConnection {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
