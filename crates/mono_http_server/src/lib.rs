use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::thread;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;

pub struct MonoRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub remote_addr: Option<String>,
}

pub struct MonoResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct MonoHttpError {
    pub message: String,
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<MonoResponse, MonoHttpError>> + Send>>;
pub type Handler = Arc<dyn Fn(MonoRequest) -> HandlerFuture + Send + Sync>;

/// A running server. The tokio runtime lives on a dedicated thread; `stop`
/// shuts it down, `wait` blocks until it exits.
pub struct ServerHandle {
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    join_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ServerHandle {
    pub fn stop(&self) -> Result<(), MonoHttpError> {
        if let Ok(mut guard) = self.shutdown_tx.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
        self.wait()
    }

    pub fn wait(&self) -> Result<(), MonoHttpError> {
        if let Ok(mut guard) = self.join_handle.lock() {
            if let Some(handle) = guard.take() {
                handle.join().map_err(|_| MonoHttpError {
                    message: "server thread panicked".to_string(),
                })?;
            }
        }
        Ok(())
    }
}

pub fn start_server(addr: SocketAddr, handler: Handler) -> Result<ServerHandle, MonoHttpError> {
    let worker_threads = std::thread::available_parallelism()
        .map(|value| value.get())
        .unwrap_or(1);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .map_err(|err| MonoHttpError {
            message: err.to_string(),
        })?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let join_handle = thread::spawn(move || {
        run_server(runtime, addr, handler, shutdown_rx);
    });

    Ok(ServerHandle {
        shutdown_tx: Mutex::new(Some(shutdown_tx)),
        join_handle: Mutex::new(Some(join_handle)),
    })
}

fn run_server(
    runtime: Runtime,
    addr: SocketAddr,
    handler: Handler,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let server_future = async move {
        let listener = match TcpListener::bind(addr).await {
            Ok(value) => value,
            Err(_) => return,
        };
        let mut shutdown_rx = shutdown_rx;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                accept = listener.accept() => {
                    let (stream, remote_addr) = match accept {
                        Ok(value) => value,
                        Err(_) => continue,
                    };
                    let handler = handler.clone();
                    let service = service_fn(move |req| {
                        let handler = handler.clone();
                        async move { handle_request(req, remote_addr, handler).await }
                    });
                    tokio::spawn(async move {
                        let mut builder = auto::Builder::new(TokioExecutor::new());
                        builder.http1().keep_alive(true);
                        let conn = builder.serve_connection(TokioIo::new(stream), service);
                        let _ = conn.await;
                    });
                }
            }
        }
    };

    runtime.block_on(server_future);
}

async fn handle_request(
    req: Request<Incoming>,
    remote_addr: SocketAddr,
    handler: Handler,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let body_bytes = body.collect().await?.to_bytes();

    let request = match build_request(&parts, body_bytes, Some(remote_addr.to_string())) {
        Ok(value) => value,
        Err(err) => {
            let mut response = Response::new(Full::from(Bytes::from(err.message)));
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return Ok(response);
        }
    };

    match handler(request).await {
        Ok(response) => match convert_response(response) {
            Ok(response) => Ok(response),
            Err(err) => {
                let mut response = Response::new(Full::from(Bytes::from(err.message)));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                Ok(response)
            }
        },
        Err(err) => {
            let mut response = Response::new(Full::from(Bytes::from(err.message)));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            Ok(response)
        }
    }
}

fn build_request(
    parts: &hyper::http::request::Parts,
    body: Bytes,
    remote_addr: Option<String>,
) -> Result<MonoRequest, MonoHttpError> {
    let method = parts.method.as_str().to_string();
    let path = parts
        .uri
        .path_and_query()
        .map(|value| value.path().to_string())
        .unwrap_or_else(|| "/".to_string());
    let headers = headers_to_vec(&parts.headers)?;
    Ok(MonoRequest {
        method,
        path,
        headers,
        body: body.to_vec(),
        remote_addr,
    })
}

fn headers_to_vec(
    headers: &hyper::HeaderMap<hyper::header::HeaderValue>,
) -> Result<Vec<(String, String)>, MonoHttpError> {
    let mut out = Vec::new();
    for (name, value) in headers.iter() {
        let value = value.to_str().map_err(|_| MonoHttpError {
            message: "invalid header value".to_string(),
        })?;
        out.push((name.as_str().to_string(), value.to_string()));
    }
    Ok(out)
}

fn convert_response(response: MonoResponse) -> Result<Response<Full<Bytes>>, MonoHttpError> {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    {
        let headers = builder.headers_mut().ok_or_else(|| MonoHttpError {
            message: "failed to access headers".to_string(),
        })?;
        for (name, value) in response.headers {
            let name = hyper::header::HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                MonoHttpError {
                    message: "invalid header name".to_string(),
                }
            })?;
            let value =
                hyper::header::HeaderValue::from_str(&value).map_err(|_| MonoHttpError {
                    message: "invalid header value".to_string(),
                })?;
            headers.append(name, value);
        }
    }
    builder
        .body(Full::from(Bytes::from(response.body)))
        .map_err(|_| MonoHttpError {
            message: "invalid response body".to_string(),
        })
}
