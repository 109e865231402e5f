//! HTTPS server for the admission webhook.
//!
//! The API server only talks TLS to webhooks, so the listener always wraps
//! accepted connections in a handshake before handing them to axum. A
//! failed handshake drops that connection and keeps accepting.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::serve::Listener;
use axum::{Json, Router};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::Duration;
use tokio_rustls::{server::TlsStream, TlsAcceptor};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::interceptor::IngressInterceptor;
use super::review::AdmissionReview;
use crate::config::{AdmissionConfig, AdmissionTlsConfig};
use crate::errors::Error;
use crate::utils::certificates::{load_certificate_bundle, CertificateInfo};

/// Router serving the webhook endpoint.
pub fn build_router(interceptor: IngressInterceptor) -> Router {
    Router::new()
        .route("/mutate", post(mutate))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(interceptor))
}

async fn mutate(
    State(interceptor): State<Arc<IngressInterceptor>>,
    Json(review): Json<AdmissionReview>,
) -> Response {
    match review.request {
        Some(request) => {
            let response = interceptor.review(&request).await;
            Json(AdmissionReview::response(response)).into_response()
        }
        None => (StatusCode::BAD_REQUEST, "admission review has no request").into_response(),
    }
}

/// Bind the webhook listener and serve until the shutdown signal fires.
pub async fn start_admission_server(
    config: AdmissionConfig,
    interceptor: IngressInterceptor,
    mut shutdown: watch::Receiver<bool>,
) -> crate::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| Error::config(format!("Invalid admission address: {}", e)))?;

    let router = build_router(interceptor);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind admission server: {}", e)))?;

    let (acceptor, certificate_info) = configure_tls_acceptor(&config.tls)?;
    info!(
        address = %addr,
        subject = %certificate_info.subject,
        expires_at = %certificate_info.not_after,
        "Starting admission webhook server"
    );

    let tls_listener = TlsListener::new(listener, acceptor);
    axum::serve(tls_listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
        .map_err(|e| Error::transport(format!("Admission server error: {}", e)))?;

    info!("Admission server shutdown completed");
    Ok(())
}

fn configure_tls_acceptor(tls: &AdmissionTlsConfig) -> crate::Result<(TlsAcceptor, CertificateInfo)> {
    let cert_path = tls.cert_path();
    let key_path = tls.key_path();
    let bundle = load_certificate_bundle(&cert_path, &key_path)
        .map_err(|err| Error::config(format!("TLS configuration error: {err}")))?;

    let mut cert_chain = Vec::with_capacity(1 + bundle.intermediates.len());
    cert_chain.push(bundle.leaf.clone());
    cert_chain.extend(bundle.intermediates.clone());

    let provider = rustls::crypto::ring::default_provider();
    let builder = rustls::ServerConfig::builder_with_provider(provider.into())
        .with_safe_default_protocol_versions()
        .map_err(|err| Error::config(format!("Invalid TLS protocol configuration: {err}")))?;

    let server_config = builder
        .with_no_client_auth()
        .with_single_cert(cert_chain, bundle.private_key.clone_key())
        .map_err(|err| Error::config(format!("Failed to load TLS certificate: {err}")))?;

    let info = bundle.info.clone();
    Ok((TlsAcceptor::from(Arc::new(server_config)), info))
}

struct TlsListener {
    listener: TcpListener,
    acceptor: TlsAcceptor,
}

impl TlsListener {
    fn new(listener: TcpListener, acceptor: TlsAcceptor) -> Self {
        Self { listener, acceptor }
    }
}

impl Listener for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => match self.acceptor.accept(stream).await {
                    Ok(tls_stream) => return (tls_stream, addr),
                    Err(err) => {
                        warn!(error = %err, %addr, "TLS handshake failed");
                        continue;
                    }
                },
                Err(err) => {
                    if is_connection_error(&err) {
                        continue;
                    }
                    error!("Webhook accept error: {err}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    fn local_addr(&self) -> std::io::Result<Self::Addr> {
        self.listener.local_addr()
    }
}

fn is_connection_error(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
    )
}
