//! Server runner: wires the dispatch loop, registry and router together.

use std::sync::Arc;

use tokio::{net::TcpListener, sync::mpsc};

use crate::{
    config::ServerConfig,
    error::ServerError,
    infrastructure::registry::ConnectionRegistry,
    signal::shutdown_signal,
    ui::{AppState, build_router},
    usecase::{DispatchLoop, SubmitMessageUseCase},
};

/// Bind the configured address and serve until Ctrl-C / SIGTERM.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// Also returns when the dispatch loop stops with an error, which only happens
/// under the `halt` log failure policy.
pub async fn serve<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let log = config.open_message_log().await?;
    let log_name = log.name().to_string();
    let registry = ConnectionRegistry::with_send_timeout(config.send_timeout());
    let (tx, rx) = mpsc::channel(config.queue_capacity.get());

    let dispatch = DispatchLoop::new(
        log.clone(),
        registry.clone(),
        rx,
        config.log_failure_policy,
    );
    let state = Arc::new(AppState {
        registry,
        log,
        submitter: SubmitMessageUseCase::new(tx),
        history_limit: config.history_limit,
        allowed_origins: config.allowed_origins.clone(),
    });
    let app = build_router(state, &config.public_dir);

    let local_addr = listener.local_addr().map_err(ServerError::Serve)?;
    tracing::info!(
        addr = %local_addr,
        public_dir = %config.public_dir.display(),
        message_log = %log_name,
        "Server running"
    );

    let mut dispatch_task = tokio::spawn(dispatch.run());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(ServerError::Serve)?;
            tracing::info!("Server stopped");
        }
        result = &mut dispatch_task => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Dispatch loop stopped; shutting down");
                    Err(e.into())
                }
                Err(_) => Err(ServerError::DispatchAborted),
            };
        }
    }

    dispatch_task.abort();
    Ok(())
}
