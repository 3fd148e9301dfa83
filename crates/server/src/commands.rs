//! CLI commands

use loanstats_api::create_router;
use loanstats_auth::TokenRequest;
use loanstats_core::Aggregate;
use loanstats_ingest::{IngestSummary, MemoryQueue, MessageSource};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::context::AppContext;

/// Outcome of a batch ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub sent: usize,
    pub summary: IngestSummary,
    pub dead_letters: usize,
}

/// Push every non-blank line of `path` onto `queue`, returning how many were sent
pub fn enqueue_file(queue: &MemoryQueue, path: &Path) -> Result<usize, anyhow::Error> {
    let content = std::fs::read_to_string(path)?;
    let mut sent = 0;

    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        queue.send(line)?;
        sent += 1;
    }

    tracing::info!(path = %path.display(), sent, "payloads enqueued");
    Ok(sent)
}

/// Ingest a JSONL file of payloads and wait for the queue to drain
pub async fn ingest(ctx: &AppContext, path: &Path) -> Result<IngestReport, anyhow::Error> {
    let queue = Arc::new(MemoryQueue::new(ctx.config.ingest.max_receive_count));
    let sent = enqueue_file(&queue, path)?;
    queue.close();

    let workers = ctx.spawn_workers(Arc::clone(&queue) as Arc<dyn MessageSource>);
    let summary = workers.join().await;

    Ok(IngestReport {
        sent,
        summary,
        dead_letters: queue.dead_letters().len(),
    })
}

/// Current aggregate, `None` when nothing has been applied yet
pub async fn show(ctx: &AppContext) -> Result<Option<Aggregate>, anyhow::Error> {
    Ok(ctx.reader.fetch().await?)
}

/// Mint a bearer token
pub fn token(
    ctx: &AppContext,
    subject: &str,
    roles: &[String],
    role_id: Option<&str>,
) -> Result<String, anyhow::Error> {
    let mut request = TokenRequest::new(subject);
    for role in roles {
        request = request.role(role.as_str());
    }
    if let Some(role_id) = role_id {
        request = request.role_id(role_id);
    }

    Ok(ctx.token_issuer().issue(&request)?)
}

/// Run the HTTP API and the ingest workers until Ctrl-C
pub async fn serve(ctx: &AppContext, seed: Option<&Path>) -> Result<(), anyhow::Error> {
    let queue = Arc::new(MemoryQueue::new(ctx.config.ingest.max_receive_count));
    if let Some(seed) = seed {
        enqueue_file(&queue, seed)?;
    }
    let workers = ctx.spawn_workers(Arc::clone(&queue) as Arc<dyn MessageSource>);

    let app = create_router(ctx.app_state());
    let addr: SocketAddr = ctx.config.server.listen;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    queue.close();
    let summary = workers.join().await;
    tracing::info!(
        acked = summary.acked,
        nacked = summary.nacked,
        dead_letters = queue.dead_letters().len(),
        "ingest workers stopped"
    );

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
