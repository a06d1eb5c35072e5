/// MCP Server Transports
///
/// This module wires the dispatcher to its two transports:
/// - HTTP with Actix Web: `POST /mcp` (and `POST /`) carry JSON-RPC envelopes
/// - STDIO: one JSON-RPC envelope per line on stdin, responses on stdout
///
/// Protocol errors are always delivered as HTTP 200 with an error envelope.
/// Notifications are acknowledged with HTTP 204 and no body.

use actix_web::{
    App, HttpResponse, HttpServer,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use std::fmt::Write as _;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{error, info};

use crate::core::config::ServerConfig;
use crate::core::dispatcher::Dispatcher;

/// Largest request body accepted; conversations can be long.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Liveness string for `GET /`.
async fn index(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    let info = dispatcher.server_info();
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("{} {} is running", info.name, info.version))
}

/// Health check endpoint for load balancers and monitoring.
async fn health(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": dispatcher.server_info().name
    }))
}

/// Human-readable tool listing, one line per tool.
async fn tools_page(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    let mut page = String::from("Available tools:\n");
    for tool in dispatcher.registry().tools() {
        let required: Vec<&str> = tool.input_schema["required"]
            .as_array()
            .map(|keys| keys.iter().filter_map(|k| k.as_str()).collect())
            .unwrap_or_default();
        let _ = writeln!(
            page,
            "- {}({}): {}",
            tool.name,
            required.join(", "),
            tool.description
        );
    }
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(page)
}

/// MCP JSON-RPC endpoint.
///
/// The body is taken as raw bytes so that malformed JSON reaches the codec
/// and is answered with a parse-error envelope instead of a framework 400.
async fn mcp_handler(dispatcher: web::Data<Dispatcher>, body: web::Bytes) -> HttpResponse {
    match dispatcher.handle_body(&body).await {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::NoContent().finish(),
    }
}

/// Register all routes. Shared by the server and its tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .route("/health", web::get().to(health))
        .route("/tools", web::get().to(tools_page))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(index));
}

/// Run the MCP server in HTTP mode.
///
/// # Configuration
/// - Worker threads: from `ServerConfig::workers`
/// - Max connections: 10,000 concurrent connections
/// - Keep-alive and client request timeout: 30 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(config: &ServerConfig, dispatcher: Dispatcher) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let dispatcher = web::Data::new(dispatcher);

    info!(
        name = %config.name,
        version = %config.version,
        bind = %bind_addr,
        workers = config.workers,
        archive = %config.archive_base_url,
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            // %r = request line, %s = status, %D = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(routes)
    })
    .workers(config.workers)
    .max_connections(10000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode.
///
/// All logging goes to stderr so stdout carries nothing but responses.
pub async fn run_server_stdio(dispatcher: Dispatcher) -> std::io::Result<()> {
    info!(
        name = %dispatcher.server_info().name,
        version = %dispatcher.server_info().version,
        "MCP server starting (STDIO mode)"
    );

    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(&dispatcher, stdin, stdout).await
}

/// Serve line-delimited JSON-RPC until the reader is exhausted.
///
/// Requests are handled one at a time; each response is written on its own
/// line and flushed immediately. Notifications produce no output.
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let Some(response) = dispatcher.handle_body(line.as_bytes()).await else {
            continue;
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize response");
                continue;
            }
        };

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}
