//! UDMI 事件处理服务：接入 -> 分类 -> 文档归并 -> 持久化，
//! 附带 /health 与 /metrics。

mod ingest;
mod routes;
mod stores;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info};
use udmi_config::AppConfig;
use udmi_pipeline::{Dispatcher, DispatcherConfig, SystemClock};
use udmi_telemetry::{init_tracing, new_request_ids};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let stores = stores::build_stores(&config).await?;
    let dispatcher = Dispatcher::with_config(
        stores.devices,
        stores.sites,
        stores.history,
        Arc::new(SystemClock),
        DispatcherConfig {
            validator_id: config.validator_device_id.clone(),
            max_conflict_retries: config.max_conflict_retries,
        },
    );
    let _ingest = ingest::spawn_ingest(&config, dispatcher);

    let app = routes::create_router().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            // 注入 request_id/trace_id
            .layer(middleware::from_fn(request_context)),
    );

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "udmi.handler", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn request_context(req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %req.method(),
        path = %req.uri().path()
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
