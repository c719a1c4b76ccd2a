//! # API 服务器

use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::app::AppContext;
use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// API 服务器
pub struct ApiServer {
    config: ServerConfig,
    router: Router,
}

impl ApiServer {
    #[must_use]
    pub fn new(context: Arc<AppContext>) -> Self {
        let config = context.config.server.clone();
        let router = Self::create_router(AppState::new(context), &config);
        Self { config, router }
    }

    /// 完整的路由与中间件栈
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    fn create_router(state: AppState, config: &ServerConfig) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %uuid::Uuid::new_v4(),
            )
        });

        super::routes::create_routes(state)
            .layer(DefaultBodyLimit::max(config.body_limit))
            .layer(
                ServiceBuilder::new()
                    .layer(trace)
                    .layer(Self::cors_layer(config))
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        config.request_timeout(),
                    )),
            )
    }

    fn cors_layer(config: &ServerConfig) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE]);

        if config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*") {
            return layer.allow_origin(Any);
        }

        let origins = config
            .cors_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<std::result::Result<Vec<_>, _>>();

        match origins {
            Ok(origins) => layer.allow_origin(origins),
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::Startup,
                    LogComponent::ServerSetup,
                    "cors_config_fail",
                    &format!("Invalid CORS origin configuration: {e}, falling back to allow any")
                );
                layer.allow_origin(Any)
            }
        }
    }

    /// 绑定配置中的监听地址
    pub async fn bind(&self) -> Result<TcpListener> {
        let address = self.config.bind_address();
        TcpListener::bind(&address).await.map_err(|e| {
            AppError::config_with_source(format!("无法监听地址 {address}"), e)
        })
    }

    /// 运行服务器直到 `shutdown` 完成
    ///
    /// 收到停止信号后不再接受新连接，在途请求最多再运行 `shutdown_grace_period`，
    /// 超时后直接取消，取消会一并中止它们的外部调用与数据库操作。
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "server_start",
            &format!("Starting API server on {addr}")
        );

        let grace = self.config.shutdown_grace_period();
        let router = self.router;
        let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();

        let mut server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown.await;
                    let _ = signal_tx.send(());
                })
                .await
        });

        let deadline = async move {
            if signal_rx.await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            joined = &mut server => {
                joined
                    .map_err(|e| AppError::internal_with_source("server task failed", e))?
                    .map_err(|e| AppError::internal_with_source("server error", e))?;
            }
            () = deadline => {
                lwarn!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::ServerSetup,
                    "grace_period_expired",
                    &format!("在途请求未在 {grace:?} 内完成，强制关闭")
                );
                server.abort();
            }
        }

        linfo!(
            "system",
            LogStage::Shutdown,
            LogComponent::ServerSetup,
            "server_stopped",
            "API server stopped"
        );
        Ok(())
    }
}
