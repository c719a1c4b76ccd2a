//! # Exercise API 主程序
//!
//! 编程练习平台 HTTP 服务入口

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use exercise_api::{
    Result,
    app::AppContext,
    config::ConfigManager,
    database,
    error::Context,
    lerror, linfo,
    logging::{self, LogComponent, LogStage},
    server::ApiServer,
};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "exercise-api", version, about = "Coding-exercise platform backend")]
struct Args {
    /// 配置文件路径，缺省时按 `EXERCISE_API_CONFIG_PATH` 或 `RUST_ENV` 推断
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，`RUST_LOG` 优先
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref());

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动"
    );
    if let Err(e) = run(args).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("服务运行失败: {}", e.error_chain())
        );
        std::process::exit(1);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
}

async fn run(args: Args) -> Result<()> {
    let manager = match args.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    linfo!(
        "system",
        LogStage::Configuration,
        LogComponent::Config,
        "config_loaded",
        &format!("配置已加载: {}", manager.source().display())
    );
    let config = manager.into_config();

    let db = database::init_database(&config.database)
        .await
        .context("数据库连接失败")?;
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "run_migrations",
        "执行数据库迁移..."
    );
    database::run_migrations(&db)
        .await
        .context("数据库迁移失败")?;
    database::check_database_status(&db).await?;

    let context = Arc::new(AppContext::build(config, db)?);
    let server = ApiServer::new(context);
    let listener = server.bind().await?;
    server.serve(listener, shutdown_signal()).await
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            lerror!(
                "system",
                LogStage::Shutdown,
                LogComponent::ServerSetup,
                "ctrl_c_error",
                &format!("Failed to listen for Ctrl+C: {e:?}")
            );
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                lerror!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::ServerSetup,
                    "sigterm_error",
                    &format!("Failed to listen for SIGTERM: {e:?}")
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let reason = tokio::select! {
        () = ctrl_c => "Ctrl+C signal",
        () = terminate => "SIGTERM signal",
    };
    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::ServerSetup,
        "shutdown_signal",
        &format!("收到关闭信号: {reason}")
    );
}
