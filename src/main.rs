//! 风扇网关主入口

use anyhow::Context;
use fan_gate::{
    auth::password::{Argon2Scheme, Pbkdf2Scheme, DEFAULT_ITERATIONS},
    config::AppConfig,
    handlers::health,
    middleware::AppState,
    routes, telemetry,
};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("fan-gate {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            "hash-password" => return hash_password(&args[2..]),
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    if let Ok(env) = std::env::var("FAN_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置（缺少签名密钥或密码哈希时直接退出）
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Fan gate starting...");

    // 3. 构建应用状态
    let shutdown_timeout = config.server.graceful_shutdown_timeout_secs;
    let addr = config.server.addr.clone();
    let app_state =
        Arc::new(AppState::from_config(&config).context("Failed to build application state")?);

    // 4. 构建路由
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "Server listening");

    // 6. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 生成管理员密码哈希记录
/// 密码从标准输入读取，避免出现在 shell 历史中
fn hash_password(args: &[String]) -> anyhow::Result<()> {
    let mut iterations = DEFAULT_ITERATIONS;
    let mut use_argon2 = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--iterations" => {
                let value = iter.next().context("--iterations requires a value")?;
                iterations = value
                    .parse()
                    .with_context(|| format!("Invalid iteration count: {}", value))?;
            }
            "--argon2" => use_argon2 = true,
            other => anyhow::bail!("Unknown hash-password option: {}", other),
        }
    }

    eprintln!("Enter password, then press Enter:");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let record = if use_argon2 {
        Argon2Scheme::new().hash(password)?
    } else {
        Pbkdf2Scheme::hash(password, iterations)?
    };

    println!("{}", record);
    Ok(())
}

/// 优雅关闭信号处理
/// 收到信号后开始关闭；超过超时时间仍未结束则强制退出
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("fan-gate {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: fan-gate [选项]");
    println!("      fan-gate hash-password [--iterations N] [--argon2]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("子命令:");
    println!("  hash-password 从标准输入读取密码，输出 FAN_SECURITY__ADMIN_PASSWORD_HASH 的值");
    println!();
    println!("环境变量:");
    println!("  所有配置通过环境变量完成（前缀 FAN_，层级分隔符 __）");
    println!("  可用选项请参考 .env.example");
}
