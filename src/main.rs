//! QC Console - 食品重量质检控制台
//!
//! 单次命令（upload / capture / server-capture / history）或交互式控制台

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use qc_console::application::presentation::{HistoryBody, ScreenBody};
use qc_console::application::{
    ChangeHistoryFilter, CloseCameraCommand, LoadHistory, OpenCameraCommand,
    SubmitInspectionCommand, SubmitOutcome, ToggleHistoryDetail,
};
use qc_console::config::{load_config_from_path, print_config, AppConfig, LogConfig};
use qc_console::domain::history::{parse_date, HistoryFilter, HistoryRange, RecordId};
use qc_console::infrastructure::console::{
    render_history, render_screen, stdout_output, ConsoleState, Repl,
};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Debug, Parser)]
#[command(name = "qc-console", version, about = "Food-weight quality-control inspection console")]
struct Cli {
    /// 配置文件路径（默认搜索 qc-console.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 覆盖配置中的日志级别
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect a local PNG/JPG image
    Upload { file: PathBuf },
    /// Open the camera, capture one frame and inspect it
    Capture {
        /// Seconds to wait for the first camera frame
        #[arg(long, default_value_t = 10)]
        wait_secs: u64,
    },
    /// Ask the inspection service to capture from its own camera
    ServerCapture,
    /// Show QC history (all records unless a filter is given)
    History {
        #[arg(long)]
        range: Option<HistoryRange>,
        /// Filter date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Expand the detail of one record
        #[arg(long)]
        expand: Option<i64>,
    },
    /// Interactive console (default)
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let mut config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }

    let _log_guard = init_tracing(&config.log)?;
    tracing::info!("QC Console starting");
    print_config(&config);

    let state = Arc::new(
        ConsoleState::from_config(&config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize console: {}", e))?,
    );

    let code = match cli.command.unwrap_or(Command::Interactive) {
        Command::Upload { file } => {
            submit_once(&state, SubmitInspectionCommand::Upload { path: file }).await?
        }
        Command::ServerCapture => submit_once(&state, SubmitInspectionCommand::ServerCapture).await?,
        Command::Capture { wait_secs } => capture_once(&state, &config, wait_secs).await?,
        Command::History {
            range,
            date,
            expand,
        } => history_once(&state, range, date, expand).await?,
        Command::Interactive => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            Repl::new(state.clone(), stdout_output()).run(input).await?;
            ExitCode::SUCCESS
        }
    };

    tracing::info!("QC Console stopped");
    Ok(code)
}

/// 初始化日志；设置了 file_dir 时写入按天滚动的文件
fn init_tracing(log: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let log_filter = format!("{},qc_console={}", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let guard = match &log.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "qc-console.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            if log.json {
                builder.json().init();
            } else {
                builder.init();
            }
            Some(guard)
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            if log.json {
                builder.json().init();
            } else {
                builder.init();
            }
            None
        }
    };
    Ok(guard)
}

async fn submit_once(
    state: &ConsoleState,
    command: SubmitInspectionCommand,
) -> anyhow::Result<ExitCode> {
    let outcome = state.submit_handler.handle(command).await?;
    let view = state.screen_view();
    println!("{}", render_screen(&view));
    Ok(match (outcome, view.body) {
        (SubmitOutcome::Succeeded { .. }, ScreenBody::Result(_)) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn capture_once(
    state: &ConsoleState,
    config: &AppConfig,
    wait_secs: u64,
) -> anyhow::Result<ExitCode> {
    let opened = state.open_camera_handler.handle(OpenCameraCommand).await?;
    if let Some(label) = &opened.device_label {
        tracing::info!(device = %label, "Waiting for first frame");
    }

    let wait = Duration::from_secs(wait_secs.max(config.camera.connect_timeout_secs));
    if !state.wait_for_frame(wait).await {
        tracing::warn!(wait_secs = wait.as_secs(), "No camera frame before timeout");
    }

    let code = submit_once(state, SubmitInspectionCommand::CameraCapture).await;
    state.close_camera_handler.handle(CloseCameraCommand);
    code
}

async fn history_once(
    state: &ConsoleState,
    range: Option<HistoryRange>,
    date: Option<String>,
    expand: Option<i64>,
) -> anyhow::Result<ExitCode> {
    if range.is_none() && date.is_none() {
        state.load_history_handler.handle(LoadHistory).await;
    } else {
        let date = match date {
            Some(raw) => parse_date(&raw)?,
            None => state.clock.today(),
        };
        let filter = HistoryFilter::new(range.unwrap_or(HistoryRange::Day), date);
        state
            .change_filter_handler
            .handle(ChangeHistoryFilter::Both(filter))
            .await;
    }

    if let Some(id) = expand {
        state.toggle_detail_handler.handle(ToggleHistoryDetail {
            record_id: RecordId::new(id),
        })?;
    }

    let view = state.history_view();
    println!("{}", render_history(&view));
    Ok(match view.body {
        HistoryBody::Error(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
