//! Interactive Console - 交互式命令循环
//!
//! 每条命令的同步部分（取锁、抓拍、登记查询条件）在读下一行之前完成，
//! 只有网络等待放到后台任务；命令循环始终可以继续输入。

use chrono::NaiveDate;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::render::{render_history, render_notice, render_screen};
use super::state::ConsoleState;
use crate::application::{
    ChangeHistoryFilter, CloseCameraCommand, LoadHistory, OpenCameraCommand, RefreshHistory,
    SubmitInspectionCommand, SubmitOutcome, ToggleHistoryDetail,
};
use crate::domain::history::{parse_date, HistoryFilter, HistoryRange, RecordId};
use crate::infrastructure::events::ConsoleEvent;

pub const HELP_TEXT: &str = "\
Commands:
  upload <FILE>            inspect a local PNG/JPG image
  camera on | camera off   open or close the live camera
  capture                  capture the camera frame and inspect it
  server-capture           let the inspection service capture from its camera
  status                   show the inspection screen
  history                  show the history table
  refresh                  repeat the current history query
  range <day|week|month|year>
  date <YYYY-MM-DD>
  filter <RANGE> <DATE>    change both filter fields at once
  toggle <ID>              expand or collapse a history record
  help | quit";

/// 控制台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Upload(PathBuf),
    Capture,
    ServerCapture,
    CameraOn,
    CameraOff,
    Status,
    History,
    Refresh,
    Range(HistoryRange),
    Date(NaiveDate),
    Filter(HistoryFilter),
    Toggle(RecordId),
    Help,
    Quit,
}

/// 解析一行输入；空行返回 None
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word.to_ascii_lowercase().as_str(), rest) {
        ("upload", "") => return Err("usage: upload <FILE>".to_string()),
        ("upload", path) => ConsoleCommand::Upload(PathBuf::from(path)),
        ("capture", "") => ConsoleCommand::Capture,
        ("server-capture", "") => ConsoleCommand::ServerCapture,
        ("camera", arg) => match arg.to_ascii_lowercase().as_str() {
            "on" | "open" => ConsoleCommand::CameraOn,
            "off" | "close" => ConsoleCommand::CameraOff,
            _ => return Err("usage: camera on | camera off".to_string()),
        },
        ("status", "") => ConsoleCommand::Status,
        ("history", "") => ConsoleCommand::History,
        ("refresh", "") => ConsoleCommand::Refresh,
        ("range", arg) => ConsoleCommand::Range(arg.parse().map_err(|e| format!("{}", e))?),
        ("date", arg) => ConsoleCommand::Date(parse_date(arg).map_err(|e| e.to_string())?),
        ("filter", args) => {
            let mut parts = args.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(range), Some(date), None) => ConsoleCommand::Filter(
                    HistoryFilter::parse(range, date).map_err(|e| e.to_string())?,
                ),
                _ => return Err("usage: filter <RANGE> <DATE>".to_string()),
            }
        }
        ("toggle", arg) => ConsoleCommand::Toggle(RecordId::new(
            arg.parse::<i64>()
                .map_err(|_| format!("invalid record id: {:?}", arg))?,
        )),
        ("help", "") | ("?", "") => ConsoleCommand::Help,
        ("quit", "") | ("exit", "") => ConsoleCommand::Quit,
        _ => return Err(format!("unknown command: {} (try `help`)", line)),
    };
    Ok(Some(command))
}

/// 控制台输出
pub type ConsoleOutput = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn stdout_output() -> ConsoleOutput {
    Arc::new(Mutex::new(Box::new(std::io::stdout())))
}

fn emit(output: &ConsoleOutput, text: &str) {
    let mut out = output.lock().unwrap_or_else(|e| e.into_inner());
    if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
        tracing::debug!(error = %e, "Console write failed");
    }
}

/// 退出时等待在途请求的默认时长
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// 交互式控制台
pub struct Repl {
    state: Arc<ConsoleState>,
    output: ConsoleOutput,
    tasks: Vec<JoinHandle<()>>,
    drain_timeout: Duration,
}

enum Flow {
    Continue,
    Quit,
}

impl Repl {
    pub fn new(state: Arc<ConsoleState>, output: ConsoleOutput) -> Self {
        Self {
            state,
            output,
            tasks: Vec::new(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// 退出时最多等待在途请求这么久，超时的请求被中止
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// 读取命令直到 quit 或输入结束；退出前在限定时间内等待后台任务
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> std::io::Result<()> {
        let stop = CancellationToken::new();
        let printer = spawn_printer(self.state.clone(), self.output.clone(), stop.clone());

        emit(&self.output, HELP_TEXT);
        // 首次加载在接受输入之前完成，之后的筛选总是晚于它登记
        self.state.load_history_handler.handle(LoadHistory).await;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if let Flow::Quit = self.dispatch(command).await {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => emit(&self.output, &message),
            }
            self.tasks.retain(|task| !task.is_finished());
        }

        self.drain().await;
        stop.cancel();
        if let Err(e) = printer.await {
            tracing::warn!(error = %e, "Console printer failed");
        }

        // 离开前释放摄像头
        self.state.close_camera_handler.handle(CloseCameraCommand);
        Ok(())
    }

    /// 等待在途任务；超时后中止剩余任务（提交会按中止结算并释放锁）
    async fn drain(&mut self) {
        self.tasks.retain(|task| !task.is_finished());
        if self.tasks.is_empty() {
            return;
        }
        let pending = self.tasks.len();
        emit(
            &self.output,
            &format!(
                "Waiting for {} pending request(s) (up to {}s)...",
                pending,
                self.drain_timeout.as_secs_f32()
            ),
        );

        let joined = tokio::time::timeout(
            self.drain_timeout,
            futures_util::future::join_all(self.tasks.iter_mut()),
        )
        .await;
        match joined {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "Console task failed");
                    }
                }
                self.tasks.clear();
            }
            Err(_) => {
                let abandoned = self.tasks.iter().filter(|task| !task.is_finished()).count();
                tracing::warn!(abandoned = abandoned, "Abandoning pending console tasks");
                emit(
                    &self.output,
                    &format!("Abandoned {} pending request(s)", abandoned),
                );
                for task in self.tasks.drain(..) {
                    // 已完成的任务输出已被取走，不能再次 await
                    if task.is_finished() {
                        continue;
                    }
                    task.abort();
                    if let Err(e) = task.await {
                        if !e.is_cancelled() {
                            tracing::warn!(error = %e, "Console task failed");
                        }
                    }
                }
            }
        }
    }

    async fn dispatch(&mut self, command: ConsoleCommand) -> Flow {
        match command {
            ConsoleCommand::Upload(path) => self.spawn_submit(SubmitInspectionCommand::Upload { path }),
            ConsoleCommand::Capture => self.spawn_submit(SubmitInspectionCommand::CameraCapture),
            ConsoleCommand::ServerCapture => self.spawn_submit(SubmitInspectionCommand::ServerCapture),
            ConsoleCommand::CameraOn => {
                if let Ok(response) = self.state.open_camera_handler.handle(OpenCameraCommand).await {
                    if !response.opened {
                        emit(&self.output, "Camera is already on");
                    }
                }
            }
            ConsoleCommand::CameraOff => {
                if !self.state.close_camera_handler.handle(CloseCameraCommand).closed {
                    emit(&self.output, "Camera is already off");
                }
            }
            ConsoleCommand::Status => emit(&self.output, &render_screen(&self.state.screen_view())),
            ConsoleCommand::History => {
                emit(&self.output, &render_history(&self.state.history_view()))
            }
            ConsoleCommand::Refresh => {
                let ticket = self.state.load_history_handler.begin_refresh(RefreshHistory);
                let state = self.state.clone();
                self.tasks.push(tokio::spawn(async move {
                    state.load_history_handler.finish(ticket).await;
                }));
            }
            ConsoleCommand::Range(range) => self.change_filter(ChangeHistoryFilter::Range(range)),
            ConsoleCommand::Date(date) => self.change_filter(ChangeHistoryFilter::Date(date)),
            ConsoleCommand::Filter(filter) => self.change_filter(ChangeHistoryFilter::Both(filter)),
            ConsoleCommand::Toggle(record_id) => {
                match self
                    .state
                    .toggle_detail_handler
                    .handle(ToggleHistoryDetail { record_id })
                {
                    Ok(_) => emit(&self.output, &render_history(&self.state.history_view())),
                    Err(e) => emit(&self.output, &e.to_string()),
                }
            }
            ConsoleCommand::Help => emit(&self.output, HELP_TEXT),
            ConsoleCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn spawn_submit(&mut self, command: SubmitInspectionCommand) {
        // 取锁与抓拍在这里同步完成，之后的命令看到的是已经开始的提交
        let started = match self.state.submit_handler.begin(command) {
            Ok(Some(started)) => started,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(error = %e, "Submission rejected");
                return;
            }
        };
        let state = self.state.clone();
        self.tasks.push(tokio::spawn(async move {
            if let SubmitOutcome::Failed { submission_id, reason } =
                state.submit_handler.finish(started).await
            {
                tracing::debug!(submission_id = %submission_id, reason = %reason, "Submission settled as failed");
            }
        }));
    }

    fn change_filter(&mut self, change: ChangeHistoryFilter) {
        // 新条件在读取下一行之前写入存储
        let Some(ticket) = self.state.change_filter_handler.begin(change) else {
            emit(&self.output, "Filter unchanged");
            return;
        };
        let state = self.state.clone();
        self.tasks.push(tokio::spawn(async move {
            state.change_filter_handler.finish(ticket).await;
        }));
    }
}

/// 订阅事件并在界面变化时重新渲染
fn spawn_printer(
    state: Arc<ConsoleState>,
    output: ConsoleOutput,
    stop: CancellationToken,
) -> JoinHandle<()> {
    let mut events = state.events.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) => print_event(&state, &output, &event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped = skipped, "Console printer lagged");
                    }
                    Err(RecvError::Closed) => return,
                },
            }
        }
        // 停止前把已发布的事件打印完
        loop {
            match events.try_recv() {
                Ok(event) => print_event(&state, &output, &event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    })
}

fn print_event(state: &ConsoleState, output: &ConsoleOutput, event: &ConsoleEvent) {
    match event {
        ConsoleEvent::SubmissionStarted { .. }
        | ConsoleEvent::SubmissionSucceeded { .. }
        | ConsoleEvent::SubmissionFailed { .. } => emit(output, &render_screen(&state.screen_view())),
        ConsoleEvent::HistoryUpdated { .. } | ConsoleEvent::HistoryFailed { .. } => {
            emit(output, &render_history(&state.history_view()))
        }
        other => {
            if let Some(notice) = render_notice(other) {
                emit(output, &notice);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        HistoryError, HistoryStorePort, MediaSourcePort, ScreenStatePort,
    };
    use crate::domain::history::HistoryQuery;
    use crate::domain::inspection::{RequestState, UploadPolicy};
    use tokio::sync::Semaphore;
    use crate::domain::DisplayClock;
    use crate::infrastructure::adapters::camera::SyntheticCameraDevice;
    use crate::infrastructure::adapters::history::FakeHistoryClient;
    use crate::infrastructure::adapters::inspection::FakeInspectionClient;
    use crate::infrastructure::console::ConsoleDeps;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn console(history: FakeHistoryClient) -> (Arc<ConsoleState>, Arc<FakeInspectionClient>) {
        console_with(FakeInspectionClient::new(), history)
    }

    fn console_with(
        inspection: FakeInspectionClient,
        history: FakeHistoryClient,
    ) -> (Arc<ConsoleState>, Arc<FakeInspectionClient>) {
        let inspection = Arc::new(inspection);
        let state = ConsoleState::new(ConsoleDeps {
            inspection: inspection.clone(),
            history: Arc::new(history),
            camera: Arc::new(SyntheticCameraDevice::new(32, 24)),
            upload_policy: UploadPolicy::default(),
            jpeg_quality: 90,
            clock: DisplayClock::utc(),
        });
        (Arc::new(state), inspection)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  ").unwrap(), None);
        assert_eq!(
            parse_command("upload /tmp/a b.jpg").unwrap(),
            Some(ConsoleCommand::Upload(PathBuf::from("/tmp/a b.jpg")))
        );
        assert_eq!(parse_command("camera on").unwrap(), Some(ConsoleCommand::CameraOn));
        assert_eq!(parse_command("CAMERA OFF").unwrap(), Some(ConsoleCommand::CameraOff));
        assert_eq!(
            parse_command("range Week").unwrap(),
            Some(ConsoleCommand::Range(HistoryRange::Week))
        );
        assert_eq!(
            parse_command("toggle 12").unwrap(),
            Some(ConsoleCommand::Toggle(RecordId::new(12)))
        );
        assert!(matches!(
            parse_command("filter month 2024-02-10").unwrap(),
            Some(ConsoleCommand::Filter(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("upload").is_err());
        assert!(parse_command("range fortnight").is_err());
        assert!(parse_command("date 2024-13-01").is_err());
        assert!(parse_command("toggle abc").is_err());
        assert!(parse_command("filter day").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test]
    async fn test_session_uploads_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("tray.jpg");
        std::fs::write(&image, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        let history = FakeHistoryClient::new().with_failure(
            HistoryQuery::Filtered(HistoryFilter::parse("year", "2024-01-01").unwrap()),
            HistoryError::Timeout,
        );
        let (state, inspection) = console(history);
        let buffer = SharedBuffer::default();
        let output: ConsoleOutput = Arc::new(Mutex::new(Box::new(buffer.clone())));

        let script = format!("upload {}\nfilter year 2024-01-01\nbogus\nquit\n", image.display());
        Repl::new(state.clone(), output)
            .run(script.as_bytes())
            .await
            .unwrap();

        let text = buffer.text();
        assert!(text.contains("unknown command: bogus"));
        assert!(text.contains("Verdict: [OK] PASS"));
        assert!(text.contains("Error: Request timeout"));
        assert_eq!(inspection.call_count(), 1);
        assert!(!state.guard.is_held());
    }

    #[tokio::test]
    async fn test_camera_commands() {
        let (state, _inspection) = console(FakeHistoryClient::new());
        let buffer = SharedBuffer::default();
        let output: ConsoleOutput = Arc::new(Mutex::new(Box::new(buffer.clone())));

        Repl::new(state.clone(), output)
            .run(&b"camera on\ncamera on\ncapture\ncamera off\ncamera off\n"[..])
            .await
            .unwrap();

        let text = buffer.text();
        assert!(text.contains("Camera on: synthetic 32x24"));
        assert!(text.contains("Camera is already on"));
        assert!(text.contains("Camera is already off"));
        assert!(!state.media.is_open());
    }

    #[tokio::test]
    async fn test_range_then_date_keeps_both_changes() {
        let (state, _inspection) = console(FakeHistoryClient::new());
        let output: ConsoleOutput = Arc::new(Mutex::new(Box::new(SharedBuffer::default())));

        Repl::new(state.clone(), output)
            .run(&b"range week\ndate 2024-05-02\nquit\n"[..])
            .await
            .unwrap();

        let expected = HistoryFilter::parse("week", "2024-05-02").unwrap();
        let snapshot = state.history_store.snapshot();
        assert_eq!(snapshot.filter(), expected);
        assert_eq!(snapshot.active_query(), HistoryQuery::Filtered(expected));
    }

    #[tokio::test]
    async fn test_capture_uses_frame_before_camera_off() {
        let (state, inspection) = console(FakeHistoryClient::new());
        let output: ConsoleOutput = Arc::new(Mutex::new(Box::new(SharedBuffer::default())));

        Repl::new(state.clone(), output)
            .run(&b"camera on\ncapture\ncamera off\nquit\n"[..])
            .await
            .unwrap();

        assert_eq!(inspection.call_count(), 1);
        assert!(matches!(
            state.screen.snapshot().state(),
            RequestState::Succeeded(_)
        ));
        assert!(!state.media.is_open());
    }

    #[tokio::test]
    async fn test_quit_abandons_requests_after_drain_timeout() {
        let gate = Arc::new(Semaphore::new(0));
        let (state, _inspection) = console_with(
            FakeInspectionClient::new().with_gate(gate),
            FakeHistoryClient::new(),
        );
        let buffer = SharedBuffer::default();
        let output: ConsoleOutput = Arc::new(Mutex::new(Box::new(buffer.clone())));

        Repl::new(state.clone(), output)
            .with_drain_timeout(Duration::from_millis(50))
            .run(&b"server-capture\nquit\n"[..])
            .await
            .unwrap();

        let text = buffer.text();
        assert!(text.contains("Waiting for 1 pending request(s)"));
        assert!(text.contains("Abandoned 1 pending request(s)"));
        assert!(!state.guard.is_held());
        assert_eq!(
            state.screen.snapshot().state(),
            &RequestState::Failed("Submission aborted".to_string())
        );
    }
}
