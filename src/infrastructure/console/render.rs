//! Console Renderer - 把展示模型渲染成终端文本

use std::fmt::Write;

use crate::application::presentation::{
    HistoryBody, HistoryDetail, HistoryScreen, ResultView, ScreenBody, ScreenView, VerdictStyle,
    EMPTY_HINT, EMPTY_TITLE, LOADING_HINT, LOADING_TITLE, LOADING_TEXT, NO_DATA_TEXT,
    NO_ITEMS_TEXT,
};
use crate::infrastructure::events::ConsoleEvent;

/// 进度条满格字符数
const BAR_CELLS: f64 = 20.0;

pub fn render_screen(view: &ScreenView) -> String {
    let mut out = String::from("== Inspection ==\n");

    if let Some(preview) = &view.preview {
        let _ = writeln!(
            out,
            "Preview: {} ({}) {}",
            preview.file_name, preview.source_label, preview.location
        );
        let _ = writeln!(out, "Upload Time: {}", preview.upload_time);
    } else if let Some(note) = view.preview_note {
        let _ = writeln!(out, "Preview: {}", note);
    }

    match &view.body {
        ScreenBody::Empty => {
            let _ = writeln!(out, "{}\n  {}", EMPTY_TITLE, EMPTY_HINT);
        }
        ScreenBody::Loading => {
            let _ = writeln!(out, "{}\n  {}", LOADING_TITLE, LOADING_HINT);
        }
        ScreenBody::Error(reason) => {
            let _ = writeln!(out, "Error: {}", reason);
        }
        ScreenBody::Result(result) => render_result(&mut out, result),
    }
    out
}

fn render_result(out: &mut String, view: &ResultView) {
    let marker = match view.badge.style {
        VerdictStyle::Pass => "[OK]",
        VerdictStyle::Fail => "[NG]",
        VerdictStyle::DisplayError => "[??]",
    };
    let _ = writeln!(
        out,
        "Verdict: {} {} - {}",
        marker, view.badge.label, view.badge.description
    );
    let _ = writeln!(out, "{:<16} {:>16} {:>11}", "Category", view.column_header, "Percentage");
    for row in &view.rows {
        let cells = (row.bar_width / 100.0 * BAR_CELLS).round() as usize;
        let _ = writeln!(
            out,
            "{:<16} {:>16} {:>10}% {}",
            row.category,
            row.magnitude,
            row.percentage,
            "#".repeat(cells)
        );
    }
    let _ = writeln!(
        out,
        "{:<16} {:>16} {:>11}",
        view.total_label,
        format!("{} {}", view.total, view.unit),
        view.footer_percentage
    );
    let _ = writeln!(out, "Measured: {}", view.measured_at);
    if let Some(overlay) = &view.overlay {
        let _ = writeln!(out, "Image: {}\nOverlay: {}", overlay.image_url, overlay.overlay_url);
    }
}

pub fn render_history(screen: &HistoryScreen) -> String {
    let mut out = String::from("== QC History ==\n");
    let filter = &screen.filter;
    let _ = write!(out, "Filter: {} {} ({})", filter.range, filter.date, filter.window);
    if filter.showing_all {
        out.push_str(" [showing all records]");
    }
    out.push('\n');

    match &screen.body {
        HistoryBody::Loading => {
            let _ = writeln!(out, "{}", LOADING_TEXT);
        }
        HistoryBody::Error(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
        HistoryBody::Empty => {
            let _ = writeln!(out, "{}", NO_DATA_TEXT);
        }
        HistoryBody::Table(rows) => {
            let _ = writeln!(
                out,
                "{:>6}  {:<18}  {:<24}  {:>12}  {:<8}",
                "ID", "Date", "Image", "Total (g)", "Status"
            );
            for row in rows {
                let _ = writeln!(
                    out,
                    "{:>6}  {:<18}  {:<24}  {:>12}  {:<8}  [{}]",
                    row.id,
                    row.date,
                    row.image_name,
                    row.total_weight,
                    row.status.text(),
                    row.toggle_label
                );
                match &row.detail {
                    Some(HistoryDetail::NoItems) => {
                        let _ = writeln!(out, "        {}", NO_ITEMS_TEXT);
                    }
                    Some(HistoryDetail::Items(items)) => {
                        for item in items {
                            let _ = writeln!(
                                out,
                                "        - {:<16} {:>10} g {:>6}%",
                                item.category, item.weight, item.ratio
                            );
                        }
                    }
                    None => {}
                }
            }
        }
    }
    out
}

/// 不改变界面主体的事件渲染成一行提示
pub fn render_notice(event: &ConsoleEvent) -> Option<String> {
    match event {
        ConsoleEvent::SubmissionDropped { source } => Some(format!(
            "A request is already in progress; {} ignored",
            source
        )),
        ConsoleEvent::CameraOpened { device_label } => Some(format!("Camera on: {}", device_label)),
        ConsoleEvent::CameraClosed => Some("Camera off".to_string()),
        ConsoleEvent::CameraFailed { error } => Some(format!("Cannot open camera: {}", error)),
        _ => None,
    }
}
