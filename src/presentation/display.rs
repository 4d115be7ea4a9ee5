use std::io::{self, Write};

use anyhow::Result;

use crate::application::DisplayConfig;
use crate::domain::ScanResult;
use crate::presentation::chart::{acquire_chart, chart_points};

/// 格式化持续时间
pub fn format_duration(duration: std::time::Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}.{:03}s", secs, duration.subsec_millis())
    }
}

/// 将扫描结果格式化为单行: `{'路径' : 数量, ...}`，按路径升序
pub fn format_scan_result(result: &ScanResult) -> String {
    let pairs = result
        .iter()
        .map(|(path, count)| format!("'{}' : {}", path, count))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{{{}}}", pairs)
}

/// 输出扫描结果，然后尝试绘制柱状图
///
/// 图表组件不可用时只输出一行提示，不视为错误。
pub fn report(result: &ScanResult, config: &DisplayConfig, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", format_scan_result(result))?;

    match acquire_chart(config) {
        Ok(chart) => chart.render(&chart_points(result), out)?,
        Err(advisory) if !advisory.is_fatal() => writeln!(out, "{}", advisory)?,
        Err(err) => return Err(err.into()),
    }

    out.flush()?;
    Ok(())
}

/// 输出到 stdout
pub fn print_scan_result(result: &ScanResult, config: &DisplayConfig) -> Result<()> {
    let mut stdout = io::stdout().lock();
    report(result, config, &mut stdout)
}
