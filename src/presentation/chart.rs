use std::io::{self, Write};

use crate::application::DisplayConfig;
use crate::domain::{ScanError, ScanResult};

/// 柱状图中的一根柱子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    /// x 轴序号，从 1 开始
    pub index: usize,
    /// 目录路径
    pub label: String,
    /// 匹配文件数
    pub value: u64,
}

/// 按结果顺序（路径升序）生成柱状图数据
pub fn chart_points(result: &ScanResult) -> Vec<ChartPoint> {
    result
        .iter()
        .enumerate()
        .map(|(i, (path, count))| ChartPoint {
            index: i + 1,
            label: path.to_string(),
            value: count,
        })
        .collect()
}

/// 柱状图绘制组件
pub trait BarChart {
    fn render(&self, points: &[ChartPoint], out: &mut dyn Write) -> io::Result<()>;
}

/// 获取柱状图组件；未编译 `chart` 特性或配置关闭绘图时返回 `ChartingUnavailable`
pub fn acquire_chart(config: &DisplayConfig) -> Result<Box<dyn BarChart>, ScanError> {
    if !config.plot {
        return Err(ScanError::ChartingUnavailable("plotting is disabled".to_string()));
    }

    terminal_chart(config)
}

#[cfg(feature = "chart")]
fn terminal_chart(config: &DisplayConfig) -> Result<Box<dyn BarChart>, ScanError> {
    Ok(Box::new(TerminalBarChart::new(config.bar_width, config.color)))
}

#[cfg(not(feature = "chart"))]
fn terminal_chart(_config: &DisplayConfig) -> Result<Box<dyn BarChart>, ScanError> {
    Err(ScanError::ChartingUnavailable(
        "kindly rebuild dirmatch with the \"chart\" feature enabled".to_string(),
    ))
}

/// 终端水平柱状图，相邻柱子红蓝交替
#[cfg(feature = "chart")]
#[derive(Debug, Clone)]
pub struct TerminalBarChart {
    bar_width: usize,
    color: bool,
}

#[cfg(feature = "chart")]
impl TerminalBarChart {
    const FILLS: [(&'static str, char); 2] = [("\x1b[1;31m", '█'), ("\x1b[1;34m", '▓')];
    const RESET: &'static str = "\x1b[0m";

    pub fn new(bar_width: usize, color: bool) -> Self {
        Self { bar_width, color }
    }

    /// 按最大值缩放柱长，非零值至少占一格
    fn bar_len(&self, value: u64, max: u64) -> usize {
        if value == 0 || max == 0 {
            return 0;
        }
        let scaled = (value as u128 * self.bar_width as u128 + max as u128 / 2) / max as u128;
        (scaled as usize).clamp(1, self.bar_width.max(1))
    }
}

#[cfg(feature = "chart")]
impl BarChart for TerminalBarChart {
    fn render(&self, points: &[ChartPoint], out: &mut dyn Write) -> io::Result<()> {
        let max = points.iter().map(|p| p.value).max().unwrap_or(0);
        let index_width = points.len().to_string().len();
        let value_width = max.to_string().len();

        for (i, point) in points.iter().enumerate() {
            let (color, fill) = Self::FILLS[i % 2];
            let len = self.bar_len(point.value, max);
            let bar: String = std::iter::repeat(fill).take(len).collect();
            let padding = " ".repeat(self.bar_width.saturating_sub(len));

            if self.color {
                write!(out, "{:>iw$} │ {}{}{}", point.index, color, bar, Self::RESET, iw = index_width)?;
            } else {
                write!(out, "{:>iw$} │ {}", point.index, bar, iw = index_width)?;
            }
            writeln!(
                out,
                "{} {:>vw$}  {}",
                padding,
                point.value,
                point.label,
                vw = value_width
            )?;
        }

        Ok(())
    }
}
