pub mod chart;
pub mod display;

pub use chart::{acquire_chart, chart_points, BarChart, ChartPoint};
pub use display::{format_duration, format_scan_result, print_scan_result, report};
