use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use dirmatch::application::{validate, Config};
use dirmatch::domain::{scan_directory, ScanOptions};
use dirmatch::infrastructure::{ErrorLogger, Logger, LoggerTrait};
use dirmatch::presentation::{format_duration, print_scan_result};

/// 统计目录树中每个目录下文件名匹配正则表达式的文件数
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// 根目录路径
    #[clap(short = 'r', long = "rootdir", value_name = "Path")]
    rootdir: Option<PathBuf>,

    /// 文件名搜索正则表达式，从文件名第一个字符开始匹配
    #[clap(short = 's', long = "searchString", value_name = "SearchRegex")]
    search_string: Option<String>,

    /// 配置文件路径，文件不存在时会创建默认配置
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 启用日志记录，日志文件保存到配置的 log_dir
    #[clap(long)]
    log: bool,

    /// 遵循 .gitignore 规则，默认情况下会扫描所有目录
    #[clap(long)]
    respect_gitignore: bool,

    /// 不绘制柱状图
    #[clap(long)]
    no_plot: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let outcome = run(&args);

    let mut stdout = io::stdout().lock();
    ExitCode::from(finish(&outcome, &mut stdout))
}

/// 单行诊断信息
fn diagnostic(err: &anyhow::Error) -> String {
    format!("Exception occurred, reason : {:#}", err)
}

/// 失败时输出诊断行，返回进程退出码
fn finish(outcome: &Result<()>, out: &mut dyn Write) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(err) => {
            let _ = writeln!(out, "{}", diagnostic(err));
            let _ = out.flush();
            1
        }
    }
}

/// 加载配置，命令行参数优先
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_or_create(path)?,
        None => Config::default(),
    };

    if args.respect_gitignore {
        config.scan.respect_gitignore = true;
    }
    if args.no_plot {
        config.display.plot = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    // 初始化日志记录器
    let logger = Arc::new(Logger::new(args.log, &config.logging.log_dir)?);
    let error_logger = ErrorLogger::new(args.log, &config.logging.log_dir)?;

    let outcome = scan_and_report(args, &config, &logger);

    if let Err(err) = &outcome {
        let root = args.rootdir.as_ref().map(|root| root.display().to_string());
        let _ = error_logger.log_fatal(err, root.as_deref());
        error_logger.print_error_summary();
    }
    error_logger.finalize()?;

    outcome
}

fn scan_and_report(args: &Args, config: &Config, logger: &Arc<Logger>) -> Result<()> {
    // 记录扫描参数到日志
    if logger.is_enabled() {
        logger.log_message(&format!("遵循 .gitignore 规则: {}", config.scan.respect_gitignore))?;
        logger.log_message(&format!("绘制柱状图: {}", config.display.plot))?;
    }

    let request = validate(args.rootdir.as_deref(), args.search_string.as_deref())?;

    if logger.is_enabled() {
        logger.log_message(&format!("根目录: {}", request.root().display()))?;
        logger.log_message(&format!("搜索模式: {}", request.pattern().as_str()))?;
    }

    let options = ScanOptions {
        respect_gitignore: config.scan.respect_gitignore,
        show_progress: config.display.show_progress,
    };

    let start_time = Instant::now();
    let result = scan_directory(&request, options, Arc::clone(logger) as Arc<dyn LoggerTrait>)?;
    let duration = start_time.elapsed();

    print_scan_result(&result, &config.display)?;

    // 完成日志记录
    if logger.is_enabled() {
        logger.log_message(&format!("扫描用时: {}", format_duration(duration)))?;
        logger.finalize(result.len(), result.total_matches(), duration)?;
        eprintln!("完整日志已保存到: {}", logger.log_path().display());
    }

    Ok(())
}
