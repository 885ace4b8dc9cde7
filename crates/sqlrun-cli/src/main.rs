use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlrun_core::{
    estimate_cost_usd, format_bytes, load_config_file, split_and_write, Overrides, OutputFormat, Settings,
    SplitOptions, SqlSource,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "sqlrun", version, about = "Split SQL files into statements and prepare them for execution")]
struct Cli {
    /// 配置文件（TOML，可含 project_id / api_key / model）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 切分一个或多个 SQL 文件（目录只展开第一层 *.sql）
    Split {
        /// 输入文件或目录
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 输出格式：text 或 json
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// 输出文件；缺省写到标准输出
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// 线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 最大文件大小（字节），超过则跳过
        #[arg(long)]
        max_file_size: Option<u64>,
    },

    /// 加载单个 SQL 文件，显示将被执行的第一条语句
    Check {
        file: PathBuf,

        /// 项目 ID（默认取 GCP_PROJECT_ID 环境变量）
        #[arg(long, short)]
        project_id: Option<String>,

        /// 显示全部语句与解析后的配置
        #[arg(long, short)]
        verbose: bool,
    },

    /// 按处理字节数估算按需查询费用
    Cost {
        bytes: u64,
    },
}

fn main() -> ExitCode {
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

/// 错误输出：`error: ` 前缀 + 完整的上下文链
fn error_line(e: &anyhow::Error) -> String {
    format!("error: {e:#}")
}

fn run(cli: Cli) -> Result<()> {

    match cli.command {
        Commands::Split { inputs, format, output, threads, max_file_size } => {
            info!(?inputs, ?output, "starting split");

            let format = match format.as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Text,
            };
            let opts = SplitOptions { format, max_file_size, threads: parse_threads(&threads) };

            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(File::create(path).context("create output file")?)),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };
            let stats = split_and_write(&inputs, &mut out, &opts).context("split failed")?;
            if format == OutputFormat::Json {
                writeln!(out)?;
            }
            out.flush().context("flush output")?;

            info!(
                files_split = stats.files_split,
                files_skipped = stats.files_skipped,
                statements = stats.statements_written,
                unterminated = stats.unterminated,
                "split finished"
            );
        }
        Commands::Check { file, project_id, verbose } => {
            let config = match &cli.config {
                Some(path) => Some(load_config_file(path)?),
                None => None,
            };
            let overrides = Overrides {
                project_id,
                ..Default::default()
            };
            let settings = Settings::from_env(&overrides, config.as_ref());

            let source = SqlSource::load(&file)?;
            let statements = source.statements();
            if verbose {
                println!("SQL file: {}", file.display());
                println!("Project ID: {}", settings.project_id.as_deref().unwrap_or("(unset)"));
                println!("Statements: {}", statements.len());
                for (i, stmt) in statements.iter().enumerate() {
                    println!("\n[{}]\n{stmt}", i + 1);
                }
                println!("\n{}", "=".repeat(60));
            }
            if settings.project_id.is_none() {
                warn!("project id is not set; running this file would fail");
            }
            println!("{}", source.first_statement());
        }
        Commands::Cost { bytes } => {
            println!("Data processed: {}", format_bytes(bytes));
            println!("Estimated cost: ${:.6}", estimate_cost_usd(bytes));
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug；日志写 stderr，不干扰语句输出
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).with_writer(io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
