//! 주가 이력 파이프라인 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 수집 → 정규화 → 지표 → 모델 적합
//! equity run
//!
//! # 저장된 CSV로 오프라인 실행
//! equity run --input data/meta_history.csv
//!
//! # 5스텝 예측
//! equity predict --steps 5
//!
//! # 적합 진단 지표
//! equity metrics
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use equity_core::{init_logging, AppConfig, LogConfig};

mod commands;

use commands::metrics::{compute_metrics, print_metrics};
use commands::predict::{predict, print_forecast};
use commands::run::{print_summary, run_pipeline};

#[derive(Parser)]
#[command(name = "equity")]
#[command(about = "Equity price history pipeline - 시세 수집, 지표 계산, ARIMA 예측", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 전체 파이프라인 실행 (수집 → 정규화 → 저장 → 지표 → 모델 적합)
    Run {
        /// 웹 페이지 대신 읽을 CSV 파일
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// 저장된 모델로 예측
    Predict {
        /// 예측 스텝 수 (기본: 설정의 forecast.default_steps)
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// 저장된 모델의 적합 진단 지표
    Metrics,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    init_logging(LogConfig::from(&config.logging)).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Run { input } => {
            info!(input = ?input, "Starting pipeline run");
            match run_pipeline(&config, input.as_deref()).await {
                Ok(summary) => print_summary(&summary),
                Err(e) => {
                    error!("Pipeline failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Predict { steps } => {
            let steps = steps.unwrap_or(config.forecast.default_steps);
            let values = predict(&config, steps);
            print_forecast(steps, &values);
        }

        Commands::Metrics => {
            let diagnostics = compute_metrics(&config);
            print_metrics(diagnostics.as_ref());
        }
    }

    Ok(())
}
