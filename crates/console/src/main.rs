//! vlogcrew console: submit content-plan jobs and follow their progress.

mod client;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use client::{ApiClient, JobView};

#[derive(Parser)]
#[command(name = "vlogcrew", version, about = "Submit and follow vlog content-plan jobs")]
struct Cli {
    /// Job API base URL
    #[arg(
        long,
        env = "VLOGCREW_API_URL",
        default_value = "http://localhost:8012/api/crewai"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new job
    Submit {
        /// Target platform, e.g. douyin, xiaohongshu, bilibili
        #[arg(long)]
        platform: String,
        /// Creator niche and goals
        #[arg(long)]
        niche: String,
        /// Optional reference image (PNG/JPG)
        #[arg(long)]
        image: Option<PathBuf>,
        /// Keep polling until the job finishes
        #[arg(long)]
        watch: bool,
    },

    /// Print a job's current status, result and events
    Status {
        job_id: String,
    },

    /// Print new events until the job reaches a terminal status
    Watch {
        job_id: String,
        /// Seconds between polls
        #[arg(long, default_value_t = 3)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vlogcrew=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.base_url);
    tracing::debug!(base_url = %cli.base_url, "Using job API");

    match cli.command {
        Commands::Submit {
            platform,
            niche,
            image,
            watch,
        } => {
            if platform.trim().is_empty() || niche.trim().is_empty() {
                anyhow::bail!("--platform and --niche must not be blank");
            }
            let created = client.submit(&platform, &niche, image.as_deref()).await?;
            println!("{}", created.job_id);
            if watch {
                watch_job(&client, &created.job_id, Duration::from_secs(3)).await?;
            }
        }
        Commands::Status { job_id } => {
            let job = client.status(&job_id).await?;
            print_job(&job);
        }
        Commands::Watch {
            job_id,
            interval_secs,
        } => {
            watch_job(&client, &job_id, Duration::from_secs(interval_secs.max(1))).await?;
        }
    }

    Ok(())
}

async fn watch_job(client: &ApiClient, job_id: &str, interval: Duration) -> anyhow::Result<()> {
    let mut seen = 0;
    loop {
        let job = client.status(job_id).await?;
        for event in job.events_since(seen) {
            println!("[{}] {}", event.timestamp.format("%H:%M:%S"), event.data);
        }
        seen = job.events.len();

        if job.status.is_terminal() {
            println!("status: {}", job.status);
            print_result(&job.result);
            return Ok(());
        }
        tokio::time::sleep(interval).await;
    }
}

fn print_job(job: &JobView) {
    println!("job:    {}", job.job_id);
    println!("status: {}", job.status);
    for event in &job.events {
        println!("[{}] {}", event.timestamp.to_rfc3339(), event.data);
    }
    print_result(&job.result);
}

fn print_result(result: &serde_json::Value) {
    match result {
        serde_json::Value::String(s) if s.is_empty() => {}
        serde_json::Value::String(s) => println!("{s}"),
        other => match serde_json::to_string_pretty(other) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{other}"),
        },
    }
}
