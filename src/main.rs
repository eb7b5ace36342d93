use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use isolated_optimize::config::{translate, ConfigSection, UserConfig};
use isolated_optimize::preflight;
use isolated_optimize::worker::WorkerPool;
use isolated_optimize::{prepare, ExecutionContext, OptimizeRequest};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "isolated-optimize")]
#[command(about = "Prepare, check and dispatch isolated strategy optimization runs", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging (RUST_LOG still wins)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a flat user config (TOML/JSON) into the framework config
    Translate {
        config: PathBuf,

        /// Write the result as TOML instead of printing JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check job files: config, routes, dates and candle coverage
    Check {
        #[arg(required = true)]
        jobs: Vec<PathBuf>,
    },

    /// Send each job to a fresh worker process
    Dispatch {
        #[arg(required = true)]
        jobs: Vec<PathBuf>,

        /// Worker program; receives one job as JSON on stdin
        #[arg(short, long)]
        worker: PathBuf,

        /// Extra argument for the worker (repeatable)
        #[arg(long = "worker-arg", allow_hyphen_values = true)]
        worker_args: Vec<String>,

        /// Maximum concurrent workers (default: available cores)
        #[arg(short, long = "jobs")]
        jobs_in_parallel: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Translate { config, output } => run_translate(config, output),
        Commands::Check { jobs } => run_check(&jobs),
        Commands::Dispatch {
            jobs,
            worker,
            worker_args,
            jobs_in_parallel,
        } => run_dispatch(&jobs, worker, worker_args, jobs_in_parallel),
    }
}

fn run_translate(config: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let user_config = UserConfig::load(&config)
        .with_context(|| format!("loading {}", config.display()))?;
    user_config.validate()?;

    let framework_config = translate(&user_config)?;
    match output {
        Some(path) => {
            framework_config
                .save_to_file(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&framework_config)?),
    }
    Ok(())
}

fn run_check(jobs: &[PathBuf]) -> anyhow::Result<()> {
    let mut failed = 0;

    for path in jobs {
        let request = OptimizeRequest::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;

        let mut ctx = ExecutionContext::new();
        match prepare(&mut ctx, &request) {
            Ok(prepared) => {
                let issues = preflight::check(&request);
                if issues.is_empty() {
                    println!(
                        "OK    {} ({} on {} core(s))",
                        path.display(),
                        prepared.config.exchange.name(),
                        prepared.cpu_cores
                    );
                } else {
                    failed += 1;
                    println!("WARN  {}", path.display());
                    for issue in issues {
                        println!("      - {}", issue);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                println!("FAIL  {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} job(s) did not pass", failed, jobs.len());
    }
    Ok(())
}

fn run_dispatch(
    jobs: &[PathBuf],
    worker: PathBuf,
    worker_args: Vec<String>,
    jobs_in_parallel: Option<usize>,
) -> anyhow::Result<()> {
    let requests = jobs
        .iter()
        .map(|path| {
            OptimizeRequest::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut pool = WorkerPool::new(worker).with_args(worker_args);
    if let Some(n) = jobs_in_parallel {
        pool = pool.with_max_workers(n);
    }

    let results = pool.dispatch(&requests)?;
    let mut failed = 0;
    for (path, result) in jobs.iter().zip(&results) {
        match result {
            Ok(()) => println!("DONE  {}", path.display()),
            Err(e) => {
                failed += 1;
                println!("FAIL  {}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} job(s) failed", failed, jobs.len());
    }
    Ok(())
}
