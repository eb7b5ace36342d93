//! Fan-out of optimization requests.
//!
//! Two ways to run many requests side by side:
//! - [`WorkerPool`] sends each request to a fresh OS process (the worker
//!   reads it from stdin and calls [`serve`]).
//! - [`run_batch`] runs requests on rayon threads, each with its own
//!   [`ExecutionContext`].

use crate::context::ExecutionContext;
use crate::error::{OptimizeError, Result};
use crate::optimize::{optimize, run_optimization, OptimizeRequest};
use crate::optimizer::OptimizerFactory;
use crate::routes::RouteValidator;
use rayon::prelude::*;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Lines of worker stderr kept in a failure report
const STDERR_TAIL_LINES: usize = 20;

/// Worker side: read one JSON request and run it in a fresh context.
pub fn serve<R: Read, F: OptimizerFactory>(reader: R, factory: &F) -> Result<()> {
    let request: OptimizeRequest = serde_json::from_reader(reader)?;
    log::info!(
        "Worker received request: {} route(s), {} trial(s)",
        request.routes.len(),
        request.optimal_total
    );
    optimize(request, factory)
}

/// Same as [`serve`], but against a caller-provided context.
pub fn serve_in<R: Read, F: OptimizerFactory>(
    ctx: &mut ExecutionContext,
    reader: R,
    factory: &F,
) -> Result<()> {
    let request: OptimizeRequest = serde_json::from_reader(reader)?;
    run_optimization(ctx, request, factory)
}

/// Run requests in parallel inside this process, one fresh context each.
/// Results come back in input order.
pub fn run_batch<F>(
    requests: Vec<OptimizeRequest>,
    factory: &F,
    validator: &RouteValidator,
) -> Vec<Result<()>>
where
    F: OptimizerFactory + Sync,
{
    requests
        .into_par_iter()
        .map(|request| {
            let mut ctx = ExecutionContext::with_validator(validator.clone());
            run_optimization(&mut ctx, request, factory)
        })
        .collect()
}

/// Runs each request in its own child process.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    program: PathBuf,
    args: Vec<String>,
    max_workers: usize,
}

impl WorkerPool {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Dispatch all requests, at most `max_workers` processes at a time.
    /// Results come back in input order.
    pub fn dispatch(&self, requests: &[OptimizeRequest]) -> Result<Vec<Result<()>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| OptimizeError::Configuration(format!("Failed to build worker pool: {}", e)))?;

        log::info!(
            "Dispatching {} request(s) to '{}' with {} worker(s)",
            requests.len(),
            self.program.display(),
            self.max_workers
        );

        Ok(pool.install(|| {
            requests
                .par_iter()
                .enumerate()
                .map(|(index, request)| {
                    let result = self.run_one(request);
                    match &result {
                        Ok(()) => log::info!("Request #{} finished", index),
                        Err(e) => log::warn!("Request #{} failed: {}", index, e),
                    }
                    result
                })
                .collect()
        }))
    }

    fn run_one(&self, request: &OptimizeRequest) -> Result<()> {
        let payload = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::new(ErrorKind::BrokenPipe, "worker stdin unavailable"))?;

        // Feed stdin from another thread so a chatty worker cannot fill its
        // stderr pipe while we are still blocked writing the request.
        let writer = std::thread::spawn(move || stdin.write_all(&payload));
        let output = child.wait_with_output()?;

        match writer.join() {
            Ok(Ok(())) => {}
            // Worker quit without reading everything; its exit status tells why.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(OptimizeError::Configuration(
                    "stdin writer thread panicked".to_string(),
                ))
            }
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");

        Err(OptimizeError::WorkerFailed {
            program: self.program.display().to_string(),
            status: output.status.to_string(),
            stderr: tail,
        })
    }
}
