use std::io::{stdin, stdout};

use anyhow::Result;
use tracing::error;

use farchess_worker::{Worker, WorkerConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = WorkerConfig::from_env();
    let mut worker = Worker::new(config);

    if let Err(err) = worker.run(stdin().lock(), stdout().lock()) {
        error!(%err, "worker loop exited with an error");
        return Err(err.into());
    }

    Ok(())
}
