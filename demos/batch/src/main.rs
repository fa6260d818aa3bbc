use tracing::info;

use gkelog_context::{Context, set_labels};
use gkelog_observe::{LoggerConfig, init_logger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logger(&LoggerConfig::default())?;

    // Each job runs in its own scope seeded from the caller's labels, so
    // the job_id of one iteration never bleeds into the next.
    for i in 0..10 {
        let job_id = format!("{}", i + 1);
        Context::capture().scope(run_job(job_id)).await;
    }
    Ok(())
}

async fn run_job(job_id: String) {
    set_labels([("job_id", job_id)]);
    info!("started job");
    // ... do some more work ...
    info!("job finished");
}
