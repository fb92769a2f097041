pub mod error;
pub mod params;

pub mod alignment;
pub mod classify;
pub mod coords;
pub mod genome;
pub mod io;
pub mod output;
pub mod pipeline;
pub mod select;
pub mod splice;
pub mod stats;

use log::info;

use crate::params::Parameters;

/// Top-level entry point. Called from `main()` after CLI parsing.
pub fn run(params: &Parameters) -> anyhow::Result<()> {
    params.validate()?;

    info!("denovofusion v{}", env!("CARGO_PKG_VERSION"));
    info!("method: {}", params.method);
    info!("threads: {}", params.threads);
    if params.reference.is_none() {
        info!("no --reference given; splice correction disabled");
    }

    let report = pipeline::run_pipeline(params)?;
    info!(
        "Done: {} fusion candidates in {}",
        report.candidates.len(),
        report.candidates_path.display()
    );
    Ok(())
}
