use day_10::part1::process;
use miette::{Context, IntoDiagnostic};
use tracing_subscriber::EnvFilter;

#[tracing::instrument]
fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = std::io::read_to_string(std::io::stdin())
        .into_diagnostic()
        .context("read topographic map from stdin")?;
    let result = process(&input).context("process part 1")?;
    println!("{}", result);
    Ok(())
}
