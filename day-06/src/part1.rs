use miette::Result;
use tracing::info;

use crate::patrol::Lab;

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let lab = Lab::parse(input)?;
    let route = lab.route()?;

    info!(visited = route.len(), "guard left the lab");
    Ok(route.len().to_string())
}
