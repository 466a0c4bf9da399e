use miette::Result;
use tracing::info;

use crate::garden::fence_prices;

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let price = fence_prices(input)?.standard;

    info!(price, "priced fences");
    Ok(price.to_string())
}
