use miette::Result;
use tracing::info;

use crate::garden::fence_prices;

#[tracing::instrument(skip(input))]
pub fn process(input: &str) -> Result<String> {
    let price = fence_prices(input)?.bulk;

    info!(price, "priced fences with bulk discount");
    Ok(price.to_string())
}
