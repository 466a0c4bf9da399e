use miette::{Context, Result};
use region_grid::{measure, parse_grid, validate, Adjacency, FencePrices, RegionBuilder, RegionMetrics};
use tracing::debug;

/// Parses a garden map and measures every plant region in it.
///
/// Debug builds also check the region partition before measuring.
pub fn survey(input: &str) -> Result<Vec<RegionMetrics<char>>> {
    let grid = parse_grid(input).wrap_err("Failed to parse garden map")?;
    let adjacency = Adjacency::link(&grid);
    let regions = RegionBuilder::new(&grid, &adjacency).build();

    if cfg!(debug_assertions) {
        validate(&grid, &adjacency, &regions).wrap_err("Region labelling is inconsistent")?;
    }

    debug!(
        plants = regions.labels().len(),
        regions = regions.region_count(),
        "surveyed garden"
    );
    Ok(measure(&regions, &adjacency))
}

/// Both fence prices for a garden map.
pub fn fence_prices(input: &str) -> Result<FencePrices> {
    let metrics = survey(input)?;
    Ok(region_grid::fence_prices(&metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_simple() -> miette::Result<()> {
        let metrics = survey(
            "AAAA
BBCD
BBCC
EEEC",
        )?;

        assert_eq!(5, metrics.len());
        let d = metrics.iter().find(|m| m.label == 'D').unwrap();
        assert_eq!((1, 4, 4), (d.area, d.perimeter, d.corners));
        Ok(())
    }

    #[test]
    fn test_fence_prices_enclave() -> miette::Result<()> {
        let prices = fence_prices(
            "OOOOO
OXOXO
OOOOO
OXOXO
OOOOO",
        )?;
        assert_eq!(
            FencePrices {
                standard: 772,
                bulk: 436
            },
            prices
        );
        Ok(())
    }

    #[test]
    fn test_survey_rejects_ragged_map() {
        let err = survey("AAA\nAA").unwrap_err();
        assert_eq!("Failed to parse garden map", err.to_string());
    }
}
