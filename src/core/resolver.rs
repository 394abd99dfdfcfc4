use crate::core::distance::haversine_meters;
use crate::domain::model::{Center, Filter, Location, RankedCenter, RankedResult};
use crate::utils::error::{FinderError, Result};

/// Ranks `catalog` by distance from `location`.
///
/// Centers rejected by `filter` are dropped before any distance is computed.
/// The sort is stable, so centers at equal distance keep their catalog order,
/// and `limit` keeps only the nearest `limit` entries. An empty catalog gives
/// an empty result.
///
/// Fails with `InvalidArgument` when `location` is out of range or `limit` is
/// not positive.
pub fn resolve<'a>(
    location: &Location,
    catalog: &'a [Center],
    filter: Option<&Filter>,
    limit: Option<i64>,
) -> Result<RankedResult<'a>> {
    location.validate()?;
    let limit = match limit {
        Some(n) if n <= 0 => {
            return Err(FinderError::invalid_argument(format!(
                "limit must be positive, got {}",
                n
            )))
        }
        Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        None => None,
    };

    let mut ranked: Vec<RankedCenter<'a>> = catalog
        .iter()
        .filter(|center| filter.map_or(true, |f| f.matches(center)))
        .map(|center| RankedCenter {
            center,
            distance_m: haversine_meters(location, &center.location),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

    let mut result = RankedResult::from_sorted(ranked);
    if let Some(limit) = limit {
        result.truncate(limit);
    }

    tracing::debug!(
        "Resolved {} of {} centers around {}",
        result.len(),
        catalog.len(),
        location
    );
    Ok(result)
}
