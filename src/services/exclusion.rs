//! Converts flooded sensor points into `exclude` geometry for the
//! directions provider.
//!
//! Each flooded point becomes a small plus-shaped cluster of blocked
//! coordinates (centre + 4 cardinal offsets of ~22 m), approximating a
//! circular no-go zone. The builder never truncates: bounding the token
//! count against the provider's limit is the request client's job.

use crate::constants::{EXCLUSION_OFFSET_DEGREES, EXCLUSION_TOKENS_PER_POINT};
use crate::models::{ExclusionToken, FloodPoint};

/// Five tokens per flooded point, in input order: centre, east, west,
/// north, south. Clear points contribute nothing.
pub fn build_exclusions(points: &[FloodPoint]) -> Vec<ExclusionToken> {
    points
        .iter()
        .filter(|p| p.is_flooded())
        .flat_map(|p| blocking_cluster(p, EXCLUSION_OFFSET_DEGREES))
        .collect()
}

fn blocking_cluster(
    point: &FloodPoint,
    offset: f64,
) -> [ExclusionToken; EXCLUSION_TOKENS_PER_POINT] {
    let centre = point.coordinates;
    [
        ExclusionToken(centre),
        ExclusionToken(centre.offset(0.0, offset)),
        ExclusionToken(centre.offset(0.0, -offset)),
        ExclusionToken(centre.offset(offset, 0.0)),
        ExclusionToken(centre.offset(-offset, 0.0)),
    ]
}

/// Comma-joined `point(lng lat)` list, or `None` when there is nothing to
/// exclude (the parameter must then be omitted, not sent empty).
pub fn format_exclusions(tokens: &[ExclusionToken]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    Some(
        tokens
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}
