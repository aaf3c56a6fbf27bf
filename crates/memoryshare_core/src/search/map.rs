//! Map projections: marker list and initial viewport.

use crate::model::memory::{Location, Memory, MemoryId};

/// Viewport used when there are no memories to centre on (Trondheim).
pub const DEFAULT_CENTER: Location = Location {
    latitude: 63.4305,
    longitude: 10.3951,
};
/// Span, in degrees, of the initial viewport on both axes.
pub const DEFAULT_DELTA: f64 = 0.1;

/// One marker per memory; selecting it opens the memory by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: MemoryId,
    pub title: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    pub center: Location,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

pub fn map_markers(memories: &[Memory]) -> Vec<MapMarker> {
    memories
        .iter()
        .map(|memory| MapMarker {
            id: memory.id.clone(),
            title: memory.title.clone(),
            location: memory.location,
        })
        .collect()
}

/// Centres on the first (newest) memory, or on [`DEFAULT_CENTER`].
pub fn initial_region(memories: &[Memory]) -> MapRegion {
    let center = memories
        .first()
        .map_or(DEFAULT_CENTER, |memory| memory.location);
    MapRegion {
        center,
        latitude_delta: DEFAULT_DELTA,
        longitude_delta: DEFAULT_DELTA,
    }
}
