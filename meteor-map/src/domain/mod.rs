//! Domain types for the station map.
//!
//! Station ids and coordinates enforce their invariants at construction
//! time, so the engine components can trust any value they receive.

mod coordinate;
mod station;

pub use coordinate::{
    ApproxCoordinate, EARTH_RADIUS_KM, ExactCoordinate, InvalidCoordinate, haversine_km,
};
pub use station::{InvalidStationId, STATION_ID_LEN, StationId, parse_id_list};
