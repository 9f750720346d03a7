// ── Vendor REST API ──
//
// AOS-CX style switch API: cookie session login, `/rest/{version}/...`
// resources keyed by name, PATCH for partial updates. Endpoint groups are
// inherent methods spread over `auth` and `endpoints`.

mod auth;
mod client;
mod endpoints;
pub mod models;

pub use client::{DEFAULT_API_VERSION, RestClient};
pub use models::{
    RestArpEntry, RestInterface, RestLldpNeighbor, RestMacEntry, RestPoeInterface, RestSystem,
    RestVlan,
};
