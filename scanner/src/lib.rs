//! Client-side adapters for the attendance check-in flow.
//!
//! The pieces here sit between the device (camera, geolocation) and the
//! check-in API: QR decoding with single-fire delivery, token resolution
//! from scanned payloads, a location provider seam with a fixed error
//! taxonomy, and the flow that assembles the check-in request payload.

pub mod decode;
pub mod flow;
pub mod location;
pub mod token;
