/// Geographic position in degrees (WGS84).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}
