//! Map annotation: markers, radius circles and camera for the selected endpoints,
//! plus the clickable sample-airport map.

use crate::location::{LatLng, Location, Side};
use crate::search::SearchCriteria;
use serde::Serialize;
use tracing::debug;

pub const METERS_PER_MILE: f64 = 1609.34;

pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Continental US, shown before anything is selected.
pub const DEFAULT_CENTER: LatLng = LatLng { lat: 39.8283, lng: -98.5795 };
pub const DEFAULT_ZOOM: u8 = 4;
pub const FOCUS_ZOOM: u8 = 8;
pub const FIT_PADDING_PX: u32 = 50;

const ORIGIN_COLOR: &str = "#16a34a";
const DESTINATION_COLOR: &str = "#2563eb";
const CIRCLE_FILL_OPACITY: f64 = 0.15;

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

fn side_color(side: Side) -> &'static str {
    match side {
        Side::Origin => ORIGIN_COLOR,
        Side::Destination => DESTINATION_COLOR,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub side: Side,
    pub position: LatLng,
    /// Three-letter code drawn inside the marker icon.
    pub code: String,
    pub title: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub side: Side,
    pub center: LatLng,
    pub radius_meters: f64,
    pub color: &'static str,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Camera {
    Center { center: LatLng, zoom: u8 },
    FitBounds { south_west: LatLng, north_east: LatLng, padding_px: u32 },
}

impl Default for Camera {
    fn default() -> Self {
        Camera::Center { center: DEFAULT_CENTER, zoom: DEFAULT_ZOOM }
    }
}

/// Everything drawn on top of the tiles.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MapScene {
    pub markers: Vec<Marker>,
    pub circles: Vec<Circle>,
    pub camera: Camera,
}

impl MapScene {
    /// Build the scene for the current form state from scratch.
    pub fn for_criteria(criteria: &SearchCriteria) -> Self {
        let mut scene = MapScene::default();
        let mut points = Vec::with_capacity(2);

        for side in [Side::Origin, Side::Destination] {
            let Some(location) = criteria.location(side) else { continue };
            let Some(position) = location.coordinates() else {
                debug!(side = %side, location = %location, "Skipping location without coordinates");
                continue;
            };

            scene.markers.push(Marker {
                side,
                position,
                code: location.code(),
                title: location.label(),
                color: side_color(side),
            });

            let radius = criteria.radius(side);
            if radius > 0.0 {
                scene.circles.push(Circle {
                    side,
                    center: position,
                    radius_meters: miles_to_meters(radius),
                    color: side_color(side),
                    fill_opacity: CIRCLE_FILL_OPACITY,
                });
            }
            points.push(position);
        }

        scene.camera = match points.as_slice() {
            [a, b] => Camera::FitBounds {
                south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
                north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
                padding_px: FIT_PADDING_PX,
            },
            [only] => Camera::Center { center: *only, zoom: FOCUS_ZOOM },
            _ => Camera::default(),
        };
        scene
    }
}

/// A live map instance with its tile layer and current annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapInstance {
    pub tile_url: &'static str,
    pub attribution: &'static str,
    pub scene: MapScene,
}

/// Owner of at most one map instance.
#[derive(Debug, Default)]
pub struct MapView {
    instance: Option<MapInstance>,
    renders: u64,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the map. A second call while mounted does nothing and returns `false`.
    pub fn mount(&mut self) -> bool {
        if self.instance.is_some() {
            debug!("Map already mounted");
            return false;
        }
        self.instance = Some(MapInstance {
            tile_url: TILE_URL,
            attribution: TILE_ATTRIBUTION,
            scene: MapScene::default(),
        });
        debug!("Map mounted");
        true
    }

    pub fn is_mounted(&self) -> bool {
        self.instance.is_some()
    }

    /// Tear the map down, dropping the instance with every layer on it.
    pub fn unmount(&mut self) -> Option<MapInstance> {
        let instance = self.instance.take();
        if instance.is_some() {
            debug!("Map unmounted");
        }
        instance
    }

    /// Remove all markers and circles and redraw them for `criteria`.
    pub fn render(&mut self, criteria: &SearchCriteria) -> Option<&MapScene> {
        let instance = self.instance.as_mut()?;
        instance.scene = MapScene::for_criteria(criteria);
        self.renders += 1;
        debug!(
            markers = instance.scene.markers.len(),
            circles = instance.scene.circles.len(),
            render = self.renders,
            "Map redrawn"
        );
        Some(&instance.scene)
    }

    pub fn scene(&self) -> Option<&MapScene> {
        self.instance.as_ref().map(|i| &i.scene)
    }
}

/// A clickable airport on the sample map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AirportPin {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub position: LatLng,
}

impl AirportPin {
    pub fn to_location(&self) -> Location {
        Location::airport(self.code, self.name, self.city, self.position.lat, self.position.lng)
    }
}

const fn pin(
    code: &'static str,
    name: &'static str,
    city: &'static str,
    lat: f64,
    lng: f64,
) -> AirportPin {
    AirportPin { code, name, city, position: LatLng { lat, lng } }
}

pub const SAMPLE_AIRPORTS: [AirportPin; 10] = [
    pin("ATL", "Hartsfield-Jackson Atlanta Intl", "Atlanta", 33.6407, -84.4277),
    pin("JFK", "New York JFK", "New York", 40.6413, -73.7781),
    pin("LAX", "Los Angeles Intl", "Los Angeles", 33.9416, -118.4085),
    pin("ORD", "Chicago O'Hare", "Chicago", 41.9742, -87.9073),
    pin("DFW", "Dallas/Fort Worth", "Dallas", 32.8998, -97.0403),
    pin("DEN", "Denver Intl", "Denver", 39.8561, -104.6737),
    pin("LAS", "Harry Reid Intl", "Las Vegas", 36.0840, -115.1537),
    pin("PHX", "Phoenix Sky Harbor", "Phoenix", 33.4342, -112.0116),
    pin("SEA", "Seattle-Tacoma Intl", "Seattle", 47.4502, -122.3088),
    pin("MIA", "Miami Intl", "Miami", 25.7959, -80.2870),
];

/// How a pin is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    Origin,
    Destination,
    Idle,
}

/// Pick origin and destination by clicking sample airport pins.
#[derive(Debug, Clone)]
pub struct MapPicker {
    selecting_for: Side,
    pins: &'static [AirportPin],
}

impl Default for MapPicker {
    fn default() -> Self {
        Self { selecting_for: Side::Origin, pins: &SAMPLE_AIRPORTS }
    }
}

impl MapPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selecting_for(&self) -> Side {
        self.selecting_for
    }

    /// The "Select Origin" / "Select Destination" toggle.
    pub fn select_side(&mut self, side: Side) {
        self.selecting_for = side;
    }

    pub fn pins(&self) -> &'static [AirportPin] {
        self.pins
    }

    /// Click on the pin with `code`. Writes the selection into `criteria`;
    /// an origin pick moves the picker on to the destination.
    pub fn click(&mut self, code: &str, criteria: &mut SearchCriteria) -> Option<Side> {
        let pin = self.pins.iter().find(|p| p.code.eq_ignore_ascii_case(code))?;
        let side = self.selecting_for;
        criteria.set_location(side, pin.to_location());
        if side == Side::Origin {
            self.selecting_for = Side::Destination;
        }
        debug!(code = pin.code, side = %side, "Map pin selected");
        Some(side)
    }

    pub fn pin_state(&self, pin: &AirportPin, criteria: &SearchCriteria) -> PinState {
        let selected = |side| criteria.location(side).and_then(Location::iata) == Some(pin.code);
        if selected(Side::Origin) {
            PinState::Origin
        } else if selected(Side::Destination) {
            PinState::Destination
        } else {
            PinState::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria_with(origin: Option<Location>, destination: Option<Location>) -> SearchCriteria {
        SearchCriteria { origin, destination, ..SearchCriteria::default() }
    }

    #[test]
    fn test_empty_scene_uses_default_view() {
        let scene = MapScene::for_criteria(&SearchCriteria::default());
        assert!(scene.markers.is_empty());
        assert!(scene.circles.is_empty());
        assert_eq!(scene.camera, Camera::default());
    }

    #[test]
    fn test_single_point_centers() {
        let paris = Location::city("Paris", 48.8566, 2.3522);
        let scene = MapScene::for_criteria(&criteria_with(None, Some(paris)));

        assert_eq!(scene.markers.len(), 1);
        assert_eq!(scene.markers[0].side, Side::Destination);
        assert_eq!(scene.markers[0].code, "PAR");
        assert_eq!(
            scene.camera,
            Camera::Center { center: LatLng::new(48.8566, 2.3522), zoom: FOCUS_ZOOM }
        );
    }

    #[test]
    fn test_two_points_fit_bounds_and_circles_in_meters() {
        let mut criteria = criteria_with(
            Some(SAMPLE_AIRPORTS[1].to_location()),
            Some(Location::city("Los Angeles", 34.05, -118.24)),
        );
        criteria.set_radius(Side::Origin, 0.0);
        criteria.set_radius(Side::Destination, 100.0);

        let scene = MapScene::for_criteria(&criteria);
        assert_eq!(scene.markers.len(), 2);
        assert_eq!(scene.markers[0].code, "JFK");
        assert_eq!(scene.circles.len(), 1);
        assert_eq!(scene.circles[0].side, Side::Destination);
        assert!((scene.circles[0].radius_meters - 160_934.0).abs() < 1e-6);

        match scene.camera {
            Camera::FitBounds { south_west, north_east, padding_px } => {
                assert_eq!(south_west, LatLng::new(34.05, -118.24));
                assert_eq!(north_east, LatLng::new(40.6413, -73.7781));
                assert_eq!(padding_px, FIT_PADDING_PX);
            }
            other => panic!("expected fit bounds, got {:?}", other),
        }
    }

    #[test]
    fn test_render_replaces_previous_layers() {
        let mut view = MapView::new();
        assert!(view.render(&SearchCriteria::default()).is_none());

        assert!(view.mount());
        assert!(!view.mount());

        let mut criteria = criteria_with(
            Some(SAMPLE_AIRPORTS[0].to_location()),
            Some(SAMPLE_AIRPORTS[2].to_location()),
        );
        assert_eq!(view.render(&criteria).unwrap().markers.len(), 2);
        assert_eq!(view.render(&criteria).unwrap().circles.len(), 2);

        criteria.destination = None;
        let scene = view.render(&criteria).unwrap();
        assert_eq!(scene.markers.len(), 1);
        assert_eq!(scene.circles.len(), 1);

        let instance = view.unmount().expect("was mounted");
        assert_eq!(instance.scene.markers.len(), 1);
        assert!(!view.is_mounted());
        assert!(view.scene().is_none());
        assert!(view.mount());
        assert!(view.scene().unwrap().markers.is_empty());
    }

    #[test]
    fn test_map_picker_advances_to_destination() {
        let mut picker = MapPicker::new();
        let mut criteria = SearchCriteria::default();

        assert_eq!(picker.click("sea", &mut criteria), Some(Side::Origin));
        assert_eq!(picker.selecting_for(), Side::Destination);
        assert_eq!(picker.click("MIA", &mut criteria), Some(Side::Destination));
        assert_eq!(picker.selecting_for(), Side::Destination);
        assert_eq!(picker.click("XXX", &mut criteria), None);

        assert_eq!(criteria.origin.as_ref().and_then(Location::iata), Some("SEA"));
        assert_eq!(criteria.destination.as_ref().and_then(Location::iata), Some("MIA"));

        let states: Vec<PinState> = picker
            .pins()
            .iter()
            .map(|p| picker.pin_state(p, &criteria))
            .collect();
        assert_eq!(states.iter().filter(|s| **s == PinState::Origin).count(), 1);
        assert_eq!(states.iter().filter(|s| **s == PinState::Destination).count(), 1);

        picker.select_side(Side::Origin);
        picker.click("DEN", &mut criteria);
        assert_eq!(criteria.origin.as_ref().and_then(Location::iata), Some("DEN"));
    }
}
