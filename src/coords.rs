//! Pixel-to-Data Coordinate Mapping
//!
//! Pure functions translating pointer events in screen-pixel space into
//! data-space coordinates, given the plot's pixel geometry and its fixed
//! axis ranges. The y axis inverts: pixel rows grow downward while data y
//! grows upward.
//!
//! The mapping is exact only because the visualizer pins the axis ranges
//! to a constant square; tracking pan/zoom is out of scope.

use crate::protocol::Point;

/// Visible data-axis ranges of the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    /// Left edge of the x axis.
    pub x_min: f64,
    /// Right edge of the x axis.
    pub x_max: f64,
    /// Bottom edge of the y axis.
    pub y_min: f64,
    /// Top edge of the y axis.
    pub y_max: f64,
}

impl Default for AxisBounds {
    /// The visualizer's fixed `[-10, 10] x [-10, 10]` range.
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            y_min: -10.0,
            y_max: 10.0,
        }
    }
}

/// Pixel geometry of the rendering surface.
///
/// `origin_*` is the bounding-box corner of the plot element in client
/// coordinates; the margins offset from there to the drawable content
/// rectangle, whose size is `plot_width x plot_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotGeometry {
    /// Bounding-box left edge, client pixels.
    pub origin_x: f64,
    /// Bounding-box top edge, client pixels.
    pub origin_y: f64,
    /// Content margin left of the drawable area.
    pub margin_left: f64,
    /// Content margin above the drawable area.
    pub margin_top: f64,
    /// Drawable content width in pixels.
    pub plot_width: f64,
    /// Drawable content height in pixels.
    pub plot_height: f64,
}

/// A raw pointer event in client-pixel coordinates.
///
/// This is the input-adapter boundary: the DOM shell constructs one of
/// these and everything downstream is a pure function of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Horizontal client coordinate.
    pub client_x: f64,
    /// Vertical client coordinate.
    pub client_y: f64,
}

/// Map a pointer event to data space.
///
/// Returns `None` when the event lands outside the drawable content
/// rectangle (in an axis label or margin, for instance).
pub fn data_from_pixel(
    geometry: &PlotGeometry,
    bounds: &AxisBounds,
    event: &PointerEvent,
) -> Option<Point> {
    let px = event.client_x - geometry.origin_x - geometry.margin_left;
    let py = event.client_y - geometry.origin_y - geometry.margin_top;

    if px < 0.0 || px > geometry.plot_width || py < 0.0 || py > geometry.plot_height {
        return None;
    }

    let x = bounds.x_min + (px / geometry.plot_width) * (bounds.x_max - bounds.x_min);
    // Pixel rows grow downward; data y grows upward.
    let y = bounds.y_min + (1.0 - py / geometry.plot_height) * (bounds.y_max - bounds.y_min);
    Some(Point::new(x, y))
}

/// Map a data-space point back to a pointer event.
///
/// Inverse of [`data_from_pixel`]; used to verify the round trip against
/// the surface's own projection.
pub fn pixel_from_data(geometry: &PlotGeometry, bounds: &AxisBounds, point: &Point) -> PointerEvent {
    let fx = (point.x - bounds.x_min) / (bounds.x_max - bounds.x_min);
    let fy = (point.y - bounds.y_min) / (bounds.y_max - bounds.y_min);
    PointerEvent {
        client_x: geometry.origin_x + geometry.margin_left + fx * geometry.plot_width,
        client_y: geometry.origin_y + geometry.margin_top + (1.0 - fy) * geometry.plot_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PlotGeometry {
        PlotGeometry {
            origin_x: 40.0,
            origin_y: 25.0,
            margin_left: 80.0,
            margin_top: 60.0,
            plot_width: 540.0,
            plot_height: 380.0,
        }
    }

    #[test]
    fn test_corners_map_to_axis_extremes() {
        let geom = geometry();
        let bounds = AxisBounds::default();

        // Top-left of the content rectangle is (x_min, y_max).
        let top_left = PointerEvent {
            client_x: geom.origin_x + geom.margin_left,
            client_y: geom.origin_y + geom.margin_top,
        };
        let p = data_from_pixel(&geom, &bounds, &top_left).unwrap();
        assert!((p.x - bounds.x_min).abs() < 1e-9);
        assert!((p.y - bounds.y_max).abs() < 1e-9);

        // Bottom-right is (x_max, y_min).
        let bottom_right = PointerEvent {
            client_x: geom.origin_x + geom.margin_left + geom.plot_width,
            client_y: geom.origin_y + geom.margin_top + geom.plot_height,
        };
        let p = data_from_pixel(&geom, &bounds, &bottom_right).unwrap();
        assert!((p.x - bounds.x_max).abs() < 1e-9);
        assert!((p.y - bounds.y_min).abs() < 1e-9);
    }

    #[test]
    fn test_center_maps_to_origin() {
        let geom = geometry();
        let bounds = AxisBounds::default();
        let center = PointerEvent {
            client_x: geom.origin_x + geom.margin_left + geom.plot_width / 2.0,
            client_y: geom.origin_y + geom.margin_top + geom.plot_height / 2.0,
        };
        let p = data_from_pixel(&geom, &bounds, &center).unwrap();
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let geom = geometry();
        let bounds = AxisBounds::default();
        for &(x, y) in &[
            (0.0, 0.0),
            (-9.5, 9.5),
            (3.25, -7.125),
            (9.99, -9.99),
            (-1.0, 4.0),
        ] {
            let original = Point::new(x, y);
            let pixel = pixel_from_data(&geom, &bounds, &original);
            let back = data_from_pixel(&geom, &bounds, &pixel).unwrap();
            assert!((back.x - original.x).abs() < 1e-9, "x drifted for {:?}", original);
            assert!((back.y - original.y).abs() < 1e-9, "y drifted for {:?}", original);
        }
    }

    #[test]
    fn test_clicks_outside_content_are_rejected() {
        let geom = geometry();
        let bounds = AxisBounds::default();

        // In the margin band, left of the content rectangle.
        let in_margin = PointerEvent {
            client_x: geom.origin_x + geom.margin_left - 5.0,
            client_y: geom.origin_y + geom.margin_top + 10.0,
        };
        assert!(data_from_pixel(&geom, &bounds, &in_margin).is_none());

        // Below the content rectangle.
        let below = PointerEvent {
            client_x: geom.origin_x + geom.margin_left + 10.0,
            client_y: geom.origin_y + geom.margin_top + geom.plot_height + 1.0,
        };
        assert!(data_from_pixel(&geom, &bounds, &below).is_none());
    }

    #[test]
    fn test_asymmetric_bounds() {
        let geom = geometry();
        let bounds = AxisBounds {
            x_min: 0.0,
            x_max: 100.0,
            y_min: -1.0,
            y_max: 1.0,
        };
        let original = Point::new(25.0, 0.5);
        let pixel = pixel_from_data(&geom, &bounds, &original);
        let back = data_from_pixel(&geom, &bounds, &pixel).unwrap();
        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
    }
}
