use paddock_shared::render::Surface;

/// Pure function: convert client (viewport) coordinates to drawing-surface
/// pixels. The canvas may be laid out at a different CSS size than its
/// backing store, so both axes are scaled independently.
pub fn client_to_surface(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
    rect_w: f64,
    rect_h: f64,
    surface: Surface,
) -> Option<(f64, f64)> {
    if rect_w <= 0.0 || rect_h <= 0.0 {
        return None;
    }
    let x = (client_x - rect_left) * surface.width / rect_w;
    let y = (client_y - rect_top) * surface.height / rect_h;
    Some((x, y))
}

/// Surface coordinates of a DOM mouse event over `canvas`.
pub fn pointer_on_surface(
    evt: &web_sys::MouseEvent,
    canvas: &web_sys::HtmlCanvasElement,
    surface: Surface,
) -> Option<(f64, f64)> {
    let rect = canvas.get_bounding_client_rect();
    client_to_surface(
        evt.client_x() as f64,
        evt.client_y() as f64,
        rect.left(),
        rect.top(),
        rect.width(),
        rect.height(),
        surface,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: Surface = Surface {
        width: 1100.0,
        height: 640.0,
    };

    #[test]
    fn test_identity_when_css_size_matches() {
        let (x, y) = client_to_surface(310.0, 220.0, 10.0, 20.0, 1100.0, 640.0, SURFACE).unwrap();
        assert!((x - 300.0).abs() < 1e-9);
        assert!((y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_scales_when_canvas_is_shrunk() {
        // Canvas laid out at half size: a click at its centre is still the surface centre.
        let (x, y) = client_to_surface(275.0, 160.0, 0.0, 0.0, 550.0, 320.0, SURFACE).unwrap();
        assert!((x - 550.0).abs() < 1e-9);
        assert!((y - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_axes_scale_independently() {
        let (x, y) = client_to_surface(110.0, 128.0, 0.0, 0.0, 220.0, 256.0, SURFACE).unwrap();
        assert!((x - 550.0).abs() < 1e-9);
        assert!((y - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sized_rect_returns_none() {
        assert!(client_to_surface(1.0, 1.0, 0.0, 0.0, 0.0, 640.0, SURFACE).is_none());
        assert!(client_to_surface(1.0, 1.0, 0.0, 0.0, 1100.0, 0.0, SURFACE).is_none());
    }

    #[test]
    fn test_points_left_of_canvas_go_negative() {
        let (x, _) = client_to_surface(0.0, 50.0, 40.0, 0.0, 1100.0, 640.0, SURFACE).unwrap();
        assert!((x + 40.0).abs() < 1e-9);
    }
}
