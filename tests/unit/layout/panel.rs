//! Tests for layout metrics, panel geometry and stamp fitting

#[cfg(test)]
mod tests {
    use panelstamp::layout::panel::panel_geometry;
    use panelstamp::layout::{LayoutParams, PanelPosition, PanelRect, fit_stamp};

    // Tests output and preview metrics
    // Verified by using the output spacing for previews
    #[test]
    fn test_params_metrics() {
        let output = LayoutParams::output(PanelPosition::Left, 300, 12.0, 1.5);
        assert_eq!(output.line_height, 20);
        assert_eq!(output.padding, 10);
        assert!(output.truncate.is_none());

        let preview = LayoutParams::preview(PanelPosition::Left, 200, 10.0, 1.5);
        assert_eq!(preview.line_height, 14);
        assert_eq!(preview.padding, 5);
        assert_eq!(preview.truncate, Some((30, 35)));
    }

    // Tests content width per panel position
    // Verified by using the panel width for bottom panels
    #[test]
    fn test_content_width() {
        let left = LayoutParams::output(PanelPosition::Left, 300, 12.0, 1.0);
        assert_eq!(left.content_width(1000), 280);

        let bottom = LayoutParams::output(PanelPosition::Bottom, 300, 12.0, 1.0);
        assert_eq!(bottom.content_width(1000), 980);

        let narrow = LayoutParams::output(PanelPosition::Left, 15, 12.0, 1.0);
        assert_eq!(narrow.content_width(1000), 1);
    }

    // Tests left panels grow the canvas only when content is taller than the image
    // Verified by always using the content height
    #[test]
    fn test_left_geometry() {
        let params = LayoutParams::output(PanelPosition::Left, 200, 12.0, 1.0);

        let (canvas, origin, panel) = panel_geometry((400, 300), 85, &params);
        assert_eq!(canvas, (600, 300));
        assert_eq!(origin, (200, 0));
        assert_eq!(
            panel,
            PanelRect {
                x: 0,
                y: 0,
                width: 200,
                height: 300
            }
        );

        let (tall_canvas, _, tall_panel) = panel_geometry((400, 100), 185, &params);
        assert_eq!(tall_canvas, (600, 205));
        assert_eq!(tall_panel.bottom(), 205);
    }

    // Tests bottom panels span the image width below it
    // Verified by omitting the bottom reserve
    #[test]
    fn test_bottom_geometry() {
        let params = LayoutParams::output(PanelPosition::Bottom, 200, 12.0, 1.0);

        let (canvas, origin, panel) = panel_geometry((400, 300), 85, &params);
        assert_eq!(canvas, (400, 405));
        assert_eq!(origin, (0, 0));
        assert_eq!(panel.y, 300);
        assert_eq!(panel.height, 105);
        assert_eq!(panel.right(), 400);
    }

    // Tests stamps are scaled then shrunk to the available width
    // Verified by skipping the proportional shrink
    #[test]
    fn test_fit_stamp() {
        assert_eq!(fit_stamp(100, 50, 1.5, 1000), (150, 75));
        assert_eq!(fit_stamp(360, 100, 1.0, 180), (180, 50));
        assert_eq!(fit_stamp(0, 0, 1.0, 10), (1, 1));
        assert_eq!(fit_stamp(40, 20, f32::NAN, 100), (40, 20));
    }
}
