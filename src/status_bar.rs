//! Module for the status bar: the readout of the view and the pixel under the pointer

use crate::cursor::CursorSample;
use crate::transform_state::TransformState;

pub struct StatusBar {
    /// The left text of the bar
    left_text: String,
    /// The right text of the bar
    right_text: String,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            left_text: String::new(),
            right_text: String::new(),
        }
    }

    /// Set the text of the status bar
    pub fn set_text(&mut self, text: (String, String)) {
        let (l, r) = text;
        self.left_text = l;
        self.right_text = r;
    }

    /// Update the text from the cursor and view
    pub fn update(&mut self, cursor: Option<&CursorSample>, state: &TransformState) {
        self.set_text((cursor_text(cursor), view_text(state)));
    }

    pub fn left_text(&self) -> &str {
        &self.left_text
    }

    pub fn right_text(&self) -> &str {
        &self.right_text
    }

    /// Lay out the bar on a line of `width` characters
    /// The right text keeps as much space as it requires and the left text is truncated to fit
    pub fn render(&self, width: usize) -> String {
        const TEXT_GAP: usize = 2;

        let right_width = self.right_text.chars().count();
        let left_space = width.saturating_sub(right_width + TEXT_GAP);
        let left: String = self.left_text.chars().take(left_space).collect();

        let padding = width.saturating_sub(left.chars().count() + right_width).max(TEXT_GAP);

        format!("{}{}{}", left, " ".repeat(padding), self.right_text)
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Readout of the pixel under the pointer
fn cursor_text(cursor: Option<&CursorSample>) -> String {
    let Some(cursor) = cursor else {
        return String::new();
    };

    let mut text = format!("x: {:.2}, y: {:.2}", cursor.image.x, cursor.image.y);

    if !cursor.in_bounds {
        return text;
    }

    match cursor.value {
        Some(value) => text.push_str(&format!("  value: {}", value)),
        None => text.push_str("  value: -"),
    }

    if let Some(celestial) = &cursor.celestial {
        text.push_str(&format!(
            "  RA: {} ({})  Dec: {} ({})",
            celestial.ra_sexagesimal,
            celestial.ra_decimal(),
            celestial.dec_sexagesimal,
            celestial.dec_decimal(),
        ));
    }

    text
}

/// Summary of the view orientation
fn view_text(state: &TransformState) -> String {
    format!(
        "{:.0}%  {:.1}°{}{}{}",
        state.scale() * 100.0,
        state.rotation().degrees(),
        if state.flip_horizontal() { "  flip-h" } else { "" },
        if state.flip_vertical() { "  flip-v" } else { "" },
        if state.is_wcs_locked() { "  WCS" } else { "" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celestial::CelestialCoordinates;
    use crate::geometry::Point;

    fn sample(in_bounds: bool, celestial: Option<CelestialCoordinates>) -> CursorSample {
        CursorSample {
            screen: Point::new(10.0, 10.0),
            image: Point::new(50.5, 20.25),
            pixel_x: 50,
            pixel_y: 19,
            in_bounds,
            value: in_bounds.then_some(3.5),
            celestial,
        }
    }

    #[test]
    fn empty_without_cursor() {
        let mut bar = StatusBar::new();
        bar.update(None, &TransformState::default());

        assert_eq!(bar.left_text(), "");
        assert_eq!(bar.right_text(), "100%  0.0°");
    }

    #[test]
    fn out_of_bounds_shows_position_only() {
        let mut bar = StatusBar::new();
        bar.update(Some(&sample(false, None)), &TransformState::default());

        assert_eq!(bar.left_text(), "x: 50.50, y: 20.25");
    }

    #[test]
    fn shows_value_and_coordinates() {
        let mut bar = StatusBar::new();
        let celestial = CelestialCoordinates::new(150.0, -2.2);
        bar.update(Some(&sample(true, Some(celestial))), &TransformState::default());

        assert_eq!(
            bar.left_text(),
            "x: 50.50, y: 20.25  value: 3.5  RA: 10:00:00.00 (150.000000)  Dec: -02:12:00.00 (-2.200000)"
        );
    }

    #[test]
    fn render_keeps_right_text() {
        let mut bar = StatusBar::new();
        bar.set_text(("left side text".to_string(), "right".to_string()));

        assert_eq!(bar.render(20), "left side tex  right");
        assert_eq!(bar.render(30).len(), 30);
        assert!(bar.render(30).ends_with("right"));
    }
}
