use morph_core::{ShapeKind, TensionStatus};

/// Window title carrying the current shape, tension bar value and band, and
/// tracking state.
pub fn window_title(shape: ShapeKind, status: &TensionStatus) -> String {
    format!("Particle Morph | {shape} | {status}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::{CaptureError, Interaction};

    #[test]
    fn title_shows_shape_band_and_tracking() {
        let status = TensionStatus::from_interaction(Interaction::tension(0.8));
        assert_eq!(
            window_title(ShapeKind::Saturn, &status),
            "Particle Morph | saturn | Tension  80% [high] | Tracking Active"
        );
    }

    #[test]
    fn title_after_capture_failure_still_names_the_shape() {
        let status = TensionStatus::failed(CaptureError::NotFound);
        let title = window_title(ShapeKind::Flower, &status);
        assert!(title.contains("| flower |"), "{title}");
        assert!(title.ends_with("Tracking Failed: no camera found"), "{title}");
    }
}
