use morph_core::{ControlCommand, Rgb, ShapeKind};
use winit::keyboard::KeyCode;

/// Swatches cycled by the color key; the first is the default base color.
pub const PALETTE: [&str; 6] = ["#ff0055", "#00ff88", "#ffaa00", "#33aaff", "#cc66ff", "#ffffff"];

#[inline]
pub fn shape_for_key(code: KeyCode) -> Option<ShapeKind> {
    match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(ShapeKind::Heart),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(ShapeKind::Flower),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(ShapeKind::Saturn),
        KeyCode::Digit4 | KeyCode::Numpad4 => Some(ShapeKind::MeditatingFigure),
        KeyCode::Digit5 | KeyCode::Numpad5 => Some(ShapeKind::Starburst),
        _ => None,
    }
}

/// Palette entry after `index`, wrapping.
pub fn next_palette_color(index: &mut usize) -> Rgb {
    *index = (*index + 1) % PALETTE.len();
    Rgb::from_hex(PALETTE[*index]).unwrap_or_default()
}

/// Translate a key press into an engine command.
pub fn command_for_key(code: KeyCode, palette_index: &mut usize) -> Option<ControlCommand> {
    if let Some(shape) = shape_for_key(code) {
        return Some(ControlCommand::SelectShape(shape));
    }
    match code {
        KeyCode::KeyC => Some(ControlCommand::SelectColor(next_palette_color(palette_index))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_shapes_in_order() {
        let digits = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
        ];
        for (code, kind) in digits.into_iter().zip(ShapeKind::ALL) {
            assert_eq!(shape_for_key(code), Some(kind));
        }
        assert_eq!(shape_for_key(KeyCode::Numpad3), Some(ShapeKind::Saturn));
        assert_eq!(shape_for_key(KeyCode::Digit6), None);
    }

    #[test]
    fn color_key_cycles_palette() {
        let mut index = 0;
        for step in 1..=PALETTE.len() {
            let cmd = command_for_key(KeyCode::KeyC, &mut index);
            let expected = Rgb::from_hex(PALETTE[step % PALETTE.len()]).unwrap();
            assert_eq!(cmd, Some(ControlCommand::SelectColor(expected)));
        }
        assert_eq!(index, 0);
        assert_eq!(command_for_key(KeyCode::KeyQ, &mut index), None);
    }

    #[test]
    fn palette_entries_parse() {
        for hex in PALETTE {
            assert!(Rgb::from_hex(hex).is_ok(), "{hex}");
        }
        assert_eq!(Rgb::from_hex(PALETTE[0]).unwrap(), Rgb::default());
    }
}
