use string_art::field::Field;
use string_art::layout::{CircleLayout, LayoutParams};
use string_art::raster::chord_pixels;
use nalgebra::Point2;

/// Uniform square field of the given side length.
pub fn uniform_field(size: usize, value: f32) -> Field {
    Field::filled(size, size, value)
}

/// Eight nails on a radius-100 circle centered at (100, 100) in a 200x200
/// space: the layout used by the end-to-end scenarios.
pub fn eight_nail_layout_params() -> LayoutParams {
    LayoutParams {
        num_nails: 8,
        radius: 100.0,
        center: Point2::new(100.0, 100.0),
        space: (200, 200),
    }
}

/// Zero field with a single bright chord painted between two nails, so the
/// first scan has exactly one worthwhile candidate.
pub fn field_with_bright_chord(params: &LayoutParams, from: usize, to: usize) -> Field {
    let layout = CircleLayout::generate(params).expect("valid layout");
    let (w, h) = layout.space();
    let mut field = Field::new(w, h);
    for (x, y) in chord_pixels(layout.nail_px(from), layout.nail_px(to), 1, w, h) {
        field.set(x as usize, y as usize, 1.0);
    }
    field
}
