// Host-side tests for colors.

use biosignal_plot::Color;

#[test]
fn components_are_clamped_to_unit_range() {
    let c = Color::new(1.5, -0.2, 0.5, 2.0);
    assert_eq!(c.array(), [1.0, 0.0, 0.5, 1.0]);
}

#[test]
fn nan_components_become_zero() {
    let c = Color::new(f32::NAN, 0.25, f32::NAN, 1.0);
    assert_eq!(c.r(), 0.0);
    assert_eq!(c.g(), 0.25);
    assert_eq!(c.b(), 0.0);
}

#[test]
fn default_is_opaque_black() {
    assert_eq!(Color::default(), Color::BLACK);
    assert_eq!(Color::BLACK.a(), 1.0);
    assert_eq!(Color::TRANSPARENT.a(), 0.0);
}

#[test]
fn css_string_uses_byte_channels() {
    assert_eq!(Color::new(1.0, 0.0, 0.5, 0.5).to_css(), "rgba(255, 0, 128, 0.5)");
}

#[test]
fn serializes_as_rgba_array() {
    let c = Color::new(0.0, 0.5, 1.0, 1.0);
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "[0.0,0.5,1.0,1.0]");

    let parsed: Color = serde_json::from_str("[2.0, 0.5, 0.25, 1.0]").unwrap();
    assert_eq!(parsed.array(), [1.0, 0.5, 0.25, 1.0]);
}

#[test]
fn uniform_layout_is_four_floats() {
    assert_eq!(std::mem::size_of::<Color>(), 16);
    let c = Color::new(0.1, 0.2, 0.3, 0.4);
    let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&c));
    assert_eq!(floats, &[0.1, 0.2, 0.3, 0.4]);
}
