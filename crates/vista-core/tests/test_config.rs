use vista_core::config::{Color, SharpenConfig, ViewConfig};
use vista_core::resample::{DevicePreference, SharpenParams};

// ---------------------------------------------------------------------------
// DevicePreference
// ---------------------------------------------------------------------------

#[test]
fn test_device_preference_display() {
    assert_eq!(format!("{}", DevicePreference::Auto), "Auto");
    assert_eq!(format!("{}", DevicePreference::Cpu), "CPU");
    assert_eq!(format!("{}", DevicePreference::Gpu), "GPU");
}

#[test]
fn test_device_preference_default_is_auto() {
    assert_eq!(DevicePreference::default(), DevicePreference::Auto);
    assert!(DevicePreference::Auto.wants_gpu());
    assert!(!DevicePreference::Cpu.wants_gpu());
}

// ---------------------------------------------------------------------------
// ViewConfig
// ---------------------------------------------------------------------------

#[test]
fn test_view_config_defaults() {
    let c = ViewConfig::default();
    assert!(c.high_quality_downscaling);
    assert!(c.smooth_transform);
    assert!(c.pan_zoom_enabled);
    assert!(!c.right_click_for_hundred_percent);
    assert!(!c.sharpen.enabled);
    assert_eq!(c.grab_tolerance, 10.0);
    assert_eq!(c.zoom_base, 1.5);
}

#[test]
fn test_sharpen_params_only_when_enabled() {
    let mut s = SharpenConfig::default();
    assert_eq!(s.params(), None);
    s.enabled = true;
    s.strength = 0.7;
    s.radius = 1.5;
    assert_eq!(
        s.params(),
        Some(SharpenParams {
            strength: 0.7,
            radius: 1.5
        })
    );
}

#[test]
fn test_view_config_json_roundtrip() {
    let mut c = ViewConfig::default();
    c.use_gpu = DevicePreference::Cpu;
    c.outline_color = Color::rgba(1, 2, 3, 4);
    c.sharpen.enabled = true;
    let json = serde_json::to_string(&c).unwrap();
    let back: ViewConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
}

#[test]
fn test_view_config_partial_toml_uses_defaults() {
    let text = r#"
        smooth_transform = false
        use_gpu = "Cpu"

        [sharpen]
        enabled = true
        strength = 1.25
    "#;
    let c: ViewConfig = toml::from_str(text).unwrap();
    assert!(!c.smooth_transform);
    assert_eq!(c.use_gpu, DevicePreference::Cpu);
    assert!(c.sharpen.enabled);
    assert_eq!(c.sharpen.strength, 1.25);
    assert_eq!(c.sharpen.radius, SharpenConfig::default().radius);
    assert!(c.high_quality_downscaling);
}

#[test]
fn test_view_config_toml_roundtrip() {
    let c = ViewConfig::default();
    let text = toml::to_string_pretty(&c).unwrap();
    let back: ViewConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, c);
}

#[test]
fn test_affects_resampling() {
    let base = ViewConfig::default();
    let mut other = base.clone();
    other.outline_color = Color::rgb(255, 0, 0);
    other.grab_tolerance = 4.0;
    assert!(!base.affects_resampling(&other));
    other.sharpen.enabled = true;
    assert!(base.affects_resampling(&other));
}

#[test]
fn test_color_with_alpha() {
    let c = Color::rgb(10, 20, 30).with_alpha(128);
    assert_eq!(c, Color::rgba(10, 20, 30, 128));
}
