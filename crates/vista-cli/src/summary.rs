use std::path::Path;

use console::Style;
use vista_core::ImageView;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_render_summary(view: &ImageView, input: &Path, output: &Path, backend_name: &str) {
    let s = Styles::new();
    let config = view.config();
    let widget = view.widget_size();

    println!();
    println!("  {}", s.title.apply_to("Vista Render"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(input.display()));
    println!("  {:<14}{}", s.label.apply_to("Output"), s.path.apply_to(output.display()));
    println!("  {:<14}{}", s.label.apply_to("Backend"), s.method.apply_to(backend_name));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Widget"),
        s.value.apply_to(format!("{}x{}", widget.width, widget.height))
    );
    println!();

    let scale = view
        .current_scaling_factor()
        .map(|f| format!("{:.2}%", f * 100.0))
        .unwrap_or_else(|| "-".into());
    println!("  {:<14}{}", s.label.apply_to("Scale"), s.value.apply_to(scale));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Zoom exp"),
        s.value.apply_to(format!("{:.3}", view.zoom_exponent()))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Rotation"),
        s.value.apply_to(format!("{:.1}\u{00b0}", view.rotation()))
    );
    let pan = view.pan_offset();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Pan"),
        s.value.apply_to(format!("({:.1}, {:.1})", pan.x, pan.y))
    );

    if config.high_quality_downscaling {
        println!("  {:<14}{}", s.label.apply_to("Downscale"), s.method.apply_to("area average"));
    } else {
        println!("  {:<14}{}", s.label.apply_to("Downscale"), s.disabled.apply_to("off"));
    }
    match config.sharpen.params() {
        Some(p) => println!(
            "  {:<14}{}",
            s.label.apply_to("Sharpen"),
            s.method.apply_to(format!("strength {:.2}, radius {:.2}", p.strength, p.radius))
        ),
        None => println!("  {:<14}{}", s.label.apply_to("Sharpen"), s.disabled.apply_to("off")),
    }
    if !view.points().is_empty() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Points"),
            s.value.apply_to(view.points().len())
        );
    }
    if let Some(visible) = view.visible_image_rect() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Visible"),
            s.value.apply_to(format!(
                "({:.0}, {:.0}) - ({:.0}, {:.0})",
                visible.x0, visible.y0, visible.x1, visible.y1
            ))
        );
    }
    println!();
}
