use console::Style;
use gigaview_core::viewport::{FramePlan, SkipReason, ViewportController};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    level: Style,
    skipped: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            level: Style::new().green(),
            skipped: Style::new().dim().yellow(),
        }
    }
}

pub fn print_frame_plan(controller: &ViewportController, plan: &FramePlan, status: Option<&str>) {
    let s = Styles::new();
    let view = &plan.view;

    println!();
    println!("  {}", s.title.apply_to("Frame Plan"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(10)));
    println!();

    if let (Some(canvas), Some(frame)) = (controller.canvas(), controller.canvas_frame()) {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Canvas"),
            s.value.apply_to(format!(
                "[{:.6}, {:.6}] - [{:.6}, {:.6}] ({frame})",
                canvas.min_x(),
                canvas.min_y(),
                canvas.max_x(),
                canvas.max_y()
            ))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Viewport"),
        s.value
            .apply_to(format!("{}x{}", view.viewport_width, view.viewport_height))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Scale"),
        s.value
            .apply_to(format!("{:.6} x {:.6}", view.scale_x, view.scale_y))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Translate"),
        s.value
            .apply_to(format!("({:.2}, {:.2})", view.translate_x, view.translate_y))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Zoom level"),
        s.value.apply_to(view.zoom_level)
    );
    if let Some(status) = status {
        println!("  {:<14}{}", s.label.apply_to("Centre"), status);
    }
    println!();

    println!("  {}", s.header.apply_to("Images"));
    for image in controller.images() {
        let id = image.id();
        println!(
            "    {:<12}{} ({}x{})",
            s.label.apply_to(id.to_string()),
            s.value.apply_to(image.name()),
            image.pixel_width(),
            image.pixel_height()
        );
        if let Some(p) = plan.placement(id) {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Level"),
                s.level
                    .apply_to(format!("{} (1/{})", p.window.level_index, p.window.factor))
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Window"),
                s.value.apply_to(p.window.rect)
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Source"),
                s.value.apply_to(p.source_rect)
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Screen"),
                s.value.apply_to(format!(
                    "({:.0},{:.0} {}x{})",
                    p.screen_rect.x0, p.screen_rect.y0, p.target_width, p.target_height
                ))
            );
        } else if let Some(reason) = plan.skip_reason(id) {
            let text = match reason {
                SkipReason::OutOfView => "out of view",
                SkipReason::Degenerate => "degenerate transform",
            };
            println!(
                "    {:<12}{}",
                s.label.apply_to("Skipped"),
                s.skipped.apply_to(text)
            );
        }
    }
    println!();
}
