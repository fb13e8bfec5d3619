//! Replays renderer frames onto a 2D canvas.
use paddock_shared::render::{DrawCommand, TextAlign, TextBaseline};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Find the canvas element and its 2D context.
pub fn lookup(canvas_id: &str) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| format!("canvas #{} not found", canvas_id))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| format!("#{} is not a canvas", canvas_id))?;
    let ctx = canvas
        .get_context("2d")
        .map_err(|_| "getContext(\"2d\") failed".to_string())?
        .ok_or("2d context unavailable")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "unexpected context type".to_string())?;
    Ok((canvas, ctx))
}

fn align_str(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
    }
}

fn baseline_str(baseline: TextBaseline) -> &'static str {
    match baseline {
        TextBaseline::Top => "top",
        TextBaseline::Middle => "middle",
    }
}

pub struct Painter {
    ctx: CanvasRenderingContext2d,
}

impl Painter {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Painter { ctx }
    }

    pub fn paint(&self, commands: &[DrawCommand]) {
        for cmd in commands {
            if let Err(e) = self.draw(cmd) {
                tracing::warn!(error = ?e, "canvas draw call failed");
            }
        }
    }

    fn draw(&self, cmd: &DrawCommand) -> Result<(), wasm_bindgen::JsValue> {
        let ctx = &self.ctx;
        match cmd {
            DrawCommand::Clear { width, height } => ctx.clear_rect(0.0, 0.0, *width, *height),
            DrawCommand::Line { from, to, color, width } => {
                ctx.begin_path();
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.move_to(from.0, from.1);
                ctx.line_to(to.0, to.1);
                ctx.stroke();
            }
            DrawCommand::FillRect { rect, color } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            }
            DrawCommand::StrokeRect { rect, color, width } => {
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
            }
            DrawCommand::FillCircle { center, radius, color } => {
                ctx.begin_path();
                ctx.arc(center.0, center.1, *radius, 0.0, std::f64::consts::TAU)?;
                ctx.set_fill_style_str(color);
                ctx.fill();
            }
            DrawCommand::StrokeArc {
                center,
                radius,
                start_angle,
                end_angle,
                color,
                width,
            } => {
                ctx.begin_path();
                ctx.arc(center.0, center.1, *radius, *start_angle, *end_angle)?;
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.stroke();
            }
            DrawCommand::Text {
                at,
                text,
                font,
                color,
                align,
                baseline,
            } => {
                ctx.set_font(font);
                ctx.set_fill_style_str(color);
                ctx.set_text_align(align_str(*align));
                ctx.set_text_baseline(baseline_str(*baseline));
                ctx.fill_text(text, at.0, at.1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_settings_map_to_canvas_keywords() {
        assert_eq!(align_str(TextAlign::Left), "left");
        assert_eq!(align_str(TextAlign::Center), "center");
        assert_eq!(baseline_str(TextBaseline::Top), "top");
        assert_eq!(baseline_str(TextBaseline::Middle), "middle");
    }
}
