use crate::presenter::StimulusView;
use crate::text::TextPainter;
use anyhow::{anyhow, Result};
use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Transform};
use vrt_core::{Condition, Phase};

const BACKGROUND: Color = Color::BLACK;
const DOWNLOAD_PROMPT: &str = "Press ENTER to download results";
const ABORTED_NOTICE: &str = "Experiment aborted. Press ESC to exit";

/// Draws the stimulus disc, the arrow, the text readouts and a row of progress dots.
pub struct StimulusRenderer {
    center_x: f32,
    center_y: f32,
    radius: f32,
    painter: TextPainter,
    instructions: Vec<String>,
}

impl StimulusRenderer {
    pub fn new(width: u32, height: u32, painter: TextPainter, instructions: Vec<String>) -> Self {
        let mut renderer = Self {
            center_x: 0.0,
            center_y: 0.0,
            radius: 0.0,
            painter,
            instructions,
        };
        renderer.resize(width, height);
        renderer
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.center_x = width as f32 / 2.0;
        self.center_y = height as f32 / 2.0;
        self.radius = width.min(height) as f32 * 0.3;
    }

    /// Render a complete frame for `view`. `progress` is `(completed, total)` trials.
    pub fn render_frame(
        &self,
        pixmap: &mut Pixmap,
        view: &StimulusView,
        progress: (usize, usize),
    ) -> Result<()> {
        pixmap.fill(BACKGROUND);

        let disc = PathBuilder::from_circle(self.center_x, self.center_y, self.radius)
            .ok_or_else(|| anyhow!("degenerate stimulus disc"))?;
        pixmap.fill_path(
            &disc,
            &solid(disc_color(view.phase)),
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        if let (Phase::StimulusActive, Some(condition)) = (view.phase, view.condition) {
            let arrow = self
                .arrow_path(condition)
                .ok_or_else(|| anyhow!("degenerate arrow"))?;
            pixmap.fill_path(
                &arrow,
                &solid(Color::BLACK),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }

        self.render_header(pixmap, view);
        self.render_summary(pixmap, &view.summary);
        self.render_progress(pixmap, progress);
        Ok(())
    }

    /// Lines above the disc: instructions before the run, then the latest
    /// latency and, once finished, what to do next.
    fn render_header(&self, pixmap: &mut Pixmap, view: &StimulusView) {
        let mut lines: Vec<String> = Vec::new();
        if view.phase == Phase::NotStarted {
            lines.extend(self.instructions.iter().cloned());
        } else if let Some(latency) = view.last_latency_ms {
            lines.push(format!("{latency} ms"));
        }
        match view.phase {
            Phase::Aborted => lines.push(ABORTED_NOTICE.to_string()),
            phase if phase.is_terminal() && view.summary.is_empty() => {
                lines.push(DOWNLOAD_PROMPT.to_string())
            }
            _ => {}
        }

        let size = (self.radius * 0.18).max(12.0);
        let line_height = size * 1.4;
        let bottom = self.center_y - self.radius - size * 0.8;
        let top = bottom - line_height * lines.len() as f32;
        for (i, line) in lines.iter().enumerate() {
            let y = top + line_height * i as f32;
            self.painter.draw(pixmap, line, self.center_x, y, size, text_color());
        }
    }

    fn render_summary(&self, pixmap: &mut Pixmap, lines: &[String]) {
        let size = (self.radius * 0.13).max(8.0);
        let line_height = size * 1.4;
        let top = self.center_y - line_height * lines.len() as f32 / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let y = top + line_height * i as f32;
            self.painter.draw(pixmap, line, self.center_x, y, size, Color::BLACK);
        }
    }

    fn arrow_path(&self, condition: Condition) -> Option<Path> {
        let dir = match condition {
            Condition::Left => -1.0,
            Condition::Right => 1.0,
        };
        let (cx, cy) = (self.center_x, self.center_y);
        let half = self.radius * 0.6;
        let shaft = half * 0.24;
        let head = half * 0.9;
        let neck = cx + dir * (half - head);

        let mut pb = PathBuilder::new();
        pb.move_to(cx - dir * half, cy - shaft);
        pb.line_to(neck, cy - shaft);
        pb.line_to(neck, cy - head * 0.8);
        pb.line_to(cx + dir * half, cy);
        pb.line_to(neck, cy + head * 0.8);
        pb.line_to(neck, cy + shaft);
        pb.line_to(cx - dir * half, cy + shaft);
        pb.close();
        pb.finish()
    }

    fn render_progress(&self, pixmap: &mut Pixmap, (done, total): (usize, usize)) {
        if total == 0 {
            return;
        }
        let dot = (self.radius * 0.05).max(2.0);
        let spacing = dot * 4.0;
        let start_x = self.center_x - spacing * (total as f32 - 1.0) / 2.0;
        let y = self.center_y + self.radius + spacing * 2.0;

        for i in 0..total {
            let color = if i < done {
                Color::from_rgba8(200, 200, 200, 255)
            } else {
                Color::from_rgba8(70, 70, 70, 255)
            };
            if let Some(path) = PathBuilder::from_circle(start_x + spacing * i as f32, y, dot) {
                pixmap.fill_path(
                    &path,
                    &solid(color),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
        }
    }
}

fn disc_color(phase: Phase) -> Color {
    match phase {
        Phase::NotStarted => Color::from_rgba8(40, 40, 40, 255),
        Phase::AwaitingDelay => Color::from_rgba8(90, 90, 90, 255),
        Phase::StimulusActive => Color::from_rgba8(230, 230, 230, 255),
        Phase::Ended => Color::from_rgba8(40, 160, 80, 255),
        Phase::Aborted => Color::from_rgba8(180, 40, 40, 255),
    }
}

fn text_color() -> Color {
    Color::from_rgba8(220, 220, 220, 255)
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(view: StimulusView) -> Pixmap {
        let renderer = StimulusRenderer::new(200, 200, TextPainter::Segments, Vec::new());
        let mut pixmap = Pixmap::new(200, 200).unwrap();
        renderer.render_frame(&mut pixmap, &view, (3, 10)).unwrap();
        pixmap
    }

    fn red_at(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).unwrap().red()
    }

    /// Lit pixels in the band above the disc (the disc starts at row 40).
    fn header_pixels(pixmap: &Pixmap) -> usize {
        (0..36)
            .flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|&(x, y)| red_at(pixmap, x, y) > 0)
            .count()
    }

    fn active(condition: Condition) -> StimulusView {
        StimulusView {
            phase: Phase::StimulusActive,
            condition: Some(condition),
            ..StimulusView::default()
        }
    }

    #[test]
    fn disc_color_follows_phase() {
        let waiting = render(StimulusView {
            phase: Phase::AwaitingDelay,
            ..StimulusView::default()
        });
        assert_eq!(red_at(&waiting, 100, 60), 90);
        assert_eq!(red_at(&waiting, 2, 2), 0);
        let shown = render(active(Condition::Right));
        assert_eq!(red_at(&shown, 100, 60), 230);
    }

    #[test]
    fn arrow_head_points_toward_condition() {
        // Off-axis point left of centre: inside the head of a left arrow,
        // outside the narrow shaft of a right arrow.
        let left = render(active(Condition::Left));
        let right = render(active(Condition::Right));
        assert_eq!(red_at(&left, 90, 85), 0);
        assert_eq!(red_at(&right, 90, 85), 230);
        assert_eq!(red_at(&right, 110, 85), 0);
    }

    #[test]
    fn no_arrow_without_stimulus() {
        let ended = render(StimulusView {
            phase: Phase::Ended,
            condition: Some(Condition::Left),
            ..StimulusView::default()
        });
        assert_eq!(red_at(&ended, 90, 85), 40);
    }

    #[test]
    fn latency_readout_drawn_above_disc() {
        let waiting = StimulusView {
            phase: Phase::AwaitingDelay,
            ..StimulusView::default()
        };
        assert_eq!(header_pixels(&render(waiting.clone())), 0);

        let answered = render(StimulusView {
            last_latency_ms: Some(250),
            ..waiting
        });
        assert!(header_pixels(&answered) > 0);
    }

    #[test]
    fn summary_drawn_inside_disc() {
        let ended = StimulusView {
            phase: Phase::Ended,
            ..StimulusView::default()
        };
        // Pixels darker than the green disc inside a box well within it.
        let dark = |pixmap: &Pixmap| {
            (72..128u32)
                .flat_map(|y| (72..128u32).map(move |x| (x, y)))
                .filter(|&(x, y)| red_at(pixmap, x, y) < 40)
                .count()
        };
        assert_eq!(dark(&render(ended.clone())), 0);

        let with_summary = render(StimulusView {
            summary: vec!["Count: 10".into(), "Mean: 250.00 ms".into()],
            ..ended
        });
        assert!(dark(&with_summary) > 0);
    }
}
