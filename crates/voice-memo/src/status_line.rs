use voice_memo_core::{Permission, SessionState, SessionView};

/// Bar glyphs from quietest to loudest.
const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders one status line: state, elapsed time, the pause control label,
/// the waveform and an optional notice.
///
/// `full_scale` is the magnitude drawn as a full bar. The waveform is padded
/// to the window capacity so the line keeps its width.
pub(crate) fn render_status(view: &SessionView, full_scale: f32, notice: Option<&str>) -> String {
    let label = match (view.state, view.permission) {
        (_, Permission::Denied) => "NO MIC",
        (SessionState::Idle, _) => "IDLE",
        (SessionState::Recording, _) => "REC",
        (SessionState::Paused, _) => "PAUSED",
        (SessionState::Stopped, _) => "STOPPED",
        (SessionState::Finished, _) => "SAVED",
    };

    let bars: String = view
        .bars
        .iter()
        .map(|&magnitude| bar_glyph(magnitude, full_scale))
        .chain(std::iter::repeat(' '))
        .take(view.capacity)
        .collect();

    let mut line = format!(
        "{:<7} {:02}:{:02}  [{}]  |{}|",
        label,
        view.elapsed_seconds / 60,
        view.elapsed_seconds % 60,
        view.pause_label,
        bars
    );

    if let Some(notice) = notice {
        line.push_str("  ");
        line.push_str(notice);
    }

    line
}

/// Glyph for one magnitude, clamped to the available levels.
pub(crate) fn bar_glyph(magnitude: f32, full_scale: f32) -> char {
    if full_scale.is_nan() || full_scale <= 0.0 || !magnitude.is_finite() {
        return LEVELS[0];
    }

    let ratio = (magnitude / full_scale).clamp(0.0, 1.0);
    let index = (ratio * (LEVELS.len() - 1) as f32).round() as usize;
    LEVELS[index.min(LEVELS.len() - 1)]
}
