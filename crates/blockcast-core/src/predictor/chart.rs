//! ASCII rendering of learned probabilities.

use super::calendar::TimeBlockCalendar;
use super::state::PredictorAttributes;

const BAR_WIDTH: usize = 30;

/// Render probabilities in calendar order (block 0 first), one row per block.
///
/// Rows at or above `threshold` are marked `●`; the current block is marked `◄`.
pub fn render_ascii_chart(
    calendar: &TimeBlockCalendar,
    attributes: &PredictorAttributes,
    threshold: f64,
) -> String {
    let count = attributes.probabilities.len();
    let mut output = String::from("\nProbability by block:\n");
    output.push_str(&"─".repeat(50));
    output.push('\n');

    if count == 0 {
        output.push_str("(no blocks)\n");
        return output;
    }

    let anchor = attributes.rotation_anchor.rem_euclid(count as i64) as usize;
    for block in 0..count {
        // Buffer index 0 holds the anchor block.
        let offset = (block + count - anchor) % count;
        let p = attributes.probabilities[offset].clamp(0.0, 1.0);
        let bar_length = (p * BAR_WIDTH as f64).round() as usize;
        let predicted = if p >= threshold { "●" } else { "·" };
        let current = if block == anchor { " ◄" } else { "" };

        output.push_str(&format!(
            "{} {}{} {} {:>3.0}%{}\n",
            calendar.block_label(block),
            "█".repeat(bar_length),
            " ".repeat(BAR_WIDTH - bar_length),
            predicted,
            p * 100.0,
            current
        ));
    }

    output.push_str(&"─".repeat(50));
    output.push_str(&format!("\n● ≥ threshold ({:.0}%)  · below  ◄ current\n", threshold * 100.0));
    output
}
