//! Render protocol encoder
//!
//! Pure transformations from orders and text to fixed-width display
//! lines and control byte sequences. Nothing here touches the device.

use crate::order::Order;

/// Clear display and home the cursor
pub const CLEAR: &[u8] = &[0x0C];

/// Beep sequence: BEL followed by ESC B (covers both common variants)
pub const BEEP: &[u8] = &[0x07, 0x1B, 0x42];

/// Notification melody played after an order renders: quick double
/// beep, single beep, double beep. Each entry is a beep count; the
/// session paces the groups.
pub const NOTIFICATION_MELODY: &[usize] = &[2, 1, 2];

/// Minimum padded width for item names
pub const NAME_MIN_WIDTH: usize = 5;

/// Maximum width before item names are truncated
pub const NAME_MAX_WIDTH: usize = 7;

/// Cursor positioning: ESC L followed by the linear cell index
pub fn cursor_move(row: usize, col: usize, width: usize) -> [u8; 3] {
    [0x1B, 0x4C, (row * width + col) as u8]
}

/// Format an amount as integer currency with space-grouped thousands.
///
/// Rounding is half-up, matching [`crate::order::round_half_up`];
/// `8600.0` renders as `"8 600"`.
pub fn format_money(amount: f64) -> String {
    let rounded = crate::order::round_half_up(amount);
    group_thousands(rounded)
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 && c.is_ascii_digit() {
            grouped.push(' ');
        }
        grouped.push(*c);
    }
    grouped
}

/// Fit an item name into the display column.
///
/// Names of [`NAME_MAX_WIDTH`] characters or more are truncated to
/// exactly that width; shorter names are right-padded to
/// [`NAME_MIN_WIDTH`]. Names of 5 or 6 characters pass through
/// unchanged, so columns are not perfectly aligned for those lengths.
/// That asymmetry is intentional-looking enough that it is preserved
/// as-is pending product review.
pub fn format_name(name: &str) -> String {
    let count = name.chars().count();
    if count >= NAME_MAX_WIDTH {
        name.chars().take(NAME_MAX_WIDTH).collect()
    } else {
        format!("{:<width$}", name, width = NAME_MIN_WIDTH)
    }
}

/// Render an order into display lines: one per item, then the total.
pub fn render_order(order: &Order) -> Vec<String> {
    let mut lines: Vec<String> = order
        .items()
        .iter()
        .map(|item| {
            format!(
                "{}: {} Ar",
                format_name(&item.name),
                group_thousands(item.rounded_total())
            )
        })
        .collect();
    lines.push(format!("TOTAL = {} Ar", group_thousands(order.total())));
    lines
}

/// Render a welcome banner: space-padded to at least `width`, never
/// truncated. A banner longer than one row flows onto the next row of
/// the display.
pub fn render_welcome(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count < width {
        let mut line = String::with_capacity(width);
        line.push_str(text);
        line.extend(std::iter::repeat(' ').take(width - count));
        line
    } else {
        text.to_string()
    }
}

/// Center a line of text within `width` characters.
pub fn center_text(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count >= width {
        return text.chars().take(width).collect();
    }
    let pad = (width - count) / 2;
    fit_line(&format!("{}{}", " ".repeat(pad), text), width)
}

/// Truncate or right-pad a line to exactly `width` characters.
pub fn fit_line(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let count = line.chars().count();
    if count < width {
        line.extend(std::iter::repeat(' ').take(width - count));
    }
    line
}

/// Clip lines to the physical display: exactly `height` lines of
/// exactly `width` characters, dropping the oldest lines first when
/// there are too many.
pub fn frame_lines(lines: &[String], width: usize, height: usize) -> Vec<String> {
    let start = lines.len().saturating_sub(height);
    let mut framed: Vec<String> = lines[start..]
        .iter()
        .map(|line| fit_line(line, width))
        .collect();
    while framed.len() < height {
        framed.push(" ".repeat(width));
    }
    framed
}

/// The `width`-character window of `padded` visible at `offset`.
pub fn scroll_window(padded: &str, width: usize, offset: usize) -> String {
    padded.chars().skip(offset).take(width).collect()
}

/// All scroll windows for a banner, padded with a blank screen on both
/// sides so the text slides fully in and out.
pub fn scroll_frames(text: &str, width: usize) -> Vec<String> {
    let padded = format!("{}{}{}", " ".repeat(width), text, " ".repeat(width));
    let total = padded.chars().count();
    (0..=total - width)
        .map(|offset| scroll_window(&padded, width, offset))
        .collect()
}
