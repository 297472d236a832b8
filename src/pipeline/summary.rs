//! Findings summaries and progress messages.
//!
//! Confidence is clamped for the displayed percent only. The findings text
//! sent to the analysis service carries the raw value.

use crate::detection::Detection;
use crate::identity::keying::capitalize;

/// Summary sent when nothing was detected.
pub const NO_DAMAGE_SUMMARY: &str = "no damage";

/// Label of the detection substituted for an empty result.
pub const NORMAL_LABEL: &str = "normal";

pub const DETECTING_MESSAGE: &str = "Detecting damage...";

/// Shown when a detection label is blank.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Detection reported in place of an empty result: no damage, full confidence.
pub fn normal_detection() -> Detection {
    Detection::new(NORMAL_LABEL, 1.0, None)
}

/// Build the findings text for the analysis service.
///
/// `"no damage"` for no detections, otherwise
/// `"Found N potential issues: label (confidence: 0.87); ..."` in detection order.
pub fn findings_summary(detections: &[Detection]) -> String {
    if detections.is_empty() {
        return NO_DAMAGE_SUMMARY.to_string();
    }

    let mut summary = format!("Found {} potential issues: ", detections.len());
    for detection in detections {
        summary.push_str(&format!(
            "{} (confidence: {}); ",
            detection.label,
            format_confidence(detection.confidence)
        ));
    }
    summary
}

/// Confidence with two decimals, ties rounded away from zero.
///
/// Rounds the shortest decimal form of the value, so `0.125` gives `"0.13"`
/// while `0.005f32` (stored just below the tie) gives `"0.00"`.
pub fn format_confidence(confidence: f32) -> String {
    let value = f64::from(confidence);
    if !value.is_finite() {
        return format!("{:.2}", value);
    }

    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).map_or(false, |d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - 2;
    let render = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, render(&digits[..split]), render(&digits[split..]))
}

/// Confidence as a whole percent in `[0, 100]`.
pub fn confidence_percent(confidence: f32) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Trimmed, capitalized label for display.
pub fn display_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        capitalize(trimmed)
    }
}

/// Progress message after detection, naming the top detection.
///
/// `substituted` marks the synthesized no-damage detection.
pub fn detection_message(top: &Detection, substituted: bool) -> String {
    let label = display_label(&top.label);
    let percent = confidence_percent(top.confidence);
    if substituted {
        format!("No damage detected: {} ({}%), uploading findings...", label, percent)
    } else {
        format!("Detected {} ({}%), uploading findings...", label, percent)
    }
}

pub fn simulation_message(findings_text: &str) -> String {
    format!("Simulating upload: '{}' ...", findings_text)
}
