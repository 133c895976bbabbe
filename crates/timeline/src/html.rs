//! Markup emission for composed slides.
//!
//! Everything the page needs is inline: no fonts, images, or scripts are
//! fetched, so the document reaches resource-idle as soon as it is parsed.
//! Numbers are printed through fixed-precision formatters so the output is
//! byte-stable across platforms.

use std::fmt::Write;

use crate::cue::{Cue, CueTarget, Timeline};
use crate::document::BarLayout;

const STYLESHEET: &str = r#"    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }

    body {
      width: __W__px;
      height: __H__px;
      background: white;
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
      display: flex;
      align-items: center;
      justify-content: center;
      overflow: hidden;
    }

    .slide {
      width: 1600px;
      height: 900px;
      display: flex;
      flex-direction: row;
      gap: 80px;
      padding: 60px;
    }

    .content {
      flex: 1;
      display: flex;
      flex-direction: column;
      gap: 40px;
    }

    .title {
      font-size: 72px;
      font-weight: 700;
      color: #333;
      opacity: 0;
      animation: fadeIn 0.6s ease-out forwards;
    }

    .bullets {
      list-style: none;
      display: flex;
      flex-direction: column;
      gap: 20px;
    }

    .bullets li {
      font-size: 36px;
      color: #555;
      padding-left: 40px;
      position: relative;
      opacity: 0;
      animation: fadeIn 0.5s ease-out forwards;
    }

    .bullets li::before {
      content: "\2022";
      position: absolute;
      left: 0;
      color: #333;
      font-size: 40px;
    }

    .chart-container {
      flex: 0 0 500px;
      display: flex;
      align-items: center;
      justify-content: center;
    }

    .chart {
      width: 100%;
      height: 400px;
      display: flex;
      align-items: flex-end;
      justify-content: space-around;
      gap: 20px;
      border-bottom: 3px solid #333;
      padding-bottom: 10px;
    }

    .chart-bar {
      flex: 1;
      height: 100%;
      display: flex;
      flex-direction: column;
      justify-content: flex-end;
      align-items: center;
      gap: 10px;
      opacity: 0;
      animation: fadeIn 0.6s ease-out forwards;
    }

    .bar-fill {
      width: 100%;
      background: linear-gradient(180deg, #4A90E2 0%, #357ABD 100%);
      border-radius: 8px 8px 0 0;
      display: flex;
      align-items: flex-start;
      justify-content: center;
      padding-top: 10px;
      overflow: hidden;
      animation: growUp 0.8s ease-out backwards;
    }

    .bar-value {
      font-size: 28px;
      font-weight: 700;
      color: white;
    }

    .bar-label {
      font-size: 24px;
      color: #555;
      font-weight: 600;
    }

    @keyframes fadeIn {
      from {
        opacity: 0;
        transform: translateY(20px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @keyframes growUp {
      from {
        height: 0;
      }
    }
"#;

/// Render the complete page.
pub(crate) fn render_page(
    title: &str,
    bullets: &[String],
    bars: &[BarLayout],
    timeline: &Timeline,
    canvas: (u32, u32),
) -> String {
    let (width, height) = canvas;
    let stylesheet = STYLESHEET
        .replace("__W__", &width.to_string())
        .replace("__H__", &height.to_string());

    let mut out = String::with_capacity(stylesheet.len() + 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    let _ = writeln!(
        out,
        "  <meta name=\"viewport\" content=\"width={width}, height={height}\">"
    );
    out.push_str("  <title>Slide</title>\n  <style>\n");
    out.push_str(&stylesheet);
    out.push_str("  </style>\n</head>\n<body>\n  <div class=\"slide\">\n");
    out.push_str("    <div class=\"content\">\n");

    let _ = writeln!(
        out,
        "      <h1 class=\"title\"{}>{}</h1>",
        cue_attrs(timeline, CueTarget::Title),
        escape(title)
    );

    out.push_str("      <ul class=\"bullets\">\n");
    for (i, bullet) in bullets.iter().enumerate() {
        let _ = writeln!(
            out,
            "        <li{}>{}</li>",
            cue_attrs(timeline, CueTarget::Bullet(i)),
            escape(bullet)
        );
    }
    out.push_str("      </ul>\n    </div>\n");

    if !bars.is_empty() {
        out.push_str("    <div class=\"chart-container\">\n      <div class=\"chart\">\n");
        for (i, bar) in bars.iter().enumerate() {
            let delay = timeline
                .delay_of(CueTarget::Bar(i))
                .map(format_secs)
                .unwrap_or_else(|| "0".to_string());
            let _ = writeln!(
                out,
                "        <div class=\"chart-bar\"{}>",
                cue_attrs(timeline, CueTarget::Bar(i))
            );
            let _ = writeln!(
                out,
                "          <div class=\"bar-fill\" style=\"height: {}%; animation-delay: {delay}s;\">",
                format_decimal(bar.height_pct)
            );
            let _ = writeln!(
                out,
                "            <span class=\"bar-value\">{}</span>",
                format_value(bar.value)
            );
            out.push_str("          </div>\n");
            let _ = writeln!(
                out,
                "          <span class=\"bar-label\">{}</span>",
                escape(&bar.label)
            );
            out.push_str("        </div>\n");
        }
        out.push_str("      </div>\n    </div>\n");
    }

    out.push_str("  </div>\n</body>\n</html>\n");
    out
}

fn cue_attrs(timeline: &Timeline, target: CueTarget) -> String {
    match timeline.cues.iter().find(|c| c.target == target) {
        Some(Cue { delay_secs, .. }) => format!(
            " data-cue=\"{}\" style=\"animation-delay: {}s;\"",
            target.element_id(),
            format_secs(*delay_secs)
        ),
        None => String::new(),
    }
}

/// Seconds with millisecond precision, trailing zeros trimmed.
pub(crate) fn format_secs(secs: f64) -> String {
    format_decimal(secs)
}

/// Up to three decimals, trailing zeros and dot trimmed (`50`, `33.333`).
pub(crate) fn format_decimal(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Chart values as a reader would write them: `10`, `12.5`.
pub(crate) fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Escape text for use in element content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(0.8), "0.8");
        assert_eq!(format_decimal(0.8 + 0.4 * 2.0), "1.6");
        assert_eq!(format_decimal(100.0), "100");
        assert_eq!(format_decimal(100.0 / 3.0), "33.333");
        assert_eq!(format_decimal(0.0), "0");
        assert_eq!(format_decimal(-0.0), "0");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(10.0), "10");
        assert_eq!(format_value(12.5), "12.5");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"R&D" isn't</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; isn&#39;t&lt;/b&gt;"
        );
        assert_eq!(escape("Revenue up 12%"), "Revenue up 12%");
    }
}
