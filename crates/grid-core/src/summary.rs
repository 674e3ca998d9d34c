//! Footer summary text ("Viewing rows 1 through 20 of 500").

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Template used when the summary is enabled without a custom one.
pub const DEFAULT_SUMMARY_TEMPLATE: &str = "Viewing rows {start} through {end} of {total}";

/// `summary` option: `true`/`false`, or a template with `{start}`, `{end}` and `{total}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryOption {
    /// Enable the default template, or disable the summary.
    Enabled(bool),
    /// Custom template.
    Template(String),
}

impl Default for SummaryOption {
    fn default() -> Self {
        SummaryOption::Enabled(true)
    }
}

impl SummaryOption {
    /// Template in effect, `None` when the summary is off.
    pub fn template(&self) -> Option<&str> {
        match self {
            SummaryOption::Enabled(true) => Some(DEFAULT_SUMMARY_TEMPLATE),
            SummaryOption::Enabled(false) => None,
            SummaryOption::Template(template) => Some(template),
        }
    }
}

/// Fill the placeholders of `template`.
pub fn format_summary(template: &str, start: usize, end: usize, total: usize) -> String {
    template
        .replace("{start}", &start.to_string())
        .replace("{end}", &end.to_string())
        .replace("{total}", &total.to_string())
}

/// Summary for `visible` (view positions, without overscan) out of `total` rows.
///
/// Positions are reported 1-based. Returns `None` when the summary is off, nothing is visible,
/// or every row already fits on screen.
pub fn summary_text(
    option: &SummaryOption,
    visible: Option<Range<usize>>,
    total: usize,
) -> Option<String> {
    let template = option.template()?;
    let visible = visible.filter(|r| !r.is_empty())?;
    if visible.start == 0 && visible.end >= total {
        return None;
    }
    Some(format_summary(
        template,
        visible.start + 1,
        visible.end.min(total),
        total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary() {
        let text = summary_text(&SummaryOption::default(), Some(3..6), 10);
        assert_eq!(text.as_deref(), Some("Viewing rows 4 through 6 of 10"));
    }

    #[test]
    fn test_custom_template_and_disabled() {
        let option = SummaryOption::Template("{start}-{end}/{total}".into());
        assert_eq!(summary_text(&option, Some(0..5), 9).as_deref(), Some("1-5/9"));
        assert_eq!(summary_text(&SummaryOption::Enabled(false), Some(0..5), 9), None);
    }

    #[test]
    fn test_no_summary_when_everything_fits() {
        assert_eq!(summary_text(&SummaryOption::default(), Some(0..4), 4), None);
        assert_eq!(summary_text(&SummaryOption::default(), None, 4), None);
    }

    #[test]
    fn test_option_deserializes_bool_or_string() {
        let flag: SummaryOption = serde_json::from_str("false").unwrap();
        let template: SummaryOption = serde_json::from_str(r#""{total} rows""#).unwrap();
        assert_eq!(flag, SummaryOption::Enabled(false));
        assert_eq!(template.template(), Some("{total} rows"));
    }
}
