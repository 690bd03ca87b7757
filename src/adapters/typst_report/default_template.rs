//! Built-in Typst report template.
//!
//! Custom templates may use the same `{{PLACEHOLDER}}` markers:
//! `TITLE`, `PARAMETERS`, `SUMMARY`, `EQUITY_CURVE_SVG`, `TRADE_LOG`,
//! `CROSSING_LOG`.

const DEFAULT_TEMPLATE: &str = r#"#set page(paper: "a4", margin: 2cm)
#set text(size: 10pt)

= {{TITLE}}

== Parameters

{{PARAMETERS}}

== Results

{{SUMMARY}}

== Equity Curve

Shaded bands mark holding periods. Equity starts at 1.0.

{{EQUITY_CURVE_SVG}}

== Trades

{{TRADE_LOG}}

== Threshold Crossings

{{CROSSING_LOG}}
"#;

pub fn template() -> &'static str {
    DEFAULT_TEMPLATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_every_placeholder() {
        for marker in [
            "{{TITLE}}",
            "{{PARAMETERS}}",
            "{{SUMMARY}}",
            "{{EQUITY_CURVE_SVG}}",
            "{{TRADE_LOG}}",
            "{{CROSSING_LOG}}",
        ] {
            assert!(template().contains(marker), "missing {marker}");
        }
    }
}
