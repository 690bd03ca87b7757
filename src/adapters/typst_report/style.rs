//! Cell styling for report tables.
//!
//! Pure functions only: the domain never sees colours.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gain,
    Loss,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub tone: Tone,
    pub strong: bool,
}

impl CellStyle {
    pub fn strong(self) -> Self {
        CellStyle {
            strong: true,
            ..self
        }
    }

    pub fn fill(&self) -> &'static str {
        match self.tone {
            Tone::Gain => "green",
            Tone::Loss => "red",
            Tone::Flat => "black",
        }
    }

    /// Wrap already-escaped Typst content.
    pub fn apply(&self, content: &str) -> String {
        if self.strong {
            format!("text(fill: {}, weight: \"bold\", [{}])", self.fill(), content)
        } else {
            format!("text(fill: {}, [{}])", self.fill(), content)
        }
    }
}

/// Colour a value by which side of `reference` it falls on.
pub fn style(value: f64, reference: f64) -> CellStyle {
    let tone = if value > reference {
        Tone::Gain
    } else if value < reference {
        Tone::Loss
    } else {
        Tone::Flat
    };
    CellStyle {
        tone,
        strong: false,
    }
}
