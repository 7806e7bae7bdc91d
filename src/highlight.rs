/// Display tier of a score cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Strong,
    Moderate,
    Plain,
}

impl Highlight {
    /// Short marker appended to a cell in console output.
    pub fn marker(self) -> &'static str {
        match self {
            Highlight::Strong => "++",
            Highlight::Moderate => "+",
            Highlight::Plain => "",
        }
    }
}

/// Maps a score to its display tier.
///
/// | Range  | Tier     |
/// |--------|----------|
/// | >= 90  | Strong   |
/// | >= 80  | Moderate |
/// | < 80   | Plain    |
pub fn highlight(value: Option<f64>) -> Highlight {
    match value {
        Some(v) if v >= 90.0 => Highlight::Strong,
        Some(v) if v >= 80.0 => Highlight::Moderate,
        _ => Highlight::Plain,
    }
}
