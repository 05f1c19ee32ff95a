//! Product variant axes.

use serde::{Deserialize, Serialize};

/// Garment sizes, in display order.
///
/// The ordering of the enum is the ordering shown on product pages, so
/// `#[derive(Ord)]` is relied on by catalog code that sorts size lists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
}

impl Size {
    /// All sizes, smallest first.
    pub const ALL: [Self; 6] = [Self::Xs, Self::S, Self::M, Self::L, Self::Xl, Self::Xxl];

    /// The label shown on product pages and stored in cart lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Xs => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::Xxl => "XXL",
        }
    }

    /// Parse a size label; `None` for anything outside the fixed set.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "XS" => Some(Self::Xs),
            "S" => Some(Self::S),
            "M" => Some(Self::M),
            "L" => Some(Self::L),
            "XL" => Some(Self::Xl),
            "XXL" => Some(Self::Xxl),
            _ => None,
        }
    }
}

impl core::fmt::Display for Size {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_size_ordering() {
        assert!(Size::Xs < Size::S);
        assert!(Size::Xl < Size::Xxl);

        let mut sizes = vec![Size::L, Size::Xs, Size::Xxl, Size::M];
        sizes.sort();
        assert_eq!(sizes, vec![Size::Xs, Size::M, Size::L, Size::Xxl]);
    }

    #[test]
    fn test_size_parse() {
        for size in Size::ALL {
            assert_eq!(Size::parse(size.as_str()), Some(size));
        }
        assert_eq!(Size::parse("XXXL"), None);
        assert_eq!(Size::parse("xs"), None);
    }

    #[test]
    fn test_size_serde() {
        assert_eq!(serde_json::to_string(&Size::Xxl).unwrap(), "\"XXL\"");
        let back: Size = serde_json::from_str("\"XS\"").unwrap();
        assert_eq!(back, Size::Xs);
    }
}
