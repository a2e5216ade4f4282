use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of an accepted genotype against its reference allele.
///
/// Derived solely from the reference allele character count inside the
/// two-character genotype string; never stored independently of that
/// derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zygosity {
    /// Homozygous reference (reference allele appears twice).
    Wt,
    /// Heterozygous (reference allele appears once).
    Het,
    /// Homozygous alternate (reference allele absent).
    Hom,
}

impl Zygosity {
    /// Classify a two-character genotype already accepted by the matcher.
    ///
    /// Returns `None` for any count other than 0, 1 or 2 reference
    /// characters; such a row must be dropped, not guessed at.
    pub fn classify(ref_allele: &str, genotype: &str) -> Option<Zygosity> {
        let ref_count = genotype.matches(ref_allele).count();
        match ref_count {
            2 => Some(Zygosity::Wt),
            1 => Some(Zygosity::Het),
            0 => Some(Zygosity::Hom),
            _ => None,
        }
    }
}

impl fmt::Display for Zygosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Zygosity::Wt => "WT",
            Zygosity::Het => "HET",
            Zygosity::Hom => "HOM",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Zygosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WT" => Ok(Zygosity::Wt),
            "HET" => Ok(Zygosity::Het),
            "HOM" => Ok(Zygosity::Hom),
            _ => Err(format!("Invalid zygosity label: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("C", "CC", Some(Zygosity::Wt))]
    #[case("C", "CT", Some(Zygosity::Het))]
    #[case("C", "TC", Some(Zygosity::Het))]
    #[case("C", "TT", Some(Zygosity::Hom))]
    #[case("I", "ID", Some(Zygosity::Het))]
    #[case("D", "DD", Some(Zygosity::Wt))]
    fn test_classify(
        #[case] ref_allele: &str,
        #[case] genotype: &str,
        #[case] expected: Option<Zygosity>,
    ) {
        assert_eq!(Zygosity::classify(ref_allele, genotype), expected);
    }

    #[rstest]
    fn test_display_round_trip() {
        for z in [Zygosity::Wt, Zygosity::Het, Zygosity::Hom] {
            assert_eq!(z.to_string().parse::<Zygosity>().unwrap(), z);
        }
    }
}
