use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FormatResult;
use core::str::FromStr;

use serde::Serialize;

use crate::errors::RuleViolation;
use crate::impl_string_typed_field;

/// The dependency tier of a feature. Rank B features depend on rank A features, and rank C features depend on both.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Serialize)]
pub(crate) enum Rank {
    A,
    B,
    C,
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::A => write!(f,"A"),
            Self::B => write!(f,"B"),
            Self::C => write!(f,"C"),
        }
    }
}

impl FromStr for Rank {
    type Err = RuleViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            _ => Err(RuleViolation::InvalidRank(s.to_owned()))
        }
    }
}

impl_string_typed_field!(Rank);

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FeatureKind {
    Point,
    Line,
    Polygon,
}

impl Display for FeatureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::Point => write!(f,"point"),
            Self::Line => write!(f,"line"),
            Self::Polygon => write!(f,"polygon"),
        }
    }
}

#[cfg(test)]
mod test {

    use super::FeatureKind;
    use super::Rank;
    use crate::errors::RuleViolation;

    #[test]
    fn test_parse_rank() {
        assert_eq!("A".parse::<Rank>(),Ok(Rank::A));
        assert_eq!("B".parse::<Rank>(),Ok(Rank::B));
        assert_eq!(" B ".parse::<Rank>(),Err(RuleViolation::InvalidRank(" B ".to_owned())));
        assert_eq!("C".parse::<Rank>(),Ok(Rank::C));
        assert_eq!("a".parse::<Rank>(),Err(RuleViolation::InvalidRank("a".to_owned())));
        assert_eq!("D".parse::<Rank>(),Err(RuleViolation::InvalidRank("D".to_owned())));
        assert_eq!("".parse::<Rank>(),Err(RuleViolation::InvalidRank(String::new())));
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&Rank::B).unwrap(),"\"B\"");
        assert_eq!(serde_json::to_string(&FeatureKind::Polygon).unwrap(),"\"polygon\"");
        assert_eq!(FeatureKind::Line.to_string(),"line");
    }
}
