use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FormatResult;
use std::error::Error;

pub(crate) use gdal::errors::GdalError;
use gdal::vector::OGRwkbGeometryType;
use ordered_float::FloatIsNan;
use serde::Serialize;

pub(crate) use clap::error::Error as ArgumentError;

use crate::feature_map::fields::FeatureKind;
use crate::feature_map::fields::Rank;
use crate::typed_map::fields::IdRef;

/// The broad classes of failure, used to decide how a rejection is reported to the caller.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
pub(crate) enum ErrorCategory {
    Format,
    Input,
    RuleViolation,
    Reconcile,
    NotFound,
    Store,
    Engine,
}

#[derive(Debug,Clone,PartialEq)]
pub(crate) enum RuleViolation {
    InvalidRank(String),
    NoRankAContext(FeatureKind,Rank),
    NotInsideRankA(FeatureKind),
    NotAnchoredToRankA(FeatureKind),
    IntersectsRankA(FeatureKind),
    NotAnchoredToRankB(FeatureKind),
}

impl Display for RuleViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::InvalidRank(a) => write!(f,"Invalid rank '{}', choose one of: A, B or C.",a),
            Self::NoRankAContext(kind, Rank::A) => write!(f,"A rank A polygon must be drawn before a rank A {} can be added.",kind),
            Self::NoRankAContext(kind, rank) => write!(f,"A rank {} {} needs rank A points or lines to anchor to, but there are none.",rank,kind),
            Self::NotInsideRankA(kind) => write!(f,"A rank A {} can only be drawn inside a rank A polygon.",kind),
            Self::NotAnchoredToRankA(kind @ FeatureKind::Line) => write!(f,"A rank B {} must start or end on a rank A point or on the start or end of a rank A line.",kind),
            Self::NotAnchoredToRankA(kind) => write!(f,"A rank B {} can only be drawn on a rank A point or on the start or end of a rank A line.",kind),
            Self::IntersectsRankA(kind) => write!(f,"A rank C {} must not intersect rank A points or lines.",kind),
            Self::NotAnchoredToRankB(kind) => write!(f,"A rank C {} must intersect at least one rank B point or line.",kind),
        }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub(crate) enum ReconcileError {
    InvalidGeometry,
    FullyCovered(String),
    NoValidRemainder,
    NegligibleRemainder,
    CleanupFailed,
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::InvalidGeometry => write!(f,"The polygon is empty or has invalid coordinates."),
            Self::FullyCovered(a) => write!(f,"The polygon is completely covered by polygon '{}', it was not saved.",a),
            Self::NoValidRemainder => write!(f,"No valid polygon was left after removing the overlapping areas."),
            Self::NegligibleRemainder => write!(f,"The area left after removing the overlapping areas is too small to save."),
            Self::CleanupFailed => write!(f,"No valid geometry was left after cleaning up the polygon."),
        }
    }
}

#[derive(Debug)]
pub(crate) enum CommandError {
    GdalError(GdalError),
    JsonError(serde_json::Error),
    FloatIsNan,
    InvalidWkt(String),
    IncorrectGdalGeometryType {
        expected: OGRwkbGeometryType::Type,
        found: OGRwkbGeometryType::Type
    },
    UnsupportedGdalGeometryType(OGRwkbGeometryType::Type),
    NameRequired,
    NameMustStartWithUppercase,
    NameCannotStartWithSoftG,
    EmptyGeometry(FeatureKind),
    NonFiniteCoordinate,
    LongitudeOutOfRange(f64),
    LatitudeOutOfRange(f64),
    TooFewVertices {
        kind: FeatureKind,
        minimum: usize,
        found: usize
    },
    UnclosedRing,
    RuleViolation(RuleViolation),
    Reconcile(ReconcileError),
    MissingFeature(&'static str,IdRef),
    MissingField(&'static str),
    MissingGeometry(&'static str),
    GeometryOperationFailed(&'static str),
    RequestRejected,
}

impl CommandError {

    pub(crate) const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidWkt(_) |
            Self::IncorrectGdalGeometryType { .. } |
            Self::UnsupportedGdalGeometryType(_) => ErrorCategory::Format,
            Self::FloatIsNan |
            Self::NameRequired |
            Self::NameMustStartWithUppercase |
            Self::NameCannotStartWithSoftG |
            Self::EmptyGeometry(_) |
            Self::NonFiniteCoordinate |
            Self::LongitudeOutOfRange(_) |
            Self::LatitudeOutOfRange(_) |
            Self::TooFewVertices { .. } |
            Self::UnclosedRing |
            Self::RuleViolation(RuleViolation::InvalidRank(_)) => ErrorCategory::Input,
            Self::RuleViolation(_) => ErrorCategory::RuleViolation,
            Self::Reconcile(_) => ErrorCategory::Reconcile,
            Self::MissingFeature(_, _) => ErrorCategory::NotFound,
            Self::GdalError(_) |
            Self::JsonError(_) |
            Self::MissingField(_) |
            Self::MissingGeometry(_) |
            Self::RequestRejected => ErrorCategory::Store,
            Self::GeometryOperationFailed(_) => ErrorCategory::Engine,
        }
    }
}

impl Error for CommandError {

}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::GdalError(a) => write!(f,"gdal: {}",a),
            Self::JsonError(a) => write!(f,"json: {}",a),
            Self::FloatIsNan => write!(f,"Invalid coordinate values were found."),
            Self::InvalidWkt(a) => write!(f,"Geometry could not be read, check the WKT format: {}",a),
            Self::IncorrectGdalGeometryType { expected, found } => write!(f,"Expected a {} geometry, found a {}.",geometry_type_name(*expected),geometry_type_name(*found)),
            Self::UnsupportedGdalGeometryType(a) => write!(f,"Geometry type {} is not supported.",geometry_type_name(*a)),
            Self::NameRequired => write!(f,"A name is required."),
            Self::NameMustStartWithUppercase => write!(f,"The name must start with an uppercase letter."),
            Self::NameCannotStartWithSoftG => write!(f,"The name can't start with the letter 'ğ'."),
            Self::EmptyGeometry(a) => write!(f,"The {} geometry is empty.",a),
            Self::NonFiniteCoordinate => write!(f,"Invalid coordinate values were found."),
            Self::LongitudeOutOfRange(a) => write!(f,"Longitude {} must be between -180 and 180.",a),
            Self::LatitudeOutOfRange(a) => write!(f,"Latitude {} must be between -90 and 90.",a),
            Self::TooFewVertices { kind, minimum, found } => write!(f,"A {} must have at least {} points, found {}.",kind,minimum,found),
            Self::UnclosedRing => write!(f,"The polygon must be closed (the first and last points must be the same)."),
            Self::RuleViolation(a) => write!(f,"{}",a),
            Self::Reconcile(a) => write!(f,"{}",a),
            Self::MissingFeature(layer, id) => write!(f,"Layer '{}' has no feature id '{}'.",layer,id),
            Self::MissingField(a) => write!(f,"While loading data, a record had no value for '{}'.",a),
            Self::MissingGeometry(a) => write!(f,"While loading data, a record in '{}' had no geometry.",a),
            Self::GeometryOperationFailed(a) => write!(f,"The geometry engine failed to calculate the {}.",a),
            Self::RequestRejected => write!(f,"The request was rejected."),
        }
    }
}

fn geometry_type_name(value: OGRwkbGeometryType::Type) -> String {
    gdal::vector::geometry_type_to_name(value)
}

impl From<GdalError> for CommandError {

    fn from(value: GdalError) -> Self {
        Self::GdalError(value)
    }
}

impl From<FloatIsNan> for CommandError {

    fn from(_: FloatIsNan) -> Self {
        Self::FloatIsNan
    }

}

impl From<serde_json::Error> for CommandError {

    fn from(value: serde_json::Error) -> Self {
        Self::JsonError(value)
    }
}

impl From<RuleViolation> for CommandError {

    fn from(value: RuleViolation) -> Self {
        Self::RuleViolation(value)
    }
}

impl From<ReconcileError> for CommandError {

    fn from(value: ReconcileError) -> Self {
        Self::Reconcile(value)
    }
}

#[derive(Debug)]
pub(crate) enum ProgramError {
    ArgumentError(ArgumentError),
    CommandError(CommandError)
}

impl Error for ProgramError {

}

impl Display for ProgramError {

    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::ArgumentError(a) => write!(f,"{}",a),
            Self::CommandError(a) => write!(f,"{}",a),
        }
    }
}

impl From<ArgumentError> for ProgramError {

    fn from(value: ArgumentError) -> Self {
        Self::ArgumentError(value)
    }
}

impl From<CommandError> for ProgramError {

    fn from(value: CommandError) -> Self {
        Self::CommandError(value)
    }
}
