use serde::Serialize;

use crate::errors::CommandError;
use crate::errors::ErrorCategory;
use crate::feature_map::fields::FeatureKind;
use crate::feature_map::fields::Rank;
use crate::feature_map::line_layer::LineEntity;
use crate::feature_map::point_layer::PointEntity;
use crate::feature_map::polygon_layer::PolygonEntity;
use crate::typed_map::fields::IdRef;

pub(crate) mod ranked;
pub(crate) mod polygons;

/// The answer to every request. Failures are reported here instead of as errors, with a message naming the rule or problem.
#[derive(Debug,Serialize)]
pub(crate) struct Response<Data: Serialize> {
    pub(crate) success: bool,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<ErrorCategory>,
    pub(crate) data: Option<Data>
}

impl<Data: Serialize> Response<Data> {

    pub(crate) fn succeeded<Message: Into<String>>(message: Message, data: Data) -> Self {
        Self {
            success: true,
            message: message.into(),
            category: None,
            data: Some(data)
        }
    }

    pub(crate) fn failed(error: &CommandError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            category: Some(error.category()),
            data: None
        }
    }

}

impl<Data: Serialize> From<Result<(String,Data),CommandError>> for Response<Data> {

    fn from(value: Result<(String,Data),CommandError>) -> Self {
        match value {
            Ok((message,data)) => Self::succeeded(message, data),
            Err(err) => Self::failed(&err)
        }
    }
}

/// A stored feature, as it is reported to callers.
#[derive(Clone,Debug,PartialEq,Serialize)]
pub(crate) struct FeatureRecord {
    pub(crate) id: IdRef,
    pub(crate) kind: FeatureKind,
    pub(crate) name: String,
    pub(crate) wkt: String,
    pub(crate) rank: Option<Rank>
}

impl From<PointEntity> for FeatureRecord {

    fn from(value: PointEntity) -> Self {
        Self {
            id: value.fid,
            kind: FeatureKind::Point,
            name: value.name,
            wkt: value.wkt,
            rank: Some(value.rank)
        }
    }
}

impl From<LineEntity> for FeatureRecord {

    fn from(value: LineEntity) -> Self {
        Self {
            id: value.fid,
            kind: FeatureKind::Line,
            name: value.name,
            wkt: value.wkt,
            rank: Some(value.rank)
        }
    }
}

impl From<PolygonEntity> for FeatureRecord {

    fn from(value: PolygonEntity) -> Self {
        Self {
            id: value.fid,
            kind: FeatureKind::Polygon,
            name: value.name,
            wkt: value.wkt,
            rank: value.rank
        }
    }
}

fn plural(kind: FeatureKind, count: usize) -> String {
    if count == 1 {
        format!("1 {} found.",kind)
    } else {
        format!("{} {}s found.",count,kind)
    }
}
