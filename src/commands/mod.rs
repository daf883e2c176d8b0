use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;

use crate::algorithms::reconcile::ReconcileSettings;
use crate::algorithms::reconcile::NEGLIGIBLE_AREA;
use crate::errors::CommandError;
use crate::feature_map::FeatureMap;
use crate::progress::ProgressObserver;
use crate::service::Response;
use crate::typed_map::fields::IdRef;

mod create;
mod point;
mod line;
mod polygon;

use create::Create;
use point::Point;
use line::Line;
use polygon::Polygon;

pub(crate) trait Task {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError>;

}

#[macro_export]
macro_rules! command_def {
    ($(#[$attr: meta])* pub $struct_name: ident {$($command_name: ident),*}) => {

        #[derive(Subcommand)]
        $(#[$attr])*
        pub enum $struct_name {
            $(
                $command_name($command_name)
            ),*
        }

        impl Task for $struct_name {

            fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
                match self {
                    $(Self::$command_name(a) => a.run(progress)),*
                }
            }

        }
    };
}

#[macro_export]
macro_rules! subcommand_def {
    ($(#[$attr: meta])* pub struct $struct_name: ident $body: tt) => {

        #[derive(Args)]
        $(#[$attr])*
        pub struct $struct_name $body

    };
}

command_def!{
    #[command(disable_help_subcommand(true))]
    pub MainCommand {
        Create,
        Point,
        Line,
        Polygon
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand(true))]
pub struct Strata {

    #[command(subcommand)]
    pub command: MainCommand

}

impl Task for Strata {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        self.command.run(progress)
    }

}

subcommand_def!{
    pub struct TargetArg {
        /// The path to the GeoPackage file holding the features
        pub target: PathBuf,
    }
}

subcommand_def!{
    pub struct IdArg {
        /// The id of the stored feature
        pub(crate) id: IdRef,
    }
}

subcommand_def!{
    pub struct NamedArg {
        #[arg(long)]
        /// The name of the feature, which must start with an uppercase letter
        pub name: String,

        #[arg(long)]
        /// The geometry of the feature, as well-known text
        pub wkt: String,
    }
}

subcommand_def!{
    pub struct RankArg {
        #[arg(long)]
        /// The rank of the feature: A, B or C
        pub rank: String,
    }
}

subcommand_def!{
    pub struct NegligibleAreaArg {
        #[arg(long,default_value_t=NEGLIGIBLE_AREA)]
        /// Overlaps and remainders with an area at or below this are ignored when polygons are compared
        pub negligible_area: f64,
    }
}

impl NegligibleAreaArg {

    pub(crate) const fn to_settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            negligible_area: self.negligible_area
        }
    }
}

/// Prints the response to stdout. A response which reports a failure becomes an error, so the process exits with a failure code.
pub(crate) fn print_response<Data: Serialize>(response: &Response<Data>) -> Result<(),CommandError> {
    println!("{}",serde_json::to_string_pretty(response)?);
    if response.success {
        Ok(())
    } else {
        Err(CommandError::RequestRejected)
    }
}

/// Opens the target for editing. If it can't be opened, that is printed as a failed response like any other rejection.
pub(crate) fn edit_target(target_arg: &TargetArg) -> Result<FeatureMap,CommandError> {
    match FeatureMap::edit(&target_arg.target) {
        Ok(target) => Ok(target),
        Err(err) => {
            print_response(&Response::<()>::failed(&err))?;
            Err(err)
        }
    }
}

#[cfg(test)]
mod test {

    use clap::Parser as _;

    use std::path::PathBuf;

    use super::edit_target;
    use super::Strata;
    use super::MainCommand;
    use super::TargetArg;
    use crate::algorithms::reconcile::NEGLIGIBLE_AREA;
    use crate::errors::CommandError;
    use crate::errors::ErrorCategory;
    use crate::feature_map::FeatureMap;
    use crate::service::Response;

    #[test]
    fn test_parse_polygon_defaults() {
        let parsed = Strata::try_parse_from(["strata","polygon","add","map.gpkg","--name","Park","--wkt","POLYGON((0 0,0 1,1 1,1 0,0 0))"]).unwrap();
        match parsed.command {
            MainCommand::Polygon(polygon) => match polygon.command {
                super::polygon::PolygonCommand::Add(add) => {
                    assert_eq!(add.named.name,"Park");
                    assert!((add.negligible_area.negligible_area - NEGLIGIBLE_AREA).abs() < f64::EPSILON);
                },
                _ => panic!("wrong subcommand")
            },
            _ => panic!("wrong command")
        }
    }

    #[test]
    fn test_parse_id() {
        assert!(Strata::try_parse_from(["strata","point","get","map.gpkg","12"]).is_ok());
        assert!(Strata::try_parse_from(["strata","point","get","map.gpkg","twelve"]).is_err());
        assert!(Strata::try_parse_from(["strata","line","update","map.gpkg","3","--name","Road","--wkt","LINESTRING(0 0,1 1)"]).is_err());
        assert!(Strata::try_parse_from(["strata","polygon","check-intersection","map.gpkg","POLYGON((0 0,0 1,1 1,1 0,0 0))"]).is_ok());
    }

    #[test]
    fn test_missing_target_is_a_failed_response() {
        let target_arg = TargetArg {
            target: PathBuf::from("/vsimem/strata_commands_no_such_file.gpkg")
        };
        assert!(matches!(edit_target(&target_arg),Err(CommandError::RequestRejected)));

        let Err(err) = FeatureMap::edit(&target_arg.target) else {
            panic!("missing file should not open")
        };
        let json = serde_json::to_value(Response::<()>::failed(&err)).unwrap();
        assert_eq!(json["success"],false);
        assert_eq!(json["category"],serde_json::to_value(ErrorCategory::Store).unwrap());
    }
}
