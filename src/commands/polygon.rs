use clap::Args;
use clap::Subcommand;

use crate::command_def;
use crate::commands::edit_target;
use crate::commands::print_response;
use crate::commands::IdArg;
use crate::commands::NamedArg;
use crate::commands::NegligibleAreaArg;
use crate::commands::TargetArg;
use crate::commands::Task;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::service::polygons::add_polygon;
use crate::service::polygons::check_polygon_intersection;
use crate::service::polygons::delete_polygon;
use crate::service::polygons::get_polygon;
use crate::service::polygons::list_polygons;
use crate::service::polygons::update_polygon;
use crate::subcommand_def;

subcommand_def!{
    /// Adds a rank A polygon. Areas already covered by stored polygons are cut out of it first.
    pub struct Add {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        #[clap(flatten)]
        pub named: NamedArg,

        #[clap(flatten)]
        pub negligible_area: NegligibleAreaArg,

    }
}

impl Task for Add {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        let settings = self.negligible_area.to_settings();
        print_response(&add_polygon(&mut target, &self.named.name, &self.named.wkt, &settings, progress))
    }
}

subcommand_def!{
    /// Replaces the name and geometry of a stored polygon. The geometry is cut against all other stored polygons.
    pub struct Update {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        #[clap(flatten)]
        pub id_arg: IdArg,

        #[clap(flatten)]
        pub named: NamedArg,

        #[clap(flatten)]
        pub negligible_area: NegligibleAreaArg,

    }
}

impl Task for Update {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        let settings = self.negligible_area.to_settings();
        print_response(&update_polygon(&mut target, &self.id_arg.id, &self.named.name, &self.named.wkt, &settings, progress))
    }
}

subcommand_def!{
    /// Deletes a stored polygon
    pub struct Delete {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        #[clap(flatten)]
        pub id_arg: IdArg,

    }
}

impl Task for Delete {

    fn run<Progress: ProgressObserver>(self, _: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&delete_polygon(&mut target, &self.id_arg.id))
    }
}

subcommand_def!{
    /// Prints a stored polygon
    pub struct Get {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        #[clap(flatten)]
        pub id_arg: IdArg,

    }
}

impl Task for Get {

    fn run<Progress: ProgressObserver>(self, _: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&get_polygon(&mut target, &self.id_arg.id))
    }
}

subcommand_def!{
    /// Prints all stored polygons
    pub struct List {

        #[clap(flatten)]
        pub target_arg: TargetArg,

    }
}

impl Task for List {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&list_polygons(&mut target, progress))
    }
}

subcommand_def!{
    /// Reports which stored polygons a candidate polygon overlaps, without storing it
    pub struct CheckIntersection {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        /// The candidate polygon, as well-known text
        pub wkt: String,

        #[clap(flatten)]
        pub negligible_area: NegligibleAreaArg,

    }
}

impl Task for CheckIntersection {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        let settings = self.negligible_area.to_settings();
        print_response(&check_polygon_intersection(&mut target, &self.wkt, &settings, progress))
    }
}

command_def!{
    #[command(disable_help_subcommand(true))]
    pub PolygonCommand {
        Add,
        Update,
        Delete,
        Get,
        List,
        CheckIntersection
    }
}

subcommand_def!{
    /// Adds, changes, removes and reads rank A polygons
    pub struct Polygon {

        #[command(subcommand)]
        pub command: PolygonCommand

    }
}

impl Task for Polygon {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        self.command.run(progress)
    }
}
