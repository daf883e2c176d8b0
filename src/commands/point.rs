use clap::Args;
use clap::Subcommand;

use crate::command_def;
use crate::commands::edit_target;
use crate::commands::print_response;
use crate::commands::IdArg;
use crate::commands::NamedArg;
use crate::commands::RankArg;
use crate::commands::TargetArg;
use crate::commands::Task;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::service::ranked::add_ranked;
use crate::service::ranked::delete_ranked;
use crate::service::ranked::get_ranked;
use crate::service::ranked::list_ranked;
use crate::service::ranked::search_points;
use crate::service::ranked::update_ranked;
use crate::service::ranked::Points;
use crate::subcommand_def;

subcommand_def!{
    /// Adds a ranked point
    pub struct Add {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        #[clap(flatten)]
        pub named: NamedArg,

        #[clap(flatten)]
        pub rank: RankArg,

    }
}

impl Task for Add {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&add_ranked::<Points,_>(&mut target, &self.named.name, &self.named.wkt, &self.rank.rank, progress))
    }
}

subcommand_def!{
    /// Replaces the name, geometry and rank of a stored point
    pub struct Update {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        #[clap(flatten)]
        pub id_arg: IdArg,

        #[clap(flatten)]
        pub named: NamedArg,

        #[clap(flatten)]
        pub rank: RankArg,

    }
}

impl Task for Update {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&update_ranked::<Points,_>(&mut target, &self.id_arg.id, &self.named.name, &self.named.wkt, &self.rank.rank, progress))
    }
}

subcommand_def!{
    /// Deletes a stored point
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
        print_response(&delete_ranked::<Points>(&mut target, &self.id_arg.id))
    }
}

subcommand_def!{
    /// Prints a stored point
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
        print_response(&get_ranked::<Points>(&mut target, &self.id_arg.id))
    }
}

subcommand_def!{
    /// Prints all stored points
    pub struct List {

        #[clap(flatten)]
        pub target_arg: TargetArg,

    }
}

impl Task for List {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&list_ranked::<Points,_>(&mut target, progress))
    }
}

subcommand_def!{
    /// Prints the points whose name contains the text. Case matters.
    pub struct Search {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        /// The text to look for
        pub name: String,

    }
}

impl Task for Search {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&search_points(&mut target, &self.name, progress))
    }
}

command_def!{
    #[command(disable_help_subcommand(true))]
    pub PointCommand {
        Add,
        Update,
        Delete,
        Get,
        List,
        Search
    }
}

subcommand_def!{
    /// Adds, changes, removes and reads ranked points
    pub struct Point {

        #[command(subcommand)]
        pub command: PointCommand

    }
}

impl Task for Point {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        self.command.run(progress)
    }
}
