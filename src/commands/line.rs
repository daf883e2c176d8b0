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
use crate::service::ranked::update_ranked;
use crate::service::ranked::Lines;
use crate::subcommand_def;

subcommand_def!{
    /// Adds a ranked line
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
        print_response(&add_ranked::<Lines,_>(&mut target, &self.named.name, &self.named.wkt, &self.rank.rank, progress))
    }
}

subcommand_def!{
    /// Replaces the name, geometry and rank of a stored line
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
        print_response(&update_ranked::<Lines,_>(&mut target, &self.id_arg.id, &self.named.name, &self.named.wkt, &self.rank.rank, progress))
    }
}

subcommand_def!{
    /// Deletes a stored line
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
        print_response(&delete_ranked::<Lines>(&mut target, &self.id_arg.id))
    }
}

subcommand_def!{
    /// Prints a stored line
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
        print_response(&get_ranked::<Lines>(&mut target, &self.id_arg.id))
    }
}

subcommand_def!{
    /// Prints all stored lines
    pub struct List {

        #[clap(flatten)]
        pub target_arg: TargetArg,

    }
}

impl Task for List {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = edit_target(&self.target_arg)?;
        print_response(&list_ranked::<Lines,_>(&mut target, progress))
    }
}

command_def!{
    #[command(disable_help_subcommand(true))]
    pub LineCommand {
        Add,
        Update,
        Delete,
        Get,
        List
    }
}

subcommand_def!{
    /// Adds, changes, removes and reads ranked lines
    pub struct Line {

        #[command(subcommand)]
        pub command: LineCommand

    }
}

impl Task for Line {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        self.command.run(progress)
    }
}
