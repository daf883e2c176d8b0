use clap::Args;

use crate::commands::TargetArg;
use crate::commands::Task;
use crate::errors::CommandError;
use crate::feature_map::FeatureMap;
use crate::progress::ProgressObserver;
use crate::subcommand_def;

subcommand_def!{
    /// Creates a GeoPackage with empty point, line and polygon layers
    pub struct Create {

        #[clap(flatten)]
        pub target_arg: TargetArg,

        #[arg(long)]
        /// If true and the layers already exist in the file, they will be replaced. Otherwise, an error will occur if they exist.
        pub overwrite: bool

    }
}

impl Task for Create {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let mut target = FeatureMap::create_or_edit(&self.target_arg.target)?;
        target.initialize(self.overwrite, progress)
    }
}
