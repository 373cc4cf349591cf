pub mod cli_adapter;
pub mod service_factory;

pub use cli_adapter::{parse_args, usage, CliAdapter, Command, CommandError, TallyArgs};
pub use service_factory::TallyServiceFactory;
