pub mod args;
pub mod io;
pub mod run;
pub mod specials;

pub use args::{Args, USAGE, parse_args};
pub use run::run;
