use eyre::{Result, bail, eyre};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ApplyOptions;

pub const USAGE: &str = concat!(
    "usage: mend [--root DIR] [--dry-run] [--no-external] [--lenient] [--timeout SECS] [--verbose] [PATCH|-]\n",
    "       mend stat [PATCH|-]\n",
    "       mend help | version\n",
);

/// Options of the default `apply` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub root: PathBuf,
    pub dry_run: bool,
    pub no_external: bool,
    pub lenient: bool,
    pub verbose: bool,
    pub timeout: Option<Duration>,
    /// Patch file; `None` or `-` reads stdin.
    pub input: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dry_run: false,
            no_external: false,
            lenient: false,
            verbose: false,
            timeout: None,
            input: None,
        }
    }
}

impl Args {
    /// Flags win over whatever the environment configured.
    pub fn apply_to(&self, mut options: ApplyOptions) -> ApplyOptions {
        if self.no_external {
            options.use_external = false;
        }
        if self.lenient {
            options = options.lenient();
        }
        options.dry_run = self.dry_run;
        options
    }
}

pub fn parse_args(argv: &[String]) -> Result<Args> {
    let mut args = Args::default();
    let mut it = argv.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--root" | "-C" => {
                let dir = it.next().ok_or_else(|| eyre!("{arg} needs a directory"))?;
                args.root = PathBuf::from(dir);
            }
            "--dry-run" | "--check" | "-n" => args.dry_run = true,
            "--no-external" | "--no-git" => args.no_external = true,
            "--lenient" => args.lenient = true,
            "--verbose" => args.verbose = true,
            "--timeout" => {
                let secs = it.next().ok_or_else(|| eyre!("--timeout needs seconds"))?;
                let secs: f64 = secs
                    .parse()
                    .map_err(|_| eyre!("--timeout: `{secs}` is not a number"))?;
                if !secs.is_finite() || secs <= 0.0 {
                    bail!("--timeout must be positive");
                }
                args.timeout = Some(Duration::from_secs_f64(secs));
            }
            "-" => set_input(&mut args, arg)?,
            flag if flag.starts_with('-') => bail!("unknown flag `{flag}`"),
            _ => set_input(&mut args, arg)?,
        }
    }
    Ok(args)
}

fn set_input(args: &mut Args, value: &str) -> Result<()> {
    if let Some(prev) = &args.input {
        bail!("more than one patch given (`{prev}` and `{value}`)");
    }
    args.input = Some(value.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_argv_reads_stdin_in_cwd() {
        let args = parse_args(&[]).unwrap();
        assert_eq!(args, Args::default());
    }

    #[test]
    fn flags_and_input() {
        let args = parse_args(&argv(&[
            "--root", "/work", "--dry-run", "--no-git", "--timeout", "2.5", "fix.diff",
        ]))
        .unwrap();
        assert_eq!(args.root, PathBuf::from("/work"));
        assert!(args.dry_run);
        assert!(args.no_external);
        assert_eq!(args.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(args.input.as_deref(), Some("fix.diff"));
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(parse_args(&argv(&["--bogus"])).is_err());
        assert!(parse_args(&argv(&["a.diff", "b.diff"])).is_err());
        assert!(parse_args(&argv(&["--timeout", "0"])).is_err());
        assert!(parse_args(&argv(&["--root"])).is_err());
    }

    #[test]
    fn short_v_is_not_verbose() {
        assert!(parse_args(&argv(&["--verbose"])).unwrap().verbose);
        assert!(parse_args(&argv(&["fix.diff", "-v"])).is_err());
    }

    #[test]
    fn flags_override_options() {
        let args = parse_args(&argv(&["--lenient", "--no-external", "-n"])).unwrap();
        let options = args.apply_to(ApplyOptions::default());
        assert!(!options.use_external);
        assert!(!options.verify_context);
        assert!(!options.atomic);
        assert!(options.dry_run);
    }
}
