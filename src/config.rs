//! Command-line configuration.

use std::path::PathBuf;

use crate::{Backend, BroadcastScope, Error};

pub const USAGE: &str = "\
Usage:
  lu-decomp -g <n> <output.txt>
      generate a random n x n matrix with entries in [-50, 50]
  lu-decomp <input.txt> <workers> [local|distributed] [all|next-pivot]
      factorize serially and in parallel, then compare the results";

/// Matrices with fewer elements than this are printed to the console.
pub const PRINT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate {
        size: usize,
        output: PathBuf,
    },
    Decompose {
        input: PathBuf,
        workers: usize,
        backend: Backend,
        scope: BroadcastScope,
    },
}

impl Command {
    /// Parses the arguments that follow the program name.
    pub fn from_args<I>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        match args.first().map(String::as_str) {
            None => Err(usage("missing arguments")),
            Some("-g") => {
                let size = args
                    .get(1)
                    .ok_or_else(|| usage("missing matrix size"))?
                    .parse()
                    .map_err(|_| usage("matrix size must be a non-negative integer"))?;
                let output = args.get(2).ok_or_else(|| usage("missing output file"))?;
                Ok(Command::Generate {
                    size,
                    output: PathBuf::from(output),
                })
            }
            Some(input) => {
                let workers: usize = args
                    .get(1)
                    .ok_or_else(|| usage("missing worker count"))?
                    .parse()
                    .map_err(|_| usage("worker count must be a positive integer"))?;
                if workers == 0 {
                    return Err(usage("worker count must be a positive integer"));
                }
                let backend = match args.get(2) {
                    Some(s) => s.parse()?,
                    None => Backend::default(),
                };
                let scope = match args.get(3) {
                    Some(s) => s.parse()?,
                    None => BroadcastScope::default(),
                };
                Ok(Command::Decompose {
                    input: PathBuf::from(input),
                    workers,
                    backend,
                    scope,
                })
            }
        }
    }
}

fn usage(reason: &str) -> Error {
    Error::Usage(format!("Bad args: {}", reason))
}
