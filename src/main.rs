use std::env;
use std::io;
use std::process;

use anyhow::{bail, Context, Result};
use rewind_regex::MatcherBuilder;

// Usage: echo <input_text> | rewind -E <pattern> [--steps <limit>]
fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    if args.next().as_deref() != Some("-E") {
        bail!("Expected first argument to be '-E'");
    }
    let pattern = args.next().context("missing pattern after '-E'")?;

    let mut builder = MatcherBuilder::new(&pattern);
    match args.next().as_deref() {
        Some("--steps") => {
            let limit = args
                .next()
                .context("missing value after '--steps'")?
                .parse()
                .context("'--steps' expects a number")?;
            builder = builder.step_limit(limit);
        }
        Some(other) => bail!("unexpected argument '{other}'"),
        None => {}
    }
    let matcher = builder
        .build()
        .with_context(|| format!("cannot compile pattern '{pattern}'"))?;

    let mut input_line = String::new();
    io::stdin()
        .read_line(&mut input_line)
        .context("failed to read input line")?;

    // Trim trailing newline so it is not part of the match
    let trimmed_input = input_line.trim_end_matches('\n');

    let Some(captures) = matcher.captures(trimmed_input) else {
        process::exit(1)
    };
    for (i, group) in captures.iter().enumerate() {
        println!("{i}: {}", group.unwrap_or_default());
    }
    Ok(())
}
