use std::path::PathBuf;

use anyhow::Context;
use argh::FromArgs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bozorth::{Adjacency, Bozorth3Binary, ComparisonOracle, InProcessOracle, MatchParameters};

/// Save the comparison table of two templates
#[derive(FromArgs, Debug)]
struct Options {
    /// produce the table with the built-in matcher instead of the reference binary
    #[argh(switch)]
    in_process: bool,

    /// reference binary to run (default: bozorth3)
    #[argh(option, default = "PathBuf::from(\"bozorth3\")")]
    program: PathBuf,

    /// do not pass the verbose flag to the reference binary
    #[argh(switch)]
    quiet: bool,

    /// file to save the table into (default: comparison_table.txt)
    #[argh(option, short = 'o', default = "PathBuf::from(\"comparison_table.txt\")")]
    output: PathBuf,

    /// distance tolerance of the built-in matcher (default: 20)
    #[argh(option, default = "20.0")]
    distance_tolerance: f64,

    /// angle tolerance of the built-in matcher (default: 15)
    #[argh(option, default = "15")]
    angle_tolerance: i32,

    /// link matched pairs sharing a minutia in any position
    #[argh(switch)]
    shared_minutia: bool,

    /// probe .xyt file
    #[argh(positional)]
    probe: PathBuf,

    /// gallery .xyt file
    #[argh(positional)]
    gallery: PathBuf,
}

impl Options {
    fn oracle(&self) -> Box<dyn ComparisonOracle> {
        if self.in_process {
            let parameters = MatchParameters::new(self.distance_tolerance, self.angle_tolerance);
            let parameters = if self.shared_minutia {
                parameters.with_adjacency(Adjacency::SharedMinutia)
            } else {
                parameters
            };
            Box::new(InProcessOracle::new(parameters))
        } else {
            Box::new(Bozorth3Binary::new(&self.program).verbose(!self.quiet))
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts: Options = argh::from_env();
    info!("{:?}", opts);

    let table = opts
        .oracle()
        .compare(&opts.probe, &opts.gallery)
        .with_context(|| {
            format!(
                "cannot compare {} with {}",
                opts.probe.display(),
                opts.gallery.display()
            )
        })?;

    std::fs::write(&opts.output, table)
        .with_context(|| format!("cannot write {}", opts.output.display()))?;
    println!("Comparison table saved to '{}'", opts.output.display());

    Ok(())
}
