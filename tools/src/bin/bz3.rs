use std::collections::{BTreeMap, HashMap};
use std::ffi::OsStr;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bozorth::{
    match_outcome, match_tables_score, Adjacency, BozorthState, ComparisonReport,
    MatchParameters, Template,
};

/// Simplified Bozorth3 matcher tool
#[derive(StructOpt, Debug)]
struct Options {
    /// Maximal difference of pair distances
    #[structopt(long, default_value = "20")]
    distance_tolerance: f64,

    /// Maximal difference of pair angles, in degrees
    #[structopt(long, default_value = "15")]
    angle_tolerance: i32,

    /// Link matched pairs sharing a minutia in any position
    #[structopt(long)]
    shared_minutia: bool,

    /// Only print comparisons scoring at least this much
    #[structopt(short = "t", long, default_value = "0")]
    threshold: u32,

    /// Only print the filenames between which match scores would be computed
    #[structopt(short = "d", long)]
    dry_run: bool,

    /// Number of threads to use
    #[structopt(short = "T", long, default_value = "1")]
    threads: u32,

    /// File containing list of pairs to compare, one file in each line
    #[structopt(short = "M", long)]
    pair_file: Option<PathBuf>,

    /// File containing list of probe files or directory
    #[structopt(short = "P", long)]
    probe_files: Option<PathBuf>,

    /// File containing list of gallery files or directory
    #[structopt(short = "G", long)]
    gallery_files: Option<PathBuf>,

    /// Single probe file
    #[structopt(short = "p", long)]
    fixed_probe: Option<PathBuf>,

    /// Single gallery file
    #[structopt(short = "g", long)]
    fixed_gallery: Option<PathBuf>,

    /// Print only scores without filenames
    #[structopt(short = "s", long)]
    only_scores: bool,

    /// Do not preserve order; can run slightly faster
    #[structopt(short = "r", long)]
    relaxed_output_order: bool,

    /// Print the full comparison table for every comparison
    #[structopt(short = "v", long)]
    verbose: bool,

    /// Output file
    #[structopt(short = "o", long)]
    output_file: Option<PathBuf>,

    inputs: Vec<PathBuf>,
}

impl Options {
    fn parameters(&self) -> MatchParameters {
        let parameters = MatchParameters::new(self.distance_tolerance, self.angle_tolerance);
        if self.shared_minutia {
            parameters.with_adjacency(Adjacency::SharedMinutia)
        } else {
            parameters
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum CompareMode {
    OneToOne,
    EveryProbeWithEachGallery,
}

fn find_items_from_pairs(
    file_name: impl AsRef<Path>,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>), anyhow::Error> {
    let file = std::fs::File::open(file_name).context("cannot load pairs from file")?;
    let buff = std::io::BufReader::new(file);

    let mut probes = vec![];
    let mut galleries = vec![];

    for (i, line) in buff.lines().enumerate() {
        let line = line.context("error while reading line")?;
        if i % 2 == 0 {
            probes.push(line.into());
        } else {
            galleries.push(line.into());
        }
    }

    if probes.len() != galleries.len() {
        warn!(
            "there are {} probe files and {} gallery files, skipping last probe file",
            probes.len(),
            galleries.len()
        );
        probes.pop();
    }

    Ok((probes, galleries))
}

fn get_items_from_file(file_name: impl AsRef<Path>) -> Result<Vec<PathBuf>, anyhow::Error> {
    let file = std::fs::File::open(file_name).context("cannot load list of files")?;
    let buff = std::io::BufReader::new(file);

    let mut files = vec![];
    for line in buff.lines() {
        let line = line.context("cannot read line")?;
        files.push(line.into());
    }

    Ok(files)
}

fn get_items_from_directory(directory: impl AsRef<Path>) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut files = vec![];

    for entry in std::fs::read_dir(directory).context("cannot read directory")? {
        let entry = entry.context("cannot read entry")?;
        let meta = entry.metadata().context("cannot read file metadata")?;
        if !meta.is_file() {
            continue;
        }

        if entry.path().extension().and_then(OsStr::to_str) != Some("xyt") {
            continue;
        }

        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}

fn get_items_from_file_or_directory(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, anyhow::Error> {
    let path = path.as_ref();
    if path.is_file() {
        get_items_from_file(path)
    } else if path.is_dir() {
        get_items_from_directory(path)
    } else if path.exists() {
        bail!("cannot read path {}", path.display())
    } else {
        bail!("path {} does not exist", path.display())
    }
}

fn collect_inputs(opt: &Options) -> anyhow::Result<(Vec<PathBuf>, Vec<PathBuf>, CompareMode)> {
    let exclusive = [
        (opt.pair_file.is_some() && opt.probe_files.is_some(), "-M", "-P"),
        (opt.pair_file.is_some() && opt.gallery_files.is_some(), "-M", "-G"),
        (opt.pair_file.is_some() && opt.fixed_probe.is_some(), "-M", "-p"),
        (opt.pair_file.is_some() && opt.fixed_gallery.is_some(), "-M", "-g"),
        (opt.probe_files.is_some() && opt.fixed_probe.is_some(), "-P", "-p"),
        (opt.gallery_files.is_some() && opt.fixed_gallery.is_some(), "-G", "-g"),
    ];
    for &(conflict, first, second) in exclusive.iter() {
        if conflict {
            bail!(r#"flags "{}" and "{}" are incompatible"#, first, second);
        }
    }

    let inputs = opt.inputs.clone();
    Ok(if let Some(pair_file) = &opt.pair_file {
        let (probes, galleries) = find_items_from_pairs(pair_file)?;
        (probes, galleries, CompareMode::OneToOne)
    } else if let (Some(probe), Some(gallery)) = (&opt.fixed_probe, &opt.fixed_gallery) {
        (vec![probe.clone()], vec![gallery.clone()], CompareMode::OneToOne)
    } else if let Some(fixed_probe) = &opt.fixed_probe {
        let galleries = if let Some(gallery_files) = &opt.gallery_files {
            get_items_from_file_or_directory(gallery_files)?
        } else if !inputs.is_empty() {
            inputs
        } else {
            bail!("missing gallery files");
        };
        (
            vec![fixed_probe.clone()],
            galleries,
            CompareMode::EveryProbeWithEachGallery,
        )
    } else if let Some(fixed_gallery) = &opt.fixed_gallery {
        let probes = if let Some(probe_files) = &opt.probe_files {
            get_items_from_file_or_directory(probe_files)?
        } else if !inputs.is_empty() {
            inputs
        } else {
            bail!("missing probe files");
        };
        (
            probes,
            vec![fixed_gallery.clone()],
            CompareMode::EveryProbeWithEachGallery,
        )
    } else if let (Some(probe_files), Some(gallery_files)) = (&opt.probe_files, &opt.gallery_files) {
        (
            get_items_from_file_or_directory(probe_files)?,
            get_items_from_file_or_directory(gallery_files)?,
            CompareMode::EveryProbeWithEachGallery,
        )
    } else if let Some(probe_files) = &opt.probe_files {
        if inputs.is_empty() {
            bail!("missing gallery files");
        }
        (
            get_items_from_file_or_directory(probe_files)?,
            inputs,
            CompareMode::EveryProbeWithEachGallery,
        )
    } else if let Some(gallery_files) = &opt.gallery_files {
        if inputs.is_empty() {
            bail!("missing probe files");
        }
        (
            inputs,
            get_items_from_file_or_directory(gallery_files)?,
            CompareMode::EveryProbeWithEachGallery,
        )
    } else if !inputs.is_empty() {
        if inputs.len() % 2 == 1 {
            bail!("Number of files to compare is odd");
        }

        let mut probes = Vec::with_capacity(inputs.len() / 2);
        let mut galleries = Vec::with_capacity(inputs.len() / 2);
        for (i, path) in inputs.into_iter().enumerate() {
            if i % 2 == 0 {
                probes.push(path);
            } else {
                galleries.push(path);
            }
        }
        (probes, galleries, CompareMode::OneToOne)
    } else {
        bail!("missing input data");
    })
}

fn comparisons<'data>(
    probes: &'data [PathBuf],
    galleries: &'data [PathBuf],
    mode: CompareMode,
) -> Box<dyn Iterator<Item = (&'data PathBuf, &'data PathBuf)> + Send + 'data> {
    match mode {
        CompareMode::OneToOne => Box::new(probes.iter().zip(galleries.iter())),
        CompareMode::EveryProbeWithEachGallery => Box::new(
            probes
                .iter()
                .flat_map(move |probe| galleries.iter().map(move |gallery| (probe, gallery))),
        ),
    }
}

struct MatchResult<'data> {
    sequence: usize,
    probe: &'data PathBuf,
    gallery: &'data PathBuf,
    score: Option<u32>,
    report: Option<String>,
}

fn load_templates<'data>(
    probes: &'data [PathBuf],
    galleries: &'data [PathBuf],
) -> HashMap<&'data Path, Option<Template>> {
    let mut unique: Vec<&Path> = probes
        .iter()
        .chain(galleries.iter())
        .map(PathBuf::as_path)
        .collect();
    unique.sort();
    unique.dedup();

    unique
        .par_iter()
        .map(|&path| match Template::load(path) {
            Ok(template) => (path, Some(template)),
            Err(error) => {
                warn!("cannot load {}: {}", path.display(), error);
                (path, None)
            }
        })
        .collect()
}

fn single_match(
    probe: &Template,
    gallery: &Template,
    parameters: &MatchParameters,
    verbose: bool,
    state: &mut BozorthState,
) -> (u32, Option<String>) {
    if verbose {
        let outcome = match_outcome(probe.table(), gallery.table(), parameters, state);
        let report = ComparisonReport::new(&outcome).to_string();
        (outcome.score, Some(report))
    } else {
        (
            match_tables_score(probe.table(), gallery.table(), parameters, state),
            None,
        )
    }
}

fn write_result(output: &mut impl Write, result: &MatchResult, only_scores: bool) -> std::io::Result<()> {
    let score = result.score.map(|s| s as i64).unwrap_or(-1);
    if only_scores {
        writeln!(output, "{}", score)?;
    } else {
        writeln!(
            output,
            "{} {} {}",
            result.probe.display(),
            result.gallery.display(),
            score
        )?;
    }
    if let Some(report) = &result.report {
        write!(output, "{}", report)?;
    }
    Ok(())
}

fn print_into_stream(
    output: &mut impl Write,
    rx: crossbeam::channel::Receiver<MatchResult>,
    options: &Options,
) -> std::io::Result<()> {
    let keep = |result: &MatchResult| result.score.map_or(true, |s| s >= options.threshold);

    if options.relaxed_output_order {
        for result in rx {
            if keep(&result) {
                write_result(output, &result, options.only_scores)?;
            }
        }
    } else {
        // results arrive out of order from the workers
        let mut pending = BTreeMap::new();
        let mut next = 0;
        for result in rx {
            pending.insert(result.sequence, result);
            while let Some(result) = pending.remove(&next) {
                if keep(&result) {
                    write_result(output, &result, options.only_scores)?;
                }
                next += 1;
            }
        }
    }
    output.flush()
}

fn run(probes: &[PathBuf], galleries: &[PathBuf], mode: CompareMode, options: &Options) -> anyhow::Result<()> {
    let cache = load_templates(probes, galleries);
    let parameters = options.parameters();
    let threads = options.threads.max(1) as usize;

    crossbeam::scope(|s| -> anyhow::Result<()> {
        let (tx_jobs, rx_jobs) = crossbeam::channel::bounded::<(usize, &PathBuf, &PathBuf)>(1000);
        let (tx_done, rx_done) = crossbeam::channel::unbounded::<MatchResult>();

        s.spawn(move |_| {
            for (sequence, (probe, gallery)) in comparisons(probes, galleries, mode).enumerate() {
                if tx_jobs.send((sequence, probe, gallery)).is_err() {
                    break;
                }
            }
        });

        for _ in 0..threads {
            let rx_jobs = rx_jobs.clone();
            let tx_done = tx_done.clone();
            let cache = &cache;
            let parameters = &parameters;
            s.spawn(move |_| {
                let mut state = BozorthState::new();
                for (sequence, probe, gallery) in rx_jobs {
                    let templates = (&cache[probe.as_path()], &cache[gallery.as_path()]);
                    let (score, report) = match templates {
                        (Some(probe), Some(gallery)) => {
                            let (score, report) =
                                single_match(probe, gallery, parameters, options.verbose, &mut state);
                            (Some(score), report)
                        }
                        _ => (None, None),
                    };

                    let result = MatchResult {
                        sequence,
                        probe,
                        gallery,
                        score,
                        report,
                    };
                    if tx_done.send(result).is_err() {
                        break;
                    }
                }
            });
        }

        // Drop channels that we've cloned into the workers since we don't need them any more
        // and they are blocking the writer
        drop(rx_jobs);
        drop(tx_done);

        match &options.output_file {
            Some(file) => {
                let file = std::fs::File::create(file)
                    .with_context(|| format!("cannot create {}", file.display()))?;
                let mut buff = std::io::BufWriter::new(file);
                print_into_stream(&mut buff, rx_done, options)?;
            }
            None => {
                let stdout = std::io::stdout();
                let mut buff = std::io::BufWriter::new(stdout.lock());
                print_into_stream(&mut buff, rx_done, options)?;
            }
        }
        Ok(())
    })
    .map_err(|_| anyhow::anyhow!("a worker thread panicked"))?
}

fn dry_run(probes: &[PathBuf], galleries: &[PathBuf], mode: CompareMode) {
    for (probe, gallery) in comparisons(probes, galleries, mode) {
        println!("{} {}", probe.display(), gallery.display());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt: Options = Options::from_args();
    info!("{:?}", opt);

    let (probes, galleries, mode) = collect_inputs(&opt)?;

    if opt.dry_run {
        dry_run(&probes, &galleries, mode);
    } else {
        let start = std::time::Instant::now();
        run(&probes, &galleries, mode, &opt)?;
        info!("Done in {:?}", start.elapsed());
    }

    Ok(())
}
