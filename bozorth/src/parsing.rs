use std::fs;
use std::io;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::types::Minutia;

fn parse_line(line: &str, number: usize) -> Result<Minutia, Error> {
    let fail = |reason: String| Error::Parse {
        line: number,
        reason,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(fail(format!("expected 3 fields, found {}", fields.len())));
    }

    let mut values = [0i32; 3];
    for (value, field) in values.iter_mut().zip(fields.iter()) {
        *value = field
            .parse()
            .map_err(|_| fail(format!("`{}` is not an integer", field)))?;
    }

    let [x, y, theta] = values;
    if !(0..360).contains(&theta) {
        return Err(fail(format!("orientation {} is outside 0..360", theta)));
    }

    Ok(Minutia { x, y, theta })
}

/// Reads `x y theta` records, one per line. Blank lines are skipped.
///
/// The first malformed line aborts the whole load.
pub fn parse_xyt_reader(reader: impl BufRead) -> Result<Vec<Minutia>, Error> {
    let mut minutiae = vec![];
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        minutiae.push(parse_line(&line, index + 1)?);
    }
    Ok(minutiae)
}

pub fn parse_xyt(path: impl AsRef<Path>) -> Result<Vec<Minutia>, Error> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_owned()),
        _ => Error::Io(error),
    })?;

    let minutiae = parse_xyt_reader(io::BufReader::new(file))?;
    debug!("Loaded {} minutiae from {}", minutiae.len(), path.display());
    Ok(minutiae)
}
