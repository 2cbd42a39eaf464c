use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::{Error, Result};

/// Runs `map_fn` over every line of `[start, end)` and returns the emitted
/// records in line order.
///
/// Every call opens its own handle on `path`, so sections can be mapped
/// concurrently. A line is read whenever the position before it is below
/// `end`; with line-aligned boundaries that is exactly the lines of the
/// section. The trailing `\n` is stripped before the line is handed over, and
/// bytes that are not valid UTF-8 are replaced with U+FFFD.
pub fn map_section<F>(
    path: impl AsRef<Path>,
    start: u64,
    end: u64,
    map_fn: &F,
) -> Result<Vec<String>>
where
    F: Fn(&str) -> Vec<String> + ?Sized,
{
    map_lines(path.as_ref(), start, end, map_fn).map(|(_, records)| records)
}

/// Same as [`map_section`] but also reports how many lines were read.
pub(crate) fn map_lines<F>(
    path: &Path,
    start: u64,
    end: u64,
    map_fn: &F,
) -> Result<(usize, Vec<String>)>
where
    F: Fn(&str) -> Vec<String> + ?Sized,
{
    if path.as_os_str().is_empty() {
        return Err(Error::invalid("input path is empty"));
    }
    if start > end {
        return Err(Error::invalid(format!(
            "section start {} is past its end {}",
            start, end
        )));
    }

    let file = File::open(path)
        .map_err(|e| Error::io(format!("can't open {}", path.display()), e))?;
    let mut reader = BufReader::new(file);
    reader
        .seek(SeekFrom::Start(start))
        .map_err(|e| Error::io(format!("can't seek in {}", path.display()), e))?;

    let mut output = vec![];
    let mut lines = 0;
    let mut pos = start;
    let mut line = Vec::new();
    while pos < end {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| Error::io(format!("can't read {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        pos += n as u64;
        lines += 1;
        let content = line.strip_suffix(b"\n").unwrap_or(&line);
        output.extend(map_fn(&String::from_utf8_lossy(content)));
    }

    debug!(start, end, lines, emitted = output.len(), "mapped section");
    Ok((lines, output))
}

/// Reduces a whole bucket and writes the result to `output_path`, one string
/// per line. An existing file is overwritten. Returns the number of lines
/// written.
pub fn reduce_bucket<F>(
    bucket: &[String],
    reduce_fn: &F,
    output_path: impl AsRef<Path>,
) -> Result<usize>
where
    F: Fn(&[String]) -> Vec<String> + ?Sized,
{
    let output_path = output_path.as_ref();
    if bucket.is_empty() {
        return Err(Error::invalid("reducer bucket is empty"));
    }
    if output_path.as_os_str().is_empty() {
        return Err(Error::invalid("output file name is empty"));
    }

    let reduced = reduce_fn(bucket);
    save_result(&reduced, output_path)?;

    debug!(
        output = %output_path.display(),
        records = bucket.len(),
        lines = reduced.len(),
        "reduced bucket"
    );
    Ok(reduced.len())
}

/// Writes `lines` to `path`, creating its parent directory if needed.
pub(crate) fn save_result(lines: &[String], path: &Path) -> Result<()> {
    let to_io = |e| Error::io(format!("can't write {}", path.display()), e);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(to_io)?;
        }
    }
    let file = File::create(path).map_err(to_io)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line).map_err(to_io)?;
    }
    writer.flush().map_err(to_io)
}
