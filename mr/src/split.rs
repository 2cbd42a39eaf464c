use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::{Error, Result};

/// A half-open byte range `[start, end)` of the input owned by one mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// Splits the input into `num_sections` line-aligned ranges.
///
/// Returns `num_sections + 1` offsets: the first is 0, the last is the file
/// size, and every offset in between sits right after a newline (or at EOF).
/// Each internal boundary starts at `i * (size / num_sections)` and is pushed
/// forward to the end of the line it lands in, so sections can be uneven and,
/// with more sections than lines, empty.
pub fn split(path: impl AsRef<Path>, num_sections: usize) -> Result<Vec<u64>> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::invalid("input path is empty"));
    }
    if num_sections == 0 {
        return Err(Error::invalid("number of sections must be positive"));
    }

    let file = File::open(path)
        .map_err(|e| Error::io(format!("can't open {}", path.display()), e))?;
    let file_size = file
        .metadata()
        .map_err(|e| Error::io(format!("can't stat {}", path.display()), e))?
        .len();
    if file_size == 0 {
        return Err(Error::EmptyInput(path.to_path_buf()));
    }

    let section_size = file_size / num_sections as u64;
    let mut reader = BufReader::new(file);
    let mut boundaries = Vec::with_capacity(num_sections + 1);
    boundaries.push(0);

    let mut skipped = Vec::new();
    for i in 1..num_sections {
        let pos = reader
            .seek(SeekFrom::Start(i as u64 * section_size))
            .map_err(|e| Error::io(format!("can't seek in {}", path.display()), e))?;
        skipped.clear();
        let n = reader
            .read_until(b'\n', &mut skipped)
            .map_err(|e| Error::io(format!("can't read {}", path.display()), e))?;
        boundaries.push(pos + n as u64);
    }
    boundaries.push(file_size);

    debug!(path = %path.display(), file_size, ?boundaries, "split input");
    Ok(boundaries)
}

/// Pairs up consecutive boundaries into indexed sections.
pub fn sections(boundaries: &[u64]) -> Vec<Section> {
    boundaries
        .windows(2)
        .enumerate()
        .map(|(index, w)| Section {
            index,
            start: w[0],
            end: w[1],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn input(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn assert_line_aligned(contents: &str, boundaries: &[u64]) {
        let bytes = contents.as_bytes();
        let n = boundaries.len() - 1;
        assert_eq!(boundaries[0], 0);
        assert_eq!(boundaries[n], bytes.len() as u64);
        for w in boundaries.windows(2) {
            assert!(w[0] <= w[1], "boundaries out of order: {:?}", boundaries);
        }
        for &b in &boundaries[1..n] {
            let b = b as usize;
            assert!(b == bytes.len() || bytes[b - 1] == b'\n', "{} splits a line", b);
        }
    }

    #[test]
    fn test_split_single_section() {
        let file = input("one\ntwo\nthree\n");
        assert_eq!(split(file.path(), 1).unwrap(), vec![0, 14]);
    }

    #[test]
    fn test_split_moves_boundary_to_line_end() {
        // 20 bytes; offset 10 is the start of "cccc", which stays in section 0
        let contents = "aaaa\nbbbb\ncccc\ndddd\n";
        let file = input(contents);
        let boundaries = split(file.path(), 2).unwrap();

        assert_eq!(boundaries, vec![0, 15, 20]);
        assert_line_aligned(contents, &boundaries);
    }

    #[test]
    fn test_split_without_trailing_newline() {
        let contents = "alpha\nbeta\ngamma";
        let file = input(contents);
        for n in 1..=8 {
            let boundaries = split(file.path(), n).unwrap();
            assert_eq!(boundaries.len(), n + 1);
            assert_line_aligned(contents, &boundaries);
        }
    }

    #[test]
    fn test_split_more_sections_than_lines() {
        let contents = "a\nb\n";
        let file = input(contents);
        let boundaries = split(file.path(), 6).unwrap();

        assert_eq!(boundaries.len(), 7);
        assert_line_aligned(contents, &boundaries);
        assert!(sections(&boundaries).iter().any(|s| s.is_empty()));
    }

    #[test]
    fn test_split_uneven_lines() {
        let contents = "a very long first line of text\nb\nc\nd\ne\nf\n";
        let file = input(contents);
        for n in 1..=10 {
            assert_line_aligned(contents, &split(file.path(), n).unwrap());
        }
    }

    #[test]
    fn test_split_invalid_arguments() {
        let file = input("x\n");
        assert!(matches!(split("", 2), Err(Error::InvalidArgument(_))));
        assert!(matches!(split(file.path(), 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_split_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(split(&missing, 2), Err(Error::Io { .. })));
    }

    #[test]
    fn test_split_empty_file() {
        let file = input("");
        assert!(matches!(split(file.path(), 3), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_sections() {
        let s = sections(&[0, 4, 4, 9]);
        assert_eq!(
            s,
            vec![
                Section { index: 0, start: 0, end: 4 },
                Section { index: 1, start: 4, end: 4 },
                Section { index: 2, start: 4, end: 9 },
            ]
        );
        assert!(s[1].is_empty());
        assert_eq!(s[2].len(), 5);
    }
}
