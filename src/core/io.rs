//! Input file opening
//!
//! Every input of a run (pairs, fragment list, centromeres, tables) goes
//! through [`InputReader`], which undoes gzip/bzip2 compression on the fly
//! and memory maps large plain files.

use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

/// Read buffer for streamed inputs (256KB)
pub const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Plain files at least this large are memory mapped (64MB)
pub const MMAP_THRESHOLD: u64 = 64 * 1024 * 1024;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Compression of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl Compression {
    /// Sniff the first bytes of a file, falling back to its extension for
    /// files too short to carry a magic number
    pub fn detect(path: &Path) -> io::Result<Self> {
        let mut head = [0u8; 3];
        let mut file = File::open(path)?;
        let n = file.read(&mut head)?;
        let head = &head[..n];

        if head.starts_with(GZIP_MAGIC) {
            return Ok(Compression::Gzip);
        }
        if head.starts_with(BZIP2_MAGIC) {
            return Ok(Compression::Bzip2);
        }
        if n < 3 {
            return Ok(Self::from_extension(path));
        }
        Ok(Compression::None)
    }

    pub fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }
}

/// When to memory map a plain input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mapping {
    Never,
    Always,
    /// Map files of at least [`MMAP_THRESHOLD`] bytes
    #[default]
    Auto,
}

enum Source {
    Plain(BufReader<File>),
    Mapped(Cursor<Mmap>),
    Gzip(BufReader<MultiGzDecoder<File>>),
    Bzip2(BufReader<BzDecoder<File>>),
}

/// Buffered reader over a possibly compressed input file
pub struct InputReader {
    source: Source,
    compression: Compression,
}

impl InputReader {
    /// Open with automatic memory mapping
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::open_with(path, Mapping::Auto)
    }

    /// Open with an explicit mapping policy
    ///
    /// Compressed inputs are always streamed.
    pub fn open_with<P: AsRef<Path>>(path: P, mapping: Mapping) -> io::Result<Self> {
        let path = path.as_ref();
        let compression = Compression::detect(path)?;
        let file = File::open(path)?;

        let source = match compression {
            Compression::Gzip => Source::Gzip(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                MultiGzDecoder::new(file),
            )),
            Compression::Bzip2 => Source::Bzip2(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                BzDecoder::new(file),
            )),
            Compression::None => {
                let map = match mapping {
                    Mapping::Never => false,
                    Mapping::Always => true,
                    Mapping::Auto => file.metadata()?.len() >= MMAP_THRESHOLD,
                };
                if map {
                    // SAFETY: inputs are not modified while a run reads them
                    let mmap = unsafe { Mmap::map(&file)? };
                    Source::Mapped(Cursor::new(mmap))
                } else {
                    Source::Plain(BufReader::with_capacity(READ_BUFFER_SIZE, file))
                }
            }
        };

        Ok(Self {
            source,
            compression,
        })
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.source, Source::Mapped(_))
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.source {
            Source::Plain(r) => r.read(buf),
            Source::Mapped(r) => r.read(buf),
            Source::Gzip(r) => r.read(buf),
            Source::Bzip2(r) => r.read(buf),
        }
    }
}

impl BufRead for InputReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match &mut self.source {
            Source::Plain(r) => r.fill_buf(),
            Source::Mapped(r) => r.fill_buf(),
            Source::Gzip(r) => r.fill_buf(),
            Source::Bzip2(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match &mut self.source {
            Source::Plain(r) => r.consume(amt),
            Source::Mapped(r) => r.consume(amt),
            Source::Gzip(r) => r.consume(amt),
            Source::Bzip2(r) => r.consume(amt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(bytes: &[u8]) -> io::Result<NamedTempFile> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(bytes)?;
        temp.flush()?;
        Ok(temp)
    }

    fn read_lines(reader: InputReader) -> io::Result<Vec<String>> {
        reader.lines().collect()
    }

    #[test]
    fn test_small_plain_file_is_streamed() -> io::Result<()> {
        let temp = temp_with(b"id\tchrom\tstart_pos\tend_pos\n")?;
        let reader = InputReader::open(temp.path())?;
        assert!(!reader.is_mapped());
        assert_eq!(reader.compression(), Compression::None);
        Ok(())
    }

    #[test]
    fn test_forced_mapping() -> io::Result<()> {
        let temp = temp_with(b"line1\nline2\n")?;
        let reader = InputReader::open_with(temp.path(), Mapping::Always)?;
        assert!(reader.is_mapped());
        assert_eq!(read_lines(reader)?, vec!["line1", "line2"]);
        Ok(())
    }

    #[test]
    fn test_gzip_by_magic() -> io::Result<()> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"## pairs format v1.0\nr1 chr1 1 chr1 9 + + 0 2\n")?;
        let temp = temp_with(&encoder.finish()?)?;

        let reader = InputReader::open(temp.path())?;
        assert_eq!(reader.compression(), Compression::Gzip);
        let lines = read_lines(reader)?;
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("r1"));
        Ok(())
    }

    #[test]
    fn test_bzip2_by_magic() -> io::Result<()> {
        let mut encoder =
            bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(b"1\t0.5\tchr1\n")?;
        let temp = temp_with(&encoder.finish()?)?;

        assert_eq!(Compression::detect(temp.path())?, Compression::Bzip2);
        let mut content = String::new();
        InputReader::open(temp.path())?.read_to_string(&mut content)?;
        assert_eq!(content, "1\t0.5\tchr1\n");
        Ok(())
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(Compression::from_extension(Path::new("a.pairs.gz")), Compression::Gzip);
        assert_eq!(Compression::from_extension(Path::new("a.txt.bz2")), Compression::Bzip2);
        assert_eq!(Compression::from_extension(Path::new("a.pairs")), Compression::None);
    }
}
