//! Record sources for the import side
//!
//! A source is a pull-based, single-pass sequence of [`Record`]s. Nothing is
//! read ahead beyond the current line, so memory stays bounded no matter how
//! large the input is.
//!
//! Item-level problems (a line that does not decode) come out as
//! [`RecordContent::Undecodable`](crate::domain::RecordContent::Undecodable)
//! records. An `Err` item means the input itself could not be read and ends
//! the run.

pub mod delimited;
pub mod lines;

pub use delimited::CsvSource;
pub use lines::LineSource;

use crate::core::encoding::FileEncoding;
use crate::domain::{FerryError, Record, Result};
use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use xz2::read::XzDecoder;

/// A lazy sequence of input records
pub trait RecordSource: Iterator<Item = Result<Record>> + Send {
    /// Number of blank lines skipped so far
    fn skipped(&self) -> u64;
}

const SUPPORTED_EXTENSIONS: &str = ".json, .jsonl, .ndjson, .gz, .bz2, .xz, .zip, .csv";

/// Input file format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One JSON document or bulk line per line (`.json`, `.jsonl`, `.ndjson`)
    JsonLines,

    /// Gzip-compressed JSON lines (`.gz`)
    GzipJsonLines,

    /// Bzip2-compressed JSON lines (`.bz2`)
    Bzip2JsonLines,

    /// XZ-compressed JSON lines (`.xz`)
    XzJsonLines,

    /// JSON lines in the first file of a zip archive (`.zip`)
    ZipJsonLines,

    /// Header row plus data rows (`.csv`)
    Csv,
}

impl InputFormat {
    /// Detect the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns a configuration error for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") | Some("jsonl") | Some("ndjson") => Ok(InputFormat::JsonLines),
            Some("gz") => Ok(InputFormat::GzipJsonLines),
            Some("bz2") => Ok(InputFormat::Bzip2JsonLines),
            Some("xz") => Ok(InputFormat::XzJsonLines),
            Some("zip") => Ok(InputFormat::ZipJsonLines),
            Some("csv") => Ok(InputFormat::Csv),
            _ => Err(FerryError::Configuration(format!(
                "Unsupported file type '{}'. Supported: {}",
                path.display(),
                SUPPORTED_EXTENSIONS
            ))),
        }
    }

    /// Whether records of this format are structured rows
    pub fn is_structured(&self) -> bool {
        matches!(self, InputFormat::Csv)
    }
}

/// Open `path` as a record source
///
/// # Errors
///
/// Returns [`FerryError::Input`] if the file cannot be opened.
pub fn open(
    path: &Path,
    format: InputFormat,
    encoding: FileEncoding,
) -> Result<Box<dyn RecordSource>> {
    let file = File::open(path).map_err(|e| {
        FerryError::Input(format!("Cannot open input file {}: {}", path.display(), e))
    })?;

    tracing::debug!(
        path = %path.display(),
        format = ?format,
        encoding = encoding.name(),
        "Opened input file"
    );

    let source: Box<dyn RecordSource> = match format {
        InputFormat::JsonLines => Box::new(LineSource::new(BufReader::new(file), encoding)),
        InputFormat::GzipJsonLines => Box::new(LineSource::new(
            BufReader::new(MultiGzDecoder::new(file)),
            encoding,
        )),
        InputFormat::Bzip2JsonLines => Box::new(LineSource::new(
            BufReader::new(MultiBzDecoder::new(file)),
            encoding,
        )),
        InputFormat::XzJsonLines => Box::new(LineSource::new(
            BufReader::new(XzDecoder::new_multi_decoder(file)),
            encoding,
        )),
        InputFormat::ZipJsonLines => Box::new(LineSource::new(
            Cursor::new(first_zip_entry(file, path)?),
            encoding,
        )),
        InputFormat::Csv => Box::new(CsvSource::new(file, encoding)),
    };

    Ok(source)
}

/// Contents of the first regular file in a zip archive
///
/// An archive entry cannot outlive the borrow of its archive, so the entry is
/// inflated into memory.
fn first_zip_entry(file: File, path: &Path) -> Result<Vec<u8>> {
    let archive_error = |e: zip::result::ZipError| {
        FerryError::Input(format!("Cannot read zip archive {}: {}", path.display(), e))
    };

    let mut archive = zip::ZipArchive::new(file).map_err(archive_error)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(archive_error)?;
        if !entry.is_file() {
            continue;
        }

        tracing::debug!(entry = entry.name(), size = entry.size(), "Reading zip entry");
        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents).map_err(|e| {
            FerryError::Input(format!(
                "Cannot inflate {} in {}: {}",
                entry.name(),
                path.display(),
                e
            ))
        })?;
        return Ok(contents);
    }

    Err(FerryError::Input(format!(
        "Zip archive {} contains no files",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_case::test_case;

    #[test_case("data.json", InputFormat::JsonLines ; "json")]
    #[test_case("data.JSONL", InputFormat::JsonLines ; "jsonl uppercase")]
    #[test_case("data.ndjson", InputFormat::JsonLines ; "ndjson")]
    #[test_case("dump.jsonl.gz", InputFormat::GzipJsonLines ; "gzip")]
    #[test_case("dump.jsonl.bz2", InputFormat::Bzip2JsonLines ; "bzip2")]
    #[test_case("dump.jsonl.XZ", InputFormat::XzJsonLines ; "xz uppercase")]
    #[test_case("dump.zip", InputFormat::ZipJsonLines ; "zip")]
    #[test_case("people.csv", InputFormat::Csv ; "csv")]
    fn test_format_from_path(path: &str, expected: InputFormat) {
        assert_eq!(InputFormat::from_path(&PathBuf::from(path)).unwrap(), expected);
    }

    #[test_case("archive.tar" ; "tar")]
    #[test_case("data.txt" ; "txt")]
    #[test_case("-" ; "dash")]
    fn test_unsupported_format(path: &str) {
        assert!(matches!(
            InputFormat::from_path(&PathBuf::from(path)),
            Err(FerryError::Configuration(_))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let result = open(
            Path::new("/nonexistent/input.jsonl"),
            InputFormat::JsonLines,
            FileEncoding::utf8(),
        );
        assert!(matches!(result, Err(FerryError::Input(_))));
    }

    #[test]
    fn test_open_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        encoder.finish().unwrap();

        let mut source = open(&path, InputFormat::GzipJsonLines, FileEncoding::utf8()).unwrap();
        let records: Vec<Record> = source.by_ref().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ordinal, 3);
        assert_eq!(records[1].as_text(), Some("{\"a\":2}"));
        assert_eq!(source.skipped(), 1);
    }

    fn assert_two_documents(path: &Path, format: InputFormat) {
        let mut source = open(path, format, FileEncoding::utf8()).unwrap();
        let records: Vec<Record> = source.by_ref().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].ordinal, 3);
        assert_eq!(records[1].as_text(), Some("{\"a\":2}"));
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn test_open_bzip2() {
        use bzip2::write::BzEncoder;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl.bz2");
        let mut encoder =
            BzEncoder::new(File::create(&path).unwrap(), bzip2::Compression::default());
        encoder.write_all(b"{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        encoder.finish().unwrap();

        assert_two_documents(&path, InputFormat::Bzip2JsonLines);
    }

    #[test]
    fn test_open_xz() {
        use std::io::Write;
        use xz2::write::XzEncoder;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.jsonl.xz");
        let mut encoder = XzEncoder::new(File::create(&path).unwrap(), 6);
        encoder.write_all(b"{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        encoder.finish().unwrap();

        assert_two_documents(&path, InputFormat::XzJsonLines);
    }

    #[test]
    fn test_open_zip_reads_first_file() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.zip");
        let mut archive = zip::ZipWriter::new(File::create(&path).unwrap());
        archive.add_directory("nested/", SimpleFileOptions::default()).unwrap();
        archive.start_file("docs.jsonl", SimpleFileOptions::default()).unwrap();
        archive.write_all(b"{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        archive.start_file("other.jsonl", SimpleFileOptions::default()).unwrap();
        archive.write_all(b"{\"b\":1}\n").unwrap();
        archive.finish().unwrap();

        assert_two_documents(&path, InputFormat::ZipJsonLines);
    }

    #[test]
    fn test_open_zip_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        zip::ZipWriter::new(File::create(&path).unwrap()).finish().unwrap();

        let result = open(&path, InputFormat::ZipJsonLines, FileEncoding::utf8());
        assert!(matches!(result, Err(FerryError::Input(_))));
    }

    #[test]
    fn test_open_corrupt_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"not a zip archive").unwrap();

        let result = open(&path, InputFormat::ZipJsonLines, FileEncoding::utf8());
        assert!(matches!(result, Err(FerryError::Input(_))));
    }
}
