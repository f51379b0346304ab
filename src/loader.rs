//! Registry loader: raw bytes to ordered, string-keyed rows.
//!
//! Owns everything that touches the outside world (files, gzip, text
//! encodings, CSV). Nothing past this module performs I/O.

use csv::ReaderBuilder;
use encoding_rs::EUC_KR;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xxhash_rust::xxh64::xxh64;

use crate::error::LoadError;
use crate::models::RawRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Rows of one distinct input together with the hash of its raw bytes
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub content_hash: u64,
    pub rows: Vec<RawRow>,
}

impl Snapshot {
    /// Decode and parse an in-memory export
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let text = decode_bytes(bytes)?;
        let rows = parse_rows(&text)?;
        Ok(Self {
            content_hash: content_hash(bytes),
            rows,
        })
    }
}

/// A source of registry rows. Hosts may supply their own.
pub trait RowSource {
    /// Read, decode and parse the whole source
    fn snapshot(&self) -> Result<Snapshot, LoadError>;

    fn load(&self) -> Result<Vec<RawRow>, LoadError> {
        Ok(self.snapshot()?.rows)
    }
}

#[derive(Debug, Clone)]
enum Origin {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// CSV export, read from a file (optionally gzipped) or from memory
#[derive(Debug, Clone)]
pub struct CsvSource {
    origin: Origin,
}

impl CsvSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            origin: Origin::Path(path.as_ref().to_path_buf()),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: Origin::Bytes(bytes.into()),
        }
    }

    /// Raw bytes of the export, gunzipped if the file name ends in `.gz`
    pub fn read_bytes(&self) -> Result<Vec<u8>, LoadError> {
        match &self.origin {
            Origin::Bytes(bytes) => Ok(bytes.clone()),
            Origin::Path(path) => {
                info!("Loading registry from {}", path.display());
                let file = File::open(path)?;
                let mut reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
                    Box::new(GzDecoder::new(BufReader::new(file)))
                } else {
                    Box::new(BufReader::new(file))
                };
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

impl RowSource for CsvSource {
    fn snapshot(&self) -> Result<Snapshot, LoadError> {
        let bytes = self.read_bytes()?;
        let snapshot = Snapshot::from_bytes(&bytes)?;
        info!(
            "Loaded {} rows ({} bytes, hash {:016x})",
            snapshot.rows.len(),
            bytes.len(),
            snapshot.content_hash
        );
        Ok(snapshot)
    }
}

/// Stable identity of an input snapshot
pub fn content_hash(bytes: &[u8]) -> u64 {
    xxh64(bytes, 0)
}

/// UTF-8 (BOM optional) first, then EUC-KR, the encoding older exports use.
pub fn decode_bytes(bytes: &[u8]) -> Result<String, LoadError> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(body) {
        return Ok(text.to_string());
    }

    debug!("Input is not UTF-8, decoding as EUC-KR");
    let (text, had_errors) = EUC_KR.decode_without_bom_handling(body);
    if had_errors {
        return Err(LoadError::Decode);
    }
    Ok(text.into_owned())
}

/// Parse CSV text with a header row. Headers are kept verbatim.
pub fn parse_rows(text: &str) -> Result<Vec<RawRow>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let mut row = RawRow::new(index);
        for (key, value) in headers.iter().zip(record.iter()) {
            row.push(key, value);
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const SAMPLE: &str = "name , addr,x,y\nA,Seoul Gangnam,1,2\nB,Busan\n";

    #[test]
    fn test_headers_kept_verbatim() {
        let rows = parse_rows(SAMPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name "), Some("A"));
        assert_eq!(rows[0].get(" addr"), Some("Seoul Gangnam"));
        assert_eq!(rows[0].get("name"), None);
    }

    #[test]
    fn test_short_rows_have_absent_fields() {
        let rows = parse_rows(SAMPLE).unwrap();
        assert_eq!(rows[1].index, 1);
        assert_eq!(rows[1].get(" addr"), Some("Busan"));
        assert_eq!(rows[1].get("x"), None);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert!(matches!(parse_rows(""), Err(LoadError::MissingHeader)));
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("사업장명\n".as_bytes());
        assert_eq!(decode_bytes(&bytes).unwrap(), "사업장명\n");
    }

    #[test]
    fn test_decode_euc_kr() {
        let (encoded, _, _) = EUC_KR.encode("서울특별시 강남구");
        assert!(std::str::from_utf8(&encoded).is_err());
        assert_eq!(decode_bytes(&encoded).unwrap(), "서울특별시 강남구");
    }

    #[test]
    fn test_undecodable_bytes_are_fatal() {
        // 0xFF is not a lead byte in either encoding
        assert!(matches!(
            decode_bytes(&[0xFF, 0xFF, 0x41]),
            Err(LoadError::Decode)
        ));
    }

    #[test]
    fn test_snapshot_hash_follows_content() {
        let a = Snapshot::from_bytes(SAMPLE.as_bytes()).unwrap();
        let b = Snapshot::from_bytes(SAMPLE.as_bytes()).unwrap();
        let c = Snapshot::from_bytes(b"name\nZ\n").unwrap();
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
    }

    #[test]
    fn test_reads_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("registry.csv");
        std::fs::write(&plain, SAMPLE).unwrap();

        let gz = dir.path().join("registry.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let a = CsvSource::from_path(&plain).snapshot().unwrap();
        let b = CsvSource::from_path(&gz).snapshot().unwrap();
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvSource::from_path("/nonexistent/registry.csv")
            .load()
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
