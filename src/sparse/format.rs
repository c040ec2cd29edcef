//! On-disk formats of [`SparseMatrix`].
//!
//! Two formats are supported:
//!
//! - ASCII: the dense matrix, one line per row, entries separated by tabs,
//! - binary: the JSON object `{"values", "column_indices", "row_pointers",
//!   "columns"}` compressed with gzip.  Non-finite values are written as the
//!   strings `"Infinity"`, `"-Infinity"` and `"NaN"`.
//!
//! Readers detect the format from the gzip magic number.

use super::SparseMatrix;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fmt;
use std::fs;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::num::ParseFloatError;
use std::path::Path;
use std::str;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug)]
#[non_exhaustive]
pub enum FormatError {
    Io(io::Error),

    /// The decompressed payload is not a valid CRS object.
    Json(serde_json::Error),

    /// The ASCII payload is not valid UTF-8.
    Utf8(str::Utf8Error),

    /// An ASCII entry is not a float.
    BadFloat { lineno: usize, err: ParseFloatError },

    /// The ASCII rows don't have the same number of entries.
    Shape { lineno: usize, err: crate::Error },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Io(err) => write!(f, "io error: {err}"),
            FormatError::Json(err) => write!(f, "invalid binary matrix: {err}"),
            FormatError::Utf8(err) => write!(f, "invalid ASCII matrix: {err}"),
            FormatError::BadFloat { lineno, err } => {
                write!(f, "at line {lineno}: expected a float: {err}")
            }
            FormatError::Shape { lineno, err } => write!(f, "at line {lineno}: {err}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Io(err) => Some(err),
            FormatError::Json(err) => Some(err),
            FormatError::Utf8(err) => Some(err),
            FormatError::BadFloat { err, .. } => Some(err),
            FormatError::Shape { err, .. } => Some(err),
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl SparseMatrix {
    /// Writes the dense form of the matrix, one tab-separated line per row.
    ///
    /// Every row ends with a newline, so rows of matrices without columns are
    /// kept.
    pub fn write_ascii<W: Write>(&self, mut w: W) -> io::Result<()> {
        for row in self.to_dense() {
            for (j, value) in row.into_iter().enumerate() {
                if j != 0 {
                    write!(w, "\t")?;
                }
                write!(w, "{value:?}")?;
            }
            writeln!(w)?;
        }
        w.flush()
    }

    /// Writes the gzip-compressed JSON encoding of the CRS arrays.
    pub fn write_binary<W: Write>(&self, w: W) -> Result<(), FormatError> {
        let mut encoder = GzEncoder::new(w, Compression::default());
        serde_json::to_writer(&mut encoder, self)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Reads a matrix in either format.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self, FormatError> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        if bytes.starts_with(&GZIP_MAGIC) {
            let matrix = serde_json::from_reader(GzDecoder::new(&bytes[..]))?;
            return Ok(matrix);
        }
        tracing::debug!("payload is not gzip-compressed, reading it as ASCII");
        let text = str::from_utf8(&bytes).map_err(FormatError::Utf8)?;
        parse_ascii(text)
    }

    /// Saves the matrix to `path`, in the binary format if `binary` is true
    /// and in the ASCII format otherwise.
    pub fn save(&self, path: impl AsRef<Path>, binary: bool) -> Result<(), FormatError> {
        let path = path.as_ref();
        let _span = tracing::info_span!("save matrix", path = %path.display(), binary).entered();

        let file = BufWriter::new(fs::File::create(path)?);
        if binary {
            self.write_binary(file)
        } else {
            self.write_ascii(file)?;
            Ok(())
        }
    }

    /// Reads a matrix saved by [`SparseMatrix::save`], in either format.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let _span = tracing::info_span!("read matrix", path = %path.display()).entered();

        let matrix = Self::read_from(fs::File::open(path)?)?;
        tracing::info!(
            rows = matrix.rows(),
            columns = matrix.columns(),
            nnz = matrix.nnz(),
            "matrix read",
        );
        Ok(matrix)
    }
}

/// Serde adapter for `values`: JSON has no literal for infinities and NaN.
pub(super) mod json_floats {
    use serde::de::Error as _;
    use serde::ser::SerializeSeq as _;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum JsonFloat {
        Number(f64),
        Name(String),
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            if value.is_finite() {
                seq.serialize_element(value)?;
            } else if value.is_nan() {
                seq.serialize_element("NaN")?;
            } else if value.is_sign_positive() {
                seq.serialize_element("Infinity")?;
            } else {
                seq.serialize_element("-Infinity")?;
            }
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<JsonFloat>::deserialize(deserializer)?
            .into_iter()
            .map(|value| match value {
                JsonFloat::Number(value) => Ok(value),
                JsonFloat::Name(name) => match name.as_str() {
                    "Infinity" => Ok(f64::INFINITY),
                    "-Infinity" => Ok(f64::NEG_INFINITY),
                    "NaN" => Ok(f64::NAN),
                    _ => Err(D::Error::custom(format!("invalid float {name:?}"))),
                },
            })
            .collect()
    }
}

fn parse_ascii(text: &str) -> Result<SparseMatrix, FormatError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let lineno = i + 1;
        let row = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|err| FormatError::BadFloat { lineno, err })?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(FormatError::Shape {
                    lineno,
                    err: crate::Error::InputLenMismatch {
                        expected: first.len(),
                        actual: row.len(),
                    },
                });
            }
        }
        rows.push(row);
    }
    SparseMatrix::from_dense(&rows).map_err(|err| FormatError::Shape { lineno: 0, err })
}
