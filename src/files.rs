//! Element and vertex files.
//!
//! Both are plain text files.  The first line holds the number of entries,
//! then each line holds one entry.  An element file lists three vertex ids per
//! line; the element on the `n`-th entry line gets id `n` (starting at zero):
//!
//! ```text,ignore
//! 2
//! 0   1   2
//! 1   2   3
//! ```
//!
//! A vertex file lists the `x` and `y` coordinates of a vertex per line, the
//! vertex on the `n`-th entry line gets id `n`:
//!
//! ```text,ignore
//! 3
//! 0       0
//! 0.5     0.5
//! 1.0     2.0
//! ```
//!
//! Entries are separated by any whitespace.  Blank lines are ignored.

use crate::Element;
use crate::Node;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::num;
use std::path::Path;

#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    Io(io::Error),
    /// The file does not even hold the entry count.
    MissingHeader,
    BadInteger(num::ParseIntError),
    BadFloat(num::ParseFloatError),
    /// An entry line does not have the expected number of tokens.
    BadArity { expected: usize, found: usize },
    /// The declared entry count differs from the number of entries read.
    CountMismatch { declared: usize, found: usize },
    /// The entries could not make a valid element or domain.
    Domain(crate::Error),
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    lineno: usize,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The line the error occurred at, zero when it is not tied to a line.
    pub fn lineno(&self) -> usize {
        self.lineno
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io(err) => write!(f, "io error: {}", err),
            ErrorKind::MissingHeader => write!(f, "missing entry count"),
            ErrorKind::BadInteger(err) => write!(f, "when parsing integer: {}", err),
            ErrorKind::BadFloat(err) => write!(f, "when parsing float: {}", err),
            ErrorKind::BadArity { expected, found } => {
                write!(f, "expected {} values, found {}", expected, found)
            }
            ErrorKind::CountMismatch { declared, found } => write!(
                f,
                "specified number of entries {} does not match number of read entries {}",
                declared, found,
            ),
            ErrorKind::Domain(err) => write!(f, "{}", err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lineno == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "at line {}: {}", self.lineno, self.kind)
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::BadInteger(err) => Some(err),
            ErrorKind::BadFloat(err) => Some(err),
            ErrorKind::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, lineno: 0 }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        ErrorKind::Io(err).into()
    }
}

impl From<num::ParseIntError> for Error {
    fn from(err: num::ParseIntError) -> Error {
        ErrorKind::BadInteger(err).into()
    }
}

impl From<num::ParseFloatError> for Error {
    fn from(err: num::ParseFloatError) -> Error {
        ErrorKind::BadFloat(err).into()
    }
}

impl From<crate::Error> for Error {
    fn from(err: crate::Error) -> Error {
        ErrorKind::Domain(err).into()
    }
}

fn with_lineno<E>(lineno: usize) -> impl Fn(E) -> Error
where
    E: Into<Error>,
{
    move |err: E| {
        let mut err = err.into();
        err.lineno = lineno;
        err
    }
}

/// Reads the entry count, then calls `parse_entry` on each entry line with
/// the entry's index and its tokens.
fn parse_entries<R, T, F>(input: R, mut parse_entry: F) -> Result<Vec<T>, Error>
where
    R: io::BufRead,
    F: FnMut(usize, &[&str]) -> Result<T, Error>,
{
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| line.as_ref().map_or(true, |line| !line.trim().is_empty()));

    let declared = match lines.next() {
        Some((lineno, line)) => {
            let line = line.map_err(with_lineno(lineno))?;
            line.trim().parse::<usize>().map_err(with_lineno(lineno))?
        }
        None => return Err(ErrorKind::MissingHeader.into()),
    };

    let mut entries = Vec::with_capacity(declared);
    for (lineno, line) in lines {
        let line = line.map_err(with_lineno(lineno))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let entry = parse_entry(entries.len(), &tokens).map_err(with_lineno(lineno))?;
        entries.push(entry);
    }

    if entries.len() != declared {
        return Err(ErrorKind::CountMismatch {
            declared,
            found: entries.len(),
        }
        .into());
    }
    Ok(entries)
}

fn check_arity(tokens: &[&str], expected: usize) -> Result<(), Error> {
    if tokens.len() != expected {
        return Err(ErrorKind::BadArity {
            expected,
            found: tokens.len(),
        }
        .into());
    }
    Ok(())
}

/// Reads elements from an element file's content.
///
/// Wrapping `r` in a [`std::io::BufReader`] is recommended.
pub fn read_elements<R: io::BufRead>(r: R) -> Result<Vec<Element>, Error> {
    parse_entries(r, |id, tokens| {
        check_arity(tokens, 3)?;
        let vertices = tokens
            .iter()
            .map(|token| token.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Element::new(id, &vertices)?)
    })
}

/// Reads vertex coordinates from a vertex file's content.
///
/// Wrapping `r` in a [`std::io::BufReader`] is recommended.
pub fn read_vertices<R: io::BufRead>(r: R) -> Result<Vec<Node>, Error> {
    parse_entries(r, |_, tokens| {
        check_arity(tokens, 2)?;
        let x = tokens[0].parse::<f64>()?;
        let y = tokens[1].parse::<f64>()?;
        Ok(Node::new(x, y))
    })
}

pub fn read_element_file(path: impl AsRef<Path>) -> Result<Vec<Element>, Error> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let elements = read_elements(io::BufReader::new(file))?;
    tracing::info!("Read {} elements from {}", elements.len(), path.display());
    Ok(elements)
}

pub fn read_vertex_file(path: impl AsRef<Path>) -> Result<Vec<Node>, Error> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let nodes = read_vertices(io::BufReader::new(file))?;
    tracing::info!("Read {} vertices from {}", nodes.len(), path.display());
    Ok(nodes)
}

/// Writes elements in the element file format.
///
/// Elements are written in the given order, ids are not checked.  Wrapping
/// `w` in a [`std::io::BufWriter`] is recommended.
pub fn write_elements<W: io::Write>(mut w: W, elements: &[Element]) -> io::Result<()> {
    writeln!(w, "{}", elements.len())?;
    for element in elements {
        let [a, b, c] = element.vertices();
        writeln!(w, "{a}\t{b}\t{c}")?;
    }
    w.flush()
}

/// Writes vertex coordinates in the vertex file format.
///
/// Wrapping `w` in a [`std::io::BufWriter`] is recommended.
pub fn write_vertices<W: io::Write>(mut w: W, nodes: &[Node]) -> io::Result<()> {
    writeln!(w, "{}", nodes.len())?;
    for node in nodes {
        writeln!(w, "{}\t{}", node.x, node.y)?;
    }
    w.flush()
}
