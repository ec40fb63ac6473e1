use crate::core::io::traits::GeometryFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::UnknownElement;
use crate::core::models::geometry::Geometry;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count (value: '{0}')")]
    InvalidCount(String),
    #[error("Invalid coordinate in field {field} (value: '{value}')")]
    InvalidFloat { field: usize, value: String },
    #[error("Atom record needs an element and three coordinates")]
    TooFewFields,
    #[error(transparent)]
    UnknownElement(#[from] UnknownElement),
}

/// The plain XYZ format: an atom count line, a comment line, then one
/// `symbol x y z` record per atom with coordinates in Angstroms.
///
/// Only the first frame of a multi-frame file is read.
pub struct XyzFile;

impl XyzFile {
    fn parse_atom(line: &str, line_num: usize) -> Result<Atom, XyzError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(XyzError::Parse {
                line: line_num,
                kind: XyzParseErrorKind::TooFewFields,
            });
        }

        let mut xyz = [0.0; 3];
        for (i, value) in fields[1..4].iter().enumerate() {
            xyz[i] = value.parse().map_err(|_| XyzError::Parse {
                line: line_num,
                kind: XyzParseErrorKind::InvalidFloat {
                    field: i + 2,
                    value: value.to_string(),
                },
            })?;
        }

        Atom::new(fields[0], Point3::new(xyz[0], xyz[1], xyz[2])).map_err(|e| XyzError::Parse {
            line: line_num,
            kind: e.into(),
        })
    }
}

impl GeometryFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Geometry, Self::Error> {
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));

        let (count_line_num, count_line) = loop {
            match lines.next() {
                Some((n, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break (n, line);
                    }
                }
                None => return Err(XyzError::MissingRecord("atom count".into())),
            }
        };
        let count_str = count_line.trim();
        let expected: usize = count_str.parse().map_err(|_| XyzError::Parse {
            line: count_line_num,
            kind: XyzParseErrorKind::InvalidCount(count_str.into()),
        })?;

        let comment = match lines.next() {
            Some((_, line)) => line?,
            None => return Err(XyzError::MissingRecord("comment line".into())),
        };
        let mut geometry = Geometry::new(comment.trim());

        while geometry.len() < expected {
            match lines.next() {
                Some((n, line)) => {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    geometry.push(Self::parse_atom(&line, n)?);
                }
                None => break,
            }
        }

        if geometry.len() != expected {
            return Err(XyzError::Inconsistency(format!(
                "Declared {} atoms but found {}",
                expected,
                geometry.len()
            )));
        }
        if geometry.is_empty() {
            return Err(XyzError::Inconsistency("Geometry contains no atoms".into()));
        }

        Ok(geometry)
    }

    fn write_to(geometry: &Geometry, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "{}", geometry.len())?;
        writeln!(writer, "{}", geometry.comment.replace('\n', " "))?;
        for atom in geometry.atoms() {
            writeln!(
                writer,
                "{:<2} {:>16.10} {:>16.10} {:>16.10}",
                atom.symbol(),
                atom.position.x,
                atom.position.y,
                atom.position.z
            )?;
        }
        Ok(())
    }
}
