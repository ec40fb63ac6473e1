use crate::core::models::geometry::Geometry;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing molecular geometry file formats.
///
/// Implementors handle format-specific parsing and serialization; the provided
/// methods add path-based convenience on top of them.
pub trait GeometryFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a molecular geometry from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Geometry, Self::Error>;

    /// Writes a molecular geometry to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(geometry: &Geometry, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a molecular geometry from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Geometry, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a molecular geometry to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(geometry: &Geometry, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(geometry, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
