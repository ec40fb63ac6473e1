use super::element::{Element, UnknownElement};
use nalgebra::Point3;

/// An atom of a molecular geometry.
///
/// Only the information needed for a single-point quantum-chemistry calculation is
/// kept: the element and the Cartesian position in Angstroms.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The chemical element of the atom.
    pub element: Element,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` from an element symbol and a position.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownElement`] if `symbol` is not a supported element.
    pub fn new(symbol: &str, position: Point3<f64>) -> Result<Self, UnknownElement> {
        Ok(Self {
            element: symbol.parse()?,
            position,
        })
    }

    pub fn symbol(&self) -> &'static str {
        self.element.symbol()
    }
}
