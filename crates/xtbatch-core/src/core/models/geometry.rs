use super::atom::Atom;
use super::element::Element;
use nalgebra::Point3;

/// The geometry of a single molecule: an ordered list of atoms plus the free-text
/// comment line carried by the file it was read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub comment: String,
    atoms: Vec<Atom>,
}

impl Geometry {
    pub fn new(comment: &str) -> Self {
        Self {
            comment: comment.to_string(),
            atoms: Vec::new(),
        }
    }

    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// The element of every atom, in file order.
    pub fn elements(&self) -> Vec<Element> {
        self.atoms.iter().map(|a| a.element).collect()
    }

    /// The position of every atom, in file order.
    pub fn coordinates(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// Sum of the atomic numbers, i.e. the electron count of the neutral molecule.
    pub fn nuclear_charge(&self) -> u32 {
        self.atoms
            .iter()
            .map(|a| a.element.atomic_number() as u32)
            .sum()
    }
}

impl FromIterator<Atom> for Geometry {
    fn from_iter<T: IntoIterator<Item = Atom>>(iter: T) -> Self {
        Self {
            comment: String::new(),
            atoms: iter.into_iter().collect(),
        }
    }
}
