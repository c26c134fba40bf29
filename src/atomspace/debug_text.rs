//! Debug / snapshot text format.
//!
//! ```text
//! (atom (id 3) (type ImplicationLink) (tv 0.9 0.8) (av 12.5 1 0))
//! (link (id 3) (type ImplicationLink) (outgoing (1 2)))
//! (atom (id 1) (type ConceptNode) (tv 1 0) (av 0 0 0))
//! (node (id 1) (name "cat"))
//! ```

use std::fmt::Write;

use super::atom::{Atom, AtomKind};
use super::store::AtomSpace;
use crate::AtomId;

/// Up to six decimals, trailing zeros dropped.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.6}", x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn write_atom(out: &mut String, atom: &Atom) {
    let tv = atom.truth_value();
    let av = atom.attention_value();
    let _ = writeln!(
        out,
        "(atom (id {}) (type {}) (tv {} {}) (av {} {} {}))",
        atom.id(),
        atom.atom_type(),
        format_number(tv.strength),
        format_number(tv.confidence),
        format_number(av.sti),
        format_number(av.lti),
        format_number(av.vlti),
    );
    match atom.kind() {
        AtomKind::Node { name, .. } => {
            let _ = writeln!(out, "(node (id {}) (name {:?}))", atom.id(), name);
        }
        AtomKind::Link { outgoing, .. } => {
            let ids: Vec<String> = outgoing.iter().map(|o| o.to_string()).collect();
            let _ = writeln!(
                out,
                "(link (id {}) (type {}) (outgoing ({})))",
                atom.id(),
                atom.atom_type(),
                ids.join(" ")
            );
        }
    }
}

impl AtomSpace {
    /// Text block for one atom, `None` for unknown ids.
    pub fn atom_debug_text(&self, id: AtomId) -> Option<String> {
        let atom = self.get(id)?;
        let mut out = String::new();
        write_atom(&mut out, atom);
        Some(out)
    }

    /// Every live atom, ascending id.
    pub fn to_debug_text(&self) -> String {
        let mut out = String::new();
        for atom in self.iter() {
            write_atom(&mut out, atom);
        }
        out
    }
}
