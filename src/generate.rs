//! Structured domain generators.

use crate::Element;
use crate::Node;
use std::num::NonZeroUsize;

/// Elements and vertices of the unit square split into `columns × rows`
/// cells, each cell being cut into two triangles along its anti-diagonal.
///
/// Vertex `(i, j)` (column `i`, row `j`) lies at `(i / columns, j / rows)` and
/// has id `j * (columns + 1) + i`.  Cells are numbered row after row; cell `c`
/// gives element `2c`, its lower-left triangle, and element `2c + 1`, its
/// upper-right triangle.
///
/// ```text,ignore
///  6───7───8
///  │╲ 5│╲ 7│
///  │ ╲ │ ╲ │
///  │4 ╲│6 ╲│
///  3───4───5
///  │╲ 1│╲ 3│
///  │ ╲ │ ╲ │
///  │0 ╲│2 ╲│
///  0───1───2
/// ```
pub fn rectangle(columns: NonZeroUsize, rows: NonZeroUsize) -> (Vec<Element>, Vec<Node>) {
    let columns = usize::from(columns);
    let rows = usize::from(rows);
    let vertex_id = |i: usize, j: usize| j * (columns + 1) + i;

    let nodes = (0..=rows)
        .flat_map(|j| {
            (0..=columns).map(move |i| Node::new(i as f64 / columns as f64, j as f64 / rows as f64))
        })
        .collect();

    let elements = (0..rows)
        .flat_map(|j| (0..columns).map(move |i| (i, j)))
        .enumerate()
        .flat_map(|(cell, (i, j))| {
            let v00 = vertex_id(i, j);
            let v10 = vertex_id(i + 1, j);
            let v01 = vertex_id(i, j + 1);
            let v11 = vertex_id(i + 1, j + 1);
            [
                Element::triangle(2 * cell, [v00, v10, v01]),
                Element::triangle(2 * cell + 1, [v10, v01, v11]),
            ]
        })
        .collect();

    (elements, nodes)
}
