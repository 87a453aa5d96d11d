//! Hierarchical ray traversal over the height-field pyramid.
//!
//! Explicit stack-based descent (no recursion): each node is a
//! (level, cell) pair whose world footprint is clipped against the
//! ray; a 1D vertical slab test against the node's [min, max]
//! elevation interval prunes whole subtrees. Children are pushed
//! far-to-near so the nearest candidate is explored first, which
//! makes the first accepted finest-level hit the globally nearest —
//! required for correctness since traversal returns on first hit.

use relief_core::{Intersection, Ray};

use crate::height_field::HeightField;
use crate::patch::BilinearPatch;

/// A pyramid cell pending traversal.
#[derive(Debug, Clone, Copy)]
struct Node {
    level: usize,
    col: usize,
    row: usize,
}

/// Parametric interval where the ray overlaps `[lo, hi]` on one axis.
fn axis_interval(origin: f64, dir: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if dir == 0.0 {
        if origin < lo || origin > hi {
            return None;
        }
        return Some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let t0 = (lo - origin) / dir;
    let t1 = (hi - origin) / dir;
    Some(if t0 <= t1 { (t0, t1) } else { (t1, t0) })
}

/// Ray height at parameter `t`, tolerating infinite `t` for
/// horizontal rays.
fn height_at(ray: &Ray, t: f64) -> f64 {
    if ray.direction.z == 0.0 {
        ray.origin.z
    } else {
        ray.origin.z + ray.direction.z * t
    }
}

/// Parametric sub-interval of the ray overlapping the horizontal
/// footprint of a (level, cell) node, clipped to the ray's own
/// interval. None when the footprint is missed entirely or the node
/// is pure pyramid padding (empty footprint).
fn footprint_interval(
    field: &HeightField,
    ray: &Ray,
    level: usize,
    col: usize,
    row: usize,
) -> Option<(f64, f64)> {
    let span = 1usize << level;
    let cs = field.cell_size();
    let origin = field.origin();

    let c1 = ((col + 1) * span).min(field.cells_x());
    let r1 = ((row + 1) * span).min(field.cells_y());
    let x0 = origin.x + (col * span) as f64 * cs;
    let x1 = origin.x + c1 as f64 * cs;
    let y0 = origin.y + (row * span) as f64 * cs;
    let y1 = origin.y + r1 as f64 * cs;
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let (ax0, ax1) = axis_interval(ray.origin.x, ray.direction.x, x0, x1)?;
    let (ay0, ay1) = axis_interval(ray.origin.y, ray.direction.y, y0, y1)?;
    let t0 = ax0.max(ay0).max(ray.t_min);
    let t1 = ax1.min(ay1).min(ray.t_max);
    if t0 > t1 {
        return None;
    }
    Some((t0, t1))
}

/// Closest intersection of a ray with the terrain surface, or None
/// if the ray exits the grid's horizontal or vertical bounds without
/// a valid hit.
pub fn intersect_terrain(
    field: &HeightField,
    ray: &Ray,
    planar_tolerance: f64,
) -> Option<Intersection> {
    let top = field.num_levels() - 1;
    let mut stack: Vec<Node> = Vec::with_capacity(4 * field.num_levels());
    stack.push(Node {
        level: top,
        col: 0,
        row: 0,
    });

    while let Some(node) = stack.pop() {
        let Some((t0, t1)) = footprint_interval(field, ray, node.level, node.col, node.row) else {
            continue;
        };

        // Vertical slab test: can the ray's height span over this
        // footprint possibly reach the node's elevation interval?
        let (lo, hi) = field.range(node.level, node.col, node.row);
        let z_enter = height_at(ray, t0);
        let z_exit = height_at(ray, t1);
        if z_enter.min(z_exit) > hi || z_enter.max(z_exit) < lo {
            continue;
        }

        if node.level == 0 {
            // Padding cells beyond the real grid never become
            // intersection candidates.
            if node.col >= field.cells_x() || node.row >= field.cells_y() {
                continue;
            }
            let (x0, y0) = field.raster_to_world(node.col as f64, node.row as f64);
            let (z00, z10, z01, z11) = field.cell_corners(node.col, node.row);
            let patch = BilinearPatch::from_cell(x0, y0, field.cell_size(), z00, z10, z01, z11);
            if let Some(mut hit) = patch.intersect(ray, planar_tolerance) {
                hit.cell = (node.col, node.row);
                return Some(hit);
            }
            continue;
        }

        // Collect surviving children with their entry distances and
        // push them far-to-near.
        let child_level = node.level - 1;
        let (ccx, ccy) = field.level_cells(child_level);
        let mut kids = [(0.0_f64, 0_usize, 0_usize); 4];
        let mut n = 0;
        for (dc, dr) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let c = node.col * 2 + dc;
            let r = node.row * 2 + dr;
            if c >= ccx || r >= ccy {
                continue;
            }
            if let Some((tc, _)) = footprint_interval(field, ray, child_level, c, r) {
                kids[n] = (tc, c, r);
                n += 1;
            }
        }
        kids[..n].sort_by(|a, b| b.0.total_cmp(&a.0));
        for &(_, c, r) in &kids[..n] {
            stack.push(Node {
                level: child_level,
                col: c,
                row: r,
            });
        }
    }

    None
}
