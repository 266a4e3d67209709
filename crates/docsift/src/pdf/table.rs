//! PDF table detection from ruling lines.
//!
//! Tables are found lattice-style: the horizontal and vertical lines drawn on a
//! page are snapped and joined into edges, edge crossings become intersection
//! points, and every smallest rectangle whose four sides lie on edges becomes a
//! cell. Cells that share corners form a table. Text is placed into cells by
//! the position of each span's first glyph.
//!
//! All geometry here is top-down: `top` grows towards the bottom of the page.

use super::content::{Orientation, PageLayout, Segment, TextSpan, interpret_page};
use super::document::load_document;
use super::error::{PdfError, Result};
use crate::core::config::TableConfig;
use crate::extraction::table::{RawGrid, prune_blank};
use crate::types::ExtractedTable;
use std::collections::{BTreeMap, BTreeSet};

/// Fixed-point key for comparing snapped coordinates.
type Key = i64;

fn key(value: f32) -> Key {
    (value * 1000.0).round() as Key
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    orientation: Orientation,
    /// y (top-down) for horizontal edges, x for vertical edges.
    position: f32,
    start: f32,
    end: f32,
}

impl Edge {
    fn from_segment(segment: &Segment) -> Self {
        match segment.orientation {
            Orientation::Horizontal => Edge {
                orientation: Orientation::Horizontal,
                position: -segment.position,
                start: segment.start,
                end: segment.end,
            },
            Orientation::Vertical => Edge {
                orientation: Orientation::Vertical,
                position: segment.position,
                start: -segment.end,
                end: -segment.start,
            },
        }
    }
}

/// A detected cell, top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

fn snap_edges(edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    let mut snapped = Vec::with_capacity(edges.len());
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        let mut group: Vec<Edge> = edges.iter().copied().filter(|e| e.orientation == orientation).collect();
        group.sort_by(|a, b| a.position.total_cmp(&b.position));

        let mut cluster: Vec<Edge> = Vec::new();
        for edge in group {
            if let Some(last) = cluster.last()
                && edge.position - last.position > tolerance
            {
                flush_cluster(&mut cluster, &mut snapped);
            }
            cluster.push(edge);
        }
        flush_cluster(&mut cluster, &mut snapped);
    }
    snapped
}

fn flush_cluster(cluster: &mut Vec<Edge>, out: &mut Vec<Edge>) {
    if cluster.is_empty() {
        return;
    }
    let mean = cluster.iter().map(|e| e.position).sum::<f32>() / cluster.len() as f32;
    out.extend(cluster.drain(..).map(|e| Edge { position: mean, ..e }));
}

fn join_edges(edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    let mut lines: BTreeMap<(u8, Key), Vec<Edge>> = BTreeMap::new();
    for edge in edges {
        let tag = match edge.orientation {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        };
        lines.entry((tag, key(edge.position))).or_default().push(edge);
    }

    let mut joined = Vec::new();
    for (_, mut line) in lines {
        line.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut current = line[0];
        for edge in &line[1..] {
            if edge.start <= current.end + tolerance {
                current.end = current.end.max(edge.end);
            } else {
                joined.push(current);
                current = *edge;
            }
        }
        joined.push(current);
    }
    joined
}

/// Snap, join and length-filter the raw ruling segments of a page.
fn build_edges(segments: &[Segment], config: &TableConfig) -> Vec<Edge> {
    let edges: Vec<Edge> = segments.iter().map(Edge::from_segment).collect();
    let edges = snap_edges(edges, config.snap_tolerance);
    join_edges(edges, config.join_tolerance)
        .into_iter()
        .filter(|e| e.end - e.start >= config.min_edge_length)
        .collect()
}

#[derive(Debug, Default)]
struct Intersection {
    x: f32,
    top: f32,
    horizontal: BTreeSet<usize>,
    vertical: BTreeSet<usize>,
}

fn find_intersections(edges: &[Edge], tolerance: f32) -> BTreeMap<(Key, Key), Intersection> {
    let mut points: BTreeMap<(Key, Key), Intersection> = BTreeMap::new();
    let verticals = edges.iter().enumerate().filter(|(_, e)| e.orientation == Orientation::Vertical);

    for (vi, v) in verticals {
        for (hi, h) in edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.orientation == Orientation::Horizontal)
        {
            let crosses = v.start - tolerance <= h.position
                && h.position <= v.end + tolerance
                && h.start - tolerance <= v.position
                && v.position <= h.end + tolerance;
            if crosses {
                // Keyed (x, top) so iteration runs column by column, top to bottom.
                let point = points.entry((key(v.position), key(h.position))).or_insert_with(|| Intersection {
                    x: v.position,
                    top: h.position,
                    ..Default::default()
                });
                point.vertical.insert(vi);
                point.horizontal.insert(hi);
            }
        }
    }
    points
}

/// Smallest rectangles whose four corners are intersections connected by edges.
fn intersections_to_cells(points: &BTreeMap<(Key, Key), Intersection>) -> Vec<Cell> {
    let shares_vertical = |a: &Intersection, b: &Intersection| !a.vertical.is_disjoint(&b.vertical);
    let shares_horizontal = |a: &Intersection, b: &Intersection| !a.horizontal.is_disjoint(&b.horizontal);

    let mut cells = Vec::new();
    for (&(px, pt), point) in points {
        let below = points.range((px, pt + 1)..(px + 1, Key::MIN)).map(|(k, p)| (k.1, p));
        let right: Vec<(Key, &Intersection)> = points
            .iter()
            .filter(|(k, _)| k.1 == pt && k.0 > px)
            .map(|(k, p)| (k.0, p))
            .collect();

        'search: for (bt, below_point) in below {
            if !shares_vertical(point, below_point) {
                continue;
            }
            for (rx, right_point) in &right {
                if !shares_horizontal(point, right_point) {
                    continue;
                }
                let Some(corner) = points.get(&(*rx, bt)) else {
                    continue;
                };
                if shares_vertical(corner, right_point) && shares_horizontal(corner, below_point) {
                    cells.push(Cell {
                        x0: point.x,
                        top: point.top,
                        x1: corner.x,
                        bottom: corner.top,
                    });
                    break 'search;
                }
            }
        }
    }
    cells
}

fn corners(cell: &Cell) -> [(Key, Key); 4] {
    [
        (key(cell.x0), key(cell.top)),
        (key(cell.x1), key(cell.top)),
        (key(cell.x0), key(cell.bottom)),
        (key(cell.x1), key(cell.bottom)),
    ]
}

/// Group cells sharing at least one corner. Single-cell groups are dropped.
fn cells_to_tables(cells: Vec<Cell>) -> Vec<Vec<Cell>> {
    let mut parent: Vec<usize> = (0..cells.len()).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut owner: BTreeMap<(Key, Key), usize> = BTreeMap::new();
    for (index, cell) in cells.iter().enumerate() {
        for corner in corners(cell) {
            match owner.get(&corner) {
                Some(&other) => {
                    let (a, b) = (find(&mut parent, index), find(&mut parent, other));
                    if a != b {
                        parent[a] = b;
                    }
                }
                None => {
                    owner.insert(corner, index);
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<Cell>> = BTreeMap::new();
    for (index, cell) in cells.into_iter().enumerate() {
        let root = find(&mut parent, index);
        groups.entry(root).or_default().push(cell);
    }

    let mut tables: Vec<Vec<Cell>> = groups.into_values().filter(|group| group.len() > 1).collect();
    tables.sort_by(|a, b| {
        let top = |t: &Vec<Cell>| t.iter().map(|c| c.top).fold(f32::INFINITY, f32::min);
        let left = |t: &Vec<Cell>| t.iter().map(|c| c.x0).fold(f32::INFINITY, f32::min);
        top(a).total_cmp(&top(b)).then(left(a).total_cmp(&left(b)))
    });
    tables
}

fn cell_text(cell: &Cell, spans: &[TextSpan]) -> String {
    let mut inside: Vec<(f32, f32, f32, &str)> = spans
        .iter()
        .filter_map(|span| {
            let px = span.x + 0.5;
            let pt = -span.y - 0.25 * span.font_size;
            let contained = cell.x0 <= px && px < cell.x1 && cell.top <= pt && pt < cell.bottom;
            contained.then_some((-span.y, span.x, span.font_size, span.text.as_str()))
        })
        .collect();
    inside.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut lines: Vec<(f32, Vec<(f32, &str)>)> = Vec::new();
    for (baseline, x, size, text) in inside {
        match lines.last_mut() {
            Some((line_baseline, words)) if (baseline - *line_baseline).abs() <= size * 0.5 => {
                words.push((x, text));
            }
            _ => lines.push((baseline, vec![(x, text)])),
        }
    }

    lines
        .into_iter()
        .map(|(_, mut words)| {
            words.sort_by(|a, b| a.0.total_cmp(&b.0));
            words.iter().map(|(_, w)| w.trim()).collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Lay a table's cells out as rows (by top) and columns (by left edge).
fn table_grid(cells: &[Cell], spans: &[TextSpan]) -> RawGrid {
    let columns: BTreeSet<Key> = cells.iter().map(|c| key(c.x0)).collect();
    let mut rows: BTreeMap<Key, BTreeMap<Key, &Cell>> = BTreeMap::new();
    for cell in cells {
        rows.entry(key(cell.top)).or_default().insert(key(cell.x0), cell);
    }

    rows.values()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map(|cell| cell_text(cell, spans)))
                .collect()
        })
        .collect()
}

/// Detect ruled tables in an interpreted page, returning each as a raw grid.
pub fn detect_tables(layout: &PageLayout, config: &TableConfig) -> Vec<RawGrid> {
    let edges = build_edges(&layout.segments, config);
    if edges.is_empty() {
        return Vec::new();
    }
    let points = find_intersections(&edges, config.intersection_tolerance);
    let cells = intersections_to_cells(&points);
    cells_to_tables(cells)
        .iter()
        .map(|table| table_grid(table, &layout.spans))
        .collect()
}

/// Extract every ruled table of a PDF, pruned of blank rows and columns.
///
/// Pages are 1-based and table indices restart at 1 on every page.
pub fn extract_tables_from_pdf(pdf_bytes: &[u8], config: &TableConfig) -> Result<Vec<ExtractedTable>> {
    let document = load_document(pdf_bytes)?;
    let mut tables = Vec::new();

    for (page_number, page_id) in document.get_pages() {
        let layout = interpret_page(&document, page_id)
            .map_err(|e| PdfError::TableExtractionFailed(format!("page {}: {}", page_number, e)))?;
        for (index, grid) in detect_tables(&layout, config).iter().enumerate() {
            tables.push(ExtractedTable {
                page: Some(page_number as usize),
                table_index: index + 1,
                data: prune_blank(grid),
            });
        }
    }

    tracing::debug!(tables = tables.len(), "Detected PDF tables");
    Ok(tables)
}
