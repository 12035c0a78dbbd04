//! Breadth-first search over the open cells of a maze.
//!
//! Generation uses [`find_path`] to accept or reject a candidate maze; layout
//! validation uses both helpers again on the finished layout.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use ndarray::Array2;

use crate::*;

/// Shortest 4-connected path of open cells from `start` to `end`, both ends included.
///
/// Returns `None` when either end is a wall or out of range, or no path exists.
pub fn find_path(terrain: &Array2<Terrain>, start: Coord2, end: Coord2) -> Option<Vec<Coord2>> {
    if !is_open(terrain, start) || !is_open(terrain, end) {
        return None;
    }

    let mut came_from: Array2<Option<Coord2>> = Array2::from_elem(terrain.dim(), None);
    let mut queue = VecDeque::from([start]);
    came_from[start.to_nd_index()] = Some(start);

    while let Some(current) = queue.pop_front() {
        if current == end {
            return Some(trace_back(&came_from, start, end));
        }
        for next in terrain.iter_neighbors(current, Neighborhood::Orthogonal) {
            if terrain[next.to_nd_index()].is_open() && came_from[next.to_nd_index()].is_none() {
                came_from[next.to_nd_index()] = Some(current);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Marks every open cell 4-connected to `start`.
pub fn reachable_from(terrain: &Array2<Terrain>, start: Coord2) -> Array2<bool> {
    let mut reached = Array2::from_elem(terrain.dim(), false);
    if !is_open(terrain, start) {
        return reached;
    }

    let mut queue = VecDeque::from([start]);
    reached[start.to_nd_index()] = true;
    while let Some(current) = queue.pop_front() {
        for next in terrain.iter_neighbors(current, Neighborhood::Orthogonal) {
            if terrain[next.to_nd_index()].is_open() && !reached[next.to_nd_index()] {
                reached[next.to_nd_index()] = true;
                queue.push_back(next);
            }
        }
    }
    reached
}

fn is_open(terrain: &Array2<Terrain>, coords: Coord2) -> bool {
    terrain
        .get(coords.to_nd_index())
        .is_some_and(|tile| tile.is_open())
}

fn trace_back(came_from: &Array2<Option<Coord2>>, start: Coord2, end: Coord2) -> Vec<Coord2> {
    let mut path = Vec::from([end]);
    let mut current = end;
    while current != start {
        match came_from[current.to_nd_index()] {
            Some(previous) => {
                path.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `#` is a wall, anything else is open.
    fn terrain(rows: &[&str]) -> Array2<Terrain> {
        let cols = rows[0].len();
        Array2::from_shape_fn((rows.len(), cols), |(row, col)| {
            if rows[row].as_bytes()[col] == b'#' {
                Terrain::Wall
            } else {
                Terrain::Open
            }
        })
    }

    #[test]
    fn path_goes_around_walls() {
        let grid = terrain(&[
            "...", //
            "##.", //
            "...",
        ]);

        let path = find_path(&grid, (0, 0), (2, 0)).unwrap();

        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(2, 0)));
        assert_eq!(path.len(), 7);
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn no_path_through_a_sealed_wall() {
        let grid = terrain(&[
            ".#.", //
            ".#.", //
            ".#.",
        ]);

        assert_eq!(find_path(&grid, (0, 0), (0, 2)), None);
        let reached = reachable_from(&grid, (0, 0));
        assert!(reached[[2, 0]]);
        assert!(!reached[[0, 2]]);
    }

    #[test]
    fn endpoints_on_walls_have_no_path() {
        let grid = terrain(&[".#"]);
        assert_eq!(find_path(&grid, (0, 0), (0, 1)), None);
        assert_eq!(find_path(&grid, (0, 0), (5, 5)), None);
    }

    #[test]
    fn path_to_self_is_a_single_cell() {
        let grid = terrain(&[".."]);
        assert_eq!(find_path(&grid, (0, 1), (0, 1)), Some(Vec::from([(0, 1)])));
    }
}
