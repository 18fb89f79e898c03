//! Static 4-neighbor connectivity.
//!
//! Neighbors are precomputed once as flat cell indices and never change.
//! Order is fixed (north, south, west, east) so every fold over neighbors
//! sums in the same order regardless of which worker runs it.

use crate::config::Boundary;

/// One of the four lattice directions. North is `y - 1`, west is `x - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All directions in neighbor-slot order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }

    /// (dx, dy) step for this direction.
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }
}

/// Neighbor table for a `width`×`height` lattice, cells at `y * width + x`.
#[derive(Clone, Debug)]
pub struct Topology {
    width: usize,
    height: usize,
    boundary: Boundary,
    neighbors: Vec<[Option<usize>; 4]>,
}

impl Topology {
    /// Wires up every cell. Dimensions are assumed positive (checked by the
    /// lattice constructor).
    pub(crate) fn new(width: usize, height: usize, boundary: Boundary) -> Self {
        let mut neighbors = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let mut slots = [None; 4];
                for dir in Direction::ALL {
                    let (dx, dy) = dir.offset();
                    slots[dir.slot()] =
                        resolve(x as isize + dx, y as isize + dy, width, height, boundary);
                }
                neighbors.push(slots);
            }
        }
        Self {
            width,
            height,
            boundary,
            neighbors,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Flat index of (x, y).
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// (x, y) of a flat index.
    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    /// Neighbor of `idx` in `dir`, or `None` past a clamped edge.
    #[inline]
    pub fn neighbor(&self, idx: usize, dir: Direction) -> Option<usize> {
        self.neighbors[idx][dir.slot()]
    }

    /// Existing neighbors of `idx` in north, south, west, east order.
    #[inline]
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[idx].iter().flatten().copied()
    }

    /// How many neighbors `idx` has (4 everywhere on a periodic lattice).
    #[inline]
    pub fn degree(&self, idx: usize) -> usize {
        self.neighbors[idx].iter().flatten().count()
    }
}

fn resolve(x: isize, y: isize, width: usize, height: usize, boundary: Boundary) -> Option<usize> {
    let (w, h) = (width as isize, height as isize);
    match boundary {
        Boundary::Clamped => {
            if x < 0 || y < 0 || x >= w || y >= h {
                None
            } else {
                Some(y as usize * width + x as usize)
            }
        }
        Boundary::Periodic => {
            let xx = x.rem_euclid(w) as usize;
            let yy = y.rem_euclid(h) as usize;
            Some(yy * width + xx)
        }
    }
}
