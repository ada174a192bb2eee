//! Generic grid for spatial data

use crate::core::types::Vec2;

/// Generic 2D grid with configurable cell size
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f64,
    pub origin: Vec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f64, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    /// Grid covering a `map_width x map_height` area starting at the origin
    pub fn covering(map_width: f64, map_height: f64, cell_size: f64) -> Self {
        let cols = (map_width / cell_size).floor().max(0.0) as usize;
        let rows = (map_height / cell_size).floor().max(0.0) as usize;
        Self::new(cols, rows, cell_size, Vec2::default())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.width && y < self.height {
            Some(&mut self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Cell coordinates of a world position, `None` outside the grid
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> Option<(usize, usize)> {
        let x = ((pos.x - self.origin.x) / self.cell_size).floor();
        let y = ((pos.y - self.origin.y) / self.cell_size).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Mutable cell at a world position
    pub fn sample_mut(&mut self, pos: Vec2) -> Option<&mut T> {
        let (x, y) = self.cell_of(pos)?;
        self.get_mut(x, y)
    }

    /// Row-major iteration, one slice per row
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks() panics on zero, and a zero-width grid has no rows anyway
        self.data.chunks(self.width.max(1)).take(self.height)
    }
}
