//! Contrast limited adaptive histogram equalization.
//!
//! The frame is split into a fixed grid of equally sized
//! tiles. Each tile gets its own equalization LUT, computed
//! from a histogram whose bins are clipped at a limit
//! (with the excess spread back over all bins), and every
//! pixel is mapped through a bilinear blend of the LUTs of the
//! four nearest tile centres.
//!
//! When the frame size is not a multiple of the grid, the
//! frame is extended to the next multiple by mirroring about
//! the last row / column (without repeating it).
use ndarray::Array2;

use crate::{config::ClaheParams, image::GrayFrame};

const BINS: usize = 256;

type Lut = [u8; BINS];

#[derive(Debug, Clone, Copy)]
pub struct Clahe {
    clip_limit: f64,
    tiles_x: usize,
    tiles_y: usize,
}

impl Clahe {
    /// Expects parameters that passed
    /// [`ClaheParams::validate`]; an empty grid is treated as
    /// a single tile.
    pub fn new(params: ClaheParams) -> Self {
        Clahe {
            clip_limit: params.clip_limit,
            tiles_x: params.tile_grid[0].max(1),
            tiles_y: params.tile_grid[1].max(1),
        }
    }

    pub fn apply(&self, src: &GrayFrame) -> GrayFrame {
        let (ht, wid) = src.dim();
        if ht == 0 || wid == 0 {
            return src.clone();
        }

        let tile_w = (wid + self.tiles_x - 1) / self.tiles_x;
        let tile_h = (ht + self.tiles_y - 1) / self.tiles_y;
        let luts = self.tile_luts(src, tile_w, tile_h);

        let inv_tw = 1. / tile_w as f32;
        let inv_th = 1. / tile_h as f32;
        let cols: Vec<_> = (0..wid)
            .map(|x| neighbor_tiles(x, inv_tw, self.tiles_x))
            .collect();

        let mut dst = Array2::zeros((ht, wid));
        for y in 0..ht {
            let (ty1, ty2, ya) = neighbor_tiles(y, inv_th, self.tiles_y);
            let top = &luts[ty1 * self.tiles_x..(ty1 + 1) * self.tiles_x];
            let bottom = &luts[ty2 * self.tiles_x..(ty2 + 1) * self.tiles_x];
            for (x, &(tx1, tx2, xa)) in cols.iter().enumerate() {
                let v = src[(y, x)] as usize;
                let upper = top[tx1][v] as f32 * (1. - xa) + top[tx2][v] as f32 * xa;
                let lower = bottom[tx1][v] as f32 * (1. - xa) + bottom[tx2][v] as f32 * xa;
                let res = upper * (1. - ya) + lower * ya;
                dst[(y, x)] = res.round().max(0.).min(255.) as u8;
            }
        }
        dst
    }

    /// LUTs in row-major tile order.
    fn tile_luts(&self, src: &GrayFrame, tile_w: usize, tile_h: usize) -> Vec<Lut> {
        let (ht, wid) = src.dim();
        let area = tile_w * tile_h;
        let clip = ((self.clip_limit * area as f64 / BINS as f64) as usize).max(1);
        let lut_scale = 255. / area as f32;

        let mut luts = Vec::with_capacity(self.tiles_x * self.tiles_y);
        for ty in 0..self.tiles_y {
            for tx in 0..self.tiles_x {
                let mut hist = [0usize; BINS];
                for y in ty * tile_h..(ty + 1) * tile_h {
                    let row = reflect_101(y, ht);
                    for x in tx * tile_w..(tx + 1) * tile_w {
                        hist[src[(row, reflect_101(x, wid))] as usize] += 1;
                    }
                }
                clip_histogram(&mut hist, clip);

                let mut lut = [0u8; BINS];
                let mut sum = 0;
                for (out, count) in lut.iter_mut().zip(hist.iter()) {
                    sum += count;
                    *out = (sum as f32 * lut_scale).round().min(255.) as u8;
                }
                luts.push(lut);
            }
        }
        luts
    }
}

/// Clip every bin at `limit` and redistribute the excess:
/// evenly over all bins, then the remainder one count at a
/// time at a regular stride starting from bin 0.
fn clip_histogram(hist: &mut [usize; BINS], limit: usize) {
    let mut clipped = 0;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let batch = clipped / BINS;
    let mut residual = clipped - batch * BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

/// Tiles whose centres bracket pixel `pos`, and the weight
/// of the second one. Clamped to the grid at the borders.
fn neighbor_tiles(pos: usize, inv_tile: f32, tiles: usize) -> (usize, usize, f32) {
    let tf = pos as f32 * inv_tile - 0.5;
    let t1 = tf.floor();
    let weight = tf - t1;
    let t1 = t1 as isize;
    let t2 = ((t1 + 1).max(0) as usize).min(tiles - 1);
    (t1.max(0) as usize, t2, weight)
}

/// Mirror index `i` into `0..n` without repeating the edge
/// (`.. 2 1 | 0 1 2 .. n-1 | n-2 ..`).
fn reflect_101(i: usize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i % period;
    if m < n {
        m
    } else {
        period - m
    }
}
