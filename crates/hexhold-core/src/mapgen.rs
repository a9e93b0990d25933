//! Procedural terrain heights.
//!
//! A seeded, octaved gradient-noise field exposing the pure
//! `height_at(x, y) -> f64 in [0, 1]` collaborator interface the world
//! consumes once per tile at construction.

use crate::rng::GameRng;

const OCTAVES: u32 = 4;
const PERSISTENCE: f64 = 0.6;

/// Deterministic height field over a `width x height` region (the widest hex
/// row included).
pub struct HeightField {
    octaves: Vec<Octave>,
    total_amplitude: f64,
    width: u32,
    height: u32,
}

struct Octave {
    grid_w: u32,
    grid_h: u32,
    gradients: Vec<(f64, f64)>,
    amplitude: f64,
}

impl HeightField {
    pub fn new(seed: u64, width: u32, height: u32) -> Self {
        let mut rng = GameRng::seed_from_u64(seed);
        let mut octaves = Vec::with_capacity(OCTAVES as usize);
        let mut amplitude = 1.0;
        let mut total_amplitude = 0.0;

        for octave in 0..OCTAVES {
            let scale = 1u32 << octave;
            let grid_w = (width / scale.max(1)).max(2);
            let grid_h = (height / scale.max(1)).max(2);
            let gradients = (0..grid_w as usize * grid_h as usize)
                .map(|_| {
                    let angle = rng.next_f64() * std::f64::consts::TAU;
                    (angle.cos(), angle.sin())
                })
                .collect();
            octaves.push(Octave {
                grid_w,
                grid_h,
                gradients,
                amplitude,
            });
            total_amplitude += amplitude;
            amplitude *= PERSISTENCE;
        }

        Self {
            octaves,
            total_amplitude,
            width,
            height,
        }
    }

    /// Height at a lattice coordinate, in [0, 1]. Deterministic for a given
    /// seed and field dimensions.
    pub fn height_at(&self, x: i32, y: i32) -> f64 {
        let mut sum = 0.0;
        for octave in &self.octaves {
            let fx = (x as f64 / self.width as f64) * (octave.grid_w - 1) as f64;
            let fy = (y as f64 / self.height as f64) * (octave.grid_h - 1) as f64;
            sum += gradient_noise(fx, fy, octave.grid_w, &octave.gradients) * octave.amplitude;
        }
        ((sum / self.total_amplitude + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// 2D gradient noise with smootherstep interpolation.
fn gradient_noise(x: f64, y: f64, grid_w: u32, gradients: &[(f64, f64)]) -> f64 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let sx = x - x0 as f64;
    let sy = y - y0 as f64;

    // Smootherstep
    let u = sx * sx * sx * (sx * (sx * 6.0 - 15.0) + 10.0);
    let v = sy * sy * sy * (sy * (sy * 6.0 - 15.0) + 10.0);

    let grad_idx = |gx: i32, gy: i32| -> usize {
        let gx = gx.rem_euclid(grid_w as i32) as usize;
        let gy = gy.rem_euclid((gradients.len() / grid_w as usize) as i32) as usize;
        (gy * grid_w as usize + gx).min(gradients.len() - 1)
    };

    let dot_grid = |gx: i32, gy: i32, dx: f64, dy: f64| -> f64 {
        let (gvx, gvy) = gradients[grad_idx(gx, gy)];
        dx * gvx + dy * gvy
    };

    let n00 = dot_grid(x0, y0, sx, sy);
    let n10 = dot_grid(x1, y0, sx - 1.0, sy);
    let n01 = dot_grid(x0, y1, sx, sy - 1.0);
    let n11 = dot_grid(x1, y1, sx - 1.0, sy - 1.0);

    let nx0 = n00 + u * (n10 - n00);
    let nx1 = n01 + u * (n11 - n01);

    nx0 + v * (nx1 - nx0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heights_in_unit_interval() {
        let field = HeightField::new(42, 20, 15);
        for y in 0..15 {
            for x in 0..=20 {
                let h = field.height_at(x, y);
                assert!((0.0..=1.0).contains(&h), "height {h} at ({x},{y})");
            }
        }
    }

    #[test]
    fn deterministic_per_seed() {
        let a = HeightField::new(7, 16, 12);
        let b = HeightField::new(7, 16, 12);
        for y in 0..12 {
            for x in 0..16 {
                assert_eq!(a.height_at(x, y), b.height_at(x, y));
            }
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = HeightField::new(1, 16, 12);
        let b = HeightField::new(2, 16, 12);
        let any_diff = (0..12)
            .flat_map(|y| (0..16).map(move |x| (x, y)))
            .any(|(x, y)| a.height_at(x, y) != b.height_at(x, y));
        assert!(any_diff);
    }
}
