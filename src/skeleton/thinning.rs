//! Guo-Hall thinning
//!
//! Two alternating sub-iterations, each a parallel deletion pass guarded
//! by a crossing-number test, a connectivity-number range, and a pair of
//! corner products that differ between the two sub-iterations. Iterates
//! to a fixed point (a full pass that deletes nothing).

use image::GrayImage;

fn fg(img: &GrayImage, x: i32, y: i32, width: u32, height: u32) -> u8 {
    if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
        0
    } else if img.get_pixel(x as u32, y as u32).0[0] > 0 {
        1
    } else {
        0
    }
}

/// One Guo-Hall sub-iteration's deletion predicate. `corner_a`/`corner_b`
/// select the two products distinguishing sub-iteration A from B.
#[allow(clippy::too_many_arguments)]
fn should_delete(
    p2: u8,
    p3: u8,
    p4: u8,
    p5: u8,
    p6: u8,
    p7: u8,
    p8: u8,
    p9: u8,
    corner_a: (u8, u8, u8),
    corner_b: (u8, u8, u8),
) -> bool {
    let seq = [p2, p3, p4, p5, p6, p7, p8, p9, p2];
    let c: u32 = (0..8)
        .map(|k| if seq[k] == 0 && seq[k + 1] == 1 { 1 } else { 0 })
        .sum();

    let n1 = (p9 | p2) as u32 + (p3 | p4) as u32 + (p5 | p6) as u32 + (p7 | p8) as u32;
    let n2 = (p2 | p3) as u32 + (p4 | p5) as u32 + (p6 | p7) as u32 + (p8 | p9) as u32;
    let n = n1.min(n2);

    let (a0, a1, a2) = corner_a;
    let (b0, b1, b2) = corner_b;

    c == 1 && (2..=3).contains(&n) && (a0 & a1 & a2) == 0 && (b0 & b1 & b2) == 0
}

/// Thin a binary ridge image (foreground > 0) to a 1-pixel skeleton,
/// iterating both Guo-Hall sub-iterations to a fixed point.
pub fn guo_hall_thinning(binary: &GrayImage) -> GrayImage {
    let (width, height) = binary.dimensions();
    let mut img = binary.clone();
    let mut changed = true;

    while changed {
        changed = false;

        let mut to_zero = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if img.get_pixel(x, y).0[0] == 0 {
                    continue;
                }
                let (xi, yi) = (x as i32, y as i32);
                let p2 = fg(&img, xi, yi - 1, width, height);
                let p3 = fg(&img, xi + 1, yi - 1, width, height);
                let p4 = fg(&img, xi + 1, yi, width, height);
                let p5 = fg(&img, xi + 1, yi + 1, width, height);
                let p6 = fg(&img, xi, yi + 1, width, height);
                let p7 = fg(&img, xi - 1, yi + 1, width, height);
                let p8 = fg(&img, xi - 1, yi, width, height);
                let p9 = fg(&img, xi - 1, yi - 1, width, height);

                if should_delete(p2, p3, p4, p5, p6, p7, p8, p9, (p2, p4, p6), (p4, p6, p8)) {
                    to_zero.push((x, y));
                }
            }
        }
        if !to_zero.is_empty() {
            changed = true;
            for (x, y) in to_zero {
                img.get_pixel_mut(x, y).0[0] = 0;
            }
        }

        let mut to_zero = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if img.get_pixel(x, y).0[0] == 0 {
                    continue;
                }
                let (xi, yi) = (x as i32, y as i32);
                let p2 = fg(&img, xi, yi - 1, width, height);
                let p3 = fg(&img, xi + 1, yi - 1, width, height);
                let p4 = fg(&img, xi + 1, yi, width, height);
                let p5 = fg(&img, xi + 1, yi + 1, width, height);
                let p6 = fg(&img, xi, yi + 1, width, height);
                let p7 = fg(&img, xi - 1, yi + 1, width, height);
                let p8 = fg(&img, xi - 1, yi, width, height);
                let p9 = fg(&img, xi - 1, yi - 1, width, height);

                if should_delete(p2, p3, p4, p5, p6, p7, p8, p9, (p2, p4, p8), (p2, p6, p8)) {
                    to_zero.push((x, y));
                }
            }
        }
        if !to_zero.is_empty() {
            changed = true;
            for (x, y) in to_zero {
                img.get_pixel_mut(x, y).0[0] = 0;
            }
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn thinning_reduces_a_thick_bar_to_one_pixel_wide() {
        let mut img = GrayImage::new(20, 20);
        for y in 8..12 {
            for x in 2..18 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let skel = guo_hall_thinning(&img);
        for x in 4..16 {
            let col_sum: u32 = (0..20).map(|y| (skel.get_pixel(x, y).0[0] > 0) as u32).sum();
            assert!(col_sum <= 1, "column {x} has {col_sum} foreground pixels");
        }
    }

    #[test]
    fn thinning_preserves_a_single_pixel() {
        let mut img = GrayImage::new(10, 10);
        img.put_pixel(5, 5, Luma([255]));
        let skel = guo_hall_thinning(&img);
        assert_eq!(skel.get_pixel(5, 5).0[0], 255);
        assert_eq!(skel.pixels().filter(|p| p.0[0] > 0).count(), 1);
    }
}
