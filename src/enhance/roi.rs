//! Region-of-interest mask: block-variance ridge detection, smoothed by
//! closing then opening with an elliptical structuring element.

use image::GrayImage;

/// Mark each `block`x`block` tile as ridge-bearing (255) when its
/// intensity variance exceeds `variance_threshold`, else background (0).
pub fn block_variance_mask(gray: &GrayImage, block: u32, variance_threshold: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut mask = GrayImage::new(width, height);

    let mut y = 0;
    while y < height {
        let ye = (y + block).min(height);
        let mut x = 0;
        while x < width {
            let xe = (x + block).min(width);

            let mut n = 0f64;
            let mut sum = 0f64;
            let mut sum_sq = 0f64;
            for py in y..ye {
                for px in x..xe {
                    let v = gray.get_pixel(px, py).0[0] as f64;
                    n += 1.0;
                    sum += v;
                    sum_sq += v * v;
                }
            }
            if n >= 16.0 {
                let mean = sum / n;
                let var = sum_sq / n - mean * mean;
                if var >= variance_threshold as f64 {
                    for py in y..ye {
                        for px in x..xe {
                            mask.put_pixel(px, py, image::Luma([255]));
                        }
                    }
                }
            }
            x += block;
        }
        y += block;
    }

    close_open(&mask, 7)
}

/// A binary disc structuring element of the given odd diameter.
fn ellipse_offsets(diameter: u32) -> Vec<(i32, i32)> {
    let r = (diameter / 2) as f32;
    let mut offsets = Vec::new();
    let ri = diameter as i32 / 2;
    for dy in -ri..=ri {
        for dx in -ri..=ri {
            let nx = dx as f32 / r;
            let ny = dy as f32 / r;
            if nx * nx + ny * ny <= 1.0 {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Grayscale dilation: each output pixel is the max over the structuring
/// element's neighborhood (border pixels outside the image contribute 0).
/// For a 0/255 binary image this reduces to the usual binary dilation, so
/// the same kernel serves both the ROI mask (binary) and the Gabor output
/// (grayscale) callers.
fn dilate(img: &GrayImage, offsets: &[(i32, i32)]) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut out = GrayImage::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let mut max_v = 0u8;
            for &(dx, dy) in offsets {
                let px = x + dx;
                let py = y + dy;
                if px >= 0 && py >= 0 && px < width as i32 && py < height as i32 {
                    max_v = max_v.max(img.get_pixel(px as u32, py as u32).0[0]);
                }
            }
            out.put_pixel(x as u32, y as u32, image::Luma([max_v]));
        }
    }
    out
}

/// Grayscale erosion: each output pixel is the min over the structuring
/// element's neighborhood (border pixels outside the image contribute 0,
/// matching OpenCV's default `BORDER_CONSTANT` replicate-free behavior at
/// the edge of a closed image).
fn erode(img: &GrayImage, offsets: &[(i32, i32)]) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut out = GrayImage::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let mut min_v = 255u8;
            for &(dx, dy) in offsets {
                let px = x + dx;
                let py = y + dy;
                let v = if px >= 0 && py >= 0 && px < width as i32 && py < height as i32 {
                    img.get_pixel(px as u32, py as u32).0[0]
                } else {
                    0
                };
                min_v = min_v.min(v);
            }
            out.put_pixel(x as u32, y as u32, image::Luma([min_v]));
        }
    }
    out
}

/// Morphological close then open with an ellipse of the given diameter,
/// run twice for close / once for open.
fn close_open(img: &GrayImage, diameter: u32) -> GrayImage {
    let offsets = ellipse_offsets(diameter);
    let mut closed = img.clone();
    for _ in 0..2 {
        closed = erode(&dilate(&closed, &offsets), &offsets);
    }
    dilate(&erode(&closed, &offsets), &offsets)
}

/// Morphological close with a small ellipse (used after Gabor filtering
/// to bridge thin breaks in ridges), run for one iteration.
pub fn close(img: &GrayImage, diameter: u32) -> GrayImage {
    let offsets = ellipse_offsets(diameter);
    erode(&dilate(img, &offsets), &offsets)
}
