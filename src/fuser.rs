//! Template fusion: merge several impressions of the same finger by
//! spatial bucketing and circular-mean aggregation.

use crate::config::FuserConfig;
use crate::types::{Minutia, MinutiaType, Template};
use std::collections::HashMap;

fn circular_mean_deg(angles_deg: &[f32]) -> f32 {
    if angles_deg.is_empty() {
        return 0.0;
    }
    let n = angles_deg.len() as f32;
    let s: f32 = angles_deg.iter().map(|a| a.to_radians().sin()).sum::<f32>() / n;
    let c: f32 = angles_deg.iter().map(|a| a.to_radians().cos()).sum::<f32>() / n;
    let mean = s.atan2(c).to_degrees();
    (mean + 360.0) % 360.0
}

fn modal_type(kinds: &[MinutiaType]) -> MinutiaType {
    let mut endings = 0;
    let mut bifurcations = 0;
    for k in kinds {
        match k {
            MinutiaType::Ending => endings += 1,
            MinutiaType::Bifurcation => bifurcations += 1,
        }
    }
    if bifurcations > endings {
        MinutiaType::Bifurcation
    } else {
        MinutiaType::Ending
    }
}

/// Fuse several templates of the same finger into one, bucketing minutiae
/// on a `grid_size`-pixel grid. Buckets with fewer than 2 contributing
/// minutiae are dropped as single-impression noise; buckets whose mean
/// quality falls below `min_quality` are dropped as unreliable.
pub fn fuse_templates(templates: &[Template], config: &FuserConfig) -> Template {
    let mut buckets: HashMap<(i32, i32), Vec<Minutia>> = HashMap::new();

    for template in templates {
        for m in template.iter() {
            let key = (
                (m.x as f32 / config.grid_size).round() as i32,
                (m.y as f32 / config.grid_size).round() as i32,
            );
            buckets.entry(key).or_default().push(*m);
        }
    }

    let mut fused = Vec::new();
    for points in buckets.values() {
        if points.len() < 2 {
            continue;
        }
        let n = points.len() as f32;
        let fx = points.iter().map(|p| p.x as f32).sum::<f32>() / n;
        let fy = points.iter().map(|p| p.y as f32).sum::<f32>() / n;
        let angles: Vec<f32> = points.iter().map(|p| p.angle).collect();
        let fa = circular_mean_deg(&angles);
        let kinds: Vec<MinutiaType> = points.iter().map(|p| p.kind).collect();
        let kind = modal_type(&kinds);
        let quality = points.iter().map(|p| p.quality).sum::<f32>() / n;

        if quality < config.min_quality {
            continue;
        }

        fused.push(Minutia {
            x: fx.round() as u32,
            y: fy.round() as u32,
            angle: fa,
            kind,
            quality,
        });
    }

    Template::new(fused)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutia(x: u32, y: u32, angle: f32, quality: f32) -> Minutia {
        Minutia {
            x,
            y,
            angle,
            kind: MinutiaType::Ending,
            quality,
        }
    }

    #[test]
    fn singleton_bucket_is_dropped() {
        let t1: Template = vec![minutia(10, 10, 0.0, 0.9)].into_iter().collect();
        let fused = fuse_templates(&[t1], &FuserConfig::default());
        assert!(fused.is_empty());
    }

    #[test]
    fn agreeing_impressions_produce_a_fused_point() {
        let t1: Template = vec![minutia(100, 100, 10.0, 0.8)].into_iter().collect();
        let t2: Template = vec![minutia(101, 99, 14.0, 0.9)].into_iter().collect();
        let fused = fuse_templates(&[t1, t2], &FuserConfig::default());
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].x, 100);
        assert!((fused[0].angle - 12.0).abs() < 1.0);
    }

    #[test]
    fn low_quality_fusion_is_dropped() {
        let t1: Template = vec![minutia(50, 50, 0.0, 0.1)].into_iter().collect();
        let t2: Template = vec![minutia(51, 50, 0.0, 0.2)].into_iter().collect();
        let fused = fuse_templates(&[t1, t2], &FuserConfig::default());
        assert!(fused.is_empty());
    }

    #[test]
    fn circular_mean_handles_wraparound() {
        assert!((circular_mean_deg(&[350.0, 10.0]) - 0.0).abs() < 1e-3);
    }
}
