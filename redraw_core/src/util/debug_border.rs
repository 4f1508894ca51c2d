use palette::Srgba;
use rand::Rng;

pub type Color = Srgba;

/// Translucent background plus opaque border drawn around a fragment. Fresh
/// colors are picked on every render so re-renders are visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugBorder {
    pub background: Color,
    pub border: Color,
    pub width: f32,
}

fn random_color(rng: &mut impl Rng, alpha: f32) -> Color {
    Srgba::new(rng.gen_range(0.7..=1.0), rng.gen_range(0.7..=1.0), rng.gen_range(0.7..=1.0), alpha)
}

impl DebugBorder {
    pub const WIDTH: f32 = 3.0;

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            background: random_color(&mut rng, 0.5),
            border: random_color(&mut rng, 1.0),
            width: Self::WIDTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_borders_stay_in_the_light_range() {
        for _ in 0..32 {
            let border = DebugBorder::random();
            for channel in [border.background.red, border.background.green, border.background.blue] {
                assert!((0.7..=1.0).contains(&channel));
            }
            assert_eq!(border.background.alpha, 0.5);
            assert_eq!(border.border.alpha, 1.0);
            assert_eq!(border.width, 3.0);
        }
    }
}
