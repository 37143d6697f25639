//! Public-site helpers: hero background rotation and gallery shuffle.

use rand::seq::SliceRandom;
use rand::Rng;

/// Random permutation of `0..len`, used as the gallery's initial display order.
pub fn shuffled_order<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// Cycles the hero background through the built gallery images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroRotation {
    images: Vec<String>,
    current: usize,
}

impl HeroRotation {
    /// Starts at a random image. Returns `None` for an empty feed.
    pub fn start<R: Rng + ?Sized>(images: Vec<String>, rng: &mut R) -> Option<Self> {
        if images.is_empty() {
            return None;
        }
        let current = rng.gen_range(0..images.len());
        Some(Self { images, current })
    }

    pub fn current(&self) -> &str {
        &self.images[self.current]
    }

    /// CSS `url(...)` for the current image.
    pub fn current_url(&self) -> String {
        image_url(self.current())
    }

    /// Moves to a random image other than the current one.
    ///
    /// A single-image feed stays put.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &str {
        let len = self.images.len();
        if len > 1 {
            // Draw from the other `len - 1` slots so the result always differs.
            let offset = rng.gen_range(1..len);
            self.current = (self.current + offset) % len;
        }
        self.current()
    }
}

/// Public path of a built image.
pub fn image_url(file_name: &str) -> String {
    format!("/img/{}", file_name)
}
