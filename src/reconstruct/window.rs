use crate::error::{RestoreError, Result};

/// Position of a chunk within the schedule.
///
/// A chunk starting at 0 is always `First`, even when it also reaches the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRole {
    First,
    Interior,
    Last,
}

impl std::fmt::Display for ChunkRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkRole::First => write!(f, "first"),
            ChunkRole::Interior => write!(f, "interior"),
            ChunkRole::Last => write!(f, "last"),
        }
    }
}

/// Per-chunk weighting mask.
///
/// This is not a crossfade. The leading `fade_len` samples keep weight 1 and
/// the trailing `fade_len` samples get weight 0, dropping the tail of every
/// chunk that has a successor to cover it. The last chunk keeps its tail.
#[derive(Debug, Clone)]
pub struct WindowProfile {
    template: Vec<f32>,
    fade_len: usize,
}

impl WindowProfile {
    pub fn new(chunk_len: usize, fade_len: usize) -> Result<Self> {
        if fade_len > chunk_len {
            return Err(RestoreError::Config(format!(
                "fade length {} exceeds chunk length {}",
                fade_len, chunk_len
            )));
        }

        let fade_in = vec![1.0f32; fade_len];
        let fade_out = vec![0.0f32; fade_len];

        let mut template = vec![1.0f32; chunk_len];
        let tail = chunk_len - fade_len;
        for (w, f) in template[tail..].iter_mut().zip(&fade_out) {
            *w *= f;
        }
        for (w, f) in template[..fade_len].iter_mut().zip(&fade_in) {
            *w *= f;
        }

        Ok(Self { template, fade_len })
    }

    pub fn chunk_len(&self) -> usize {
        self.template.len()
    }

    pub fn fade_len(&self) -> usize {
        self.fade_len
    }

    /// The shared base mask, before positional overrides.
    pub fn template(&self) -> &[f32] {
        &self.template
    }

    /// A fresh copy of the template with the overrides for `role` applied.
    pub fn mask_for(&self, role: ChunkRole) -> Vec<f32> {
        let mut mask = self.template.clone();
        let tail = mask.len() - self.fade_len;
        match role {
            ChunkRole::First => mask[..self.fade_len].fill(1.0),
            ChunkRole::Last => mask[tail..].fill(1.0),
            ChunkRole::Interior => {}
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_zeroes_tail_only() {
        let window = WindowProfile::new(10, 3).unwrap();
        assert_eq!(
            window.template(),
            &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_first_keeps_leading_and_drops_trailing() {
        let window = WindowProfile::new(10, 3).unwrap();
        let mask = window.mask_for(ChunkRole::First);
        assert!(mask[..3].iter().all(|&w| w == 1.0));
        assert!(mask[7..].iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_interior_drops_trailing() {
        let window = WindowProfile::new(10, 3).unwrap();
        let mask = window.mask_for(ChunkRole::Interior);
        assert_eq!(mask, window.template());
        assert!(mask[7..].iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_last_keeps_trailing() {
        let window = WindowProfile::new(10, 3).unwrap();
        let mask = window.mask_for(ChunkRole::Last);
        assert!(mask.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_overrides_do_not_touch_template() {
        let window = WindowProfile::new(8, 2).unwrap();
        let before = window.template().to_vec();
        let _ = window.mask_for(ChunkRole::Last);
        let _ = window.mask_for(ChunkRole::First);
        assert_eq!(window.template(), before.as_slice());
    }

    #[test]
    fn test_zero_fade_is_all_ones() {
        let window = WindowProfile::new(6, 0).unwrap();
        assert!(window.template().iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_fade_longer_than_chunk() {
        assert!(matches!(
            WindowProfile::new(4, 5),
            Err(RestoreError::Config(_))
        ));
    }
}
