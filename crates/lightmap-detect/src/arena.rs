/// Enabled/disabled state and current cluster label of every pixel.
///
/// Owned by one clustering run; disabled pixels never come back.
#[derive(Clone, Debug)]
pub struct PixelArena {
    disabled: Vec<bool>,
    group: Vec<Option<usize>>,
    enabled: usize,
}

impl PixelArena {
    pub fn new(num_pixels: usize) -> Self {
        Self {
            disabled: vec![false; num_pixels],
            group: vec![None; num_pixels],
            enabled: num_pixels,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.disabled.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.disabled.is_empty()
    }

    #[inline]
    pub fn is_enabled(&self, idx: usize) -> bool {
        !self.disabled[idx]
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled
    }

    /// Indices of enabled pixels in ascending order.
    pub fn enabled(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| !self.disabled[i]).collect()
    }

    pub fn disable(&mut self, idx: usize) {
        if !self.disabled[idx] {
            self.disabled[idx] = true;
            self.enabled -= 1;
        }
        self.group[idx] = None;
    }

    pub fn disable_all(&mut self, indices: &[usize]) {
        for &idx in indices {
            self.disable(idx);
        }
    }

    pub fn set_group(&mut self, idx: usize, group: usize) {
        if !self.disabled[idx] {
            self.group[idx] = Some(group);
        }
    }

    #[inline]
    pub fn group(&self, idx: usize) -> Option<usize> {
        self.group[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabling_clears_group_and_is_counted_once() {
        let mut arena = PixelArena::new(4);
        arena.set_group(1, 3);
        arena.disable_all(&[1, 1, 2]);
        assert_eq!(arena.enabled_count(), 2);
        assert_eq!(arena.enabled(), vec![0, 3]);
        assert_eq!(arena.group(1), None);
        arena.set_group(1, 0);
        assert_eq!(arena.group(1), None);
    }
}
