/// Engine-owned copy of the most recent non-silent frame.
///
/// Storage is a channel-major 2D array that only ever grows, so steady-state
/// frames are copied without allocating. Every row of the last frame is
/// zero-padded to the full capacity, so a short channel never exposes values
/// from an earlier frame.
#[derive(Debug, Default, Clone)]
pub struct BinBuffer {
    rows: Vec<Vec<f32>>,
    capacity: usize,
    frame_channels: usize,
    frame_len: usize,
}

impl BinBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated channel rows.
    pub fn channel_capacity(&self) -> usize {
        self.rows.len()
    }

    /// Number of allocated bins per channel row.
    pub fn bin_capacity(&self) -> usize {
        self.capacity
    }

    /// Channels written by the last [`BinBuffer::copy_from`].
    pub fn frame_channels(&self) -> usize {
        self.frame_channels
    }

    /// Longest channel written by the last [`BinBuffer::copy_from`].
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Returns the row for `channel`, if allocated.
    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        self.rows.get(channel).map(Vec::as_slice)
    }

    /// Ensures room for `channels` rows of `bins` values each. Returns whether
    /// storage had to grow. Neither dimension ever shrinks.
    pub fn reserve(&mut self, channels: usize, bins: usize) -> bool {
        if channels <= self.rows.len() && bins <= self.capacity {
            return false;
        }

        let channels = channels.max(self.rows.len());
        let bins = bins.max(self.capacity);
        self.rows.resize_with(channels, Vec::new);
        for row in &mut self.rows {
            row.resize(bins, 0.0);
        }
        self.capacity = bins;
        true
    }

    /// Deep-copies `frame` into the buffer, growing it first if required.
    /// The caller's storage is free to be reused once this returns.
    pub fn copy_from<B: AsRef<[f32]>>(&mut self, frame: &[B]) -> bool {
        let longest = frame.iter().map(|ch| ch.as_ref().len()).max().unwrap_or(0);
        let grew = self.reserve(frame.len(), longest);

        for (row, channel) in self.rows.iter_mut().zip(frame) {
            let channel = channel.as_ref();
            let (head, tail) = row.split_at_mut(channel.len());
            head.copy_from_slice(channel);
            tail.fill(0.0);
        }

        self.frame_channels = frame.len();
        self.frame_len = longest;
        grew
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_values_and_detaches_from_source() {
        let mut buffer = BinBuffer::new();
        let mut frame: Vec<Vec<f32>> = vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]];
        assert!(buffer.copy_from(&frame));

        frame[0][0] = 9.0;
        assert_eq!(buffer.channel(0).unwrap(), &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.channel(1).unwrap(), &[0.4, 0.5, 0.6]);
        assert_eq!(buffer.frame_channels(), 2);
        assert_eq!(buffer.frame_len(), 3);
    }

    #[test]
    fn never_shrinks_in_either_dimension() {
        let mut buffer = BinBuffer::new();
        buffer.copy_from(&[vec![1.0_f32; 8]]);
        assert_eq!((buffer.channel_capacity(), buffer.bin_capacity()), (1, 8));

        // More channels but shorter rows keeps the wider capacity.
        assert!(buffer.copy_from(&[vec![1.0_f32; 4], vec![1.0; 4]]));
        assert_eq!((buffer.channel_capacity(), buffer.bin_capacity()), (2, 8));

        assert!(!buffer.copy_from(&[vec![2.0_f32; 2]]));
        assert_eq!((buffer.channel_capacity(), buffer.bin_capacity()), (2, 8));
        assert_eq!(buffer.frame_len(), 2);
        assert_eq!(&buffer.channel(0).unwrap()[..2], &[2.0, 2.0]);
    }

    #[test]
    fn accepts_ragged_frames() {
        let mut buffer = BinBuffer::new();
        buffer.copy_from(&[vec![1.0_f32], vec![2.0, 3.0, 4.0]]);
        assert_eq!(buffer.bin_capacity(), 3);
        assert_eq!(buffer.channel(0).unwrap(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn short_rows_drop_values_from_earlier_frames() {
        let mut buffer = BinBuffer::new();
        buffer.copy_from(&[vec![7.0_f32; 4], vec![7.0; 4]]);

        buffer.copy_from(&[vec![1.0_f32], vec![2.0, 3.0, 4.0]]);
        assert_eq!(buffer.frame_len(), 3);
        assert_eq!(buffer.channel(0).unwrap(), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[2.0, 3.0, 4.0, 0.0]);
    }
}
