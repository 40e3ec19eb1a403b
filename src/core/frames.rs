use image::RgbImage;

/// Ordered, immutable set of decoded frames for one loaded video.
///
/// Shared through `Arc` by the shell, the preview loop and an export worker.
/// Loading another video installs a fresh sequence instead of mutating this one.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<RgbImage>,
}

impl FrameSequence {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self { frames }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RgbImage> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RgbImage> {
        self.frames.iter()
    }

    /// Width and height of the first frame, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(|frame| frame.dimensions())
    }
}

impl From<Vec<RgbImage>> for FrameSequence {
    fn from(frames: Vec<RgbImage>) -> Self {
        Self::new(frames)
    }
}
