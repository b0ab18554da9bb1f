#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StudioState {
    /// No artwork uploaded yet.
    #[default]
    Empty,
    Editing,
    /// Crop selection in progress; the composite keeps showing the last applied crop.
    Cropping,
    Exporting,
}

impl StudioState {
    pub const fn has_art(self) -> bool {
        !matches!(self, StudioState::Empty)
    }
}
