#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioEvent {
    Upload,
    Reset,
    BeginCrop,
    FinishCrop,
    CancelCrop,
    BeginExport,
    FinishExport,
}
