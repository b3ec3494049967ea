pub mod click;
pub mod compositor;
pub mod drawing;
pub mod selection;
pub mod state;

pub use selection::{DragState, InputEvent, PointerButton, SelectionTracker};
pub use state::{CaptureOverlay, OverlayAction};
