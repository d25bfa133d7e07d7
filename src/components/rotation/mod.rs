mod actor;
mod handle;
pub mod rooms;
pub mod slides;
pub mod state;

pub use actor::RotationSnapshot;
pub use handle::RotationHandle;
pub use rooms::RoomDirectory;
pub use slides::{DisplayView, Slide, SlideFormatter};
pub use state::{DisplayMode, Freshness, Phase, RotationState};
