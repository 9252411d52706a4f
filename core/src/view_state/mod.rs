pub mod camera;
pub mod reconciler;

pub use camera::{CameraDelta, CameraState};
pub use reconciler::{default_hour, CameraOutcome, ViewStateReconciler};
