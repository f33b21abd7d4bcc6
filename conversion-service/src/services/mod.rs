pub mod lifecycle;
pub mod metrics;
pub mod receiver;
pub mod storage;

pub use lifecycle::{ConversionLifecycle, LifecycleState};
pub use metrics::{get_metrics, init_metrics};
pub use receiver::UploadReceiver;
pub use storage::{LocalStorage, StoragePaths};
