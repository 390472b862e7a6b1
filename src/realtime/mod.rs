pub mod notifier;
pub mod subscription;

pub use notifier::{ChangeNotifier, ListenerHandle};
pub use subscription::MessageSubscription;
