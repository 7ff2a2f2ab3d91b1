mod order;
mod session;
mod view;

pub use order::SpeakerOrder;
pub use session::Session;
pub use view::{FilteredSection, FilteredView};
