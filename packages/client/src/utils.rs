pub mod console;
pub mod presenter;
pub mod test_setup;

pub use console::ConsolePresenter;
pub use presenter::{
    Background, HistoryEntry, HistoryKind, HistorySink, HumanInput, Presenter, Reveal,
};
