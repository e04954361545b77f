pub mod assertions;
pub mod catalog;
pub mod component;
pub mod fixtures;

// Re-export commonly used items
pub use builders::EventBuilder;
pub use catalog::FakeCatalog;
pub use component::ComponentTestHarness;

pub const TEST_TERMINAL_WIDTH: u16 = 80;
pub const TEST_TERMINAL_HEIGHT: u16 = 24;
pub const TEST_PROJECT: &str = "acme-prod";
