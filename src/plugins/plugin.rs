use std::any::Any;

/// Lifecycle shared by everything the host loads
pub trait Plugin: Send {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Called once before the first command, returns false when the plugin cannot run
    fn init(&mut self) -> bool;

    /// Persist buffered state. Called by the host on a schedule.
    fn flush(&mut self) -> bool {
        true
    }

    /// Called once when the host stops, returns false when state could not be saved
    fn shutdown(&mut self) -> bool;

    /// Allows downcasting to the concrete plugin type
    fn as_any(&self) -> &dyn Any;
}
