/// Baseline comparison command.
pub mod check;
/// Export record listing command.
pub mod exports;
/// Import command.
pub mod import;
/// Schema type listing command.
pub mod types;

#[cfg(test)]
mod test_support;
mod util;
