//! Run orchestration and report output.
mod export;
mod runner;
mod summary;


pub use export::{export_report, report_json, resolve_output_format};
pub use runner::{RunPhase, RunReport, run_load_test, run_with_transport};
pub use summary::{print_summary, render_text};
