mod archive;
mod host;
mod load;
mod rollback;
mod update;

pub use archive::{archive_current, finalize_session, remove_session_dir, restore_from_archive};
pub use host::{BuildHost, FailureContext, NullProgress, ProgressSink, RecoveryChoice};
pub use load::load_run_context;
pub use rollback::{run_rollback, RollbackReport};
pub use update::{run_update, RunOptions, RunOutcome, RunReport};
