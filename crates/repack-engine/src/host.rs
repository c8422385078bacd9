use repack_core::{ProjectRecord, UpdateError};

pub trait BuildHost {
    fn build_project(&mut self, project: &ProjectRecord) -> bool;
    fn build_solution(&mut self) -> bool;
    fn clean_solution(&mut self);
    fn reopen_solution(&mut self);
}

pub trait ProgressSink {
    fn begin_stage(&mut self, stage: &str, total: usize);
    fn advance(&mut self, current: usize);
    fn status(&mut self, text: &str);
}

pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin_stage(&mut self, _stage: &str, _total: usize) {}
    fn advance(&mut self, _current: usize) {}
    fn status(&mut self, _text: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    Abort,
    Retry,
    Ignore,
}

pub struct FailureContext<'a> {
    pub package_id: &'a str,
    pub error: &'a UpdateError,
    pub completed: usize,
    pub during_rollback: bool,
}
