//! Job status lookup values.

/// Status ID type matching the INTEGER column in the database.
pub type StatusId = i64;

/// Job lifecycle status. Transitions are strictly forward:
/// `Created -> Running -> Finished`.
///
/// There is no failed state at this level — solver failures are recorded
/// per model inside the job's `outputs`, and the job still finishes.
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Created = 1,
    Running = 2,
    Finished = 3,
}

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_are_stable() {
        assert_eq!(JobStatus::Created.id(), 1);
        assert_eq!(JobStatus::Running.id(), 2);
        assert_eq!(JobStatus::Finished.id(), 3);
    }
}
