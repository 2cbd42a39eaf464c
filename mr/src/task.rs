#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    Failed,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub enum TaskType {
    Map,
    Reduce,
}

/// Bookkeeping for one worker of one phase. The worker itself never sees
/// this; the coordinator updates it as outcomes are collected.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Task {
    id: usize,
    task_type: TaskType,
    status: TaskStatus,
    records_in: usize,
    records_out: usize,
    output: Option<String>,
    error: Option<String>,
}

impl Task {
    pub fn new(id: usize, task_type: TaskType) -> Task {
        Task {
            id,
            task_type,
            status: TaskStatus::Pending,
            records_in: 0,
            records_out: 0,
            output: None,
            error: None,
        }
    }

    pub fn get_task_id(&self) -> usize {
        self.id
    }

    pub fn get_task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn get_task_status(&self) -> TaskStatus {
        self.status
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub fn get_records_in(&self) -> usize {
        self.records_in
    }

    pub fn set_records_in(&mut self, n: usize) {
        self.records_in = n;
    }

    pub fn get_records_out(&self) -> usize {
        self.records_out
    }

    pub fn get_task_output(&self) -> &Option<String> {
        &self.output
    }

    pub fn get_task_error(&self) -> &Option<String> {
        &self.error
    }

    pub fn complete(&mut self, records_out: usize, output: Option<String>) {
        self.status = TaskStatus::Done;
        self.records_out = records_out;
        self.output = output;
    }

    pub fn fail(&mut self, error: &crate::Error) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.to_string());
    }
}
