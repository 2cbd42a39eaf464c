use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::split::{sections, split, Section};
use crate::summary::RunSummary;
use crate::task::{Task, TaskStatus, TaskType};
use crate::worker::{map_lines, reduce_bucket, save_result};
use crate::{shuffle, Error, Result, Workload};

/// Where a run is in the pipeline. `Failed` can follow any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JobState {
    Idle,
    Splitting,
    Mapping,
    Shuffling,
    Reducing,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct JobConfig {
    pub input: PathBuf,
    pub num_mappers: usize,
    pub num_reducers: usize,
    /// Directory receiving `output_<i>.txt`.
    pub output_dir: PathBuf,
}

impl JobConfig {
    pub fn new(input: impl Into<PathBuf>, num_mappers: usize, num_reducers: usize) -> Self {
        JobConfig {
            input: input.into(),
            num_mappers,
            num_reducers,
            output_dir: PathBuf::from("."),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(Error::invalid("input path is empty"));
        }
        if self.num_mappers == 0 {
            return Err(Error::invalid("number of mappers must be positive"));
        }
        if self.num_reducers == 0 {
            return Err(Error::invalid("number of reducers must be positive"));
        }
        Ok(())
    }

    pub fn output_path(&self, reducer: usize) -> PathBuf {
        self.output_dir.join(format!("output_{}.txt", reducer))
    }
}

/// Drives one run: split, map in parallel, shuffle, reduce in parallel.
///
/// Each parallel phase ends in a full barrier: every worker is joined and its
/// outcome recorded before the coordinator decides whether to go on. The
/// first failure (in worker order) aborts the run; nothing is retried.
#[derive(Debug)]
pub struct Coordinator {
    config: JobConfig,
    workload: Workload,
    state: JobState,
    tasks: Vec<Task>,
}

impl Coordinator {
    pub fn new(config: JobConfig, workload: Workload) -> Self {
        Coordinator {
            config,
            workload,
            state: JobState::Idle,
            tasks: vec![],
        }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Runs the pipeline from scratch. Tasks left over from an earlier run on
    /// this coordinator are discarded.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let started = Instant::now();
        self.tasks.clear();
        self.set_state(JobState::Idle);
        match self.run_phases().await {
            Ok(summary) => {
                self.set_state(JobState::Done);
                info!(
                    wall_ms = started.elapsed().as_millis() as u64,
                    outputs = summary.outputs.len(),
                    "run complete"
                );
                Ok(summary)
            }
            Err(e) => {
                // the caller reports the error; keep the log quiet
                debug!(state = ?self.state, "run failed: {}", e);
                self.set_state(JobState::Failed);
                Err(e)
            }
        }
    }

    async fn run_phases(&mut self) -> Result<RunSummary> {
        self.config.validate()?;

        self.set_state(JobState::Splitting);
        let boundaries = split(&self.config.input, self.config.num_mappers)?;
        let sections = sections(&boundaries);

        self.set_state(JobState::Mapping);
        let map_outputs = self.map_phase(&sections).await?;

        self.set_state(JobState::Shuffling);
        let buckets = shuffle::shuffle(&map_outputs, self.config.num_reducers)?;
        drop(map_outputs);

        self.set_state(JobState::Reducing);
        let outputs = self.reduce_phase(buckets).await?;

        Ok(RunSummary {
            input: self.config.input.clone(),
            num_mappers: self.config.num_mappers,
            num_reducers: self.config.num_reducers,
            boundaries,
            tasks: self.tasks.clone(),
            outputs,
        })
    }

    async fn map_phase(&mut self, sections: &[Section]) -> Result<Vec<Vec<String>>> {
        let phase_start = Instant::now();
        let handles: Vec<_> = sections
            .iter()
            .map(|section| {
                let mut task = Task::new(section.index, TaskType::Map);
                task.set_status(TaskStatus::Running);
                self.tasks.push(task);

                let path = self.config.input.clone();
                let map_fn = Arc::clone(&self.workload.map_fn);
                let Section { start, end, .. } = *section;
                debug!(task_id = section.index, start, end, "map task starting");
                tokio::task::spawn_blocking(move || map_lines(&path, start, end, &*map_fn))
            })
            .collect();

        // barrier: every mapper is joined, even after one has failed
        let results = join_all(handles).await;

        let mut outputs = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (i, result) in results.into_iter().enumerate() {
            let task = self.task_mut(TaskType::Map, i);
            match flatten(TaskType::Map, i, result) {
                Ok((lines, records)) => {
                    task.set_records_in(lines);
                    task.complete(records.len(), None);
                    outputs.push(records);
                }
                Err(e) => {
                    debug!(task_id = i, "map task failed: {}", e);
                    task.fail(&e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        info!(
            phase = "map",
            tasks = outputs.len(),
            total_emits = outputs.iter().map(Vec::len).sum::<usize>(),
            wall_ms = phase_start.elapsed().as_millis() as u64,
            "map phase complete"
        );
        Ok(outputs)
    }

    async fn reduce_phase(&mut self, buckets: Vec<Vec<String>>) -> Result<Vec<PathBuf>> {
        let phase_start = Instant::now();
        let paths: Vec<PathBuf> = (0..buckets.len())
            .map(|i| self.config.output_path(i))
            .collect();

        let handles: Vec<_> = buckets
            .into_iter()
            .zip(paths.iter().cloned())
            .enumerate()
            .map(|(i, (bucket, path))| {
                let mut task = Task::new(i, TaskType::Reduce);
                task.set_status(TaskStatus::Running);
                task.set_records_in(bucket.len());
                self.tasks.push(task);

                let reduce_fn = Arc::clone(&self.workload.reduce_fn);
                debug!(task_id = i, records = bucket.len(), output = %path.display(), "reduce task starting");
                tokio::task::spawn_blocking(move || {
                    if bucket.is_empty() {
                        // no keys landed here; still leave an empty file behind
                        save_result(&[], &path).map(|_| 0)
                    } else {
                        reduce_bucket(&bucket, &*reduce_fn, &path)
                    }
                })
            })
            .collect();

        // barrier: every reducer is joined before the run is reported
        let results = join_all(handles).await;

        let mut first_error = None;
        for (i, result) in results.into_iter().enumerate() {
            let output = paths[i].display().to_string();
            let task = self.task_mut(TaskType::Reduce, i);
            match flatten(TaskType::Reduce, i, result) {
                Ok(lines) => task.complete(lines, Some(output)),
                Err(e) => {
                    debug!(task_id = i, "reduce task failed: {}", e);
                    task.fail(&e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        info!(
            phase = "reduce",
            tasks = paths.len(),
            wall_ms = phase_start.elapsed().as_millis() as u64,
            "reduce phase complete"
        );
        Ok(paths)
    }

    fn task_mut(&mut self, task_type: TaskType, id: usize) -> &mut Task {
        let i = self
            .tasks
            .iter()
            .position(|task| task.get_task_type() == task_type && task.get_task_id() == id)
            .unwrap_or_else(|| unreachable!("{:?} task {} was never registered", task_type, id));
        &mut self.tasks[i]
    }

    fn set_state(&mut self, state: JobState) {
        debug!(from = ?self.state, to = ?state, "state change");
        if !matches!(state, JobState::Idle | JobState::Failed | JobState::Done) {
            info!(
                input = %self.config.input.display(),
                mappers = self.config.num_mappers,
                reducers = self.config.num_reducers,
                "entering {:?}",
                state
            );
        }
        self.state = state;
    }
}

/// Turns a worker that panicked (or was cancelled) into a regular error.
fn flatten<T>(
    phase: TaskType,
    index: usize,
    joined: std::result::Result<Result<T>, JoinError>,
) -> Result<T> {
    joined.unwrap_or_else(|e| {
        debug!(?phase, index, "worker did not finish: {}", e);
        Err(Error::WorkerPanicked { phase, index })
    })
}

/// Convenience wrapper: build a coordinator and run it to completion.
pub async fn run(config: JobConfig, workload: Workload) -> Result<RunSummary> {
    Coordinator::new(config, workload).run().await
}
