//! Policy comparison over a shared workload
//!
//! Validates a workload once, then feeds the same immutable task list to any
//! number of policies and collects one result per policy.

use schedsim_core::{Result, SchedulingPolicy, Task, Ticks};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::admission::validate_workload;

/// Result of one policy run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub policy_name: String,
    pub total_tasks: usize,
    pub average_turnaround: Ticks,
}

/// Runs policies over a fixed workload
#[derive(Debug, Clone)]
pub struct Simulator {
    tasks: Vec<Task>,
}

impl Simulator {
    /// Create a simulator; fails on an invalid workload
    pub fn new(tasks: Vec<Task>) -> Result<Self> {
        validate_workload(&tasks)?;
        Ok(Simulator { tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run a single policy
    pub fn run(&self, policy: &dyn SchedulingPolicy) -> Result<SimulationResult> {
        let average_turnaround = policy.run(&self.tasks)?;
        info!(
            policy = policy.name(),
            tasks = self.tasks.len(),
            average_turnaround,
            "policy run complete"
        );

        Ok(SimulationResult {
            policy_name: policy.name().to_string(),
            total_tasks: self.tasks.len(),
            average_turnaround,
        })
    }

    /// Run every policy in order over the same workload
    pub fn compare(
        &self,
        policies: &[Box<dyn SchedulingPolicy>],
    ) -> Result<Vec<SimulationResult>> {
        policies.iter().map(|policy| self.run(policy.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::{Fcfs, Feedback, PolicyConfig, PolicyKind, RoundRobin, LEVEL};
    use crate::workload::WorkloadGenerator;
    use schedsim_core::SchedError;

    fn scenario() -> Vec<Task> {
        vec![Task::new(1, 5, 0), Task::new(2, 3, 1), Task::new(3, 8, 2)]
    }

    fn all_policies() -> Vec<Box<dyn SchedulingPolicy>> {
        let config = PolicyConfig::default();
        PolicyKind::ALL
            .into_iter()
            .map(|kind| kind.build(&config).unwrap())
            .collect()
    }

    #[test]
    fn test_simulator_rejects_empty_workload() {
        assert!(matches!(
            Simulator::new(Vec::new()),
            Err(SchedError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compare_scenario() {
        let simulator = Simulator::new(scenario()).unwrap();
        let results = simulator.compare(&all_policies()).unwrap();

        let summary: Vec<_> = results
            .iter()
            .map(|r| (r.policy_name.as_str(), r.average_turnaround))
            .collect();
        assert_eq!(summary[0], ("FCFS", 8));
        assert_eq!(summary[1], ("SJF", 8));
        assert_eq!(summary[2], ("RR", 11));
        assert_eq!(summary[3], ("FeedBack", 10));
        assert_eq!(summary[5], ("Stride", 8));
        assert!(results.iter().all(|r| r.total_tasks == 3));
    }

    #[test]
    fn test_policies_do_not_mutate_workload() {
        let tasks = vec![Task::new(3, 8, 2), Task::new(1, 5, 0), Task::new(2, 3, 1)];
        let before = tasks.clone();

        let simulator = Simulator::new(tasks.clone()).unwrap();
        simulator.compare(&all_policies()).unwrap();
        assert_eq!(simulator.tasks(), before.as_slice());

        for policy in all_policies() {
            policy.run(&tasks).unwrap();
            assert_eq!(tasks, before, "{} mutated its input", policy.name());
        }
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let tasks = WorkloadGenerator::new(40, 2.0, 1, 12, 3).unwrap().generate();
        let simulator = Simulator::new(tasks).unwrap();
        let policies = all_policies();

        assert_eq!(
            simulator.compare(&policies).unwrap(),
            simulator.compare(&policies).unwrap()
        );
    }

    #[test]
    fn test_turnaround_lower_bound() {
        // The average can never drop below the mean task length
        let tasks = WorkloadGenerator::new(60, 1.5, 1, 9, 11).unwrap().generate();
        let mean_length = tasks.iter().map(|t| t.length).sum::<Ticks>() / tasks.len() as Ticks;
        let simulator = Simulator::new(tasks).unwrap();

        for result in simulator.compare(&all_policies()).unwrap() {
            assert!(
                result.average_turnaround >= mean_length,
                "{} below mean length",
                result.policy_name
            );
        }
    }

    #[test]
    fn test_time_sliced_policies_reduce_to_fcfs() {
        let tasks = WorkloadGenerator::new(30, 4.0, 1, 8, 5).unwrap().generate();
        let max_length = tasks.iter().map(|t| t.length).max().unwrap();
        let simulator = Simulator::new(tasks).unwrap();

        let fcfs = simulator.run(&Fcfs::new()).unwrap().average_turnaround;
        let rr = simulator
            .run(&RoundRobin::new(max_length).unwrap())
            .unwrap()
            .average_turnaround;
        let feedback = simulator
            .run(&Feedback::new(max_length, LEVEL).unwrap())
            .unwrap()
            .average_turnaround;

        assert_eq!(rr, fcfs);
        assert_eq!(feedback, fcfs);
    }

    #[test]
    fn test_result_json() {
        let result = SimulationResult {
            policy_name: "RR".to_string(),
            total_tasks: 3,
            average_turnaround: 11,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"policy_name":"RR","total_tasks":3,"average_turnaround":11}"#
        );
    }
}
