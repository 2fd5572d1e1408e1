// Weighted reservation filter: eligibility checks and ranking
pub mod eligibility;
pub mod ranking;

#[cfg(test)]
pub mod testing;

pub use eligibility::{Checker, Verdict};
pub use ranking::{rank, Candidate, Choice, RequirementCandidates};

use crate::error::Result;
use crate::glpi::Inventory;
use crate::output::Progress;
use crate::requirements::Requirement;

/// Result of one filter run.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Every eligible computer per requirement, in requirement order.
    pub available: Vec<RequirementCandidates>,
    /// Present when ranking was requested.
    pub recommendations: Option<Vec<Choice>>,
}

impl FilterOutcome {
    /// Every requirement has a recommendation (ranked) or at least one
    /// candidate (unranked).
    pub fn fulfilled(&self) -> bool {
        match &self.recommendations {
            Some(choices) => choices.iter().all(|choice| choice.computer.is_some()),
            None => self.available.iter().all(|entry| !entry.candidates.is_empty()),
        }
    }
}

/// Checks every (requirement, computer) pair and collects the candidates.
pub fn collect_candidates<I: Inventory + ?Sized>(
    inventory: &I,
    requirements: &[Requirement],
) -> Result<Vec<RequirementCandidates>> {
    log::info!("Fetching computers, disks and reservations");
    let computers = inventory.list_computers()?;
    let disks = inventory.list_disks()?;
    let reservations = inventory.list_reservations()?;
    log::info!(
        "Checking {} computers against {} requirements",
        computers.len(),
        requirements.len()
    );

    let checker = Checker::new(inventory, &disks, &reservations);
    let mut progress = Progress::new(requirements.len() * computers.len());
    let mut table = Vec::with_capacity(requirements.len());

    for requirement in requirements {
        let mut candidates = Vec::new();
        for computer in &computers {
            progress.tick();
            match checker.evaluate(requirement, computer)? {
                Verdict::Eligible(eligibility) => candidates.push(Candidate {
                    computer_id: computer.id,
                    computer_name: computer.name.clone(),
                    total_weight: eligibility.total_weight(),
                }),
                Verdict::Excluded(reason) => {
                    log::debug!("{}: {} excluded, {}", requirement.name, computer.name, reason);
                }
            }
        }
        log::info!("{}: {} candidates", requirement.name, candidates.len());
        table.push(RequirementCandidates {
            requirement: requirement.name.clone(),
            candidates,
        });
    }
    progress.finish();
    Ok(table)
}

/// Runs the filter. With `ranked` unset the weighted assignment is skipped
/// and only the candidate table is returned.
pub fn run<I: Inventory + ?Sized>(
    inventory: &I,
    requirements: &[Requirement],
    ranked: bool,
) -> Result<FilterOutcome> {
    let available = collect_candidates(inventory, requirements)?;
    let recommendations = ranked.then(|| rank(&available));
    Ok(FilterOutcome {
        available,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::testing::{disk, reservation, requirement, FakeInventory, Machine};
    use super::*;
    use crate::requirements::{DiskRequirement, Window};

    fn ids(entry: &RequirementCandidates) -> Vec<u64> {
        entry.candidates.iter().map(|c| c.computer_id).collect()
    }

    #[test]
    fn test_run_prefers_lower_total_weight() {
        let mut inventory = FakeInventory::default();
        inventory.add(Machine::new(1, "big").cpus(1, 8).memory(&[16000, 16000]));
        inventory.add(Machine::new(2, "exact").cpus(1, 4).memory(&[16000]));

        let requirements = vec![requirement("r", 1, 4, 16000)];
        let outcome = run(&inventory, &requirements, true).unwrap();

        let weights: Vec<f64> = outcome.available[0].candidates.iter().map(|c| c.total_weight).collect();
        assert_eq!(weights, vec![5.0, 3.0]);

        let choices = outcome.recommendations.as_ref().unwrap();
        assert_eq!(choices[0].computer.as_ref().unwrap().computer_name, "exact");
        assert!(outcome.fulfilled());
    }

    #[test]
    fn test_failing_computers_never_become_candidates() {
        let mut inventory = FakeInventory::default();
        inventory.add(Machine::new(1, "ok").cpus(2, 16).memory(&[32000]).nics(&["Mellanox ConnectX-6"]));
        inventory.add(Machine::new(2, "few-cores").cpus(2, 4).memory(&[32000]).nics(&["Mellanox ConnectX-6"]));
        inventory.add(Machine::new(3, "low-ram").cpus(2, 16).memory(&[8000]).nics(&["Mellanox ConnectX-6"]));
        inventory.add(Machine::new(4, "wrong-nic").cpus(2, 16).memory(&[32000]).nics(&["Intel X710"]));
        inventory.add(Machine::new(5, "no-disk").cpus(2, 16).memory(&[32000]).nics(&["Mellanox ConnectX-6"]));
        // Machine 5 has no disk at all.
        inventory.disks = (1..=4).map(|owner| disk(10 + owner, owner, "nvme0n1", 1_000_000)).collect();

        let mut wanted = requirement("r", 2, 8, 16000);
        wanted.nic_model = Some("ConnectX".to_string());
        wanted.disks = vec![DiskRequirement {
            min_size_mb: 500_000,
            disk_type: Some("nvme".to_string()),
        }];

        let outcome = run(&inventory, &[wanted], false).unwrap();
        assert_eq!(ids(&outcome.available[0]), vec![1]);
        assert!(outcome.recommendations.is_none());
        assert!(outcome.fulfilled());
    }

    #[test]
    fn test_conflict_only_excludes_for_that_requirement() {
        let mut inventory = FakeInventory::default();
        inventory.add(Machine::new(1, "node-1").cpus(1, 4).memory(&[16000]));
        inventory.reservations = vec![reservation(1, "2024-03-01 00:00:00", "2024-03-31 00:00:00")];

        let at = |s: &str| crate::glpi::de::parse_datetime(s).unwrap();
        let mut march = requirement("march", 1, 4, 16000);
        march.window = Some(Window { start: at("2024-03-10"), end: at("2024-03-12") });
        let mut may = requirement("may", 1, 4, 16000);
        may.window = Some(Window { start: at("2024-05-10"), end: at("2024-05-12") });

        let outcome = run(&inventory, &[march, may], true).unwrap();
        assert!(ids(&outcome.available[0]).is_empty());
        assert_eq!(ids(&outcome.available[1]), vec![1]);

        let choices = outcome.recommendations.as_ref().unwrap();
        assert_eq!(choices[0].computer, None);
        assert_eq!(choices[1].computer.as_ref().map(|c| c.computer_id), Some(1));
        assert!(!outcome.fulfilled());
    }

    #[test]
    fn test_one_machine_two_requirements_reports_none_for_second() {
        let mut inventory = FakeInventory::default();
        inventory.add(Machine::new(1, "only").cpus(1, 4).memory(&[16000]));

        let requirements = vec![requirement("a", 1, 4, 16000), requirement("b", 1, 4, 16000)];
        let outcome = run(&inventory, &requirements, true).unwrap();
        let choices = outcome.recommendations.unwrap();
        assert_eq!(choices[0].computer.as_ref().map(|c| c.computer_id), Some(1));
        assert_eq!(choices[1].computer, None);
    }
}
