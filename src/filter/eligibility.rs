use crate::error::Result;
use crate::glpi::types::{Computer, Disk, MemoryItem, ProcessorItem, Reservation};
use crate::glpi::urls;
use crate::glpi::Inventory;
use crate::requirements::{DiskRequirement, Requirement, Window};
use std::fmt;

/// How far a computer exceeds a requirement on each weighted dimension.
/// Every weight is `available / required` and at least 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eligibility {
    pub cpu_weight: f64,
    pub core_weight: f64,
    pub memory_weight: f64,
}

impl Eligibility {
    pub fn total_weight(&self) -> f64 {
        self.cpu_weight + self.core_weight + self.memory_weight
    }
}

/// First check a computer failed for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    NotReservable,
    Cpus,
    Cores,
    Memory,
    Gpu,
    Nic,
    Disks,
    ReservationConflict,
    /// A sub-record could not be read.
    Unreadable,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Exclusion::NotReservable => "not reservable",
            Exclusion::Cpus => "not enough CPUs",
            Exclusion::Cores => "not enough cores",
            Exclusion::Memory => "not enough memory",
            Exclusion::Gpu => "no matching GPU",
            Exclusion::Nic => "no matching NIC",
            Exclusion::Disks => "disk requirements not met",
            Exclusion::ReservationConflict => "already reserved in the requested window",
            Exclusion::Unreadable => "hardware records unreadable",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Eligible(Eligibility),
    Excluded(Exclusion),
}

fn ratio(available: u64, required: u64) -> Option<f64> {
    if available < required {
        None
    } else {
        Some(available as f64 / required as f64)
    }
}

pub fn cpu_weight(processors: &[ProcessorItem], required: u32) -> Option<f64> {
    ratio(processors.len() as u64, required as u64)
}

pub fn core_weight(processors: &[ProcessorItem], required: u32) -> Option<f64> {
    ratio(processors.iter().map(|cpu| cpu.nbcores).sum(), required as u64)
}

pub fn memory_weight(modules: &[MemoryItem], required_mb: u64) -> Option<f64> {
    ratio(modules.iter().map(|dimm| dimm.size).sum(), required_mb)
}

/// Case-sensitive substring match against any model name.
pub fn any_model_contains(models: &[String], wanted: &str) -> bool {
    models.iter().any(|model| model.contains(wanted))
}

/// First-fit disk matching. `required` must be sorted ascending by size;
/// each of the computer's disks, in the given order, consumes the first
/// still-pending requirement it satisfies.
pub fn disks_satisfied(computer_id: u64, disks: &[Disk], required: &[DiskRequirement]) -> bool {
    let mut pending: Vec<&DiskRequirement> = required.iter().collect();

    for disk in disks
        .iter()
        .filter(|disk| disk.itemtype == urls::COMPUTER && disk.items_id == computer_id)
    {
        let fits = pending.iter().position(|wanted| {
            wanted.min_size_mb <= disk.totalsize
                && wanted
                    .disk_type
                    .as_deref()
                    .map_or(true, |kind| disk.name.contains(kind))
        });
        if let Some(index) = fits {
            pending.remove(index);
        }
    }
    pending.is_empty()
}

pub fn window_conflicts(window: &Window, computer_id: u64, reservations: &[Reservation]) -> bool {
    reservations
        .iter()
        .filter(|reservation| reservation.is_for(urls::COMPUTER, computer_id))
        .any(|reservation| window.collides_with(reservation.begin, reservation.end))
}

/// Evaluates (requirement, computer) pairs against one inventory snapshot.
pub struct Checker<'a, I: Inventory + ?Sized> {
    inventory: &'a I,
    disks: &'a [Disk],
    reservations: &'a [Reservation],
}

impl<'a, I: Inventory + ?Sized> Checker<'a, I> {
    pub fn new(inventory: &'a I, disks: &'a [Disk], reservations: &'a [Reservation]) -> Self {
        Checker {
            inventory,
            disks,
            reservations,
        }
    }

    /// Unreadable sub-records exclude the computer; transport failures are
    /// returned as errors.
    pub fn evaluate(&self, requirement: &Requirement, computer: &Computer) -> Result<Verdict> {
        match self.evaluate_inner(requirement, computer) {
            Err(e) if e.is_candidate_local() => {
                log::debug!("{} ({}): {}", computer.name, computer.id, e);
                Ok(Verdict::Excluded(Exclusion::Unreadable))
            }
            other => other,
        }
    }

    fn evaluate_inner(&self, requirement: &Requirement, computer: &Computer) -> Result<Verdict> {
        use Verdict::Excluded;

        // Cheapest check first; it rules out most of the fleet.
        if !self.inventory.is_reservable(computer)? {
            return Ok(Excluded(Exclusion::NotReservable));
        }

        let processors = self.inventory.processors(computer)?;
        let Some(cpu_weight) = cpu_weight(&processors, requirement.cpu_count) else {
            return Ok(Excluded(Exclusion::Cpus));
        };
        let Some(core_weight) = core_weight(&processors, requirement.core_count) else {
            return Ok(Excluded(Exclusion::Cores));
        };

        let modules = self.inventory.memory_modules(computer)?;
        let Some(memory_weight) = memory_weight(&modules, requirement.ram_mb) else {
            return Ok(Excluded(Exclusion::Memory));
        };

        if let Some(gpu) = &requirement.gpu_model {
            if !any_model_contains(&self.inventory.graphic_card_models(computer)?, gpu) {
                return Ok(Excluded(Exclusion::Gpu));
            }
        }

        if let Some(nic) = &requirement.nic_model {
            if !any_model_contains(&self.inventory.network_card_models(computer)?, nic) {
                return Ok(Excluded(Exclusion::Nic));
            }
        }

        if !requirement.disks.is_empty()
            && !disks_satisfied(computer.id, self.disks, &requirement.disks)
        {
            return Ok(Excluded(Exclusion::Disks));
        }

        if let Some(window) = &requirement.window {
            if window_conflicts(window, computer.id, self.reservations) {
                return Ok(Excluded(Exclusion::ReservationConflict));
            }
        }

        Ok(Verdict::Eligible(Eligibility {
            cpu_weight,
            core_weight,
            memory_weight,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::testing::{computer, disk, reservation, requirement, FakeInventory, Machine};

    fn disk_req(min: u64, kind: Option<&str>) -> DiskRequirement {
        DiskRequirement {
            min_size_mb: min,
            disk_type: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_weights_are_ratios() {
        let cpus = vec![ProcessorItem { nbcores: 8 }, ProcessorItem { nbcores: 8 }];
        assert_eq!(cpu_weight(&cpus, 1), Some(2.0));
        assert_eq!(core_weight(&cpus, 4), Some(4.0));
        assert_eq!(cpu_weight(&cpus, 3), None);
        assert_eq!(core_weight(&cpus, 17), None);

        let dimms = vec![MemoryItem { size: 16000 }, MemoryItem { size: 16000 }];
        assert_eq!(memory_weight(&dimms, 16000), Some(2.0));
        assert_eq!(memory_weight(&dimms, 32001), None);
    }

    #[test]
    fn test_disk_matching_is_first_fit_in_given_order() {
        let required = vec![disk_req(100, None), disk_req(500, None)];
        // The 600 disk takes the 100 slot, leaving 150 to face 500.
        let disks = vec![disk(1, 7, "sda", 600), disk(2, 7, "sdb", 150)];
        assert!(!disks_satisfied(7, &disks, &required));

        let disks = vec![disk(1, 7, "sdb", 150), disk(2, 7, "sda", 600)];
        assert!(disks_satisfied(7, &disks, &required));
    }

    #[test]
    fn test_disk_matching_respects_owner_and_type() {
        let required = vec![disk_req(100, Some("nvme"))];
        let disks = vec![disk(1, 8, "nvme0n1", 1000), disk(2, 7, "sda", 1000)];
        assert!(!disks_satisfied(7, &disks, &required));

        let disks = vec![disk(1, 7, "sda", 1000), disk(2, 7, "nvme0n1", 200)];
        assert!(disks_satisfied(7, &disks, &required));
    }

    #[test]
    fn test_gpu_match_is_case_sensitive_substring() {
        let models = vec!["NVIDIA A100-SXM4-80GB".to_string()];
        assert!(any_model_contains(&models, "A100"));
        assert!(!any_model_contains(&models, "a100"));
        assert!(!any_model_contains(&[], "A100"));
    }

    #[test]
    fn test_checker_excludes_on_each_hard_check() {
        let mut inventory = FakeInventory::default();
        inventory.add(Machine::new(1, "small").cpus(1, 2).memory(&[8000]));
        inventory.add(Machine::new(2, "unreservable").cpus(2, 32).memory(&[64000]).reservable(false));
        inventory.add(Machine::new(3, "no-gpu").cpus(2, 32).memory(&[64000]));
        inventory.add(Machine::new(4, "gpu").cpus(2, 32).memory(&[64000]).gpus(&["NVIDIA A100"]));

        let mut wanted = requirement("r", 1, 4, 16000);
        wanted.gpu_model = Some("A100".to_string());

        let checker = Checker::new(&inventory, &[], &[]);
        let verdict = |id: u64| checker.evaluate(&wanted, &computer(id, "")).unwrap();

        assert_eq!(verdict(1), Verdict::Excluded(Exclusion::Cores));
        assert_eq!(verdict(2), Verdict::Excluded(Exclusion::NotReservable));
        assert_eq!(verdict(3), Verdict::Excluded(Exclusion::Gpu));
        assert!(matches!(verdict(4), Verdict::Eligible(_)));
    }

    #[test]
    fn test_reservation_containing_window_excludes() {
        let mut inventory = FakeInventory::default();
        inventory.add(Machine::new(5, "busy").cpus(1, 4).memory(&[16000]));

        let mut wanted = requirement("r", 1, 4, 16000);
        wanted.window = Some(Window {
            start: crate::glpi::de::parse_datetime("2024-02-10").unwrap(),
            end: crate::glpi::de::parse_datetime("2024-02-12").unwrap(),
        });

        let reservations = vec![reservation(5, "2024-02-01", "2024-02-28")];
        let checker = Checker::new(&inventory, &[], &reservations);
        assert_eq!(
            checker.evaluate(&wanted, &computer(5, "busy")).unwrap(),
            Verdict::Excluded(Exclusion::ReservationConflict)
        );

        let elsewhere = vec![reservation(6, "2024-02-01", "2024-02-28")];
        let checker = Checker::new(&inventory, &[], &elsewhere);
        assert!(matches!(
            checker.evaluate(&wanted, &computer(5, "busy")).unwrap(),
            Verdict::Eligible(_)
        ));
    }

    #[test]
    fn test_unreadable_records_exclude_instead_of_failing() {
        let mut inventory = FakeInventory::default();
        inventory.add(Machine::new(9, "broken").cpus(1, 4).memory(&[16000]).unreadable_memory());

        let checker = Checker::new(&inventory, &[], &[]);
        assert_eq!(
            checker.evaluate(&requirement("r", 1, 1, 1), &computer(9, "broken")).unwrap(),
            Verdict::Excluded(Exclusion::Unreadable)
        );
    }
}
