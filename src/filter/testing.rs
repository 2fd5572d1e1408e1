// In-memory inventory for exercising the filter without a GLPI server.
use crate::error::{Error, Result};
use crate::glpi::de::parse_datetime;
use crate::glpi::types::{Computer, Disk, MemoryItem, ProcessorItem, Reservation};
use crate::glpi::urls;
use crate::glpi::Inventory;
use crate::requirements::Requirement;

#[derive(Debug, Clone)]
pub struct Machine {
    pub id: u64,
    pub name: String,
    reservable: bool,
    processors: Vec<u64>,
    memory: Vec<u64>,
    gpus: Vec<String>,
    nics: Vec<String>,
    unreadable_memory: bool,
}

impl Machine {
    pub fn new(id: u64, name: &str) -> Self {
        Machine {
            id,
            name: name.to_string(),
            reservable: true,
            processors: Vec::new(),
            memory: Vec::new(),
            gpus: Vec::new(),
            nics: Vec::new(),
            unreadable_memory: false,
        }
    }

    /// `count` processors sharing `total_cores` evenly.
    pub fn cpus(mut self, count: u64, total_cores: u64) -> Self {
        self.processors = vec![total_cores / count; count as usize];
        self
    }

    pub fn memory(mut self, modules_mb: &[u64]) -> Self {
        self.memory = modules_mb.to_vec();
        self
    }

    pub fn gpus(mut self, models: &[&str]) -> Self {
        self.gpus = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn nics(mut self, models: &[&str]) -> Self {
        self.nics = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn reservable(mut self, reservable: bool) -> Self {
        self.reservable = reservable;
        self
    }

    pub fn unreadable_memory(mut self) -> Self {
        self.unreadable_memory = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeInventory {
    machines: Vec<Machine>,
    pub disks: Vec<Disk>,
    pub reservations: Vec<Reservation>,
}

impl FakeInventory {
    pub fn add(&mut self, machine: Machine) {
        self.machines.push(machine);
    }

    fn machine(&self, computer: &Computer) -> Option<&Machine> {
        self.machines.iter().find(|machine| machine.id == computer.id)
    }
}

impl Inventory for FakeInventory {
    fn list_computers(&self) -> Result<Vec<Computer>> {
        Ok(self.machines.iter().map(|m| computer(m.id, &m.name)).collect())
    }

    fn list_disks(&self) -> Result<Vec<Disk>> {
        let mut disks = self.disks.clone();
        disks.sort_by_key(|disk| disk.totalsize);
        Ok(disks)
    }

    fn list_reservations(&self) -> Result<Vec<Reservation>> {
        Ok(self.reservations.clone())
    }

    fn is_reservable(&self, computer: &Computer) -> Result<bool> {
        Ok(self.machine(computer).is_some_and(|m| m.reservable))
    }

    fn processors(&self, computer: &Computer) -> Result<Vec<ProcessorItem>> {
        Ok(self
            .machine(computer)
            .map(|m| m.processors.iter().map(|&nbcores| ProcessorItem { nbcores }).collect())
            .unwrap_or_default())
    }

    fn memory_modules(&self, computer: &Computer) -> Result<Vec<MemoryItem>> {
        match self.machine(computer) {
            Some(m) if m.unreadable_memory => {
                Err(Error::Decode(serde_json::from_str::<MemoryItem>("{}").unwrap_err()))
            }
            Some(m) => Ok(m.memory.iter().map(|&size| MemoryItem { size }).collect()),
            None => Ok(Vec::new()),
        }
    }

    fn graphic_card_models(&self, computer: &Computer) -> Result<Vec<String>> {
        Ok(self.machine(computer).map(|m| m.gpus.clone()).unwrap_or_default())
    }

    fn network_card_models(&self, computer: &Computer) -> Result<Vec<String>> {
        Ok(self.machine(computer).map(|m| m.nics.clone()).unwrap_or_default())
    }
}

pub fn computer(id: u64, name: &str) -> Computer {
    Computer {
        id,
        name: name.to_string(),
        links: Vec::new(),
    }
}

pub fn disk(id: u64, owner: u64, name: &str, totalsize: u64) -> Disk {
    Disk {
        id,
        itemtype: urls::COMPUTER.to_string(),
        items_id: owner,
        name: name.to_string(),
        totalsize,
    }
}

pub fn reservation(computer_id: u64, begin: &str, end: &str) -> Reservation {
    Reservation {
        id: computer_id * 100,
        item_type: urls::COMPUTER.to_string(),
        item_id: computer_id,
        user_id: 1,
        begin: parse_datetime(begin).unwrap(),
        end: parse_datetime(end).unwrap(),
        comment: String::new(),
    }
}

pub fn requirement(name: &str, cpu_count: u32, core_count: u32, ram_mb: u64) -> Requirement {
    Requirement {
        name: name.to_string(),
        cpu_count,
        core_count,
        ram_mb,
        gpu_model: None,
        nic_model: None,
        disks: Vec::new(),
        window: None,
    }
}
