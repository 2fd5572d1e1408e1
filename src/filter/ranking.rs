use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A computer that passed every check for a requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub computer_id: u64,
    pub computer_name: String,
    pub total_weight: f64,
}

/// Candidates of one requirement, in inventory order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementCandidates {
    pub requirement: String,
    pub candidates: Vec<Candidate>,
}

/// The computer recommended for a requirement, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub requirement: String,
    pub computer: Option<Candidate>,
}

/// Round-based greedy assignment of computers to requirements, preferring
/// the closest (lowest weight) fit.
///
/// One round runs per requirement. While every requirement scanned so far
/// still has a candidate beyond the round index, they compete on the weight
/// at that index. The first requirement running short of candidates puts the
/// round into limited mode: the running minimum resets, and it and every
/// later requirement compete with all of their candidates. The winner takes
/// its lightest computer not already taken and leaves the contest. Ties go
/// to the requirement listed first.
///
/// The result lists every requirement of `table` in order; no computer is
/// chosen twice.
pub fn rank(table: &[RequirementCandidates]) -> Vec<Choice> {
    let mut contenders: Vec<(usize, Vec<&Candidate>)> = table
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.candidates.is_empty())
        .map(|(position, entry)| {
            let mut sorted: Vec<&Candidate> = entry.candidates.iter().collect();
            sorted.sort_by(|a, b| a.total_weight.total_cmp(&b.total_weight));
            (position, sorted)
        })
        .collect();

    let mut taken: HashSet<u64> = HashSet::new();
    let mut chosen: HashMap<usize, Candidate> = HashMap::new();

    for round in 0..table.len() {
        let mut best = f64::INFINITY;
        let mut pick: Option<usize> = None;
        let mut limited = false;

        for (index, (_, sorted)) in contenders.iter().enumerate() {
            if !limited && sorted.len() > round + 1 {
                let weight = sorted[round].total_weight;
                if weight < best {
                    best = weight;
                    pick = Some(index);
                }
            } else {
                if !limited {
                    limited = true;
                    best = f64::INFINITY;
                }
                for candidate in sorted {
                    if candidate.total_weight < best {
                        best = candidate.total_weight;
                        pick = Some(index);
                    }
                }
            }
        }

        let Some(index) = pick else {
            continue;
        };
        let (position, sorted) = &contenders[index];
        if let Some(candidate) = sorted.iter().find(|c| !taken.contains(&c.computer_id)) {
            log::debug!(
                "Round {}: {} gets {} (weight {:.2})",
                round,
                table[*position].requirement,
                candidate.computer_name,
                candidate.total_weight
            );
            taken.insert(candidate.computer_id);
            chosen.insert(*position, (*candidate).clone());
            contenders.remove(index);
        }
    }

    table
        .iter()
        .enumerate()
        .map(|(position, entry)| Choice {
            requirement: entry.requirement.clone(),
            computer: chosen.remove(&position),
        })
        .collect()
}
